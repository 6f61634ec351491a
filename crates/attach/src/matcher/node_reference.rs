use super::Matcher;
use crate::bounds::SharedBounds;
use crate::data::DataProvider;
use crate::error::{AttachError, Result};
use crate::geometry;
use crate::TextAccessor;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::rc::Rc;

/// Binary matcher that checks whether a comment's text mentions the name of a target.
///
/// A comment matches a target only if that target's name is the *only* target name mentioned in
/// the comment; comments mentioning several targets are ambiguous and match nothing. Raw and
/// normalized values are always 0 or 1.
///
/// In strict mode a name has to appear exactly as it is, as a separate word. In fuzzy mode case
/// is ignored and the parts of a name may be separated by arbitrary whitespace, including line
/// breaks. Parts are delimited by whitespace or camel case, so `ParseTree` also matches
/// "parse tree" and "parse\ntree".
///
/// All matching happens in [`Matcher::preprocess`]. Comments are only matched against targets
/// of their own hierarchy level.
pub struct NodeReferenceMatcher<C, T> {
    comment_text: Option<TextAccessor<C>>,
    target_name: Option<TextAccessor<T>>,
    bounds: Option<SharedBounds<C, T>>,
    max_distance: Option<f64>,
    fuzzy: bool,
    found: HashMap<C, T>,
}

impl<C, T> NodeReferenceMatcher<C, T>
where
    C: Clone + Eq + Hash,
    T: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self {
            comment_text: None,
            target_name: None,
            bounds: None,
            max_distance: None,
            fuzzy: false,
            found: HashMap::new(),
        }
    }

    pub fn with_comment_text_provider(
        mut self,
        f: impl Fn(&C) -> Option<String> + 'static,
    ) -> Self {
        self.comment_text = Some(Box::new(f));
        self
    }

    pub fn with_target_name_provider(mut self, f: impl Fn(&T) -> Option<String> + 'static) -> Self {
        self.target_name = Some(Box::new(f));
        self
    }

    pub fn with_fuzzy_matching(mut self) -> Self {
        self.fuzzy = true;
        self
    }

    /// Only keep matches whose comment and target are at most this far apart. Requires a
    /// bounds provider.
    pub fn with_maximum_attachment_distance(mut self, distance: f64) -> Result<Self> {
        if distance < 0.0 || distance.is_nan() {
            return Err(AttachError::invalid(format!(
                "maximum attachment distance must be >= 0, got {distance}"
            )));
        }

        self.max_distance = Some(distance);
        Ok(self)
    }

    pub fn with_bounds_provider(mut self, provider: SharedBounds<C, T>) -> Self {
        self.bounds = Some(provider);
        self
    }

    /// Comment-target pairs found during preprocessing. Only meaningful between
    /// [`Matcher::preprocess`] and [`Matcher::cleanup`].
    pub fn attachments(&self) -> &HashMap<C, T> {
        &self.found
    }

    fn check_configuration(&self) -> Result<()> {
        if self.comment_text.is_none() {
            return Err(AttachError::missing("a comment text provider is required"));
        }

        if self.target_name.is_none() {
            return Err(AttachError::missing("a target name provider is required"));
        }

        if self.max_distance.is_some() && self.bounds.is_none() {
            return Err(AttachError::missing(
                "a bounds provider is required if a maximum attachment distance is set",
            ));
        }

        Ok(())
    }

    fn match_scope(&mut self, scope: &dyn DataProvider<C, T>) -> Result<()> {
        let (Some(comment_text), Some(target_name)) = (&self.comment_text, &self.target_name)
        else {
            return Ok(());
        };

        let comment_texts: Vec<(C, String)> = scope
            .provide_comments()
            .into_iter()
            .filter_map(|comment| {
                let text = comment_text(&comment).filter(|text| !text.is_empty())?;
                Some((comment, text))
            })
            .collect();

        let target_patterns = scope
            .provide_targets()
            .into_iter()
            .filter_map(|target| {
                let name = target_name(&target).filter(|name| !name.trim().is_empty())?;
                let pattern = if self.fuzzy {
                    fuzzy_pattern(&name)
                } else {
                    strict_pattern(&name)
                };
                Some(Regex::new(&pattern).map(|regex| (target, regex)))
            })
            .collect::<std::result::Result<Vec<(T, Regex)>, regex::Error>>()?;

        for (comment, text) in comment_texts {
            let mut mentioned = target_patterns
                .iter()
                .filter(|(_, regex)| regex.is_match(&text))
                .map(|(target, _)| target);

            // only unambiguous references count
            let (Some(target), None) = (mentioned.next(), mentioned.next()) else {
                continue;
            };

            if self.within_max_distance(&comment, target) {
                self.found.insert(comment, target.clone());
            }
        }

        Ok(())
    }

    fn within_max_distance(&self, comment: &C, target: &T) -> bool {
        let Some(max_distance) = self.max_distance else {
            return true;
        };
        let Some(bounds) = self.bounds.as_ref() else {
            return false;
        };

        match (bounds.bounds_for_comment(comment), bounds.bounds_for_target(target)) {
            (Some(c), Some(t)) => {
                geometry::distance(&c, &t).is_some_and(|distance| distance <= max_distance)
            }
            _ => false,
        }
    }
}

impl<C, T> Default for NodeReferenceMatcher<C, T>
where
    C: Clone + Eq + Hash,
    T: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> Matcher<C, T> for NodeReferenceMatcher<C, T>
where
    C: Clone + Eq + Hash,
    T: Clone + PartialEq,
{
    fn raw(&self, comment: &C, target: &T) -> f64 {
        match self.found.get(comment) {
            Some(found) if found == target => 1.0,
            _ => 0.0,
        }
    }

    fn normalized(&self, comment: &C, target: &T) -> f64 {
        self.raw(comment, target)
    }

    fn preprocess(&mut self, data: &dyn DataProvider<C, T>, include_hierarchy: bool) -> Result<()> {
        self.check_configuration()?;
        self.found.clear();

        self.match_scope(data)?;
        if include_hierarchy {
            let mut queue: VecDeque<Rc<dyn DataProvider<C, T>>> =
                data.provide_sub_hierarchies().into();
            while let Some(scope) = queue.pop_front() {
                self.match_scope(scope.as_ref())?;
                queue.extend(scope.provide_sub_hierarchies());
            }
        }

        log::debug!(
            "Node reference matcher found {} unambiguous references",
            self.found.len()
        );
        Ok(())
    }

    fn cleanup(&mut self) {
        self.found.clear();
    }
}

/// Pattern matching the name as a separate word, exactly as written.
fn strict_pattern(name: &str) -> String {
    format!(r"(?s)\b{}\b", regex::escape(name))
}

/// Pattern matching the name case-insensitively with optional whitespace between its parts.
/// A new part starts after a run of whitespace and at every upper-case character that follows a
/// lower-case one.
fn fuzzy_pattern(name: &str) -> String {
    let mut pattern = String::with_capacity(name.len() * 2);
    let mut segment = String::with_capacity(name.len());
    let mut prev: Option<char> = None;

    for ch in name.trim().chars() {
        if ch.is_uppercase() {
            if prev.is_some_and(char::is_lowercase) {
                pattern.push_str(&regex::escape(&segment));
                pattern.push_str(r"\s*");
                segment.clear();
            }
            segment.push(ch);
        } else if ch.is_whitespace() {
            if prev.is_some_and(|p| !p.is_whitespace()) {
                pattern.push_str(&regex::escape(&segment));
                pattern.push_str(r"\s*");
                segment.clear();
            }
        } else {
            segment.push(ch);
        }
        prev = Some(ch);
    }
    pattern.push_str(&regex::escape(&segment));

    format!(r"(?is)\b{pattern}\b")
}
