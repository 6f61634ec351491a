use crate::bounds::SharedBounds;
use crate::data::DataProvider;
use crate::error::{AttachError, Result};
use crate::TextAccessor;

/// Decides whether a comment may be attached heuristically at all.
///
/// Some comments clearly refer to a diagram as a whole (author notes, legends, titles). Filters
/// keep those from being attached to anything. A comment is only eligible if every configured
/// filter says so.
pub trait Filter<C, T> {
    fn eligible_for_attachment(&self, comment: &C) -> bool;

    /// Called once before a run. Filters with required collaborators fail here if they were never
    /// configured.
    fn preprocess(
        &mut self,
        _data: &dyn DataProvider<C, T>,
        _include_hierarchy: bool,
    ) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) {}
}

/// Default maximum comment area used by [`SizeFilter`]
pub const DEFAULT_MAX_AREA: f64 = 10_000.0;

/// Only lets comments through whose area does not exceed a maximum. Large comments tend to be
/// descriptions of the whole diagram.
///
/// Requires a bounds provider. Comments without bounds are not eligible.
pub struct SizeFilter<C, T> {
    bounds: Option<SharedBounds<C, T>>,
    max_area: f64,
}

impl<C, T> SizeFilter<C, T> {
    pub fn new() -> Self {
        Self {
            bounds: None,
            max_area: DEFAULT_MAX_AREA,
        }
    }

    pub fn with_bounds_provider(mut self, provider: SharedBounds<C, T>) -> Self {
        self.bounds = Some(provider);
        self
    }

    pub fn with_max_area(mut self, max_area: f64) -> Result<Self> {
        if max_area < 0.0 || max_area.is_nan() {
            return Err(AttachError::invalid(format!(
                "maximum comment area must be >= 0, got {max_area}"
            )));
        }

        self.max_area = max_area;
        Ok(self)
    }

    pub fn max_area(&self) -> f64 {
        self.max_area
    }

    fn check_configuration(&self) -> Result<()> {
        if self.bounds.is_none() {
            return Err(AttachError::missing("size filter requires a bounds provider"));
        }
        Ok(())
    }
}

impl<C, T> Default for SizeFilter<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> Filter<C, T> for SizeFilter<C, T> {
    fn eligible_for_attachment(&self, comment: &C) -> bool {
        self.bounds
            .as_ref()
            .and_then(|bounds| bounds.bounds_for_comment(comment))
            .is_some_and(|rect| rect.area() <= self.max_area)
    }

    fn preprocess(
        &mut self,
        _data: &dyn DataProvider<C, T>,
        _include_hierarchy: bool,
    ) -> Result<()> {
        self.check_configuration()
    }
}

/// Filters comments by how their text starts.
///
/// By default comments that start with one of the configured prefixes are rejected and all
/// others are eligible; [`TextPrefixFilter::accept_on_match`] flips that around. Prefixes are
/// compared case-insensitively unless [`TextPrefixFilter::case_sensitive`] is set.
pub struct TextPrefixFilter<C> {
    text: Option<TextAccessor<C>>,
    prefixes: Vec<String>,
    reject_on_match: bool,
    case_sensitive: bool,
}

impl<C> TextPrefixFilter<C> {
    pub fn new() -> Self {
        Self {
            text: None,
            prefixes: Vec::new(),
            reject_on_match: true,
            case_sensitive: false,
        }
    }

    pub fn with_comment_text_provider(
        mut self,
        f: impl Fn(&C) -> Option<String> + 'static,
    ) -> Self {
        self.text = Some(Box::new(f));
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(AttachError::invalid("text prefixes must not be empty"));
        }

        self.prefixes.push(prefix);
        Ok(self)
    }

    pub fn with_prefixes<I, S>(self, prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        prefixes
            .into_iter()
            .try_fold(self, |filter, prefix| filter.with_prefix(prefix))
    }

    /// Comments starting with a prefix become the only eligible ones.
    pub fn accept_on_match(mut self) -> Self {
        self.reject_on_match = false;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    fn check_configuration(&self) -> Result<()> {
        if self.text.is_none() {
            return Err(AttachError::missing(
                "text prefix filter requires a comment text provider",
            ));
        }

        if self.prefixes.is_empty() {
            return Err(AttachError::missing(
                "text prefix filter requires at least one prefix",
            ));
        }

        Ok(())
    }

    fn starts_with_prefix(&self, text: &str) -> bool {
        if self.case_sensitive {
            return self.prefixes.iter().any(|prefix| text.starts_with(prefix.as_str()));
        }

        let text = text.to_lowercase();
        self.prefixes
            .iter()
            .any(|prefix| text.starts_with(&prefix.to_lowercase()))
    }
}

impl<C> Default for TextPrefixFilter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> Filter<C, T> for TextPrefixFilter<C> {
    fn eligible_for_attachment(&self, comment: &C) -> bool {
        let matches = self
            .text
            .as_ref()
            .and_then(|text| text(comment))
            .is_some_and(|text| self.starts_with_prefix(&text));

        if matches {
            !self.reject_on_match
        } else {
            self.reject_on_match
        }
    }

    fn preprocess(
        &mut self,
        _data: &dyn DataProvider<C, T>,
        _include_hierarchy: bool,
    ) -> Result<()> {
        self.check_configuration()
    }
}
