use crate::bounds::SharedBounds;
use crate::data::DataProvider;
use crate::decider::{AggregatedMatchDecider, AttachmentDecider, ScoreMatrix};
use crate::error::Result;
use crate::explicit::{ExplicitAttachmentProvider, NoExplicitAttachments};
use crate::filter::Filter;
use crate::matcher::{Matcher, MatcherId};
use serde::Serialize;
use std::collections::VecDeque;
use std::hash::Hash;
use std::rc::Rc;

/// Attachments applied by one run of [`CommentAttacher::attach_comments`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentReport<C, T> {
    /// Explicit attachments, in the order they were applied
    pub explicit: Vec<(C, T)>,

    /// Heuristic attachments, in the order they were applied
    pub heuristic: Vec<(C, T)>,

    /// Heuristic decisions that were dropped because explicit attachments took precedence
    pub discarded_heuristics: usize,
}

impl<C, T> AttachmentReport<C, T> {
    /// Total number of attachments applied
    pub fn total(&self) -> usize {
        self.explicit.len() + self.heuristic.len()
    }
}

struct Decisions<C, T> {
    explicit: Vec<(C, T)>,
    heuristic: Vec<(C, T)>,
}

/// Drives comment attachment for a hierarchical data set.
///
/// A run first asks every collaborator to preprocess, then walks the scopes breadth-first and
/// decides on an attachment for each comment, then cleans up, and only then applies the
/// decisions through the root data provider:
///
/// 1. A comment with an explicit attachment is attached to that target.
/// 2. Otherwise, if the comment passes every eligibility filter, each candidate target is rated
///    by every matcher and the attachment decider picks the winner, if any.
///
/// By default, heuristic attachments are only applied if no explicit attachment was found at
/// all. This is checked while walking the scopes (once an explicit attachment turned up, the
/// heuristics aren't even asked anymore) and again when applying decisions (heuristic decisions
/// made before the first explicit attachment turned up are discarded).
pub struct CommentAttacher<C, T> {
    include_hierarchy: bool,
    explicit_disables_heuristics: bool,
    explicit: Box<dyn ExplicitAttachmentProvider<C, T>>,
    bounds: Option<SharedBounds<C, T>>,
    filters: Vec<Box<dyn Filter<C, T>>>,
    matchers: Vec<(MatcherId, Box<dyn Matcher<C, T>>)>,
    decider: Box<dyn AttachmentDecider<T>>,
}

impl<C, T> CommentAttacher<C, T>
where
    C: Clone + Eq + Hash + 'static,
    T: Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            include_hierarchy: true,
            explicit_disables_heuristics: true,
            explicit: Box::new(NoExplicitAttachments),
            bounds: None,
            filters: Vec::new(),
            matchers: Vec::new(),
            decider: Box::new(AggregatedMatchDecider::new()),
        }
    }

    /// Only handle the comments of the root scope.
    pub fn limit_to_current_hierarchy_level(mut self) -> Self {
        self.include_hierarchy = false;
        self
    }

    /// Apply heuristic attachments even if explicit attachments were found.
    pub fn keep_heuristics_enabled_with_explicit_attachments(mut self) -> Self {
        self.explicit_disables_heuristics = false;
        self
    }

    pub fn with_explicit_attachment_provider(
        mut self,
        provider: impl ExplicitAttachmentProvider<C, T> + 'static,
    ) -> Self {
        self.explicit = Box::new(provider);
        self
    }

    /// Bounds provider whose lifecycle the attacher manages. Filters and matchers that need
    /// bounds usually share the same provider.
    pub fn with_bounds_provider(mut self, provider: SharedBounds<C, T>) -> Self {
        self.bounds = Some(provider);
        self
    }

    pub fn add_eligibility_filter(mut self, filter: impl Filter<C, T> + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Register a matcher. Its scores show up in score matrices under the next free
    /// [`MatcherId`], starting at 0.
    pub fn add_matcher(mut self, matcher: impl Matcher<C, T> + 'static) -> Self {
        let id = MatcherId(self.matchers.len());
        self.matchers.push((id, Box::new(matcher)));
        self
    }

    pub fn with_attachment_decider(mut self, decider: impl AttachmentDecider<T> + 'static) -> Self {
        self.decider = Box::new(decider);
        self
    }

    pub fn include_hierarchy(&self) -> bool {
        self.include_hierarchy
    }

    pub fn matcher_ids(&self) -> Vec<MatcherId> {
        self.matchers.iter().map(|(id, _)| *id).collect()
    }

    /// Find and apply attachments for the comments of `root` and, unless limited to the
    /// current hierarchy level, of all scopes below it.
    ///
    /// If anything fails before decisions are applied, all collaborators are still cleaned up
    /// and nothing is attached.
    pub fn attach_comments(
        &mut self,
        root: &dyn DataProvider<C, T>,
    ) -> Result<AttachmentReport<C, T>> {
        let outcome = self
            .preprocess(root)
            .and_then(|()| self.discover(root));
        self.cleanup(root);
        let decisions = outcome?;

        let mut report = AttachmentReport {
            explicit: Vec::with_capacity(decisions.explicit.len()),
            heuristic: Vec::new(),
            discarded_heuristics: 0,
        };

        for (comment, target) in decisions.explicit {
            root.attach(&comment, &target);
            report.explicit.push((comment, target));
        }

        if self.heuristics_allowed(report.explicit.len()) {
            for (comment, target) in decisions.heuristic {
                root.attach(&comment, &target);
                report.heuristic.push((comment, target));
            }
        } else if !decisions.heuristic.is_empty() {
            report.discarded_heuristics = decisions.heuristic.len();
            log::warn!(
                "Discarding {} heuristic attachments in favor of {} explicit attachments",
                report.discarded_heuristics,
                report.explicit.len()
            );
        }

        log::info!(
            "Attached {} comments ({} explicit, {} heuristic)",
            report.total(),
            report.explicit.len(),
            report.heuristic.len()
        );
        Ok(report)
    }

    fn heuristics_allowed(&self, explicit_count: usize) -> bool {
        explicit_count == 0 || !self.explicit_disables_heuristics
    }

    fn preprocess(&mut self, root: &dyn DataProvider<C, T>) -> Result<()> {
        let include_hierarchy = self.include_hierarchy;

        root.preprocess(include_hierarchy);
        self.explicit.preprocess(root, include_hierarchy)?;
        for filter in &mut self.filters {
            filter.preprocess(root, include_hierarchy)?;
        }
        for (_, matcher) in &mut self.matchers {
            matcher.preprocess(root, include_hierarchy)?;
        }
        if let Some(bounds) = &self.bounds {
            bounds.preprocess(root, include_hierarchy);
        }

        Ok(())
    }

    fn cleanup(&mut self, root: &dyn DataProvider<C, T>) {
        self.explicit.cleanup();
        for filter in &mut self.filters {
            filter.cleanup();
        }
        for (_, matcher) in &mut self.matchers {
            matcher.cleanup();
        }
        if let Some(bounds) = &self.bounds {
            bounds.cleanup();
        }
        root.cleanup();
    }

    fn discover(&self, root: &dyn DataProvider<C, T>) -> Result<Decisions<C, T>> {
        let mut decisions = Decisions {
            explicit: Vec::new(),
            heuristic: Vec::new(),
        };

        self.discover_in_scope(root, &mut decisions)?;

        if self.include_hierarchy {
            let mut queue: VecDeque<Rc<dyn DataProvider<C, T>>> =
                root.provide_sub_hierarchies().into();
            while let Some(scope) = queue.pop_front() {
                self.discover_in_scope(scope.as_ref(), &mut decisions)?;
                queue.extend(scope.provide_sub_hierarchies());
            }
        }

        Ok(decisions)
    }

    fn discover_in_scope(
        &self,
        scope: &dyn DataProvider<C, T>,
        decisions: &mut Decisions<C, T>,
    ) -> Result<()> {
        for comment in scope.provide_comments() {
            if let Some(target) = self.explicit.find_explicit_attachment(&comment) {
                log::debug!("Found explicit attachment for comment");
                decisions.explicit.push((comment, target));
                continue;
            }

            if !self.heuristics_allowed(decisions.explicit.len()) || !self.is_eligible(&comment) {
                continue;
            }

            if let Some(target) = self.find_heuristic_attachment(scope, &comment)? {
                log::debug!("Heuristics decided on an attachment for comment");
                decisions.heuristic.push((comment, target));
            }
        }

        Ok(())
    }

    fn is_eligible(&self, comment: &C) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.eligible_for_attachment(comment))
    }

    fn find_heuristic_attachment(
        &self,
        scope: &dyn DataProvider<C, T>,
        comment: &C,
    ) -> Result<Option<T>> {
        if self.matchers.is_empty() {
            return Ok(None);
        }

        let targets = scope.provide_targets_for(comment);
        if targets.is_empty() {
            return Ok(None);
        }

        let matrix: ScoreMatrix<T> = targets
            .into_iter()
            .map(|target| {
                let scores = self
                    .matchers
                    .iter()
                    .map(|(id, matcher)| (*id, matcher.normalized(comment, &target)))
                    .collect();
                (target, scores)
            })
            .collect();

        self.decider.make_attachment_decision(&matrix)
    }
}

impl<C, T> Default for CommentAttacher<C, T>
where
    C: Clone + Eq + Hash + 'static,
    T: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
