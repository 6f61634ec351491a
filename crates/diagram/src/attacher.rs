use crate::adapter::{AnchorAttachments, DiagramBounds, DiagramScope, SharedDiagram};
use crate::error::Result;
use crate::types::Diagram;
use comment_attach::matcher::NormalizedMatcher;
use comment_attach::{
    AggregatedMatchDecider, AlignmentMatcher, AttachConfig, AttachmentReport,
    CachingBoundsProvider, CachingDataProvider, CommentAttacher, DistanceMatcher, FilterConfig,
    MatcherConfig, NodeReferenceMatcher, SharedBounds, SizeFilter, TextPrefixFilter,
};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// How an attachment came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Explicit,
    Heuristic,
}

/// One applied attachment, by node id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentRecord {
    pub comment: String,
    pub target: String,
    pub kind: AttachmentKind,
}

/// Attachments applied to a diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramReport {
    pub attachments: Vec<AttachmentRecord>,
    pub discarded_heuristics: usize,
}

/// Comment attacher wired up for a [`Diagram`] according to an [`AttachConfig`].
///
/// Bounds lookups and scope contents are cached for the duration of a run.
pub struct DiagramAttacher {
    diagram: SharedDiagram,
    attacher: CommentAttacher<NodeIndex, NodeIndex>,
}

impl DiagramAttacher {
    pub fn from_config(config: &AttachConfig, diagram: Diagram) -> Result<Self> {
        config.validate()?;

        let diagram: SharedDiagram = Rc::new(RefCell::new(diagram));
        let bounds: SharedBounds<NodeIndex, NodeIndex> = Rc::new(CachingBoundsProvider::new(
            DiagramBounds::new(Rc::clone(&diagram)),
        ));

        let mut attacher = CommentAttacher::new()
            .with_bounds_provider(Rc::clone(&bounds))
            .with_explicit_attachment_provider(AnchorAttachments::new(Rc::clone(&diagram)));

        if !config.include_hierarchy {
            attacher = attacher.limit_to_current_hierarchy_level();
        }
        if !config.explicit_attachments_disable_heuristics {
            attacher = attacher.keep_heuristics_enabled_with_explicit_attachments();
        }

        for filter in &config.filters {
            attacher = match filter {
                FilterConfig::Size { max_area } => attacher.add_eligibility_filter(
                    SizeFilter::new()
                        .with_bounds_provider(Rc::clone(&bounds))
                        .with_max_area(*max_area)?,
                ),
                FilterConfig::TextPrefix {
                    prefixes,
                    reject_on_match,
                    case_sensitive,
                } => {
                    let mut prefix_filter = TextPrefixFilter::new()
                        .with_comment_text_provider(label_of(&diagram))
                        .with_prefixes(prefixes.iter().cloned())?;
                    if !reject_on_match {
                        prefix_filter = prefix_filter.accept_on_match();
                    }
                    if *case_sensitive {
                        prefix_filter = prefix_filter.case_sensitive();
                    }
                    attacher.add_eligibility_filter(prefix_filter)
                }
            };
        }

        for matcher in &config.matchers {
            attacher = match matcher {
                MatcherConfig::Alignment {
                    max_offset,
                    function,
                } => attacher.add_matcher(
                    AlignmentMatcher::new()
                        .with_bounds_provider(Rc::clone(&bounds))
                        .with_maximum_alignment_offset(*max_offset)?
                        .with_normalization_function(*function),
                ),
                MatcherConfig::Distance {
                    max_distance,
                    function,
                } => attacher.add_matcher(
                    DistanceMatcher::new()
                        .with_bounds_provider(Rc::clone(&bounds))
                        .with_maximum_attachment_distance(*max_distance)?
                        .with_normalization_function(*function),
                ),
                MatcherConfig::NodeReference {
                    fuzzy,
                    max_distance,
                } => {
                    let mut node_reference = NodeReferenceMatcher::new()
                        .with_comment_text_provider(label_of(&diagram))
                        .with_target_name_provider(name_of(&diagram));
                    if *fuzzy {
                        node_reference = node_reference.with_fuzzy_matching();
                    }
                    if let Some(distance) = max_distance {
                        node_reference = node_reference
                            .with_bounds_provider(Rc::clone(&bounds))
                            .with_maximum_attachment_distance(*distance)?;
                    }
                    attacher.add_matcher(node_reference)
                }
            };
        }

        let mut decider = AggregatedMatchDecider::new()
            .with_builtin_aggregator(config.decider.aggregator)
            .with_lower_boundary(config.decider.lower_boundary)?;
        if config.decider.include_lower_boundary {
            decider = decider.include_lower_boundary();
        }

        log::debug!(
            "Configured attacher with {} filters and {} matchers",
            config.filters.len(),
            config.matchers.len()
        );

        Ok(Self {
            diagram,
            attacher: attacher.with_attachment_decider(decider),
        })
    }

    /// Attach the diagram's comments, adding an `Annotates` edge for every attachment.
    pub fn run(&mut self) -> Result<DiagramReport> {
        let scope = CachingDataProvider::new(DiagramScope::root(Rc::clone(&self.diagram)));
        let report = self.attacher.attach_comments(&scope)?;
        Ok(self.describe(&report))
    }

    pub fn diagram(&self) -> Ref<'_, Diagram> {
        self.diagram.borrow()
    }

    fn describe(&self, report: &AttachmentReport<NodeIndex, NodeIndex>) -> DiagramReport {
        let diagram = self.diagram.borrow();
        let id_of = |idx: NodeIndex| {
            diagram
                .node(idx)
                .map(|node| node.id.clone())
                .unwrap_or_default()
        };
        let mut attachments = Vec::with_capacity(report.total());
        for (pairs, kind) in [
            (&report.explicit, AttachmentKind::Explicit),
            (&report.heuristic, AttachmentKind::Heuristic),
        ] {
            for &(comment, target) in pairs {
                attachments.push(AttachmentRecord {
                    comment: id_of(comment),
                    target: id_of(target),
                    kind,
                });
            }
        }

        DiagramReport {
            attachments,
            discarded_heuristics: report.discarded_heuristics,
        }
    }
}

fn label_of(diagram: &SharedDiagram) -> impl Fn(&NodeIndex) -> Option<String> + 'static {
    let diagram = Rc::clone(diagram);
    move |idx: &NodeIndex| diagram.borrow().node(*idx).map(|node| node.label.clone())
}

fn name_of(diagram: &SharedDiagram) -> impl Fn(&NodeIndex) -> Option<String> + 'static {
    let diagram = Rc::clone(diagram);
    move |idx: &NodeIndex| diagram.borrow().node(*idx).map(|node| node.name().to_string())
}
