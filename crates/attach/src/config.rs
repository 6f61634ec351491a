use crate::decider::Aggregator;
use crate::error::{AttachError, Result};
use crate::filter::DEFAULT_MAX_AREA;
use crate::matcher::{
    NormalizationFunction, DEFAULT_MAX_ALIGNMENT_OFFSET, DEFAULT_MAX_ATTACHMENT_DISTANCE,
};
use serde::{Deserialize, Serialize};

/// Declarative configuration of a comment attacher.
///
/// Adapters turn this into a wired [`crate::CommentAttacher`], supplying whatever the
/// configured filters and matchers need to look at their data (bounds, comment texts, target
/// names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachConfig {
    /// Also attach comments in nested scopes
    pub include_hierarchy: bool,

    /// Drop heuristic attachments as soon as a single explicit attachment exists
    pub explicit_attachments_disable_heuristics: bool,

    /// Eligibility filters, all of which a comment has to pass
    pub filters: Vec<FilterConfig>,

    /// Matchers, in registration order
    pub matchers: Vec<MatcherConfig>,

    pub decider: DeciderConfig,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            include_hierarchy: true,
            explicit_attachments_disable_heuristics: true,
            filters: vec![FilterConfig::Size {
                max_area: DEFAULT_MAX_AREA,
            }],
            matchers: vec![
                MatcherConfig::Distance {
                    max_distance: DEFAULT_MAX_ATTACHMENT_DISTANCE,
                    function: NormalizationFunction::Linear,
                },
                MatcherConfig::NodeReference {
                    fuzzy: true,
                    max_distance: None,
                },
            ],
            decider: DeciderConfig::default(),
        }
    }
}

impl AttachConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AttachError::invalid(format!("cannot serialize configuration: {e}")))
    }

    /// Check every value that the builders would reject
    pub fn validate(&self) -> Result<()> {
        for filter in &self.filters {
            filter.validate()?;
        }
        for matcher in &self.matchers {
            matcher.validate()?;
        }
        self.decider.validate()
    }
}

/// Eligibility filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    /// Only comments up to a maximum area are eligible
    Size {
        #[serde(default = "default_max_area")]
        max_area: f64,
    },

    /// Comments are judged by whether their text starts with one of the prefixes
    TextPrefix {
        prefixes: Vec<String>,

        /// Reject comments that start with a prefix (default) instead of accepting only those
        #[serde(default = "default_true")]
        reject_on_match: bool,

        #[serde(default)]
        case_sensitive: bool,
    },
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Size { max_area } => non_negative("max_area", *max_area),
            Self::TextPrefix { prefixes, .. } => {
                if prefixes.is_empty() {
                    return Err(AttachError::invalid(
                        "text_prefix filter needs at least one prefix",
                    ));
                }
                if prefixes.iter().any(String::is_empty) {
                    return Err(AttachError::invalid("prefixes must not be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Matcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherConfig {
    Alignment {
        #[serde(default = "default_max_offset")]
        max_offset: f64,

        #[serde(default)]
        function: NormalizationFunction,
    },

    Distance {
        #[serde(default = "default_max_distance")]
        max_distance: f64,

        #[serde(default)]
        function: NormalizationFunction,
    },

    NodeReference {
        #[serde(default)]
        fuzzy: bool,

        /// Ignore references to targets farther away than this
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_distance: Option<f64>,
    },
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Alignment { max_offset, .. } => non_negative("max_offset", *max_offset),
            Self::Distance { max_distance, .. } => non_negative("max_distance", *max_distance),
            Self::NodeReference { max_distance, .. } => match max_distance {
                Some(distance) => non_negative("max_distance", *distance),
                None => Ok(()),
            },
        }
    }
}

/// Configuration of the aggregating attachment decider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeciderConfig {
    pub aggregator: Aggregator,

    /// Aggregates have to exceed this for a target to be picked
    pub lower_boundary: f64,

    /// Also pick targets whose aggregate equals the lower boundary
    pub include_lower_boundary: bool,
}

impl Default for DeciderConfig {
    fn default() -> Self {
        Self {
            aggregator: Aggregator::Max,
            lower_boundary: 0.0,
            include_lower_boundary: false,
        }
    }
}

impl DeciderConfig {
    pub fn validate(&self) -> Result<()> {
        non_negative("lower_boundary", self.lower_boundary)
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AttachError::invalid(format!(
            "{name} must be a finite value >= 0, got {value}"
        )))
    }
}

fn default_true() -> bool {
    true
}

fn default_max_area() -> f64 {
    DEFAULT_MAX_AREA
}

fn default_max_offset() -> f64 {
    DEFAULT_MAX_ALIGNMENT_OFFSET
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_ATTACHMENT_DISTANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AttachConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_survives_toml() {
        let rendered = AttachConfig::default().to_toml_string().unwrap();
        let parsed = AttachConfig::from_toml_str(&rendered).unwrap();

        assert_eq!(parsed, AttachConfig::default());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(AttachConfig::from_toml_str("").unwrap(), AttachConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let source = r#"
include_hierarchy = false
explicit_attachments_disable_heuristics = false

[[filters]]
type = "text_prefix"
prefixes = ["TODO", "Note:"]

[[matchers]]
type = "alignment"
max_offset = 4.0
function = "binary"

[[matchers]]
type = "node_reference"
max_distance = 120.0

[decider]
aggregator = "mean"
lower_boundary = 0.25
include_lower_boundary = true
"#;
        let config = AttachConfig::from_toml_str(source).unwrap();

        assert!(!config.include_hierarchy);
        assert!(!config.explicit_attachments_disable_heuristics);
        assert_eq!(
            config.filters,
            vec![FilterConfig::TextPrefix {
                prefixes: vec!["TODO".to_string(), "Note:".to_string()],
                reject_on_match: true,
                case_sensitive: false,
            }]
        );
        assert_eq!(
            config.matchers,
            vec![
                MatcherConfig::Alignment {
                    max_offset: 4.0,
                    function: NormalizationFunction::Binary,
                },
                MatcherConfig::NodeReference {
                    fuzzy: false,
                    max_distance: Some(120.0),
                },
            ]
        );
        assert_eq!(
            config.decider,
            DeciderConfig {
                aggregator: Aggregator::Mean,
                lower_boundary: 0.25,
                include_lower_boundary: true,
            }
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let negative_area = "[[filters]]\ntype = \"size\"\nmax_area = -1.0\n";
        assert!(matches!(
            AttachConfig::from_toml_str(negative_area),
            Err(AttachError::InvalidConfiguration(_))
        ));

        let empty_prefix = "[[filters]]\ntype = \"text_prefix\"\nprefixes = [\"\"]\n";
        assert!(AttachConfig::from_toml_str(empty_prefix).is_err());

        let negative_boundary = "[decider]\nlower_boundary = -0.5\n";
        assert!(AttachConfig::from_toml_str(negative_boundary).is_err());
    }

    #[test]
    fn test_unknown_matcher_is_parse_error() {
        let source = "[[matchers]]\ntype = \"telepathy\"\n";
        assert!(matches!(
            AttachConfig::from_toml_str(source),
            Err(AttachError::ConfigParse(_))
        ));
    }
}
