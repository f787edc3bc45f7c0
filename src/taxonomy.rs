//! Bloom's taxonomy table — the static mapping from cognitive levels to
//! their descriptions and trigger vocabulary.
//!
//! Pure data consumed by the classifier and the prompt composer. The
//! priority order is explicit ([`LEVELS_BY_PRIORITY`]) rather than derived
//! from map iteration, because classification depends on it: higher-order
//! levels must win when a question mixes vocabulary from several levels.

use serde::{Deserialize, Serialize};

/// Cognitive demand of a question, per Bloom's six-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

/// Classification priority: highest-order level first.
///
/// A question containing both "what" (remember) and "evaluate" classifies
/// as Evaluate because this list is scanned front to back.
pub const LEVELS_BY_PRIORITY: [CognitiveLevel; 6] = [
    CognitiveLevel::Create,
    CognitiveLevel::Evaluate,
    CognitiveLevel::Analyze,
    CognitiveLevel::Apply,
    CognitiveLevel::Understand,
    CognitiveLevel::Remember,
];

impl CognitiveLevel {
    /// Lowercase label used in API responses and prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "remember",
            CognitiveLevel::Understand => "understand",
            CognitiveLevel::Apply => "apply",
            CognitiveLevel::Analyze => "analyze",
            CognitiveLevel::Evaluate => "evaluate",
            CognitiveLevel::Create => "create",
        }
    }

    /// Parse a label back into a level, case-insensitively.
    pub fn from_label(label: &str) -> Option<CognitiveLevel> {
        match label.to_lowercase().as_str() {
            "remember" => Some(CognitiveLevel::Remember),
            "understand" => Some(CognitiveLevel::Understand),
            "apply" => Some(CognitiveLevel::Apply),
            "analyze" => Some(CognitiveLevel::Analyze),
            "evaluate" => Some(CognitiveLevel::Evaluate),
            "create" => Some(CognitiveLevel::Create),
            _ => None,
        }
    }

    /// One-line description of what the level demands.
    pub fn description(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "Recall facts and basic concepts",
            CognitiveLevel::Understand => "Explain ideas or concepts",
            CognitiveLevel::Apply => "Use information in new situations",
            CognitiveLevel::Analyze => "Draw connections among ideas",
            CognitiveLevel::Evaluate => "Justify a stand or decision",
            CognitiveLevel::Create => "Produce new or original work",
        }
    }

    /// Vocabulary that triggers this level during classification.
    /// Matched case-insensitively against whole tokens.
    pub fn trigger_verbs(&self) -> &'static [&'static str] {
        match self {
            CognitiveLevel::Remember => &[
                "define", "list", "name", "identify", "recall", "state", "what", "who",
                "when", "where",
            ],
            CognitiveLevel::Understand => &[
                "explain", "describe", "interpret", "summarize", "discuss", "clarify",
                "how", "why",
            ],
            CognitiveLevel::Apply => &[
                "apply", "demonstrate", "calculate", "solve", "use", "illustrate", "show",
            ],
            CognitiveLevel::Analyze => &[
                "analyze", "compare", "contrast", "distinguish", "examine",
                "differentiate", "relationship",
            ],
            CognitiveLevel::Evaluate => &[
                "evaluate", "assess", "critique", "judge", "defend", "argue", "support",
                "recommend", "best",
            ],
            CognitiveLevel::Create => &[
                "create", "design", "develop", "propose", "construct", "formulate",
                "devise", "invent",
            ],
        }
    }
}

impl std::fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_create_down_to_remember() {
        assert_eq!(LEVELS_BY_PRIORITY[0], CognitiveLevel::Create);
        assert_eq!(LEVELS_BY_PRIORITY[5], CognitiveLevel::Remember);
    }

    #[test]
    fn every_level_has_verbs_and_description() {
        for level in LEVELS_BY_PRIORITY {
            assert!(!level.trigger_verbs().is_empty());
            assert!(!level.description().is_empty());
        }
    }

    #[test]
    fn labels_round_trip_through_from_label() {
        for level in LEVELS_BY_PRIORITY {
            assert_eq!(CognitiveLevel::from_label(level.label()), Some(level));
            assert_eq!(
                CognitiveLevel::from_label(&level.label().to_uppercase()),
                Some(level)
            );
        }
        assert_eq!(CognitiveLevel::from_label("synthesize"), None);
    }

    #[test]
    fn labels_are_lowercase() {
        for level in LEVELS_BY_PRIORITY {
            assert_eq!(level.label(), level.label().to_lowercase());
        }
    }
}
