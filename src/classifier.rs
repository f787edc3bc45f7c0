//! Heuristic question classification — cognitive level and sentiment.
//!
//! Both detectors are stateless functions over the raw question text (and,
//! for sentiment, the recent turn history). Keyword lists are configuration
//! data; the matching *order* is load-bearing in both detectors and must not
//! be rearranged.

use crate::config::{MIN_HISTORY_FOR_CARRYOVER, SHORT_FOLLOWUP_WORDS};
use crate::taxonomy::{CognitiveLevel, LEVELS_BY_PRIORITY};
use crate::types::{Sentiment, Turn};

/// Phrases signalling the asker is lost. Matched by substring containment,
/// so `"?"` makes any question-marked text a confusion candidate.
const CONFUSION_KEYWORDS: &[&str] = &[
    "confused", "not sure", "don't get", "difficult", "unclear", "what", "hard",
    "don't understand", "explain", "how does", "what is", "?",
];

/// Phrases signalling frustration. Checked before confusion: a text matching
/// both lists classifies as frustrated.
const FRUSTRATION_KEYWORDS: &[&str] = &[
    "frustrated", "annoying", "still don't get", "not making sense", "too difficult",
    "impossible", "giving up", "waste", "useless", "!",
];

/// Phrases signalling engagement and curiosity.
const CURIOSITY_KEYWORDS: &[&str] = &[
    "interesting", "cool", "awesome", "fascinating", "tell me more", "curious",
    "excited", "wonder", "how about",
];

/// Classify `text` by the cognitive demand of its vocabulary.
///
/// Tokenizes to lowercase whitespace-separated words and scans the levels in
/// priority order (create → remember), returning the first level whose
/// trigger-verb set intersects the token set. Defaults to
/// [`CognitiveLevel::Understand`] when nothing matches.
///
/// The scan direction is a deliberate tie-break: a question containing both
/// "what" and "evaluate" classifies as evaluate.
pub fn detect_cognitive_level(text: &str) -> CognitiveLevel {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    for level in LEVELS_BY_PRIORITY {
        if level
            .trigger_verbs()
            .iter()
            .any(|verb| tokens.contains(verb))
        {
            return level;
        }
    }
    CognitiveLevel::Understand
}

/// Infer the asker's emotional state from `text` and recent `history`.
///
/// Precedence, first match wins:
/// 1. frustration keyword present → frustrated
/// 2. confusion keyword present, or more than one `?` → confused
/// 3. curiosity keyword present → curious
/// 4. short follow-up (< 8 words) after a confused prior turn → confused
/// 5. neutral
pub fn detect_sentiment(text: &str, history: &[Turn]) -> Sentiment {
    let lower = text.to_lowercase();

    if FRUSTRATION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Sentiment::Frustrated;
    }
    if CONFUSION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        || lower.matches('?').count() > 1
    {
        return Sentiment::Confused;
    }
    if CURIOSITY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Sentiment::Curious;
    }

    // A terse follow-up right after a confused message usually means
    // the confusion persists.
    if history.len() >= MIN_HISTORY_FOR_CARRYOVER {
        let prior = &history[history.len() - 2];
        let prior_lower = prior.text.to_lowercase();
        let word_count = lower.split_whitespace().count();
        if CONFUSION_KEYWORDS.iter().any(|kw| prior_lower.contains(kw))
            && word_count < SHORT_FOLLOWUP_WORDS
        {
            return Sentiment::Confused;
        }
    }

    Sentiment::Neutral
}
