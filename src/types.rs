//! Shared types and data structures for the dialogue controller.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::config::MAX_MEMORY_TURNS;
use crate::taxonomy::CognitiveLevel;

/// Coarse emotional state inferred from question phrasing and recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Neutral,
    Confused,
    Frustrated,
    Curious,
}

impl Sentiment {
    /// Lowercase label used in API responses.
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Neutral => "neutral",
            Sentiment::Confused => "confused",
            Sentiment::Frustrated => "frustrated",
            Sentiment::Curious => "curious",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: SystemTime,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: SystemTime::now(),
        }
    }
}

/// Ordered conversation history, owned exclusively by the dialogue session.
///
/// Mutated only by appending a user/assistant pair after a successful turn,
/// or cleared wholesale on reset.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a completed question/answer exchange.
    ///
    /// Trims to the most recent [`MAX_MEMORY_TURNS`] turns so the buffer
    /// (and thus prompt size) stays bounded.
    pub fn commit_exchange(&mut self, question: &str, answer: &str) {
        self.turns.push(Turn::user(question));
        self.turns.push(Turn::assistant(answer));
        while self.turns.len() > MAX_MEMORY_TURNS {
            self.turns.remove(0);
        }
    }

    /// Replace the history with an empty sequence.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// One supporting passage returned by the retrieval gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
}

/// Instruction template produced by the prompt composer for one turn.
///
/// Carries `{context}` and `{question}` placeholders filled at generation
/// time. Never persisted — recomposed every turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    pub level: CognitiveLevel,
    pub sentiment: Sentiment,
    pub template: String,
}

impl ComposedPrompt {
    /// Fill the `{context}` and `{question}` placeholders.
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .replace("{context}", context)
            .replace("{question}", question)
    }
}

/// The active (prompt, classification) pair wired into the session.
///
/// Rebuilt every turn — a binding composed for a previous turn's
/// classification is never reused — and rebuilt again on stale-session
/// recovery.
#[derive(Debug, Clone)]
pub struct SessionBinding {
    pub prompt: ComposedPrompt,
}

impl SessionBinding {
    pub fn new(prompt: ComposedPrompt) -> Self {
        Self { prompt }
    }
}

/// Everything produced by one successful conversation turn.
///
/// `chunks` is always populated; visibility toward the caller is gated at
/// the API layer, not here.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: String,
    pub level: CognitiveLevel,
    pub sentiment: Sentiment,
    pub chunks: Vec<RetrievedChunk>,
}

/// Questions generated from a course outcome at a requested Bloom level.
#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestions {
    /// Stem of the multiple-choice question.
    pub objective_question: String,
    /// The "A." through "D." option lines, in order of appearance.
    pub options: Vec<String>,
    /// The short-answer subjective question.
    pub subjective: String,
    /// Unparsed backend response, for callers that want to render it whole.
    pub raw_text: String,
}

impl QuizQuestions {
    /// Extract the structured parts from a response following the format
    /// requested by [`crate::composer::compose_question_prompt`].
    ///
    /// Missing sections come back empty rather than failing the request;
    /// `raw_text` always carries the complete response.
    pub fn parse(raw: &str) -> Self {
        let lines: Vec<&str> = raw.lines().map(str::trim).collect();

        let options: Vec<String> = lines
            .iter()
            .filter(|l| {
                l.starts_with("A.")
                    || l.starts_with("B.")
                    || l.starts_with("C.")
                    || l.starts_with("D.")
            })
            .map(|l| l.to_string())
            .collect();

        let objective_question = first_line_after(&lines, "Objective Question");
        let subjective = first_line_after(&lines, "Short Answer Question");

        Self {
            objective_question,
            options,
            subjective,
            raw_text: raw.to_string(),
        }
    }
}

/// First non-empty line following the line that contains `heading`.
fn first_line_after(lines: &[&str], heading: &str) -> String {
    lines
        .iter()
        .position(|l| l.contains(heading))
        .and_then(|idx| {
            lines[idx + 1..]
                .iter()
                .copied()
                .find(|l| !l.is_empty())
        })
        .unwrap_or_default()
        .to_string()
}
