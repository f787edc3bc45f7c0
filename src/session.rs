//! Dialogue session — orchestrates one question→answer cycle end to end.
//!
//! The session owns the conversation memory and the currently bound prompt.
//! Every turn reclassifies the question, composes a fresh prompt, and rebinds
//! it before generation — a binding composed for an earlier turn is never
//! reused. When the generation gateway reports a stale binding, the session
//! transparently rebuilds the binding and retries exactly once.
//!
//! Callers must serialize turns: at most one `process_turn` may be in flight
//! per session (the server holds the session behind an async mutex).

use tracing::{info, warn};

use crate::classifier::{detect_cognitive_level, detect_sentiment};
use crate::composer::{compose_prompt, compose_question_prompt};
use crate::config::{MAX_QUESTION_LENGTH, RETRIEVAL_TOP_K};
use crate::error::AssistantError;
use crate::generation::Generator;
use crate::retrieval::Retriever;
use crate::taxonomy::CognitiveLevel;
use crate::types::{ConversationMemory, QuizQuestions, Sentiment, SessionBinding, TurnOutcome};

/// Conversation state plus the gateways needed to run a turn.
pub struct DialogueSession<R: Retriever, G: Generator> {
    retriever: R,
    generator: G,
    memory: ConversationMemory,
    binding: SessionBinding,
}

impl<R: Retriever, G: Generator> DialogueSession<R, G> {
    /// Create a session bound to a neutral/understand default prompt.
    pub fn new(retriever: R, generator: G) -> Self {
        Self {
            retriever,
            generator,
            memory: ConversationMemory::new(),
            binding: SessionBinding::new(compose_prompt(
                CognitiveLevel::Understand,
                Sentiment::Neutral,
            )),
        }
    }

    /// Run one full turn: validate, retrieve, classify, rebind, generate.
    ///
    /// Memory is updated with the new user/assistant pair only when the turn
    /// succeeds; a failed turn leaves the session exactly as it was.
    ///
    /// # Errors
    /// - [`AssistantError::InvalidInput`] — empty or oversized question,
    ///   rejected before any gateway call.
    /// - [`AssistantError::Retrieval`] — index failure, never retried.
    /// - [`AssistantError::Generation`] — backend failure, including a stale
    ///   binding whose single rebuild-and-retry also failed.
    pub async fn process_turn(&mut self, question: &str) -> Result<TurnOutcome, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::InvalidInput(
                "Question cannot be empty".to_string(),
            ));
        }
        if question.len() > MAX_QUESTION_LENGTH {
            return Err(AssistantError::InvalidInput(
                "Question too long".to_string(),
            ));
        }

        // Chunks are always computed, independent of caller-side visibility.
        let chunks = self.retriever.search(question, RETRIEVAL_TOP_K).await?;
        let context: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let sentiment = detect_sentiment(question, self.memory.turns());
        let level = detect_cognitive_level(question);

        // Bind this turn's classification; the previous binding is dead.
        self.binding = SessionBinding::new(compose_prompt(level, sentiment));
        let rendered = self.binding.prompt.render(&context, question);

        let response = match self.generator.generate(&rendered, self.memory.turns()).await {
            Ok(resp) => resp,
            Err(e) if e.is_stale_session() => {
                warn!("stale session binding ({e}); rebuilding and retrying once");
                self.binding = SessionBinding::new(compose_prompt(level, sentiment));
                let rendered = self.binding.prompt.render(&context, question);
                self.generator
                    .generate(&rendered, self.memory.turns())
                    .await
                    .map_err(|retry_err| match retry_err {
                        AssistantError::StaleSession(msg) => AssistantError::Generation(
                            format!("retry after rebind failed: {msg}"),
                        ),
                        other => other,
                    })?
            }
            Err(e) => return Err(e),
        };

        self.memory.commit_exchange(question, &response.text);

        info!(
            level = level.label(),
            sentiment = sentiment.label(),
            chunks = chunks.len(),
            memory_turns = self.memory.len(),
            completion_tokens = response.completion_tokens,
            "turn_complete"
        );

        Ok(TurnOutcome {
            answer: response.text,
            level,
            sentiment,
            chunks,
        })
    }

    /// Generate assessment questions for a course outcome at a Bloom level.
    ///
    /// Stateless with respect to the conversation: no memory is read or
    /// written, and the session binding is untouched. Backend errors
    /// propagate without the stale-binding retry — there is no binding to
    /// rebuild here.
    pub async fn generate_questions(
        &self,
        course_outcome: &str,
        level: CognitiveLevel,
    ) -> Result<QuizQuestions, AssistantError> {
        let course_outcome = course_outcome.trim();
        if course_outcome.is_empty() {
            return Err(AssistantError::InvalidInput(
                "Course outcome cannot be empty".to_string(),
            ));
        }

        let prompt = compose_question_prompt(course_outcome, level);
        let response = self.generator.generate(&prompt, &[]).await?;

        info!(
            level = level.label(),
            completion_tokens = response.completion_tokens,
            "questions_generated"
        );

        Ok(QuizQuestions::parse(&response.text))
    }

    /// Clear the conversation and rebind the default prompt.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.binding = SessionBinding::new(compose_prompt(
            CognitiveLevel::Understand,
            Sentiment::Neutral,
        ));
        info!("session_reset");
    }

    /// Conversation history, read-only.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// The currently bound prompt and classification.
    pub fn binding(&self) -> &SessionBinding {
        &self.binding
    }
}
