//! Tests for [`civibot::session`]
//!
//! The retrieval and generation gateways are mocked through their traits, so
//! every orchestration contract — validation order, stale-binding recovery,
//! all-or-nothing memory commits — is exercised without any network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use civibot::error::AssistantError;
use civibot::generation::{GenerationResponse, Generator};
use civibot::retrieval::Retriever;
use civibot::session::DialogueSession;
use civibot::taxonomy::CognitiveLevel;
use civibot::types::{RetrievedChunk, Role, Sentiment, Turn};

// ── Mock retrieval gateway ────────────────────────────────────────────────────

struct StubRetriever {
    chunks: Vec<&'static str>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl StubRetriever {
    fn with_chunks(chunks: Vec<&'static str>) -> Self {
        Self {
            chunks,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            chunks: vec![],
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<RetrievedChunk>, AssistantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AssistantError::Retrieval("index offline".to_string()));
        }
        Ok(self
            .chunks
            .iter()
            .take(k)
            .map(|t| RetrievedChunk { text: t.to_string() })
            .collect())
    }
}

// ── Mock generation gateway ───────────────────────────────────────────────────

/// Returns `StaleSession` for the first `stale_failures` calls, then answers.
struct ScriptedGenerator {
    stale_failures: usize,
    answer: &'static str,
    calls: Arc<AtomicUsize>,
    last_prompts: Arc<std::sync::Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    fn new(stale_failures: usize, answer: &'static str) -> Self {
        Self {
            stale_failures,
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
            last_prompts: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        rendered_prompt: &str,
        _memory: &[Turn],
    ) -> Result<GenerationResponse, AssistantError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_prompts
            .lock()
            .unwrap()
            .push(rendered_prompt.to_string());
        if n < self.stale_failures {
            return Err(AssistantError::StaleSession("binding rejected".to_string()));
        }
        Ok(GenerationResponse {
            text: self.answer.to_string(),
            model: "mock".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }
}

/// Always fails with a non-retryable generation error.
struct BrokenGenerator {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Generator for BrokenGenerator {
    async fn generate(
        &self,
        _rendered_prompt: &str,
        _memory: &[Turn],
    ) -> Result<GenerationResponse, AssistantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AssistantError::Generation("backend exploded".to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Test 1: an empty question is rejected with InvalidInput before any
/// gateway call and leaves memory unchanged.
#[tokio::test]
async fn empty_question_rejected_without_side_effects() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let retriever_calls = Arc::clone(&retriever.calls);
    let generator = ScriptedGenerator::new(0, "answer");
    let generator_calls = Arc::clone(&generator.calls);
    let mut session = DialogueSession::new(retriever, generator);

    let err = session.process_turn("   ").await.unwrap_err();
    assert!(matches!(err, AssistantError::InvalidInput(_)));
    assert!(session.memory().is_empty(), "memory must be untouched");
    assert_eq!(retriever_calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator_calls.load(Ordering::SeqCst), 0);
}

/// Test 2: a successful turn commits exactly one user/assistant pair and
/// returns the computed chunks.
#[tokio::test]
async fn successful_turn_commits_one_pair() {
    let retriever = StubRetriever::with_chunks(vec!["beam theory", "shear diagrams"]);
    let generator = ScriptedGenerator::new(0, "Beams resist bending.");
    let mut session = DialogueSession::new(retriever, generator);

    let outcome = session.process_turn("what is a beam").await.unwrap();
    assert_eq!(outcome.answer, "Beams resist bending.");
    assert_eq!(outcome.chunks.len(), 2);
    assert_eq!(session.memory().len(), 2);
    assert_eq!(session.memory().turns()[0].role, Role::User);
    assert_eq!(session.memory().turns()[1].role, Role::Assistant);
}

/// Test 3: a stale binding is rebuilt and retried exactly once; the retry's
/// success commits a single turn pair, never a duplicate.
#[tokio::test]
async fn stale_binding_retried_exactly_once() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let generator = ScriptedGenerator::new(1, "recovered answer");
    let calls = Arc::clone(&generator.calls);
    let prompts = Arc::clone(&generator.last_prompts);
    let mut session = DialogueSession::new(retriever, generator);

    let outcome = session.process_turn("explain settlement").await.unwrap();
    assert_eq!(outcome.answer, "recovered answer");
    assert_eq!(calls.load(Ordering::SeqCst), 2, "initial call + one retry");
    assert_eq!(session.memory().len(), 2, "only the successful pair committed");

    // The retry went out with a freshly composed prompt for the same turn.
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts[0], prompts[1]);
}

/// Test 4: when the retry also reports a stale binding, the turn fails as a
/// generation error and memory stays unchanged.
#[tokio::test]
async fn second_stale_failure_escalates() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let generator = ScriptedGenerator::new(2, "never reached");
    let calls = Arc::clone(&generator.calls);
    let mut session = DialogueSession::new(retriever, generator);

    let err = session.process_turn("explain settlement").await.unwrap_err();
    assert!(matches!(err, AssistantError::Generation(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 2, "no third attempt");
    assert!(session.memory().is_empty());
}

/// Test 5: non-retryable generation errors propagate without any retry.
#[tokio::test]
async fn generation_failure_is_not_retried() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = BrokenGenerator {
        calls: Arc::clone(&calls),
    };
    let mut session = DialogueSession::new(retriever, generator);

    let err = session.process_turn("explain settlement").await.unwrap_err();
    assert!(matches!(err, AssistantError::Generation(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(session.memory().is_empty());
}

/// Test 6: a retrieval failure aborts the turn before generation.
#[tokio::test]
async fn retrieval_failure_aborts_before_generation() {
    let retriever = StubRetriever::failing();
    let generator = ScriptedGenerator::new(0, "never reached");
    let generator_calls = Arc::clone(&generator.calls);
    let mut session = DialogueSession::new(retriever, generator);

    let err = session.process_turn("what is a beam").await.unwrap_err();
    assert!(matches!(err, AssistantError::Retrieval(_)));
    assert_eq!(generator_calls.load(Ordering::SeqCst), 0);
    assert!(session.memory().is_empty());
}

/// Test 7: reset followed by one turn yields a memory of exactly one pair,
/// regardless of prior conversation length.
#[tokio::test]
async fn reset_then_turn_yields_single_pair() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let generator = ScriptedGenerator::new(0, "answer");
    let mut session = DialogueSession::new(retriever, generator);

    for _ in 0..4 {
        session.process_turn("what is a beam").await.unwrap();
    }
    assert_eq!(session.memory().len(), 8);

    session.reset();
    assert!(session.memory().is_empty());

    session.process_turn("what is a truss").await.unwrap();
    assert_eq!(session.memory().len(), 2);
}

/// Test 8: the bound prompt always reflects the most recent turn's
/// classification — stale bindings are never reused.
#[tokio::test]
async fn binding_tracks_latest_classification() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let generator = ScriptedGenerator::new(0, "answer");
    let mut session = DialogueSession::new(retriever, generator);

    session.process_turn("design a new retaining wall").await.unwrap();
    assert_eq!(session.binding().prompt.level, CognitiveLevel::Create);

    session.process_turn("define bearing capacity").await.unwrap();
    assert_eq!(session.binding().prompt.level, CognitiveLevel::Remember);
    assert_eq!(session.binding().prompt.sentiment, Sentiment::Neutral);
}

/// Test 9: question generation goes straight to the generation gateway —
/// no retrieval, no memory commit, and the outcome/level appear in the
/// prompt it sends.
#[tokio::test]
async fn generate_questions_bypasses_retrieval_and_memory() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let retriever_calls = Arc::clone(&retriever.calls);
    let generator = ScriptedGenerator::new(
        0,
        "Objective Question:\nWhat is creep?\nA. a\nB. b\nC. c\nD. d\n\nShort Answer Question:\nDescribe creep in concrete.",
    );
    let prompts = Arc::clone(&generator.last_prompts);
    let session = DialogueSession::new(retriever, generator);

    let quiz = session
        .generate_questions("Explain long-term concrete behaviour", CognitiveLevel::Understand)
        .await
        .unwrap();
    assert_eq!(quiz.objective_question, "What is creep?");
    assert_eq!(quiz.options.len(), 4);
    assert_eq!(quiz.subjective, "Describe creep in concrete.");

    assert_eq!(retriever_calls.load(Ordering::SeqCst), 0);
    assert!(session.memory().is_empty());

    let prompts = prompts.lock().unwrap();
    assert!(prompts[0].contains("Explain long-term concrete behaviour"));
    assert!(prompts[0].contains("understand"));
}

/// Test 10: an empty course outcome is rejected before any gateway call.
#[tokio::test]
async fn generate_questions_rejects_empty_outcome() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let generator = ScriptedGenerator::new(0, "never reached");
    let generator_calls = Arc::clone(&generator.calls);
    let session = DialogueSession::new(retriever, generator);

    let err = session
        .generate_questions("   ", CognitiveLevel::Apply)
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::InvalidInput(_)));
    assert_eq!(generator_calls.load(Ordering::SeqCst), 0);
}

/// Test 11: reset rebinds the neutral/understand default prompt.
#[tokio::test]
async fn reset_restores_default_binding() {
    let retriever = StubRetriever::with_chunks(vec!["chunk"]);
    let generator = ScriptedGenerator::new(0, "answer");
    let mut session = DialogueSession::new(retriever, generator);

    session.process_turn("evaluate this design!").await.unwrap();
    session.reset();
    assert_eq!(session.binding().prompt.level, CognitiveLevel::Understand);
    assert_eq!(session.binding().prompt.sentiment, Sentiment::Neutral);
}
