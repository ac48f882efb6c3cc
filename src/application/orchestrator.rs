//! PhaseOrchestrator - routes each turn to collection or question answering.
//!
//! The orchestrator holds no conversation state: the caller sends the phase
//! with every turn and persists the profile once `phase_transition` is true.
//! Every turn records one conversation observation, success or failure,
//! including turns abandoned at a deadline.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::collection_extractor::{CollectionExtractor, CollectionOutcome};
use super::completion::{conversation_messages, timed_completion, PhaseSettings};
use super::retriever::{RagObservation, RetrievalError, RetrievalSettings, Retriever};
use crate::domain::conversation::{
    detect_language, join_context, qa_system_prompt, ConversationTurn, Language, Phase,
    TurnOutcome,
};
use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::metrics::MetricsAggregator;
use crate::domain::retrieval::{RetrievalResult, SharedEmbeddingStore};
use crate::ports::{AIError, AIProvider, CompletionRequest, EmbeddingProvider, RequestMetadata};

/// Knobs injected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrchestratorSettings {
    pub collection: PhaseSettings,
    pub qa: PhaseSettings,
    pub retrieval: RetrievalSettings,
}

/// Errors that fail a turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("completion failed: {0}")]
    Completion(#[from] AIError),

    #[error("phase transition rejected: {0}")]
    Transition(#[from] ValidationError),
}

impl TurnError {
    /// True when an upstream call ran out of time.
    pub fn is_timeout(&self) -> bool {
        match self {
            TurnError::Retrieval(e) => e.is_timeout(),
            TurnError::Completion(e) => e.is_timeout(),
            TurnError::Transition(_) => false,
        }
    }
}

/// Binds collection, retrieval and QA completion into one per-turn decision.
pub struct PhaseOrchestrator {
    extractor: CollectionExtractor,
    retriever: Retriever,
    provider: Arc<dyn AIProvider>,
    metrics: Arc<MetricsAggregator>,
    settings: OrchestratorSettings,
}

impl PhaseOrchestrator {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<SharedEmbeddingStore>,
        metrics: Arc<MetricsAggregator>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            extractor: CollectionExtractor::new(
                provider.clone(),
                metrics.clone(),
                settings.collection,
            ),
            retriever: Retriever::new(
                embedder,
                store,
                metrics.clone(),
                settings.retrieval.relevance_threshold,
            ),
            provider,
            metrics,
            settings,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    /// Handles one conversation turn.
    pub async fn handle_turn(&self, turn: ConversationTurn) -> Result<TurnOutcome, TurnError> {
        let turn_id = Uuid::new_v4();
        let span = tracing::info_span!("turn", turn_id = %turn_id, phase = %turn.phase);

        async move {
            tracing::info!(
                question_length = turn.question.chars().count(),
                history_length = turn.history.len(),
                "Processing turn"
            );
            let metadata = RequestMetadata::new(turn_id.to_string());

            match turn.phase {
                Phase::Collecting => self.collect(&turn, metadata).await,
                Phase::Answering => self.answer(&turn, metadata).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn collect(
        &self,
        turn: &ConversationTurn,
        metadata: RequestMetadata,
    ) -> Result<TurnOutcome, TurnError> {
        let language = turn_language(turn);
        let recorder = TurnRecorder::new(&self.metrics, Phase::Collecting, language);
        let outcome = match self
            .extractor
            .extract(&turn.history, &turn.question, metadata)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                recorder.finish(false, language);
                return Err(err.into());
            }
        };

        match outcome {
            CollectionOutcome::Continue(text) => {
                recorder.finish(true, language);
                Ok(TurnOutcome::answer(text))
            }
            CollectionOutcome::Completed { profile, message } => {
                let next = match turn.phase.transition_to(Phase::Answering) {
                    Ok(next) => next,
                    Err(err) => {
                        recorder.finish(false, language);
                        return Err(err.into());
                    }
                };
                recorder.finish(true, profile.preferred_language());
                tracing::info!(next_phase = %next, "Phase transition");
                Ok(TurnOutcome::transition(message, profile))
            }
            CollectionOutcome::ExtractionFailed(text) => {
                recorder.finish(false, language);
                Ok(TurnOutcome::answer(text))
            }
        }
    }

    async fn answer(
        &self,
        turn: &ConversationTurn,
        metadata: RequestMetadata,
    ) -> Result<TurnOutcome, TurnError> {
        let language = turn_language(turn);
        let mut recorder = TurnRecorder::new(&self.metrics, Phase::Answering, language);
        let result = self.answer_inner(turn, metadata, &mut recorder).await;
        recorder.finish(result.is_ok(), language);
        result
    }

    async fn answer_inner(
        &self,
        turn: &ConversationTurn,
        metadata: RequestMetadata,
        recorder: &mut TurnRecorder<'_>,
    ) -> Result<TurnOutcome, TurnError> {
        let (retrieved, observation) = self
            .retriever
            .retrieve_unrecorded(&turn.question, self.settings.retrieval.top_k)
            .await?;
        recorder.stage_rag(observation);

        let passages = match retrieved {
            // No LLM call on a no-match.
            RetrievalResult::NoMatch { message } => return Ok(TurnOutcome::answer(message)),
            RetrievalResult::Matched { passages } => passages,
        };

        let context = join_context(passages.iter().map(|p| p.text.as_str()));
        let request = CompletionRequest::new(metadata)
            .with_system_prompt(qa_system_prompt(
                turn.hmo.as_deref(),
                turn.tier.as_deref(),
                &context,
            ))
            .with_messages(conversation_messages(&turn.history, &turn.question))
            .with_temperature(self.settings.qa.temperature)
            .with_max_tokens(self.settings.qa.max_tokens);

        let response = timed_completion(self.provider.as_ref(), &self.metrics, request).await?;
        Ok(TurnOutcome::answer(response.text_or_empty()))
    }
}

/// Metrics bookkeeping for one turn.
///
/// The RAG observation is held back until the turn resolves. A turn dropped
/// before `finish` (request deadline, client gone) records one failed
/// conversation and nothing else.
struct TurnRecorder<'a> {
    metrics: &'a MetricsAggregator,
    phase: Phase,
    language: Language,
    rag: Option<RagObservation>,
    finished: bool,
}

impl<'a> TurnRecorder<'a> {
    fn new(metrics: &'a MetricsAggregator, phase: Phase, language: Language) -> Self {
        Self {
            metrics,
            phase,
            language,
            rag: None,
            finished: false,
        }
    }

    fn stage_rag(&mut self, observation: RagObservation) {
        self.rag = Some(observation);
    }

    fn finish(mut self, success: bool, language: Language) {
        self.finished = true;
        if let Some(observation) = self.rag.take() {
            observation.record(self.metrics);
        }
        self.metrics
            .record_conversation(self.phase, success, language);
    }
}

impl Drop for TurnRecorder<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(phase = %self.phase, "Turn abandoned before completion");
            self.metrics
                .record_conversation(self.phase, false, self.language);
        }
    }
}

/// The profile's language when the caller sent one, else the question's script.
fn turn_language(turn: &ConversationTurn) -> Language {
    turn.user_info
        .get("preferred_language")
        .and_then(|v| v.as_str())
        .and_then(Language::from_code)
        .unwrap_or_else(|| detect_language(&turn.question))
}
