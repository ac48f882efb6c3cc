//! Shared plumbing for hosted completion calls.

use std::time::Instant;

use crate::domain::conversation::{HistoryMessage, TurnRole};
use crate::domain::metrics::MetricsAggregator;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
};

/// Per-phase generation knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for PhaseSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
        }
    }
}

/// Issues one completion call and records its latency and outcome.
///
/// If the returned future is dropped before the provider answers, nothing is
/// recorded.
pub(crate) async fn timed_completion(
    provider: &dyn AIProvider,
    metrics: &MetricsAggregator,
    request: CompletionRequest,
) -> Result<CompletionResponse, AIError> {
    let started = Instant::now();
    let result = provider.complete(request).await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    metrics.record_llm_call(duration_ms, result.is_ok());
    let info = provider.provider_info();
    match &result {
        Ok(response) => {
            tracing::debug!(
                provider = %info.name,
                model = %response.model,
                prompt_tokens = response.usage.prompt_tokens,
                completion_tokens = response.usage.completion_tokens,
                total_tokens = response.usage.total_tokens,
                finish_reason = ?response.finish_reason,
                duration_ms,
                "LLM call completed"
            );
            if response.finish_reason == FinishReason::Length {
                tracing::warn!(
                    model = %response.model,
                    total_tokens = response.usage.total_tokens,
                    "LLM response truncated at max_tokens"
                );
            }
        }
        Err(err) => {
            tracing::warn!(provider = %info.name, model = %info.model, error = %err, duration_ms, "LLM call failed");
        }
    }
    result
}

/// Converts caller-supplied history into provider messages, then appends `question`.
pub(crate) fn conversation_messages(history: &[HistoryMessage], question: &str) -> Vec<Message> {
    history
        .iter()
        .map(|m| match m.role {
            TurnRole::User => Message::user(m.content.clone()),
            TurnRole::Assistant => Message::assistant(m.content.clone()),
        })
        .chain(std::iter::once(Message::user(question)))
        .collect()
}
