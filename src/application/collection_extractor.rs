//! CollectionExtractor - drives the profile collection completion call.

use std::sync::Arc;

use super::completion::{conversation_messages, timed_completion, PhaseSettings};
use crate::domain::conversation::{
    collection_complete_message, HistoryMessage, COLLECTION_SYSTEM_PROMPT,
    EXTRACTION_FAILED_MESSAGE,
};
use crate::domain::metrics::MetricsAggregator;
use crate::domain::profile::{
    profile_parameters_schema, ExtractionParseError, ProfileRecord, COMPLETE_DATA_COLLECTION,
    COMPLETE_DATA_COLLECTION_DESCRIPTION,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, FunctionSchema, RequestMetadata, StructuredCall,
};

/// Result of one collection turn.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionOutcome {
    /// Still collecting; the model's reply is shown to the user.
    Continue(String),
    /// Every field validated.
    Completed {
        profile: ProfileRecord,
        message: String,
    },
    /// The model called the function with an invalid payload.
    ExtractionFailed(String),
}

/// Runs one collection-phase completion and interprets its result.
pub struct CollectionExtractor {
    provider: Arc<dyn AIProvider>,
    metrics: Arc<MetricsAggregator>,
    settings: PhaseSettings,
    schema: FunctionSchema,
}

impl CollectionExtractor {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        metrics: Arc<MetricsAggregator>,
        settings: PhaseSettings,
    ) -> Self {
        Self {
            provider,
            metrics,
            settings,
            schema: FunctionSchema::new(
                COMPLETE_DATA_COLLECTION,
                COMPLETE_DATA_COLLECTION_DESCRIPTION,
                profile_parameters_schema(),
            ),
        }
    }

    /// Makes exactly one completion call. Provider failures propagate;
    /// invalid structured payloads become `ExtractionFailed`.
    pub async fn extract(
        &self,
        history: &[HistoryMessage],
        question: &str,
        metadata: RequestMetadata,
    ) -> Result<CollectionOutcome, AIError> {
        let request = CompletionRequest::new(metadata)
            .with_system_prompt(COLLECTION_SYSTEM_PROMPT)
            .with_messages(conversation_messages(history, question))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_structured_schema(self.schema.clone());

        let response = timed_completion(self.provider.as_ref(), &self.metrics, request).await?;

        let outcome = match response.structured_call {
            Some(call) => match parse_call(&call) {
                Ok(profile) => {
                    tracing::info!("Profile collection completed");
                    CollectionOutcome::Completed {
                        message: collection_complete_message(profile.preferred_language())
                            .to_string(),
                        profile,
                    }
                }
                Err(err) => {
                    tracing::warn!(reason = %err, "Extracted profile failed validation");
                    CollectionOutcome::ExtractionFailed(EXTRACTION_FAILED_MESSAGE.to_string())
                }
            },
            None => CollectionOutcome::Continue(response.text_or_empty().to_string()),
        };
        Ok(outcome)
    }
}

fn parse_call(call: &StructuredCall) -> Result<ProfileRecord, ExtractionParseError> {
    if call.name != COMPLETE_DATA_COLLECTION {
        return Err(ExtractionParseError::UnexpectedFunction(call.name.clone()));
    }
    ProfileRecord::from_arguments(&call.arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::conversation::Language;
    use serde_json::json;

    fn valid_arguments() -> String {
        json!({
            "name": "Dana Levi",
            "id": "123456789",
            "gender": "female",
            "age": 34,
            "hmo": "מכבי",
            "card": "987654321",
            "tier": "זהב",
            "preferred_language": "en"
        })
        .to_string()
    }

    fn extractor(provider: &MockAIProvider) -> (CollectionExtractor, Arc<MetricsAggregator>) {
        let metrics = Arc::new(MetricsAggregator::new());
        let extractor = CollectionExtractor::new(
            Arc::new(provider.clone()),
            metrics.clone(),
            PhaseSettings {
                temperature: 0.2,
                max_tokens: 500,
            },
        );
        (extractor, metrics)
    }

    async fn run(provider: &MockAIProvider) -> Result<CollectionOutcome, AIError> {
        let (extractor, _) = extractor(provider);
        extractor
            .extract(&[HistoryMessage::assistant("What is your name?")], "Dana", RequestMetadata::new("t"))
            .await
    }

    #[tokio::test]
    async fn free_text_continues_collection() {
        let provider = MockAIProvider::new().with_response("And your ID number?");

        let outcome = run(&provider).await.unwrap();

        assert_eq!(outcome, CollectionOutcome::Continue("And your ID number?".to_string()));
    }

    #[tokio::test]
    async fn valid_call_completes_with_localized_message() {
        let provider =
            MockAIProvider::new().with_function_call(COMPLETE_DATA_COLLECTION, valid_arguments());

        let outcome = run(&provider).await.unwrap();

        match outcome {
            CollectionOutcome::Completed { profile, message } => {
                assert_eq!(profile.name(), "Dana Levi");
                assert_eq!(profile.preferred_language(), Language::En);
                assert_eq!(message, collection_complete_message(Language::En));
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn ten_digit_id_fails_extraction() {
        let mut args: serde_json::Value = serde_json::from_str(&valid_arguments()).unwrap();
        args["id"] = json!("1234567890");
        let provider =
            MockAIProvider::new().with_function_call(COMPLETE_DATA_COLLECTION, args.to_string());

        let outcome = run(&provider).await.unwrap();

        assert_eq!(
            outcome,
            CollectionOutcome::ExtractionFailed(EXTRACTION_FAILED_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn malformed_json_fails_extraction() {
        let provider = MockAIProvider::new().with_function_call(COMPLETE_DATA_COLLECTION, "{not json");

        let outcome = run(&provider).await.unwrap();

        assert!(matches!(outcome, CollectionOutcome::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn unexpected_function_fails_extraction() {
        let provider = MockAIProvider::new().with_function_call("book_appointment", valid_arguments());

        let outcome = run(&provider).await.unwrap();

        assert!(matches!(outcome, CollectionOutcome::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let provider = MockAIProvider::new().with_error(AIError::unavailable("503"));

        let err = run(&provider).await.unwrap_err();

        assert!(matches!(err, AIError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn sends_one_request_with_schema_and_settings() {
        let provider = MockAIProvider::new().with_response("next?");
        let (extractor, metrics) = extractor(&provider);

        extractor
            .extract(&[], "hello", RequestMetadata::new("trace-1"))
            .await
            .unwrap();

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 1);
        let request = &calls[0];
        assert_eq!(request.system_prompt.as_deref(), Some(COLLECTION_SYSTEM_PROMPT));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(500));
        assert_eq!(
            request.structured_schema.as_ref().map(|s| s.name.as_str()),
            Some(COMPLETE_DATA_COLLECTION)
        );
        assert_eq!(request.messages.last().unwrap().content, "hello");
        assert_eq!(metrics.snapshot().llm_calls.success, 1);
    }
}
