//! External model boundary: classification and content generation.
//!
//! The classifier and generator are opaque capabilities consumed by the
//! orchestrator and agents. `HttpAiClient` talks to any OpenAI-compatible
//! chat-completions endpoint; tests substitute scripted implementations.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tripmesh_core_types::TaskType;

use crate::infrastructure::ai::parse::extract_json_object;
use crate::infrastructure::ai::retry::retry_with_backoff;
use crate::infrastructure::ai::types::{ChatMessage, Classification};
use crate::util::errors::{TripMeshError, TripMeshResult};

/// Maps a free-text request to a task type plus a short intent restatement.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, context_summary: &str) -> TripMeshResult<Classification>;
}

/// Free-text generation; callers parse the output into structured
/// operations. Parse failure is recoverable, not fatal.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, context: &str) -> TripMeshResult<String>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CLASSIFY_ATTEMPTS: u32 = 3;
const CLASSIFY_BACKOFF: Duration = Duration::from_millis(300);

pub struct HttpAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpAiClient {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> TripMeshResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TripMeshError::ExternalService(format!("http client init: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    async fn chat(&self, messages: &[ChatMessage]) -> TripMeshResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.2,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TripMeshError::ExternalService(format!("model request: {}", e)))?
            .error_for_status()
            .map_err(|e| TripMeshError::ExternalService(format!("model status: {}", e)))?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TripMeshError::ExternalService(format!("model response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                TripMeshError::ExternalService("model returned no content".to_string())
            })
    }
}

#[async_trait]
impl IntentClassifier for HttpAiClient {
    async fn classify(&self, text: &str, context_summary: &str) -> TripMeshResult<Classification> {
        let messages = [
            ChatMessage::system(CLASSIFY_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Current plan summary:\n{}\n\nUser request:\n{}",
                context_summary, text
            )),
        ];

        // Classification has no side effects; retry transient failures.
        let raw = retry_with_backoff("classify", CLASSIFY_ATTEMPTS, CLASSIFY_BACKOFF, || {
            self.chat(&messages)
        })
        .await?;

        Ok(parse_classification(&raw))
    }
}

#[async_trait]
impl ContentGenerator for HttpAiClient {
    async fn generate(&self, prompt: &str, context: &str) -> TripMeshResult<String> {
        debug!("Generating content: prompt_len={}", prompt.len());
        let mut messages = Vec::with_capacity(2);
        if !context.is_empty() {
            messages.push(ChatMessage::system(context.to_string()));
        }
        messages.push(ChatMessage::user(prompt.to_string()));
        self.chat(&messages).await
    }
}

const CLASSIFY_SYSTEM_PROMPT: &str = r#"You route travel-plan requests to specialist handlers.

Classify the user request into exactly one task type:
- plan: generate or regenerate a multi-day itinerary
- edit: targeted changes to existing plan items
- book: search or confirm reservations (hotels, flights, restaurants, activities)
- chat: questions about the plan, no changes requested

Output STRICT JSON ONLY (no markdown, no commentary):
{"intent": "one-sentence restatement", "taskType": "plan|edit|book|chat", "confidence": 0.0}
"#;

/// Classifier output parsing never fails hard: unparseable output falls
/// back to `chat` with zero confidence so the request still gets answered.
fn parse_classification(model_text: &str) -> Classification {
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawClassification {
        #[serde(default)]
        intent: String,
        task_type: String,
        #[serde(default)]
        confidence: f32,
    }

    let fallback = |reason: &str| {
        warn!("Classification fallback to chat: reason={}", reason);
        Classification {
            intent: String::new(),
            task_type: TaskType::Chat,
            confidence: 0.0,
        }
    };

    let json_str = match extract_json_object(model_text) {
        Ok(s) => s,
        Err(e) => return fallback(&e.to_string()),
    };
    let raw: RawClassification = match serde_json::from_str(json_str) {
        Ok(r) => r,
        Err(e) => return fallback(&e.to_string()),
    };
    let Some(task_type) = TaskType::parse(&raw.task_type) else {
        return fallback(&format!("unknown task type '{}'", raw.task_type));
    };

    Classification {
        intent: raw.intent,
        task_type,
        confidence: raw.confidence.clamp(0.0, 1.0),
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_classification() {
        let c = parse_classification(
            r#"{"intent": "add a museum visit", "taskType": "edit", "confidence": 0.92}"#,
        );
        assert_eq!(c.task_type, TaskType::Edit);
        assert_eq!(c.intent, "add a museum visit");
    }

    #[test]
    fn unknown_task_type_falls_back_to_chat() {
        let c = parse_classification(r#"{"intent": "x", "taskType": "teleport", "confidence": 1.0}"#);
        assert_eq!(c.task_type, TaskType::Chat);
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn noisy_output_falls_back_to_chat() {
        let c = parse_classification("I think this is an edit request.");
        assert_eq!(c.task_type, TaskType::Chat);
    }
}
