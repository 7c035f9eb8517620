//! AI infrastructure
//!
//! Opaque model capabilities consumed by the orchestrator and agents:
//! intent classification and free-text content generation.

pub mod client;
pub mod parse;
pub mod retry;
pub mod types;

pub use client::{ContentGenerator, HttpAiClient, IntentClassifier};
pub use parse::{extract_json_object, parse_json_payload};
pub use retry::retry_with_backoff;
pub use types::{ChatMessage, Classification};
