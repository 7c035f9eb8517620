//! DTOs shared across the AI boundary.

use serde::{Deserialize, Serialize};
use tripmesh_core_types::TaskType;

/// Result of classifying one free-text request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Short restatement of what the user wants.
    pub intent: String,
    pub task_type: TaskType,
    /// 0.0-1.0 as reported by the model; 0.0 when the fallback kicked in.
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
