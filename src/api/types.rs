use serde::{Deserialize, Serialize};

use crate::audio::AudioFileInfo;
use crate::constants::DEFAULT_USER_ID;
use crate::models::ChatMessage;
use crate::session::ChatMode;

// Request types

#[derive(Debug, Deserialize, Default)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn user_id(&self) -> &str {
        resolve_user_id(self.user_id.as_deref())
    }
}

/// Absent or blank user ids share the default session
pub fn resolve_user_id(user_id: Option<&str>) -> &str {
    match user_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => DEFAULT_USER_ID,
    }
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TextQuery {
    pub text: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TtsForm {
    pub text: String,
}

// Response types

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub mode: ChatMode,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeResponse {
    pub message: String,
    pub mode: ChatMode,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentModeResponse {
    pub current_mode: ChatMode,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceToTextResponse {
    pub transcribed_text: String,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceChatResponse {
    pub transcribed_text: String,
    pub response_text: String,
    pub mode: ChatMode,
    pub audio_response_path: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationHistoryResponse {
    pub user_id: String,
    pub current_mode: ChatMode,
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct AudioListResponse {
    pub audio_files: Vec<AudioFileInfo>,
    pub total_files: usize,
    pub audio_response_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub available_modes: Vec<ChatMode>,
    pub active_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_id() {
        assert_eq!(resolve_user_id(None), "default");
        assert_eq!(resolve_user_id(Some("  ")), "default");
        assert_eq!(resolve_user_id(Some("u1")), "u1");
    }
}
