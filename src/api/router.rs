// HTTP router composition

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat_text_handler, clear_history_handler, conversation_history_handler,
    download_audio_handler, get_mode_handler, health_handler, list_audio_files_handler,
    root_handler, set_mode_handler, text_to_speech_handler, voice_chat_handler,
    voice_to_text_handler,
};
use crate::app::AppState;

/// Whisper's upload ceiling
pub const MAX_AUDIO_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Modes
        .route("/set-mode", post(set_mode_handler))
        .route("/get-mode", get(get_mode_handler))
        // Chat
        .route("/chat-text", post(chat_text_handler))
        .route("/conversation-history", get(conversation_history_handler))
        .route("/clear-history", delete(clear_history_handler))
        // Voice
        .route(
            "/voice-to-text",
            post(voice_to_text_handler).layer(DefaultBodyLimit::max(MAX_AUDIO_UPLOAD_BYTES)),
        )
        .route(
            "/voice-chat",
            post(voice_chat_handler).layer(DefaultBodyLimit::max(MAX_AUDIO_UPLOAD_BYTES)),
        )
        .route("/text-to-speech", post(text_to_speech_handler))
        // Saved audio
        .route("/download-audio/{filename}", get(download_audio_handler))
        .route("/list-audio-files", get(list_audio_files_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
