/// HTTP API - Gateway

mod error;
mod handlers;
mod router;
mod types;

pub use error::{ApiError, ApiResult};
pub use router::{create_router, MAX_AUDIO_UPLOAD_BYTES};
pub use types::{
    AudioListResponse, ChatResponse, ClearHistoryResponse, ConversationHistoryResponse,
    CurrentModeResponse, HealthResponse, ModeResponse, TextQuery, VoiceChatResponse,
    VoiceToTextResponse,
};
