// HTTP handlers for chat, voice and audio endpoints

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use bytes::Bytes;
use chrono::Local;
use serde_json::{json, Value};
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::types::{
    resolve_user_id, AudioListResponse, ChatResponse, ClearHistoryResponse,
    ConversationHistoryResponse, CurrentModeResponse, HealthResponse, ModeResponse,
    SetModeRequest, TextQuery, TtsForm, UserQuery, VoiceChatResponse, VoiceToTextResponse,
};
use crate::app::AppState;
use crate::constants::APP_NAME;
use crate::models::AudioUpload;
use crate::session::ChatMode;
use crate::utils::ParleyError;

fn timestamp() -> String {
    Local::now().to_rfc3339()
}

fn parse_mode(raw: Option<&str>) -> ApiResult<Option<ChatMode>> {
    match raw {
        Some(mode) => Ok(Some(mode.parse::<ChatMode>()?)),
        None => Ok(None),
    }
}

fn mp3_response(audio: Bytes, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        audio,
    )
        .into_response()
}

/// Fields of a voice upload form
#[derive(Default)]
struct VoiceForm {
    audio: Option<AudioUpload>,
    mode: Option<String>,
    user_id: Option<String>,
}

async fn read_voice_form(mut multipart: Multipart) -> ApiResult<VoiceForm> {
    let mut form = VoiceForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("audio") => {
                let filename = field.file_name().unwrap_or("audio").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.audio = Some(AudioUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            Some("mode") => form.mode = Some(field.text().await?),
            Some("user_id") => form.user_id = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

fn require_audio(upload: Option<AudioUpload>) -> ApiResult<AudioUpload> {
    let upload = upload.ok_or_else(|| ApiError::bad_request("Missing 'audio' file field"))?;
    if !upload.is_audio() {
        return Err(ApiError::bad_request("File must be an audio file"));
    }
    Ok(upload)
}

pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": format!("{} is running!", APP_NAME) }))
}

pub async fn set_mode_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<SetModeRequest>, JsonRejection>,
) -> ApiResult<Json<ModeResponse>> {
    let Json(request) = payload?;
    let mode: ChatMode = request.mode.parse()?;
    let user_id = query.user_id();

    state.store().set_mode(user_id, mode);
    info!(user_id, %mode, "mode set");

    Ok(Json(ModeResponse {
        message: format!("Chat mode set to {}", mode),
        mode,
        user_id: user_id.to_string(),
    }))
}

pub async fn get_mode_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<CurrentModeResponse> {
    let user_id = query.user_id();
    Json(CurrentModeResponse {
        current_mode: state.store().get_mode(user_id),
        user_id: user_id.to_string(),
    })
}

pub async fn chat_text_handler(
    State(state): State<AppState>,
    payload: Result<Json<TextQuery>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(query) = payload?;
    let user_id = resolve_user_id(query.user_id.as_deref());
    let mode = parse_mode(query.mode.as_deref())?;

    let outcome = state.chat.chat(user_id, mode, &query.text).await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        mode: outcome.mode,
        timestamp: timestamp(),
    }))
}

pub async fn voice_to_text_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<VoiceToTextResponse>> {
    let upload = require_audio(read_voice_form(multipart).await?.audio)?;
    let filename = upload.filename.clone();

    let transcribed_text = state
        .transcriber
        .transcribe(upload, &state.config.groq.whisper_model)
        .await
        .map_err(ParleyError::from)?;

    Ok(Json(VoiceToTextResponse {
        transcribed_text,
        filename,
    }))
}

/// Transcribe, chat, then speak the reply
pub async fn voice_chat_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<VoiceChatResponse>> {
    let form = read_voice_form(multipart).await?;
    let upload = require_audio(form.audio)?;
    let mode = parse_mode(form.mode.as_deref().filter(|m| !m.trim().is_empty()))?;
    let user_id = resolve_user_id(form.user_id.as_deref());

    let transcribed_text = state
        .transcriber
        .transcribe(upload, &state.config.groq.whisper_model)
        .await
        .map_err(ParleyError::from)?;

    // History is only committed once the spoken reply exists
    let outcome = state.chat.respond(user_id, mode, &transcribed_text).await?;

    let audio = state
        .synthesizer
        .synthesize(&outcome.response, &state.config.speech.language)
        .await
        .map_err(ParleyError::from)?;
    let saved = state.audio.save(&audio).await?;
    state.chat.commit(user_id, &transcribed_text, &outcome);

    Ok(Json(VoiceChatResponse {
        transcribed_text,
        response_text: outcome.response,
        mode: outcome.mode,
        audio_response_path: saved.path.display().to_string(),
        timestamp: timestamp(),
    }))
}

pub async fn text_to_speech_handler(
    State(state): State<AppState>,
    Form(form): Form<TtsForm>,
) -> ApiResult<Response> {
    if form.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text cannot be empty"));
    }

    let audio = state
        .synthesizer
        .synthesize(&form.text, &state.config.speech.language)
        .await
        .map_err(ParleyError::from)?;
    state.audio.save(&audio).await?;

    Ok(mp3_response(audio, "response.mp3"))
}

pub async fn download_audio_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let audio = state.audio.read(&filename).await?;
    Ok(mp3_response(audio, &filename))
}

pub async fn conversation_history_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<ConversationHistoryResponse> {
    let user_id = query.user_id();
    let session = state.store().get_or_create(user_id);

    Json(ConversationHistoryResponse {
        user_id: user_id.to_string(),
        current_mode: session.mode,
        conversation_history: session.history,
    })
}

pub async fn clear_history_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<ClearHistoryResponse> {
    let user_id = query.user_id();
    state.store().clear_history(user_id);
    info!(user_id, "history cleared");

    Json(ClearHistoryResponse {
        message: "Conversation history cleared".to_string(),
        user_id: user_id.to_string(),
    })
}

pub async fn list_audio_files_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<AudioListResponse>> {
    let audio_response_path = state.audio.dir().display().to_string();

    let response = match state.audio.list().await? {
        Some(audio_files) => AudioListResponse {
            total_files: audio_files.len(),
            audio_files,
            audio_response_path,
            message: None,
        },
        None => AudioListResponse {
            audio_files: Vec::new(),
            total_files: 0,
            audio_response_path,
            message: Some("Audio response directory not found".to_string()),
        },
    };

    Ok(Json(response))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: timestamp(),
        available_modes: ChatMode::ALL.to_vec(),
        active_sessions: state.store().session_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::app::Config;
    use crate::models::{
        MockCompletionProvider, MockSpeechSynthesizer, MockTranscriber, ModelResponse, Providers,
    };
    use crate::utils::ProviderError;
    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "voice-form";

    fn voice_request(mode: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"q.wav\"\r\n\
             Content-Type: audio/wav\r\n\r\nRIFF\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n{mode}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\nv1\r\n\
             --{b}--\r\n",
            b = BOUNDARY,
            mode = mode,
        );
        Request::builder()
            .method("POST")
            .uri("/voice-chat")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn app(
        synthesizer: MockSpeechSynthesizer,
        audio_dir: &std::path::Path,
    ) -> (Router, AppState) {
        let mut completion = MockCompletionProvider::new();
        completion.expect_complete().times(1).returning(|_, _| {
            Ok(ModelResponse {
                content: "Send two applications today.".to_string(),
                usage: None,
                model_name: "test".to_string(),
            })
        });

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .withf(|audio, _| audio.filename == "q.wav")
            .times(1)
            .returning(|_, _| Ok("what should I do today".to_string()));

        let mut config = Config::default();
        config.speech.audio_dir = audio_dir.to_path_buf();

        let state = AppState::new(
            config,
            Providers {
                completion: Arc::new(completion),
                transcriber: Arc::new(transcriber),
                synthesizer: Arc::new(synthesizer),
            },
        );
        (create_router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_voice_chat_commits_after_speech() {
        let dir = tempfile::tempdir().unwrap();
        let mut synthesizer = MockSpeechSynthesizer::new();
        synthesizer
            .expect_synthesize()
            .withf(|text, language| text.starts_with("Send two") && language.to_string() == "en")
            .times(1)
            .returning(|_, _| Ok(Bytes::from_static(b"ID3")));
        let (router, state) = app(synthesizer, dir.path());

        let response = router.oneshot(voice_request("jobsearch")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let history = state.store().get_history("v1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "what should I do today");
        assert_eq!(state.audio.list().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_voice_chat_speech_failure_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut synthesizer = MockSpeechSynthesizer::new();
        synthesizer
            .expect_synthesize()
            .times(1)
            .returning(|_, _| Err(ProviderError::Network("tts unreachable".to_string())));
        let (router, state) = app(synthesizer, dir.path());

        let response = router.oneshot(voice_request("task")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        assert!(state.store().get_history("v1").is_empty());
        assert!(state.audio.list().await.unwrap().unwrap().is_empty());
    }
}
