//! Transcript endpoint
//!
//! Parses the request, resolves the video ID, lists the caption tracks,
//! picks one for the requested language and returns its content.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    config::ServerConfig,
    error::TranscriptError,
    provider::TranscriptProvider,
    response::{ApiError, AvailableLanguage, TranscriptPayload},
    transcript::{Transcript, TranscriptList},
    video_id::extract_video_id,
};

pub const DEFAULT_LANGUAGE: &str = "en";
const FALLBACK_LANGUAGE: &str = "en";
const UNKNOWN_VERSION: &str = "unknown";

#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn TranscriptProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn TranscriptProvider>) -> Self {
        Self { provider }
    }

    /// Provider version for error diagnostics; never fails
    fn diagnostic_version(&self) -> String {
        self.provider
            .version()
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    fn upstream(&self, err: &TranscriptError) -> ApiError {
        if err.is_unavailable() {
            return ApiError::TranscriptsUnavailable;
        }

        tracing::error!(provider = self.provider.name(), "transcript provider failed: {err}");
        ApiError::Upstream {
            message: err.to_string(),
            version: self.diagnostic_version(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptRequest {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

/// Build the router serving the transcript endpoint and a health probe
pub fn router(provider: Arc<dyn TranscriptProvider>, config: &ServerConfig) -> Router {
    Router::new()
        .route(&config.route, post(transcript))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .with_state(AppState::new(provider))
}

async fn health() -> &'static str {
    "ok"
}

async fn transcript(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TranscriptPayload>, ApiError> {
    let body = body.map_err(ApiError::from)?;
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    // Only objects are requests; serde would otherwise fill fields from an array by position
    let serde_json::Value::Object(fields) = value else {
        return Err(ApiError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    };
    let request = TranscriptRequest::deserialize(serde_json::Value::Object(fields))
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let url = request
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::MissingUrl {
            version: state.diagnostic_version(),
        })?;
    let lang = request
        .lang
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let video_id = extract_video_id(&url).map_err(|_| ApiError::InvalidVideoId)?;
    tracing::debug!(%video_id, %lang, "transcript requested");

    let list = state
        .provider
        .list_transcripts(&video_id)
        .await
        .map_err(|e| state.upstream(&e))?;
    if list.is_empty() {
        return Err(ApiError::TranscriptsUnavailable);
    }
    tracing::debug!(%video_id, tracks = list.len(), "transcripts listed");

    let available_languages: Vec<AvailableLanguage> = list.iter().map(AvailableLanguage::from).collect();

    let selected = select_transcript(state.provider.as_ref(), &list, &lang)
        .await
        .map_err(|e| state.upstream(&e))?;

    let items = state
        .provider
        .fetch(&selected)
        .await
        .map_err(|e| state.upstream(&e))?;

    tracing::debug!(
        %video_id,
        language_code = %selected.language_code,
        entries = items.len(),
        "transcript fetched"
    );

    Ok(Json(TranscriptPayload::new(
        video_id,
        &selected,
        available_languages,
        items,
    )))
}

/// Pick the track to serve for `lang`.
///
/// In order: exact match, the first track translated into `lang` (or as is
/// when it cannot be translated), the English track, the first track.
pub async fn select_transcript(
    provider: &dyn TranscriptProvider,
    list: &TranscriptList,
    lang: &str,
) -> Result<Transcript, TranscriptError> {
    match provider.find_transcript(list, &[lang]).await {
        Ok(transcript) => return Ok(transcript),
        Err(TranscriptError::NoTranscriptFound(..)) => {}
        Err(e) => return Err(e),
    }

    let first = list
        .first()
        .ok_or_else(|| TranscriptError::TranscriptsDisabled(list.video_id.clone()))?;

    let translated = if first.is_translatable {
        provider.translate(first, lang).await
    } else {
        tracing::debug!(
            language_code = %first.language_code,
            "first transcript is not translatable, serving it untranslated"
        );
        Ok(first.clone())
    };

    match translated {
        Ok(transcript) => Ok(transcript),
        Err(e) => {
            tracing::warn!(%lang, "translation failed, falling back: {e}");
            match provider.find_transcript(list, &[FALLBACK_LANGUAGE]).await {
                Ok(transcript) => Ok(transcript),
                Err(_) => Ok(first.clone()),
            }
        }
    }
}
