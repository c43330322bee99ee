use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::transcript::{Transcript, TranscriptItem};

pub const UNAVAILABLE_MESSAGE: &str = "Transcripts are disabled or not available for this video.";

/// Successful transcript lookup
#[derive(Debug, Serialize)]
pub struct TranscriptPayload {
    pub success: bool,
    pub video_id: String,
    pub language_code: String,
    pub language_name: String,
    pub is_generated: bool,
    pub available_languages: Vec<AvailableLanguage>,
    pub transcript: Vec<TranscriptItem>,
}

impl TranscriptPayload {
    pub fn new(
        video_id: String,
        selected: &Transcript,
        available_languages: Vec<AvailableLanguage>,
        transcript: Vec<TranscriptItem>,
    ) -> Self {
        Self {
            success: true,
            video_id,
            language_code: selected.language_code.clone(),
            language_name: selected.language.clone(),
            is_generated: selected.is_generated,
            available_languages,
            transcript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableLanguage {
    pub code: String,
    pub name: String,
    pub is_generated: bool,
}

impl From<&Transcript> for AvailableLanguage {
    fn from(transcript: &Transcript) -> Self {
        Self {
            code: transcript.language_code.clone(),
            name: transcript.language.clone(),
            is_generated: transcript.is_generated,
        }
    }
}

/// Terminal failures of the transcript endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body could not be decoded as JSON
    #[error("Server Error: {0}")]
    MalformedBody(String),

    #[error("Missing 'url'. Library Version: {version}")]
    MissingUrl { version: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body is too large: {0}")]
    BodyTooLarge(String),

    #[error("Could not extract Video ID from URL")]
    InvalidVideoId,

    #[error("{}", UNAVAILABLE_MESSAGE)]
    TranscriptsUnavailable,

    #[error("{message} (Lib Version: {version})")]
    Upstream { message: String, version: String },
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    error: String,
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUrl { .. }
            | Self::InvalidRequest(_)
            | Self::InvalidVideoId
            | Self::TranscriptsUnavailable => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedBody(_) | Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only provider-stage failures carry the `success: false` flag
    const fn success_flag(&self) -> Option<bool> {
        match self {
            Self::TranscriptsUnavailable | Self::Upstream { .. } => Some(false),
            _ => None,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge(rejection.body_text())
        } else {
            Self::MalformedBody(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: self.success_flag(),
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
