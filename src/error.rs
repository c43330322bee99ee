use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Errors raised while talking to a transcript provider
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Invalid video ID: {0}")]
    InvalidVideoId(String),

    #[error("Subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {0} in languages {1:?}")]
    NoTranscriptFound(String, Vec<String>),

    #[error("Transcript for video {0} is not translatable")]
    NotTranslatable(String),

    #[error("Requested translation language is not available: {0}")]
    TranslationLanguageNotAvailable(String),

    #[error("Video {0} is no longer available")]
    VideoUnavailable(String),

    #[error("Video {0} is unplayable: {1}")]
    VideoUnplayable(String, String),

    #[error("Video {0} is age restricted")]
    AgeRestricted(String),

    #[error("YouTube is blocking requests for video {0} (bot check)")]
    RequestBlocked(String),

    #[error("YouTube is blocking requests from this IP for video {0}")]
    IpBlocked(String),

    #[error("Video {0} requires a PO token to fetch transcripts")]
    PoTokenRequired(String),

    #[error("Failed to create consent cookie for video {0}")]
    FailedToCreateConsentCookie(String),

    #[error("Could not parse YouTube page data for video {0}")]
    YouTubeDataUnparsable(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("XML parse error: {0}")]
    XmlParseError(String),
}

impl TranscriptError {
    /// Whether the provider reported that the video simply has no usable captions
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::TranscriptsDisabled(_) | Self::NoTranscriptFound(..)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(TranscriptError::TranscriptsDisabled("abc".into()).is_unavailable());
        assert!(TranscriptError::NoTranscriptFound("abc".into(), vec!["en".into()]).is_unavailable());
        assert!(!TranscriptError::HttpError("boom".into()).is_unavailable());
        assert!(!TranscriptError::NotTranslatable("abc".into()).is_unavailable());
    }

    #[test]
    fn test_display_includes_video_id() {
        let err = TranscriptError::VideoUnplayable("abc".into(), "Private video".into());
        assert_eq!(err.to_string(), "Video abc is unplayable: Private video");
    }
}
