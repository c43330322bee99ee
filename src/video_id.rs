use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TranscriptError};

/// Tried in order; the first pattern that matches decides the video ID.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // watch?v=ID and most share forms ending in /ID
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11}).*").expect("valid pattern"),
        Regex::new(r"(?:embed/|v/|youtu.be/)([0-9A-Za-z_-]{11})").expect("valid pattern"),
        // bare ID
        Regex::new(r"^([0-9A-Za-z_-]{11})$").expect("valid pattern"),
    ]
});

/// Extract the 11 character video ID from a YouTube URL or a bare ID
pub fn extract_video_id(url_or_id: &str) -> Result<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url_or_id))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TranscriptError::InvalidVideoId(url_or_id.to_string()))
}
