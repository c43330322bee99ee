use async_trait::async_trait;

use crate::{
    error::Result,
    transcript::{Transcript, TranscriptItem, TranscriptList},
};

/// Source of caption tracks for a video
///
/// Every call may hit the network and fail on its own, independent of the
/// calls that came before it.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every caption track available for a video
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList>;

    /// Find a track matching the first available code in `language_codes`
    async fn find_transcript(
        &self,
        list: &TranscriptList,
        language_codes: &[&str],
    ) -> Result<Transcript> {
        list.find_transcript(language_codes).cloned()
    }

    /// Derive a track translated into `language_code`
    async fn translate(&self, transcript: &Transcript, language_code: &str) -> Result<Transcript> {
        transcript.translate(language_code)
    }

    /// Download the caption entries of a track
    async fn fetch(&self, transcript: &Transcript) -> Result<Vec<TranscriptItem>>;

    /// Version of the underlying transcript client, reported in diagnostics
    fn version(&self) -> Option<String> {
        None
    }

    fn name(&self) -> &str;
}
