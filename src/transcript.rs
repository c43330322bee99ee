use serde::{Deserialize, Serialize};

use crate::error::{Result, TranscriptError};

/// One caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationLanguage {
    pub language: String,
    pub language_code: String,
}

/// Metadata for one caption track offered for a video
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub is_translatable: bool,
    pub base_url: String,
    pub translation_languages: Vec<TranslationLanguage>,
}

impl Transcript {
    /// Derive a track translated into `language_code`.
    ///
    /// Translated tracks are machine generated and cannot be translated again.
    pub fn translate(&self, language_code: &str) -> Result<Self> {
        if !self.is_translatable {
            return Err(TranscriptError::NotTranslatable(self.video_id.clone()));
        }

        let target = self
            .translation_languages
            .iter()
            .find(|t| t.language_code == language_code)
            .ok_or_else(|| {
                TranscriptError::TranslationLanguageNotAvailable(language_code.to_string())
            })?;

        Ok(Self {
            video_id: self.video_id.clone(),
            language_code: target.language_code.clone(),
            language: target.language.clone(),
            is_generated: true,
            is_translatable: false,
            base_url: format!("{}&tlang={}", self.base_url, target.language_code),
            translation_languages: Vec::new(),
        })
    }
}

/// Every caption track available for a video.
///
/// Iteration yields manually created tracks first, then generated ones, each
/// group in the order the provider listed them.
#[derive(Debug, Clone, Default)]
pub struct TranscriptList {
    pub video_id: String,
    pub manually_created: Vec<Transcript>,
    pub generated: Vec<Transcript>,
    pub translation_languages: Vec<TranslationLanguage>,
}

impl TranscriptList {
    pub fn iter(&self) -> impl Iterator<Item = &Transcript> {
        self.manually_created.iter().chain(self.generated.iter())
    }

    pub fn first(&self) -> Option<&Transcript> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.manually_created.len() + self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manually_created.is_empty() && self.generated.is_empty()
    }

    pub fn find_transcript(&self, language_codes: &[&str]) -> Result<&Transcript> {
        // Manually created tracks win over generated ones for the same code
        for lang_code in language_codes {
            if let Some(transcript) = Self::lookup(&self.manually_created, lang_code) {
                return Ok(transcript);
            }
            if let Some(transcript) = Self::lookup(&self.generated, lang_code) {
                return Ok(transcript);
            }
        }
        Err(self.not_found(language_codes))
    }

    fn lookup<'a>(tracks: &'a [Transcript], code: &str) -> Option<&'a Transcript> {
        tracks.iter().find(|t| t.language_code == code)
    }

    fn not_found(&self, language_codes: &[&str]) -> TranscriptError {
        TranscriptError::NoTranscriptFound(
            self.video_id.clone(),
            language_codes.iter().map(|s| s.to_string()).collect(),
        )
    }
}
