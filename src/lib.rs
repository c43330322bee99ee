pub mod config;
mod error;
pub mod handler;
mod parser;
pub mod provider;
pub mod response;
pub mod transcript;
mod video_id;
pub mod youtube;

pub use config::{ProviderConfig, ServerConfig};
pub use error::{Result, TranscriptError};
pub use handler::{router, select_transcript};
pub use parser::TranscriptParser;
pub use provider::TranscriptProvider;
pub use transcript::{Transcript, TranscriptItem, TranscriptList, TranslationLanguage};
pub use video_id::extract_video_id;
pub use youtube::YouTubeProvider;
