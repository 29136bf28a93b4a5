//! Audio backend capability.
//!
//! A backend is whatever actually produces sound: a local speech engine or a
//! cloud service. The orchestrator holds exactly one, chosen at startup.

use crate::catalog::{VoiceCatalog, VoiceDescriptor};
use crate::emotion::{EmotionTable, Platform};
use crate::render;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Playback(String),

    #[error("Failed to enumerate voices: {0}")]
    VoiceEnumeration(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("playback timed out after {0} ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One playback call: text, resolved voice (if any), and final rate in wpm.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub text: String,
    pub voice: Option<VoiceDescriptor>,
    pub rate: i64,
    pub emotion: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Engine name shown to users (e.g. "system", "gTTS").
    fn name(&self) -> &'static str;

    /// Emotion table this backend's voices are matched against.
    fn emotion_table(&self) -> EmotionTable {
        EmotionTable::for_platform(Platform::current())
    }

    /// Voices currently offered by the engine.
    async fn voices(&self) -> Result<Vec<VoiceDescriptor>, BackendError>;

    /// Speak the request; returns once playback finished.
    async fn play(&self, request: &PlaybackRequest) -> Result<(), BackendError>;

    /// Body of the `list_voices` tool. The catalog is never empty here.
    fn describe_voices(&self, catalog: &VoiceCatalog, emotions: &EmotionTable) -> String {
        render::catalog_listing(self.name(), Platform::current(), catalog, emotions)
    }

    /// Release engine resources.
    async fn shutdown(&self) {}
}
