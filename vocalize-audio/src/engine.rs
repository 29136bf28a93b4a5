//! Backend selection.

use crate::elevenlabs::{ElevenLabsBackend, ElevenLabsConfig};
use crate::gtts::{GttsBackend, GttsConfig};
use crate::system::{SystemBackend, SystemConfig};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use vocalize_core::{AudioBackend, BackendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    System,
    Gtts,
    ElevenLabs,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" | "pyttsx3" | "local" => Ok(EngineKind::System),
            "gtts" | "google" => Ok(EngineKind::Gtts),
            "elevenlabs" | "eleven" => Ok(EngineKind::ElevenLabs),
            other => Err(format!("unknown TTS engine '{}'", other)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::System => "system",
            EngineKind::Gtts => "gtts",
            EngineKind::ElevenLabs => "elevenlabs",
        };
        f.write_str(name)
    }
}

/// Everything needed to construct any backend.
#[derive(Clone, Debug)]
pub struct AudioSettings {
    /// Raw engine name as configured (`TTS_ENGINE`).
    pub engine: String,
    pub system: SystemConfig,
    pub gtts: GttsConfig,
    pub elevenlabs: ElevenLabsConfig,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            engine: std::env::var("TTS_ENGINE").unwrap_or_else(|_| "system".to_string()),
            system: SystemConfig::default(),
            gtts: GttsConfig::default(),
            elevenlabs: ElevenLabsConfig::default(),
        }
    }
}

impl AudioSettings {
    /// The engine that will actually be built. Unknown names and ElevenLabs
    /// without an API key fall back to `system`.
    pub fn effective_engine(&self) -> EngineKind {
        let requested = match self.engine.parse::<EngineKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(target: "tts", error = %e, "Falling back to system engine");
                return EngineKind::System;
            }
        };

        if requested == EngineKind::ElevenLabs && self.elevenlabs.api_key.is_none() {
            warn!(target: "tts", "ELEVENLABS_API_KEY not set, falling back to system engine");
            return EngineKind::System;
        }
        requested
    }
}

pub fn build_backend(settings: &AudioSettings) -> Result<Arc<dyn AudioBackend>, BackendError> {
    let kind = settings.effective_engine();
    info!(target: "tts", engine = %kind, "Initializing TTS engine");

    let backend: Arc<dyn AudioBackend> = match kind {
        EngineKind::System => Arc::new(SystemBackend::new(settings.system.clone())?),
        EngineKind::Gtts => Arc::new(GttsBackend::new(settings.gtts.clone())?),
        EngineKind::ElevenLabs => Arc::new(ElevenLabsBackend::new(settings.elevenlabs.clone())?),
    };
    Ok(backend)
}
