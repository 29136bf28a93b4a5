//! Speak orchestrator: validation, voice and rate resolution, and a single
//! serialized playback path to the active backend.
//!
//! Every public operation returns a display string. Failures are reported
//! as strings starting with `❌` and never propagate to the caller.

use crate::backend::{AudioBackend, BackendError, PlaybackRequest};
use crate::catalog::VoiceCatalog;
use crate::emotion::{EmotionTable, DEFAULT_VOICE_NAME};
use crate::rate::{RateConfig, ValidationError};
use crate::render;
use crate::resolver::VoiceResolver;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Marker prefixed to every failure string.
pub const FAILURE_MARKER: &str = "❌";

/// Characters of the spoken text included in log lines.
const LOG_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeakRequest {
    pub text: String,
    pub voice: Option<String>,
    pub emotion: Option<String>,
    /// Words per minute. `None` uses the orchestrator's configured default.
    pub rate: Option<i64>,
}

impl SpeakRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            emotion: None,
            rate: None,
        }
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn rate(mut self, rate: i64) -> Self {
        self.rate = Some(rate);
        self
    }
}

/// Format a validation failure the way `speak` reports it.
pub fn validation_failure(err: &ValidationError) -> String {
    format!("{} Error: {}", FAILURE_MARKER, err)
}

pub struct SpeakOrchestrator {
    backend: Option<Arc<dyn AudioBackend>>,
    catalog: VoiceCatalog,
    emotions: EmotionTable,
    rates: RateConfig,
    playback_lock: Mutex<()>,
    playback_timeout: Option<Duration>,
}

impl SpeakOrchestrator {
    /// Assemble from explicit parts. Emotion voices are resolved here.
    pub fn new(
        backend: Option<Arc<dyn AudioBackend>>,
        catalog: VoiceCatalog,
        mut emotions: EmotionTable,
        rates: RateConfig,
    ) -> Self {
        catalog.resolve_emotions(&mut emotions);
        Self {
            backend,
            catalog,
            emotions,
            rates,
            playback_lock: Mutex::new(()),
            playback_timeout: None,
        }
    }

    /// Query the backend for its voices and build the catalog once.
    ///
    /// A failed enumeration is logged and leaves the catalog empty; voice
    /// resolution then degrades to index 0 and the `"default"` voice.
    pub async fn initialize(backend: Option<Arc<dyn AudioBackend>>, rates: RateConfig) -> Self {
        let Some(engine) = backend else {
            warn!(target: "speak", "TTS engine not available, skipping voice cache initialization");
            return Self::new(None, VoiceCatalog::empty(), EmotionTable::default(), rates);
        };

        let emotions = engine.emotion_table();
        let catalog = match engine.voices().await {
            Ok(voices) if voices.is_empty() => {
                warn!(target: "speak", engine = engine.name(), "No voices available on this system");
                VoiceCatalog::empty()
            }
            Ok(voices) => VoiceCatalog::build(voices),
            Err(e) => {
                error!(target: "speak", engine = engine.name(), error = %e, "Error initializing voice cache");
                VoiceCatalog::empty()
            }
        };

        Self::new(Some(engine), catalog, emotions, rates)
    }

    /// Bound each backend play call. `None` waits indefinitely.
    pub fn with_playback_timeout(mut self, limit: Option<Duration>) -> Self {
        self.playback_timeout = limit;
        self
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn emotions(&self) -> &EmotionTable {
        &self.emotions
    }

    pub fn rate_config(&self) -> &RateConfig {
        &self.rates
    }

    pub fn engine_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|b| b.name())
    }

    pub fn resolve_voice(&self, emotion: Option<&str>, voice: Option<&str>) -> usize {
        VoiceResolver::new(&self.catalog, &self.emotions).resolve(emotion, voice)
    }

    pub async fn speak(&self, request: SpeakRequest) -> String {
        let rate = request.rate.unwrap_or(self.rates.default_rate);
        if let Err(e) = self.rates.validate(&request.text, rate) {
            warn!(target: "speak", error = %e, "Invalid input for speak function");
            return validation_failure(&e);
        }

        let Some(backend) = self.backend.as_ref() else {
            error!(target: "speak", "TTS engine not available");
            return format!("{} Error: Text-to-speech engine not available", FAILURE_MARKER);
        };

        let _guard = self.playback_lock.lock().await;

        let preview: String = request.text.chars().take(LOG_PREVIEW_CHARS).collect();
        info!(
            target: "speak",
            text = %preview,
            emotion = ?request.emotion,
            voice = ?request.voice,
            rate,
            "Speaking text"
        );

        let index = self.resolve_voice(request.emotion.as_deref(), request.voice.as_deref());
        let voice = self.catalog.get(index).cloned();
        let voice_used = match &voice {
            Some(v) => {
                debug!(target: "speak", voice = %v.name, index, "Using voice");
                v.name.clone()
            }
            None => {
                warn!(target: "speak", "Could not find requested voice, using default");
                DEFAULT_VOICE_NAME.to_string()
            }
        };

        let final_rate = self
            .rates
            .compute_rate(rate, request.emotion.as_deref());

        let playback = PlaybackRequest {
            text: request.text.clone(),
            voice,
            rate: final_rate,
            emotion: request.emotion.clone(),
        };

        if let Err(e) = self.play(backend.as_ref(), &playback).await {
            let message = format!("Error speaking text: {}", e);
            error!(target: "speak", engine = backend.name(), error = %e, "Playback failed");
            return format!("{} {}", FAILURE_MARKER, message);
        }

        let mut details = Vec::new();
        if let Some(emotion) = &request.emotion {
            details.push(format!("emotion: {}", emotion));
        }
        if request.voice.is_some() {
            details.push(format!("voice: {}", voice_used));
        }
        details.push(format!("rate: {} wpm", final_rate));
        details.push(format!("engine: {}", backend.name()));

        info!(target: "speak", parameters = details.len(), "Successfully spoke text");
        format!("🗣️ Spoke: '{}' ({})", request.text, details.join(", "))
    }

    async fn play(
        &self,
        backend: &dyn AudioBackend,
        request: &PlaybackRequest,
    ) -> Result<(), BackendError> {
        match self.playback_timeout {
            None => backend.play(request).await,
            Some(limit) => match timeout(limit, backend.play(request)).await {
                Ok(res) => res,
                Err(_) => Err(BackendError::Timeout(limit.as_millis() as u64)),
            },
        }
    }

    pub fn list_emotions(&self) -> String {
        render::emotion_catalog(&self.emotions)
    }

    pub fn list_voices(&self) -> String {
        if self.catalog.is_empty() {
            warn!(target: "speak", "No voices available in cache");
            return format!("{} No voices available on this system", FAILURE_MARKER);
        }
        match &self.backend {
            Some(backend) => backend.describe_voices(&self.catalog, &self.emotions),
            None => format!("{} Error: Text-to-speech engine not available", FAILURE_MARKER),
        }
    }

    pub fn voice_guide(&self) -> String {
        render::voice_guide()
    }

    /// Stop the backend. Called once on every shutdown path.
    pub async fn shutdown(&self) {
        if let Some(backend) = &self.backend {
            backend.shutdown().await;
            info!(target: "speak", engine = backend.name(), "TTS engine stopped");
        }
    }
}
