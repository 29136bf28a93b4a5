//! ElevenLabs text-to-speech API.
//!
//! Emotion is expressed through voice settings rather than voice choice:
//! every emotion speaks with the configured voice unless the caller names
//! another one from the account.
//!
//! Env: ELEVENLABS_API_KEY, ELEVENLABS_VOICE_ID, ELEVENLABS_MODEL_ID,
//! TTS_PLAYER, TTS_TEMP_DIR

use crate::utils::{play_audio_bytes, temp_dir_from_env};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use vocalize_core::emotion::{EmotionEntry, EmotionTable, EMOTION_NAMES};
use vocalize_core::render::SEPARATOR_WIDTH;
use vocalize_core::{AudioBackend, BackendError, PlaybackRequest, VoiceCatalog, VoiceDescriptor};

pub const ELEVENLABS_ENGINE_NAME: &str = "ElevenLabs";
pub const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWQS";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Voices shown by `list_voices` before the rest is summarized.
const MAX_LISTED_VOICES: usize = 20;

#[derive(Clone, Debug)]
pub struct ElevenLabsConfig {
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub api_base: String,
    pub player: Option<String>,
    pub temp_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            voice_id: std::env::var("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|_| DEFAULT_VOICE_ID.to_string()),
            model_id: std::env::var("ELEVENLABS_MODEL_ID")
                .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            api_base: ELEVENLABS_API_BASE.to_string(),
            player: std::env::var("TTS_PLAYER").ok(),
            temp_dir: temp_dir_from_env(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl VoiceSettings {
    const fn new(stability: f64, similarity_boost: f64, style: f64) -> Self {
        Self {
            stability,
            similarity_boost,
            style,
            use_speaker_boost: true,
            speed: None,
        }
    }
}

/// Lower stability reads as more expressive; higher style exaggerates delivery.
pub fn voice_settings_for(emotion: Option<&str>) -> VoiceSettings {
    match emotion.map(str::to_lowercase).as_deref() {
        Some("cheerful") => VoiceSettings::new(0.30, 0.80, 0.60),
        Some("dramatic") => VoiceSettings::new(0.20, 0.90, 0.80),
        Some("friendly") => VoiceSettings::new(0.50, 0.75, 0.30),
        Some("professional") => VoiceSettings::new(0.75, 0.75, 0.00),
        Some("playful") => VoiceSettings::new(0.25, 0.70, 0.70),
        Some("calm") => VoiceSettings::new(0.85, 0.70, 0.10),
        _ => VoiceSettings::new(0.50, 0.75, 0.00),
    }
}

/// ElevenLabs speed runs 0.7..=1.2 with 1.0 at 150 wpm.
pub fn speed_for_rate(rate: i64) -> f64 {
    (rate as f64 / 150.0).clamp(0.7, 1.2)
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    voices: Vec<ApiVoice>,
}

#[derive(Debug, Deserialize)]
struct ApiVoice {
    voice_id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

pub struct ElevenLabsBackend {
    client: reqwest::Client,
    cfg: ElevenLabsConfig,
    api_key: String,
}

impl ElevenLabsBackend {
    pub fn new(cfg: ElevenLabsConfig) -> Result<Self, BackendError> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| BackendError::Unavailable("ELEVENLABS_API_KEY is not set".into()))?;
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent("vocalize-mcp/0.1")
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;
        info!(target: "tts.elevenlabs", voice_id = %cfg.voice_id, model_id = %cfg.model_id, "ElevenLabs engine ready");
        Ok(Self {
            client,
            cfg,
            api_key,
        })
    }

    pub fn voice_id(&self) -> &str {
        &self.cfg.voice_id
    }

    async fn fetch_voices(&self) -> Result<Vec<ApiVoice>, BackendError> {
        let url = format!("{}/v1/voices", self.cfg.api_base);
        let resp = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(BackendError::Http(format!(
                "GET /v1/voices returned {}",
                resp.status()
            )));
        }
        let body: VoicesResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Ok(body.voices)
    }
}

/// Put the configured voice first so emotion fallback lands on it.
pub(crate) fn order_voices(configured: &str, fetched: Vec<(String, String)>) -> Vec<VoiceDescriptor> {
    let mut voices: Vec<VoiceDescriptor> = fetched
        .into_iter()
        .map(|(id, name)| VoiceDescriptor::new(name, id))
        .collect();
    match voices.iter().position(|v| v.handle == configured) {
        Some(0) => {}
        Some(pos) => {
            let voice = voices.remove(pos);
            voices.insert(0, voice);
        }
        None => voices.insert(0, VoiceDescriptor::new(configured, configured)),
    }
    voices
}

#[async_trait]
impl AudioBackend for ElevenLabsBackend {
    fn name(&self) -> &'static str {
        ELEVENLABS_ENGINE_NAME
    }

    fn emotion_table(&self) -> EmotionTable {
        EmotionTable::new(
            EMOTION_NAMES
                .iter()
                .map(|name| EmotionEntry::new(name, &[]))
                .collect(),
        )
    }

    async fn voices(&self) -> Result<Vec<VoiceDescriptor>, BackendError> {
        let fetched = match self.fetch_voices().await {
            Ok(voices) => voices.into_iter().map(|v| (v.voice_id, v.name)).collect(),
            Err(e) => {
                warn!(target: "tts.elevenlabs", error = %e, "Could not list account voices, using configured voice only");
                Vec::new()
            }
        };
        Ok(order_voices(&self.cfg.voice_id, fetched))
    }

    async fn play(&self, request: &PlaybackRequest) -> Result<(), BackendError> {
        let voice_id = request
            .voice
            .as_ref()
            .map(|v| v.handle.as_str())
            .unwrap_or(self.cfg.voice_id.as_str());

        let mut voice_settings = voice_settings_for(request.emotion.as_deref());
        voice_settings.speed = Some(speed_for_rate(request.rate));

        let body = SpeechBody {
            text: &request.text,
            model_id: &self.cfg.model_id,
            voice_settings,
        };
        debug!(target: "tts.elevenlabs", voice_id, settings = ?body.voice_settings, "Requesting speech");

        let url = format!("{}/v1/text-to-speech/{}", self.cfg.api_base, voice_id);
        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(BackendError::Http(format!(
                "ElevenLabs returned {}: {}",
                status, detail
            )));
        }
        let audio = resp
            .bytes()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        play_audio_bytes(audio.to_vec(), &self.cfg.temp_dir, self.cfg.player.as_deref()).await
    }

    fn describe_voices(&self, catalog: &VoiceCatalog, _emotions: &EmotionTable) -> String {
        let mut out = vec![
            format!("🎭 VOICE GUIDE ({} Engine):", ELEVENLABS_ENGINE_NAME),
            format!("🎙️ CURRENT VOICE: {}", self.cfg.voice_id),
            format!("🎙️ {} voices available in your account", catalog.len()),
            String::new(),
            "🎯 EMOTION-TO-VOICE-SETTINGS MAPPING:".to_string(),
        ];

        for name in EMOTION_NAMES {
            let s = voice_settings_for(Some(name));
            out.push(format!(
                "• {}: stability {:.2}, similarity {:.2}, style {:.2}",
                name, s.stability, s.similarity_boost, s.style
            ));
        }

        out.push(format!("\n{}", "=".repeat(SEPARATOR_WIDTH)));
        out.push("🎙️ AVAILABLE VOICES:".to_string());
        for (i, voice) in catalog.voices().iter().take(MAX_LISTED_VOICES).enumerate() {
            out.push(format!("   {}: {} ({})", i, voice.name, voice.handle));
        }
        if catalog.len() > MAX_LISTED_VOICES {
            out.push(format!("   ... and {} more", catalog.len() - MAX_LISTED_VOICES));
        }

        out.push(String::new());
        out.extend(
            [
                "💡 USAGE:",
                "   speak('Hello!', emotion='friendly')",
                "   speak('Big news!', emotion='dramatic', rate=180)",
                "   speak('Hi there', voice='<voice name from the list above>')",
            ]
            .map(String::from),
        );

        out.join("\n")
    }
}
