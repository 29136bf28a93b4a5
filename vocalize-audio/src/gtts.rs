//! Google Translate text-to-speech.
//!
//! Voices are English accents served from regional Google domains; the
//! voice handle is the top-level domain. The service has no rate control,
//! so `calm` maps to its slow mode and every other rate is ignored.
//!
//! Env overrides: GTTS_LANG, TTS_PLAYER, TTS_TEMP_DIR

use crate::utils::{play_audio_bytes, temp_dir_from_env};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use vocalize_core::emotion::{EmotionTable, Platform, EMOTION_NAMES};
use vocalize_core::render::SEPARATOR_WIDTH;
use vocalize_core::{AudioBackend, BackendError, PlaybackRequest, VoiceCatalog, VoiceDescriptor};

pub const GTTS_ENGINE_NAME: &str = "gTTS";

/// Longest text the endpoint accepts per request.
const MAX_CHUNK_CHARS: usize = 200;

/// (display name, top-level domain)
pub const ACCENTS: &[(&str, &str)] = &[
    ("English (US)", "com"),
    ("English (UK)", "co.uk"),
    ("English (Australia)", "com.au"),
    ("English (Canada)", "ca"),
    ("English (India)", "co.in"),
    ("English (Ireland)", "ie"),
    ("English (South Africa)", "co.za"),
];

/// Accent used for each emotion.
pub const EMOTION_ACCENTS: &[(&str, &str)] = &[
    ("cheerful", "English (Australia)"),
    ("dramatic", "English (UK)"),
    ("friendly", "English (US)"),
    ("professional", "English (Canada)"),
    ("playful", "English (Ireland)"),
    ("calm", "English (India)"),
];

#[derive(Clone, Debug)]
pub struct GttsConfig {
    pub lang: String,
    pub player: Option<String>,
    pub temp_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for GttsConfig {
    fn default() -> Self {
        Self {
            lang: std::env::var("GTTS_LANG").unwrap_or_else(|_| "en".to_string()),
            player: std::env::var("TTS_PLAYER").ok(),
            temp_dir: temp_dir_from_env(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

pub struct GttsBackend {
    client: reqwest::Client,
    cfg: GttsConfig,
}

impl GttsBackend {
    pub fn new(cfg: GttsConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent("Mozilla/5.0 (vocalize-mcp)")
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;
        info!(target: "tts.gtts", lang = %cfg.lang, "gTTS engine ready");
        Ok(Self { client, cfg })
    }

    async fn fetch_chunk(
        &self,
        tld: &str,
        chunk: &str,
        idx: usize,
        total: usize,
        slow: bool,
    ) -> Result<Vec<u8>, BackendError> {
        let url = format!("https://translate.google.{}/translate_tts", tld);
        let speed = if slow { "0.3" } else { "1" };
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.cfg.lang.as_str()),
                ("q", chunk),
                ("ttsspeed", speed),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .header("Referer", format!("https://translate.google.{}/", tld))
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Http(format!(
                "gTTS request failed with status {}",
                status
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

pub fn accent_for_emotion(emotion: &str) -> Option<&'static str> {
    let emotion = emotion.to_lowercase();
    EMOTION_ACCENTS
        .iter()
        .find(|(e, _)| *e == emotion)
        .map(|(_, accent)| *accent)
}

/// Split text at whitespace into pieces of at most `MAX_CHUNK_CHARS`
/// characters. Single words longer than that are cut.
pub(crate) fn chunk_text(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > MAX_CHUNK_CHARS {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(MAX_CHUNK_CHARS);
            chunks.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current_len + needed > MAX_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl AudioBackend for GttsBackend {
    fn name(&self) -> &'static str {
        GTTS_ENGINE_NAME
    }

    fn emotion_table(&self) -> EmotionTable {
        EMOTION_NAMES.iter().fold(
            EmotionTable::for_platform(Platform::Other),
            |table, emotion| match accent_for_emotion(emotion) {
                Some(accent) => table.with_candidates(emotion, &[accent]),
                None => table,
            },
        )
    }

    async fn voices(&self) -> Result<Vec<VoiceDescriptor>, BackendError> {
        Ok(ACCENTS
            .iter()
            .map(|(name, tld)| VoiceDescriptor::new(*name, *tld))
            .collect())
    }

    async fn play(&self, request: &PlaybackRequest) -> Result<(), BackendError> {
        let tld = request
            .voice
            .as_ref()
            .map(|v| v.handle.as_str())
            .unwrap_or("com");
        let slow = request
            .emotion
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case("calm"));
        debug!(target: "tts.gtts", tld, slow, rate = request.rate, "Rate is not adjustable on gTTS");

        let chunks = chunk_text(&request.text);
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(
                self.fetch_chunk(tld, chunk, idx, chunks.len(), slow)
                    .await?,
            );
        }

        play_audio_bytes(audio, &self.cfg.temp_dir, self.cfg.player.as_deref()).await
    }

    fn describe_voices(&self, catalog: &VoiceCatalog, emotions: &EmotionTable) -> String {
        let mut out = vec![
            format!("🎭 VOICE GUIDE ({} Engine):", GTTS_ENGINE_NAME),
            "🌐 Google Text-to-Speech with accent variations".to_string(),
            format!("🎙️ {} accents available", catalog.len()),
            String::new(),
            "🎯 EMOTION-TO-ACCENT MAPPING:".to_string(),
        ];

        for name in EMOTION_NAMES {
            let Some(entry) = emotions.get(name) else {
                continue;
            };
            let accent = entry
                .resolved_voices
                .first()
                .map(String::as_str)
                .unwrap_or("English (US)");
            let note = if name == "calm" { ", slow speech" } else { "" };
            out.push(format!("• {}: {}{}", name, accent, note));
        }

        out.push(format!("\n{}", "=".repeat(SEPARATOR_WIDTH)));
        out.push("🎙️ AVAILABLE ACCENTS:".to_string());
        for (i, voice) in catalog.voices().iter().enumerate() {
            out.push(format!("   {}: {} ({})", i, voice.name, voice.handle));
        }

        out.push(String::new());
        out.extend(
            [
                "💡 USAGE:",
                "   speak('Hello!', emotion='friendly')",
                "   speak('Cheers, mate!', voice='Australia')",
                "   speak('Relax...', emotion='calm')",
                "   Note: rate is ignored by gTTS",
            ]
            .map(String::from),
        );

        out.join("\n")
    }
}
