use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use vocalize_audio::AudioSettings;
use vocalize_core::RateConfig;

/// Server configuration: env-driven defaults with an optional TOML overlay
#[derive(Clone, Debug)]
pub struct VocalizeConfig {
    pub audio: AudioSettings,
    pub rates: RateConfig,
    /// Upper bound on a single playback (`TTS_TIMEOUT_MS`); unset waits forever
    pub playback_timeout_ms: Option<u64>,
    /// Upper bound on a single tool call; unset waits forever
    pub tool_timeout_ms: Option<u64>,
}

impl Default for VocalizeConfig {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            rates: RateConfig::default().with_env_overrides(),
            playback_timeout_ms: std::env::var("TTS_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0),
            tool_timeout_ms: None,
        }
    }
}

impl VocalizeConfig {
    /// Load configuration from a TOML file (path via VOCALIZE_CONFIG or ./vocalize.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path = std::env::var("VOCALIZE_CONFIG").unwrap_or_else(|_| "vocalize.toml".into());
        Self::load_from(Path::new(&path), Self::default())
    }

    pub fn load_from(path: &Path, default: Self) -> Self {
        if !path.exists() {
            tracing::info!(target: "vocalize_mcp", path = %path.display(), "No TOML config found; using defaults/env");
            return default;
        }
        let loaded = match fs::read_to_string(path) {
            Ok(s) => match toml::from_str::<VocalizeToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "vocalize_mcp", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "vocalize_mcp", error = %e, "Failed to read TOML; using defaults");
                default
            }
        };
        loaded.validated()
    }

    /// Replace an inconsistent rate table with the built-in one.
    fn validated(mut self) -> Self {
        if let Err(e) = self.rates.check() {
            tracing::warn!(target: "vocalize_mcp", error = %e, "Invalid rate configuration; using built-in rates");
            self.rates = RateConfig::default();
        }
        self
    }

    pub fn playback_timeout(&self) -> Option<Duration> {
        self.playback_timeout_ms.map(Duration::from_millis)
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_ms.map(Duration::from_millis)
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct VocalizeToml {
    pub engine: Option<String>,
    pub playback_timeout_ms: Option<u64>,
    pub tool_timeout_ms: Option<u64>,
    pub rate: Option<RateToml>,
    pub system: Option<SystemToml>,
    pub gtts: Option<GttsToml>,
    pub elevenlabs: Option<ElevenLabsToml>,
}

impl VocalizeToml {
    fn overlay(self, mut base: VocalizeConfig) -> VocalizeConfig {
        if let Some(e) = self.engine {
            base.audio.engine = e;
        }
        if let Some(ms) = self.playback_timeout_ms {
            base.playback_timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(ms) = self.tool_timeout_ms {
            base.tool_timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(r) = self.rate {
            r.apply(&mut base.rates);
        }
        if let Some(s) = self.system {
            s.apply(&mut base.audio);
        }
        if let Some(g) = self.gtts {
            g.apply(&mut base.audio);
        }
        if let Some(e) = self.elevenlabs {
            e.apply(&mut base.audio);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct RateToml {
    pub min_rate: Option<i64>,
    pub max_rate: Option<i64>,
    pub default_rate: Option<i64>,
    pub multipliers: Option<BTreeMap<String, f64>>,
}
impl RateToml {
    fn apply(self, r: &mut RateConfig) {
        if let Some(v) = self.min_rate {
            r.min_rate = v;
        }
        if let Some(v) = self.max_rate {
            r.max_rate = v;
        }
        if let Some(v) = self.default_rate {
            r.default_rate = v;
        }
        if let Some(m) = self.multipliers {
            r.multipliers
                .extend(m.into_iter().map(|(k, v)| (k.to_lowercase(), v)));
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct SystemToml {
    pub say_bin: Option<PathBuf>,
    pub espeak_bin: Option<PathBuf>,
}
impl SystemToml {
    fn apply(self, a: &mut AudioSettings) {
        if let Some(x) = self.say_bin.filter(|p| p.exists()) {
            a.system.say_bin = Some(x);
        }
        if let Some(x) = self.espeak_bin.filter(|p| p.exists()) {
            a.system.espeak_bin = Some(x);
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GttsToml {
    pub lang: Option<String>,
    pub player: Option<String>,
    pub temp_dir: Option<PathBuf>,
}
impl GttsToml {
    fn apply(self, a: &mut AudioSettings) {
        if let Some(x) = self.lang {
            a.gtts.lang = x;
        }
        if let Some(x) = self.player {
            a.gtts.player = Some(x);
        }
        if let Some(x) = self.temp_dir {
            a.gtts.temp_dir = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ElevenLabsToml {
    pub api_key: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub api_base: Option<String>,
    pub player: Option<String>,
}
impl ElevenLabsToml {
    fn apply(self, a: &mut AudioSettings) {
        if let Some(x) = self.api_key.filter(|k| !k.trim().is_empty()) {
            a.elevenlabs.api_key = Some(x);
        }
        if let Some(x) = self.voice_id {
            a.elevenlabs.voice_id = x;
        }
        if let Some(x) = self.model_id {
            a.elevenlabs.model_id = x;
        }
        if let Some(x) = self.api_base {
            a.elevenlabs.api_base = x;
        }
        if let Some(x) = self.player {
            a.elevenlabs.player = Some(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(toml_text: &str) -> VocalizeConfig {
        let t: VocalizeToml = toml::from_str(toml_text).unwrap();
        t.overlay(VocalizeConfig::default()).validated()
    }

    #[test]
    fn overlays_engine_and_rates() {
        let cfg = overlay(
            r#"
            engine = "gtts"
            playback_timeout_ms = 30000

            [rate]
            max_rate = 300
            multipliers = { Calm = 0.8, whisper = 0.6 }

            [gtts]
            lang = "en-GB"
            "#,
        );
        assert_eq!(cfg.audio.engine, "gtts");
        assert_eq!(cfg.playback_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.rates.max_rate, 300);
        assert_eq!(cfg.rates.multiplier("calm"), Some(0.8));
        assert_eq!(cfg.rates.multiplier("whisper"), Some(0.6));
        assert_eq!(cfg.rates.multiplier("dramatic"), Some(1.2));
        assert_eq!(cfg.audio.gtts.lang, "en-GB");
    }

    #[test]
    fn zero_timeout_means_none() {
        let cfg = overlay("playback_timeout_ms = 0\ntool_timeout_ms = 0");
        assert_eq!(cfg.playback_timeout(), None);
        assert_eq!(cfg.tool_timeout(), None);
    }

    #[test]
    fn bad_rate_bounds_are_rejected() {
        let cfg = overlay("[rate]\nmin_rate = 500\nmax_rate = 100");
        assert_eq!(cfg.rates, RateConfig::default());
    }

    #[test]
    fn elevenlabs_section_sets_key() {
        let cfg = overlay("[elevenlabs]\napi_key = \"abc\"\nvoice_id = \"v1\"");
        assert_eq!(cfg.audio.elevenlabs.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.audio.elevenlabs.voice_id, "v1");
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let cfg = VocalizeConfig::load_from(
            Path::new("/nonexistent/vocalize.toml"),
            VocalizeConfig::default(),
        );
        assert!(cfg.rates.check().is_ok());
    }
}
