//! Audio backends for Vocalize.
//!
//! - `system`: local speech via `say`, `espeak-ng` or Windows SAPI
//! - `gtts`: Google Translate TTS with English accent variants
//! - `elevenlabs`: ElevenLabs text-to-speech API
//!
//! `engine` picks one of them from settings, falling back to `system`.

pub mod elevenlabs;
pub mod engine;
pub mod gtts;
pub mod system;
pub(crate) mod utils;

pub use elevenlabs::{ElevenLabsBackend, ElevenLabsConfig};
pub use engine::{build_backend, AudioSettings, EngineKind};
pub use gtts::{GttsBackend, GttsConfig};
pub use system::{SystemBackend, SystemConfig};
