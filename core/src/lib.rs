// Vocalize Core Library
// Expressive text-to-speech tools for agents

pub mod backend;
pub mod catalog;
pub mod emotion;
pub mod mcp;
pub mod rate;
pub mod render;
pub mod resolver;
pub mod speak;
pub mod tools;

// Export core types
pub use backend::{AudioBackend, BackendError, PlaybackRequest};
pub use catalog::{VoiceCatalog, VoiceDescriptor};
pub use emotion::{EmotionEntry, EmotionTable, Platform};
pub use rate::{RateConfig, ValidationError};
pub use resolver::VoiceResolver;
pub use speak::{SpeakOrchestrator, SpeakRequest};
