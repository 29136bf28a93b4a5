//! Picks the voice index for a speak request.

use crate::catalog::VoiceCatalog;
use crate::emotion::EmotionTable;
use tracing::{debug, warn};

/// Resolves an optional voice name and/or emotion to a catalog index.
///
/// Priority: explicit voice name, then the emotion's resolved voices, then
/// index 0. Never fails; an empty catalog always yields 0, so callers must
/// check the catalog before dereferencing the result.
pub struct VoiceResolver<'a> {
    catalog: &'a VoiceCatalog,
    emotions: &'a EmotionTable,
}

impl<'a> VoiceResolver<'a> {
    pub fn new(catalog: &'a VoiceCatalog, emotions: &'a EmotionTable) -> Self {
        Self { catalog, emotions }
    }

    pub fn resolve(&self, emotion: Option<&str>, voice_name: Option<&str>) -> usize {
        if self.catalog.is_empty() {
            warn!(target: "catalog", "No voices available");
            return 0;
        }

        if let Some(name) = voice_name.filter(|n| !n.trim().is_empty()) {
            if let Some(index) = self.catalog.lookup(name) {
                return index;
            }
            debug!(target: "catalog", voice = %name, "Requested voice not found");
        }

        if let Some(entry) = emotion.and_then(|e| self.emotions.get(e)) {
            for voice in &entry.resolved_voices {
                if let Some(index) = self.catalog.lookup(voice) {
                    return index;
                }
            }
        }

        0
    }
}
