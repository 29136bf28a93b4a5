//! Voice catalog: snapshot of the voices the active backend reports, plus a
//! lowercase name index built once at startup.
//!
//! Index keys are every voice's full lowercase name and each whitespace
//! token of it. Full names always map to their own voice; a token keeps the
//! first voice that registered it, so common words like "news" resolve to
//! the earliest voice containing them. Key iteration follows insertion order.

use crate::emotion::{EmotionTable, DEFAULT_VOICE_NAME};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A selectable voice. `handle` is opaque and passed back to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    pub name: String,
    pub handle: String,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDescriptor>,
    name_index: IndexMap<String, usize>,
}

impl VoiceCatalog {
    /// Build the catalog and its name index from a raw voice list.
    pub fn build(voices: Vec<VoiceDescriptor>) -> Self {
        let mut name_index = IndexMap::new();

        for (i, voice) in voices.iter().enumerate() {
            let full = voice.name.to_lowercase();
            name_index.insert(full.clone(), i);
            for token in full.split_whitespace() {
                name_index.entry(token.to_string()).or_insert(i);
            }
        }

        info!(
            target: "catalog",
            voices = voices.len(),
            keys = name_index.len(),
            "Voice cache initialized"
        );

        Self { voices, name_index }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn voices(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    pub fn get(&self, index: usize) -> Option<&VoiceDescriptor> {
        self.voices.get(index)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn name_index(&self) -> &IndexMap<String, usize> {
        &self.name_index
    }

    /// Exact, case-insensitive key lookup.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(&name.to_lowercase()).copied()
    }

    /// First index whose key contains `needle` (already lowercase).
    fn first_containing(&self, needle: &str) -> Option<usize> {
        self.name_index
            .iter()
            .find(|(key, _)| key.contains(needle))
            .map(|(_, &i)| i)
    }

    /// Exact key lookup, falling back to the first key containing `name`.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        if key.trim().is_empty() {
            return None;
        }
        self.name_index
            .get(&key)
            .copied()
            .or_else(|| self.first_containing(&key))
    }

    /// Fill `resolved_voices` of every emotion from this catalog.
    ///
    /// Each candidate contributes the real name of the first indexed voice
    /// whose key contains it. Emotions with no hit fall back to the first
    /// catalog voice, or to `"default"` when the catalog is empty.
    pub fn resolve_emotions(&self, emotions: &mut EmotionTable) {
        for entry in emotions.iter_mut() {
            let mut resolved = Vec::new();
            for candidate in &entry.candidate_voices {
                let needle = candidate.to_lowercase();
                match self.first_containing(&needle) {
                    Some(i) => resolved.push(self.voices[i].name.clone()),
                    None => debug!(
                        target: "catalog",
                        voice = %candidate,
                        emotion = %entry.name,
                        "Voice not found for emotion"
                    ),
                }
            }

            if resolved.is_empty() {
                let fallback = self
                    .voices
                    .first()
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| DEFAULT_VOICE_NAME.to_string());
                warn!(
                    target: "catalog",
                    emotion = %entry.name,
                    fallback = %fallback,
                    "No specific voices found for emotion, using fallback"
                );
                resolved.push(fallback);
            }
            entry.resolved_voices = resolved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionTable, Platform};

    fn voices(names: &[&str]) -> Vec<VoiceDescriptor> {
        names
            .iter()
            .map(|n| VoiceDescriptor::new(*n, format!("{}.voice", n.to_lowercase())))
            .collect()
    }

    #[test]
    fn indexes_full_names_and_tokens() {
        let catalog = VoiceCatalog::build(voices(&["Albert", "Good News", "Bad News"]));
        assert_eq!(catalog.index_of("albert"), Some(0));
        assert_eq!(catalog.index_of("Good News"), Some(1));
        assert_eq!(catalog.index_of("good"), Some(1));
        assert_eq!(catalog.index_of("bad"), Some(2));
        // "news" was registered by the first voice that had it.
        assert_eq!(catalog.index_of("news"), Some(1));
    }

    #[test]
    fn full_name_wins_over_earlier_token() {
        let catalog = VoiceCatalog::build(voices(&["Alex Pro", "Alex"]));
        assert_eq!(catalog.index_of("alex"), Some(1));
        assert_eq!(catalog.index_of("pro"), Some(0));
    }

    #[test]
    fn lookup_falls_back_to_substring() {
        let catalog = VoiceCatalog::build(voices(&["Albert", "Samantha"]));
        assert_eq!(catalog.lookup("SAM"), Some(1));
        assert_eq!(catalog.lookup("bert"), Some(0));
        assert_eq!(catalog.lookup("zzz"), None);
        assert_eq!(catalog.lookup(""), None);
    }

    #[test]
    fn empty_catalog_resolves_to_default() {
        let catalog = VoiceCatalog::build(Vec::new());
        let mut table = EmotionTable::for_platform(Platform::MacOs);
        catalog.resolve_emotions(&mut table);
        for entry in table.iter() {
            assert_eq!(entry.resolved_voices, vec!["default".to_string()]);
        }
    }

    #[test]
    fn resolution_uses_real_names_or_first_voice() {
        let catalog = VoiceCatalog::build(voices(&["Albert", "Good News", "Bad News", "Fred"]));
        let mut table = EmotionTable::for_platform(Platform::MacOs);
        catalog.resolve_emotions(&mut table);

        assert_eq!(table.get("cheerful").unwrap().resolved_voices, vec!["Good News"]);
        assert_eq!(table.get("dramatic").unwrap().resolved_voices, vec!["Bad News"]);
        assert_eq!(
            table.get("friendly").unwrap().resolved_voices,
            vec!["Fred", "Albert"]
        );
        // Nothing matches "Boing"/"Bubbles"/"Bahh": fall back to the first voice.
        assert_eq!(table.get("playful").unwrap().resolved_voices, vec!["Albert"]);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let raw = voices(&["Albert", "Good News", "Bad News", "Fred"]);
        let a = VoiceCatalog::build(raw.clone());
        let b = VoiceCatalog::build(raw);
        assert_eq!(a.name_index(), b.name_index());

        let mut ta = EmotionTable::for_platform(Platform::MacOs);
        let mut tb = EmotionTable::for_platform(Platform::MacOs);
        a.resolve_emotions(&mut ta);
        b.resolve_emotions(&mut tb);
        a.resolve_emotions(&mut ta);
        assert_eq!(ta, tb);
    }
}
