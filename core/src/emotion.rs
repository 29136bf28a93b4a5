//! Emotion table: expressive categories mapped to preferred voices.
//!
//! Each platform ships a static table of the six emotions with the voice
//! names most likely to exist on that platform. The `resolved_voices` list of
//! every entry is filled in once, after the voice catalog is built
//! (see [`VoiceCatalog::resolve_emotions`](crate::catalog::VoiceCatalog::resolve_emotions)).

/// Emotion names in presentation order.
pub const EMOTION_NAMES: [&str; 6] = [
    "cheerful",
    "dramatic",
    "friendly",
    "professional",
    "playful",
    "calm",
];

/// Placeholder voice name used when nothing better is known.
pub const DEFAULT_VOICE_NAME: &str = "default";

const MACOS_VOICES: [(&str, &[&str]); 6] = [
    ("cheerful", &["Good News", "Bubbles", "Bells"]),
    (
        "dramatic",
        &["Bad News", "Bahh", "Cellos", "Wobble", "Deranged"],
    ),
    ("friendly", &["Fred", "Albert", "Flo", "Grandma"]),
    ("professional", &["Eddy", "Daniel", "Anna", "Alex"]),
    ("playful", &["Boing", "Bubbles", "Bahh"]),
    ("calm", &["Alice", "Ellen", "Amelie", "Samantha"]),
];

const WINDOWS_VOICES: [(&str, &[&str]); 6] = [
    ("cheerful", &["Zira", "Eva"]),
    ("dramatic", &["David", "Mark"]),
    ("friendly", &["Zira", "Hazel"]),
    ("professional", &["David", "Mark"]),
    ("playful", &["Zira"]),
    ("calm", &["Hazel", "Eva"]),
];

const OTHER_VOICES: [(&str, &[&str]); 6] = [
    ("cheerful", &[DEFAULT_VOICE_NAME]),
    ("dramatic", &[DEFAULT_VOICE_NAME]),
    ("friendly", &[DEFAULT_VOICE_NAME]),
    ("professional", &[DEFAULT_VOICE_NAME]),
    ("playful", &[DEFAULT_VOICE_NAME]),
    ("calm", &[DEFAULT_VOICE_NAME]),
];

/// Human-readable description of a known emotion.
pub fn describe(emotion: &str) -> &'static str {
    match emotion {
        "cheerful" => "Upbeat, positive, and energetic voices",
        "dramatic" => "Theatrical, expressive, and attention-grabbing voices",
        "friendly" => "Warm, approachable, and conversational voices",
        "professional" => "Clear, authoritative, and business-appropriate voices",
        "playful" => "Fun, quirky, and entertaining voices",
        "calm" => "Soothing, gentle, and relaxed voices",
        _ => "Custom emotion",
    }
}

/// Operating system family used to pick the static voice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::MacOs => "Darwin",
            Platform::Windows => "Windows",
            Platform::Other => "Linux",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmotionEntry {
    pub name: String,
    pub description: String,
    /// Preferred voice names, in priority order.
    pub candidate_voices: Vec<String>,
    /// Real voice names found in the catalog; empty until the catalog is built.
    pub resolved_voices: Vec<String>,
}

impl EmotionEntry {
    pub fn new(name: &str, candidates: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: describe(name).to_string(),
            candidate_voices: candidates.iter().map(|c| c.to_string()).collect(),
            resolved_voices: Vec::new(),
        }
    }

    /// Voices worth showing to a user: candidates when configured,
    /// otherwise whatever the catalog resolved.
    pub fn sample_voices(&self) -> &[String] {
        if self.candidate_voices.is_empty() {
            &self.resolved_voices
        } else {
            &self.candidate_voices
        }
    }
}

/// Ordered emotion table. Lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionTable {
    entries: Vec<EmotionEntry>,
}

impl EmotionTable {
    pub fn new(entries: Vec<EmotionEntry>) -> Self {
        Self { entries }
    }

    /// Static table for the given platform.
    pub fn for_platform(platform: Platform) -> Self {
        let table: &[(&str, &[&str])] = match platform {
            Platform::MacOs => &MACOS_VOICES,
            Platform::Windows => &WINDOWS_VOICES,
            Platform::Other => &OTHER_VOICES,
        };
        Self::new(
            table
                .iter()
                .map(|(name, voices)| EmotionEntry::new(name, voices))
                .collect(),
        )
    }

    /// Replace the candidate list of one emotion, keeping table order.
    pub fn with_candidates(mut self, emotion: &str, candidates: &[&str]) -> Self {
        let key = emotion.to_lowercase();
        match self.entries.iter_mut().find(|e| e.name == key) {
            Some(entry) => {
                entry.candidate_voices = candidates.iter().map(|c| c.to_string()).collect();
                entry.resolved_voices.clear();
            }
            None => self.entries.push(EmotionEntry::new(&key, candidates)),
        }
        self
    }

    pub fn get(&self, emotion: &str) -> Option<&EmotionEntry> {
        let key = emotion.to_lowercase();
        self.entries.iter().find(|e| e.name == key)
    }

    pub fn contains(&self, emotion: &str) -> bool {
        self.get(emotion).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmotionEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EmotionEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmotionTable {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}
