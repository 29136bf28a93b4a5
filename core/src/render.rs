//! Text rendering for the discovery tools.

use crate::catalog::VoiceCatalog;
use crate::emotion::{EmotionTable, Platform, DEFAULT_VOICE_NAME};

/// Voices listed per emotion before the rest is summarized.
const MAX_VOICES_PER_EMOTION: usize = 5;

pub const SEPARATOR_WIDTH: usize = 60;

pub fn emotion_catalog(emotions: &EmotionTable) -> String {
    let mut out = vec![
        "🎭 EMOTION CATEGORIES FOR EXPRESSIVE SPEECH:".to_string(),
        String::new(),
    ];

    for entry in emotions.iter() {
        out.push(format!("🎯 {}", entry.name.to_uppercase()));
        out.push(format!("   Description: {}", entry.description));
        out.push(format!(
            "   Sample voices: {}",
            entry.sample_voices().join(", ")
        ));
        out.push(String::new());
    }

    out.extend(
        [
            "💡 USAGE EXAMPLES:",
            "   speak('Great job!', emotion='cheerful')",
            "   speak('Breaking news...', emotion='dramatic')",
            "   speak('How can I help?', emotion='professional')",
            "   speak('Hello there!', voice='Fred')",
            "   speak('Urgent message!', voice='Bad News', rate=200)",
        ]
        .map(String::from),
    );

    out.join("\n")
}

/// Grouped listing of a local engine's catalog.
pub fn catalog_listing(
    engine: &str,
    platform: Platform,
    catalog: &VoiceCatalog,
    emotions: &EmotionTable,
) -> String {
    let mut out = vec![
        format!(
            "🎭 VOICE GUIDE FOR {} ({} Engine):",
            platform.display_name().to_uppercase(),
            engine
        ),
        format!("🎙️ {} voices available on your system", catalog.len()),
        String::new(),
        "🎯 RECOMMENDED EMOTIONS:".to_string(),
    ];

    for entry in emotions.iter() {
        let resolved = &entry.resolved_voices;
        let uses_fallback = resolved.is_empty()
            || (resolved.len() == 1 && resolved[0] == DEFAULT_VOICE_NAME);
        if uses_fallback {
            out.push(format!(
                "• {}: {} (using fallback)",
                entry.name, entry.description
            ));
        } else {
            out.push(format!(
                "• {}: {} ({} voices)",
                entry.name,
                entry.description,
                resolved.len()
            ));
        }
    }

    out.push(format!("\n{}", "=".repeat(SEPARATOR_WIDTH)));
    out.push("🎯 VOICES BY EMOTION CATEGORY:".to_string());
    out.push(String::new());

    for entry in emotions.iter() {
        let voices = if entry.resolved_voices.is_empty() {
            entry.sample_voices()
        } else {
            &entry.resolved_voices
        };
        if voices.is_empty() {
            continue;
        }
        out.push(format!("🎭 {}:", entry.name.to_uppercase()));
        for name in voices.iter().take(MAX_VOICES_PER_EMOTION) {
            if let Some(index) = catalog.index_of(name) {
                out.push(format!("   {}: {}", index, name));
            }
        }
        if voices.len() > MAX_VOICES_PER_EMOTION {
            out.push(format!(
                "   ... and {} more",
                voices.len() - MAX_VOICES_PER_EMOTION
            ));
        }
        out.push(String::new());
    }

    out.extend(
        [
            "💡 USAGE:",
            "   speak('Hello!', emotion='friendly')",
            "   speak('Alert!', emotion='dramatic')",
            "   speak('Calm down', emotion='calm')",
        ]
        .map(String::from),
    );

    out.join("\n")
}

const VOICE_GUIDE: &[&str] = &[
    "🎙️ VOCALIZE AGENT - VOICE EMOTING GUIDE FOR AI AGENTS",
    "============================================================",
    "",
    "🎯 PURPOSE:",
    "This MCP server enables you to express emotions and personality through voice,",
    "making interactions more engaging and human-like. Use voice to match your",
    "emotional state, emphasize important information, or create atmosphere.",
    "",
    "🗣️ MAIN FUNCTION: speak(text, voice=None, emotion=None, rate=150)",
    "",
    "📋 EMOTION CATEGORIES & WHEN TO USE:",
    "",
    "🎉 CHEERFUL - Use when:",
    "   • Celebrating success or achievements",
    "   • Sharing good news or positive updates",
    "   • Expressing excitement or enthusiasm",
    "   • Encouraging or motivating users",
    "   Example: speak('Congratulations! Task completed successfully!', emotion='cheerful')",
    "",
    "🎭 DRAMATIC - Use when:",
    "   • Making important announcements",
    "   • Highlighting critical information or warnings",
    "   • Creating suspense or emphasis",
    "   • Drawing attention to key points",
    "   Example: speak('BREAKING: Critical system alert detected!', emotion='dramatic')",
    "",
    "🤝 FRIENDLY - Use when:",
    "   • Casual conversation and greetings",
    "   • Providing help or assistance",
    "   • Building rapport with users",
    "   • General day-to-day interactions",
    "   Example: speak('Hi there! How can I help you today?', emotion='friendly')",
    "",
    "💼 PROFESSIONAL - Use when:",
    "   • Business communications",
    "   • Formal presentations or reports",
    "   • Technical explanations",
    "   • Official announcements",
    "   Example: speak('The quarterly review meeting is scheduled for 3 PM.', emotion='professional')",
    "",
    "🎪 PLAYFUL - Use when:",
    "   • Making jokes or being humorous",
    "   • Engaging in fun activities",
    "   • Working with children or in casual contexts",
    "   • Adding levity to conversations",
    "   Example: speak('Oops! That was a silly mistake!', emotion='playful')",
    "",
    "😌 CALM - Use when:",
    "   • Providing reassurance or comfort",
    "   • Delivering meditation or relaxation content",
    "   • Discussing sensitive topics",
    "   • De-escalating tense situations",
    "   Example: speak('Take a deep breath. Everything will be okay.', emotion='calm')",
    "",
    "🎛️ ADVANCED USAGE:",
    "",
    "• Specific Voices: speak('Hello!', voice='Fred') - Use named voices for consistency",
    "• Rate Control: speak('Fast update!', emotion='dramatic', rate=200) - Adjust speed",
    "• Voice Override: speak('Special voice', voice='Bad News') - Direct voice selection",
    "",
    "💡 BEST PRACTICES FOR AI AGENTS:",
    "",
    "1. MATCH EMOTION TO CONTENT:",
    "   - Good news → cheerful",
    "   - Warnings → dramatic",
    "   - Instructions → professional",
    "   - Comfort → calm",
    "",
    "2. VARY YOUR VOICE:",
    "   - Don't use the same emotion for everything",
    "   - Switch between voices to keep interactions dynamic",
    "   - Use dramatic sparingly for maximum impact",
    "",
    "3. CONSIDER CONTEXT:",
    "   - Professional settings → professional/friendly",
    "   - Casual chat → friendly/playful",
    "   - Emergency alerts → dramatic",
    "   - Relaxation → calm",
    "",
    "4. EMOTIONAL PROGRESSION:",
    "   - Start conversations friendly",
    "   - Escalate to dramatic for important points",
    "   - Return to calm for conclusions",
    "",
    "🔧 DISCOVERY TOOLS:",
    "• list_emotions() - Show all emotion categories with descriptions",
    "• list_voices() - Browse available voices organized by emotion",
    "• voice_guide() - This comprehensive guide",
    "",
    "🎯 QUICK REFERENCE:",
    "speak('text')                          # Basic speech",
    "speak('text', emotion='cheerful')      # Emotion-based",
    "speak('text', voice='Fred')            # Specific voice",
    "speak('text', emotion='calm', rate=120) # Full control",
    "",
    "Remember: Voice is a powerful tool for creating connection and conveying",
    "meaning beyond words. Use it thoughtfully to enhance your communication!",
];

pub fn voice_guide() -> String {
    VOICE_GUIDE.join("\n")
}
