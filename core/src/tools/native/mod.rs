pub mod discovery;
pub mod speak;

pub use discovery::{ListEmotionsTool, ListVoicesTool, VoiceGuideTool};
pub use speak::SpeakTool;

use crate::speak::SpeakOrchestrator;
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Register `speak`, `list_voices`, `list_emotions` and `voice_guide`.
pub async fn register_speech_tools(registry: &ToolRegistry, orchestrator: Arc<SpeakOrchestrator>) {
    registry
        .register(Arc::new(SpeakTool::new(Arc::clone(&orchestrator))))
        .await;
    registry
        .register(Arc::new(ListVoicesTool::new(Arc::clone(&orchestrator))))
        .await;
    registry
        .register(Arc::new(ListEmotionsTool::new(Arc::clone(&orchestrator))))
        .await;
    registry
        .register(Arc::new(VoiceGuideTool::new(orchestrator)))
        .await;
}
