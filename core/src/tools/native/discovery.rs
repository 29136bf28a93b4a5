use crate::speak::SpeakOrchestrator;
use crate::tools::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

fn no_arguments() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// `list_voices()`: catalog grouped by emotion.
pub struct ListVoicesTool {
    orchestrator: Arc<SpeakOrchestrator>,
}

impl ListVoicesTool {
    pub fn new(orchestrator: Arc<SpeakOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for ListVoicesTool {
    fn name(&self) -> String {
        "list_voices".to_string()
    }

    fn description(&self) -> String {
        "List available text-to-speech voices with emotion categories".to_string()
    }

    fn parameters(&self) -> Value {
        no_arguments()
    }

    async fn call(&self, _arguments: Value) -> ToolResult<Value> {
        Ok(Value::String(self.orchestrator.list_voices()))
    }
}

/// `list_emotions()`: emotion names, descriptions and sample voices.
pub struct ListEmotionsTool {
    orchestrator: Arc<SpeakOrchestrator>,
}

impl ListEmotionsTool {
    pub fn new(orchestrator: Arc<SpeakOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for ListEmotionsTool {
    fn name(&self) -> String {
        "list_emotions".to_string()
    }

    fn description(&self) -> String {
        "List available emotion categories for expressive speech".to_string()
    }

    fn parameters(&self) -> Value {
        no_arguments()
    }

    async fn call(&self, _arguments: Value) -> ToolResult<Value> {
        Ok(Value::String(self.orchestrator.list_emotions()))
    }
}

/// `voice_guide()`: static usage documentation.
pub struct VoiceGuideTool {
    orchestrator: Arc<SpeakOrchestrator>,
}

impl VoiceGuideTool {
    pub fn new(orchestrator: Arc<SpeakOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for VoiceGuideTool {
    fn name(&self) -> String {
        "voice_guide".to_string()
    }

    fn description(&self) -> String {
        "Complete guide for AI agents on using voice capabilities effectively".to_string()
    }

    fn parameters(&self) -> Value {
        no_arguments()
    }

    async fn call(&self, _arguments: Value) -> ToolResult<Value> {
        Ok(Value::String(self.orchestrator.voice_guide()))
    }
}
