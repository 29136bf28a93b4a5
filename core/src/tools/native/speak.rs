use crate::speak::{validation_failure, SpeakOrchestrator, SpeakRequest};
use crate::tools::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// `speak(text, voice?, emotion?, rate?)`
pub struct SpeakTool {
    orchestrator: Arc<SpeakOrchestrator>,
}

impl SpeakTool {
    pub fn new(orchestrator: Arc<SpeakOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

fn optional_string(arguments: &Value, key: &str) -> ToolResult<Option<String>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

#[async_trait]
impl Tool for SpeakTool {
    fn name(&self) -> String {
        "speak".to_string()
    }

    fn description(&self) -> String {
        "Speak text aloud with optional voice and emotion control. Returns a confirmation \
         message about what was spoken."
            .to_string()
    }

    fn parameters(&self) -> Value {
        let rates = self.orchestrator.rate_config();
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text to speak"
                },
                "voice": {
                    "type": "string",
                    "description": "Specific voice name to use (e.g. \"Fred\", \"Good News\", \"Bad News\")"
                },
                "emotion": {
                    "type": "string",
                    "description": "Emotion/vibe - \"cheerful\", \"dramatic\", \"friendly\", \"professional\", \"playful\", \"calm\""
                },
                "rate": {
                    "type": "integer",
                    "description": format!(
                        "Speaking rate in words per minute (default: {}, range: {}-{})",
                        rates.default_rate, rates.min_rate, rates.max_rate
                    ),
                    "default": rates.default_rate
                }
            },
            "required": ["text"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let text = match arguments.get("text") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(ToolError::InvalidArguments(format!(
                    "'text' must be a string, got {}",
                    other
                )))
            }
        };
        let voice = optional_string(&arguments, "voice")?;
        let emotion = optional_string(&arguments, "emotion")?;

        let rate = match self
            .orchestrator
            .rate_config()
            .validate_request(&text, arguments.get("rate"))
        {
            Ok(rate) => rate,
            Err(e) => return Ok(Value::String(validation_failure(&e))),
        };

        let request = SpeakRequest {
            text,
            voice,
            emotion,
            rate: Some(rate),
        };
        Ok(Value::String(self.orchestrator.speak(request).await))
    }
}
