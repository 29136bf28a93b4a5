pub mod error;
pub mod native;
pub mod registry;
pub mod traits;

// Re-export common types
pub use error::{ToolError, ToolResult};
pub use native::register_speech_tools;
pub use registry::ToolRegistry;
pub use traits::Tool;
