/// Model Context Protocol (MCP) server
///
/// Exposes the tool registry to MCP clients over newline-delimited
/// JSON-RPC 2.0 (stdio in production).
///
/// MCP Protocol Spec: https://spec.modelcontextprotocol.io/specification/
///
/// Architecture:
/// - `server`: request dispatch and the stdio serve loop
/// - `types`: MCP protocol types (JSON-RPC 2.0 based)
pub mod server;
pub mod types;

pub use server::McpServer;
pub use types::{
    McpError, McpTool, McpToolCall, ServerInfo, ToolContent, DEFAULT_PROTOCOL_VERSION,
    SUPPORTED_PROTOCOL_VERSIONS,
};
