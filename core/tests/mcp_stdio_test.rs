/// MCP protocol over an in-memory duplex stream
mod common;

use common::{orchestrator, RecordingBackend};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use vocalize_core::mcp::McpServer;
use vocalize_core::tools::{register_speech_tools, ToolRegistry};

async fn build_server(backend: Arc<RecordingBackend>) -> McpServer {
    let registry = ToolRegistry::new();
    register_speech_tools(&registry, orchestrator(backend).await).await;
    McpServer::new(registry)
}

async fn call(server: &McpServer, request: Value) -> Value {
    let response = server
        .handle_line(&request.to_string())
        .await
        .expect("request with id must be answered");
    serde_json::to_value(response).unwrap()
}

#[tokio::test]
async fn lists_the_four_tools() {
    let server = build_server(Arc::new(RecordingBackend::default())).await;
    let resp = call(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;

    let names: Vec<&str> = resp["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["list_emotions", "list_voices", "speak", "voice_guide"]);

    let speak = &resp["result"]["tools"][2];
    assert_eq!(speak["inputSchema"]["required"], json!(["text"]));
    assert_eq!(speak["inputSchema"]["properties"]["rate"]["default"], 150);
}

#[tokio::test]
async fn speak_over_tools_call() {
    let backend = Arc::new(RecordingBackend::default());
    let server = build_server(backend.clone()).await;

    let resp = call(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": "speak", "arguments": {"text": "Great job!", "emotion": "cheerful"}}
        }),
    )
    .await;

    assert_eq!(resp["id"], 7);
    assert_eq!(resp["result"]["isError"], false);
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("rate: 169 wpm"), "{}", text);
    assert_eq!(backend.last().unwrap().text, "Great job!");
}

#[tokio::test]
async fn invalid_rate_is_a_string_result() {
    let backend = Arc::new(RecordingBackend::default());
    let server = build_server(backend.clone()).await;

    for (rate, expected) in [
        (json!("fast"), "❌ Error: Rate must be a number"),
        (json!(10), "❌ Error: Rate must be between 50 and 400 wpm"),
    ] {
        let resp = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": "speak", "arguments": {"text": "Hi", "rate": rate}}
            }),
        )
        .await;
        assert_eq!(resp["result"]["content"][0]["text"], expected);
    }
    assert!(backend.last().is_none());
}

#[tokio::test]
async fn discovery_tools_answer() {
    let server = build_server(Arc::new(RecordingBackend::default())).await;

    for (tool, marker) in [
        ("list_emotions", "🎭 EMOTION CATEGORIES FOR EXPRESSIVE SPEECH:"),
        ("voice_guide", "🎯 QUICK REFERENCE:"),
        ("list_voices", "🎯 VOICES BY EMOTION CATEGORY:"),
    ] {
        let resp = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": tool}}),
        )
        .await;
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains(marker), "{} missing {}", tool, marker);
    }
}

#[tokio::test]
async fn serves_over_duplex_until_eof() {
    let server = build_server(Arc::new(RecordingBackend::default())).await;
    let (client, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let serve = tokio::spawn(async move { server.serve(server_read, server_write).await });

    let (client_read, mut client_write) = tokio::io::split(client);
    let requests = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "duplex", "version": "1"}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
    ];
    for request in &requests {
        client_write
            .write_all(format!("{}\n", request).as_bytes())
            .await
            .unwrap();
    }
    client_write.shutdown().await.unwrap();

    let mut lines = BufReader::new(client_read).lines();
    let mut ids = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        let resp: Value = serde_json::from_str(&line).unwrap();
        if resp["id"] == 1 {
            assert_eq!(resp["result"]["serverInfo"]["name"], "VocalizeAgent");
        }
        ids.push(resp["id"].as_i64().unwrap());
    }
    ids.sort();
    assert_eq!(ids, vec![1, 2]);

    serve.await.unwrap().unwrap();
}
