mod config;
use config::VocalizeConfig;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use vocalize_audio::build_backend;
use vocalize_core::mcp::{McpError, McpServer};
use vocalize_core::tools::{register_speech_tools, ToolRegistry};
use vocalize_core::SpeakOrchestrator;

const INSTRUCTIONS: &str = "Use speak(text, voice?, emotion?, rate?) to talk out loud. \
Call voice_guide() first for when to use each emotion, list_emotions() and list_voices() to discover options.";

/// How long to wait for blocking tasks once serving has stopped. The stdin
/// reader runs on a blocking thread and cannot be cancelled.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, PartialEq, Eq)]
enum Stopped {
    /// The client closed stdin.
    Eof,
    /// Ctrl-C arrived while serving.
    Interrupted,
}

/// Drive `serve` until it finishes or `interrupt` fires. If the interrupt
/// listener itself fails, keep serving until the client disconnects.
async fn serve_until<S, I>(serve: S, interrupt: I) -> Result<Stopped, McpError>
where
    S: Future<Output = Result<(), McpError>>,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(serve);
    tokio::select! {
        res = &mut serve => res.map(|()| Stopped::Eof),
        res = interrupt => match res {
            Ok(()) => {
                info!(target: "vocalize_mcp", "Interrupted, shutting down");
                Ok(Stopped::Interrupted)
            }
            Err(e) => {
                warn!(target: "vocalize_mcp", error = %e, "Failed to listen for Ctrl-C");
                serve.await.map(|()| Stopped::Eof)
            }
        }
    }
}

fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("vocalize-mcp: failed to start tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let code = runtime.block_on(run());
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    code
}

async fn run() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    // stdout carries the JSON-RPC stream, so logs go to stderr
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "info,vocalize_core=info,vocalize_audio=info,vocalize_mcp=info".to_string()
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    if let Ok(path) = dotenv {
        info!(target: "vocalize_mcp", path = %path.display(), "Loaded .env");
    }

    let cfg = VocalizeConfig::load();

    let backend = match build_backend(&cfg.audio) {
        Ok(backend) => Some(backend),
        Err(e) => {
            error!(target: "vocalize_mcp", error = %e, "Failed to initialize TTS engine");
            None
        }
    };

    let orchestrator = Arc::new(
        SpeakOrchestrator::initialize(backend, cfg.rates.clone())
            .await
            .with_playback_timeout(cfg.playback_timeout()),
    );

    let registry = ToolRegistry::new().with_call_timeout(cfg.tool_timeout());
    register_speech_tools(&registry, Arc::clone(&orchestrator)).await;

    let server = McpServer::new(registry).with_instructions(INSTRUCTIONS);

    info!(
        target: "vocalize_mcp",
        engine = orchestrator.engine_name().unwrap_or("none"),
        voices = orchestrator.catalog().len(),
        "Starting VocalizeAgent MCP server on stdio"
    );

    let outcome = serve_until(server.serve_stdio(), signal::ctrl_c()).await;

    orchestrator.shutdown().await;

    match outcome {
        Ok(stopped) => {
            info!(target: "vocalize_mcp", reason = ?stopped, "VocalizeAgent stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(target: "vocalize_mcp", error = %e, "MCP transport failed");
            ExitCode::FAILURE
        }
    }
}
