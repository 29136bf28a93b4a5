//! Shared process and playback helpers.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task;
use tracing::debug;
use vocalize_core::BackendError;

/// Players able to handle MP3, in preference order.
const MP3_PLAYERS: &[&str] = &["afplay", "mpg123", "ffplay", "paplay"];

pub(crate) fn get_from_env_or_path(env_key: &str, default_bin: &str) -> Option<PathBuf> {
    if let Ok(p) = std::env::var(env_key) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Some(pb);
        }
    }
    get_from_path(default_bin)
}

pub(crate) fn get_from_path(bin: &str) -> Option<PathBuf> {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(bin);
        return if p.exists() { Some(p) } else { None };
    }
    if let Ok(paths) = std::env::var("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join(bin);
            if candidate.exists() {
                return Some(candidate);
            }
            if cfg!(windows) {
                let exe = dir.join(format!("{}.exe", bin));
                if exe.exists() {
                    return Some(exe);
                }
            }
        }
    }
    None
}

/// Generate a simple unique id based on current time in nanoseconds.
#[inline]
pub(crate) fn gen_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:x}", nanos)
}

pub(crate) fn temp_dir_from_env() -> PathBuf {
    std::env::var("TTS_TEMP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir())
}

pub(crate) fn select_player(pref: Option<&str>) -> Option<PathBuf> {
    if let Some(bin) = pref.and_then(get_from_path) {
        return Some(bin);
    }
    MP3_PLAYERS.iter().find_map(|p| get_from_path(p))
}

fn play_with(player_bin: &Path, audio_path: &Path) -> std::io::Result<std::process::ExitStatus> {
    let name = player_bin
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let mut cmd = Command::new(player_bin);
    match name {
        "ffplay" => {
            cmd.args(["-autoexit", "-nodisp", "-loglevel", "quiet"]);
        }
        "mpg123" => {
            cmd.arg("-q");
        }
        _ => {}
    }
    cmd.arg(audio_path);
    debug!(target: "tts", command = ?cmd, "Running player");
    cmd.status()
}

/// Write `audio` to a temp file, play it to completion, then remove it.
pub(crate) async fn play_audio_bytes(
    audio: Vec<u8>,
    temp_dir: &Path,
    player_pref: Option<&str>,
) -> Result<(), BackendError> {
    let player = select_player(player_pref).ok_or_else(|| {
        BackendError::Unavailable("No audio player found (tried afplay, mpg123, ffplay, paplay)".into())
    })?;

    let path = temp_dir.join(format!("vocalize_{}.mp3", gen_id()));
    tokio::fs::write(&path, &audio).await?;

    let play_path = path.clone();
    let status = run_blocking(move || play_with(&player, &play_path)).await;
    let _ = tokio::fs::remove_file(&path).await;

    let status = status?;
    if !status.success() {
        return Err(BackendError::Playback(format!(
            "audio player exited with {}",
            status
        )));
    }
    Ok(())
}

/// Run a blocking closure on the blocking pool, flattening join errors.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, BackendError>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| BackendError::Playback(format!("playback task failed: {}", e)))?
        .map_err(BackendError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_hex() {
        let id = gen_id();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn missing_binary_is_none() {
        assert!(get_from_path("definitely-not-a-real-binary-xyz").is_none());
    }
}
