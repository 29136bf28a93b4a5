//! Local speech through the platform's command-line synthesizer.
//!
//! Engines, in order of preference:
//! - macOS `say` (`-v voice -r wpm`, voices from `say -v ?`)
//! - Windows SAPI through PowerShell `System.Speech`
//! - `espeak-ng` / `espeak` (`-v voice -s wpm`, voices from `--voices`)
//!
//! Env overrides: SAY_BIN, ESPEAK_BIN

use crate::utils::{get_from_env_or_path, get_from_path, run_blocking};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};
use vocalize_core::{AudioBackend, BackendError, PlaybackRequest, VoiceDescriptor};

pub const SYSTEM_ENGINE_NAME: &str = "system";

#[derive(Clone, Debug)]
pub struct SystemConfig {
    pub say_bin: Option<PathBuf>,
    pub powershell_bin: Option<PathBuf>,
    pub espeak_bin: Option<PathBuf>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let say_bin = if cfg!(target_os = "macos") {
            get_from_env_or_path("SAY_BIN", "say")
        } else {
            std::env::var("SAY_BIN").ok().and_then(|p| get_from_path(&p))
        };
        let powershell_bin = if cfg!(windows) {
            get_from_path("powershell")
        } else {
            None
        };
        let espeak_bin =
            get_from_env_or_path("ESPEAK_BIN", "espeak-ng").or_else(|| get_from_path("espeak"));

        Self {
            say_bin,
            powershell_bin,
            espeak_bin,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Synth {
    Say(PathBuf),
    Sapi(PathBuf),
    Espeak(PathBuf),
}

pub struct SystemBackend {
    synth: Synth,
}

impl SystemBackend {
    pub fn new(cfg: SystemConfig) -> Result<Self, BackendError> {
        let synth = if let Some(bin) = cfg.say_bin {
            Synth::Say(bin)
        } else if let Some(bin) = cfg.powershell_bin {
            Synth::Sapi(bin)
        } else if let Some(bin) = cfg.espeak_bin {
            Synth::Espeak(bin)
        } else {
            return Err(BackendError::Unavailable(
                "No system speech engine found (say, SAPI, espeak-ng)".into(),
            ));
        };
        info!(target: "tts.system", synth = ?synth, "Detected system speech engine");
        Ok(Self { synth })
    }
}

const SAPI_LIST_VOICES: &str = "Add-Type -AssemblyName System.Speech; \
    (New-Object System.Speech.Synthesis.SpeechSynthesizer).GetInstalledVoices() | \
    ForEach-Object { $_.VoiceInfo.Name }";

fn sapi_speak_script(voice: Option<&str>, rate: i64) -> String {
    let mut script = String::from(
        "Add-Type -AssemblyName System.Speech; \
         $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; ",
    );
    if let Some(voice) = voice {
        script.push_str(&format!("$s.SelectVoice('{}'); ", voice.replace('\'', "''")));
    }
    script.push_str(&format!(
        "$s.Rate = {}; $s.Speak([Console]::In.ReadToEnd())",
        sapi_rate(rate)
    ));
    script
}

/// SAPI rates run -10..=10 with 0 around 150 wpm.
fn sapi_rate(wpm: i64) -> i64 {
    ((wpm - 150) / 25).clamp(-10, 10)
}

/// Parse `say -v ?` lines such as `Bad News   en_US    # The light...`.
pub fn parse_say_voices(output: &str) -> Vec<VoiceDescriptor> {
    output
        .lines()
        .filter_map(|line| {
            let left = line.split('#').next()?.trim();
            if left.is_empty() {
                return None;
            }
            let name = match left.rsplit_once(char::is_whitespace) {
                Some((name, _locale)) => name.trim(),
                None => left,
            };
            (!name.is_empty()).then(|| VoiceDescriptor::new(name, name))
        })
        .collect()
}

/// Parse `espeak-ng --voices`: `Pty Language Age/Gender VoiceName File ...`.
pub fn parse_espeak_voices(output: &str) -> Vec<VoiceDescriptor> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 {
                return None;
            }
            Some(VoiceDescriptor::new(cols[3].replace('_', " "), cols[1]))
        })
        .collect()
}

fn capture(mut cmd: Command) -> std::io::Result<String> {
    let output = cmd.stderr(Stdio::null()).output()?;
    if !output.status.success() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{:?} exited with {}", cmd.get_program(), output.status),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn speak_blocking(synth: &Synth, voice: Option<&str>, rate: i64, text: &str) -> std::io::Result<()> {
    let mut cmd = match synth {
        Synth::Say(bin) => {
            let mut cmd = Command::new(bin);
            if let Some(v) = voice {
                cmd.arg("-v").arg(v);
            }
            cmd.arg("-r").arg(rate.to_string());
            cmd
        }
        Synth::Sapi(bin) => {
            let mut cmd = Command::new(bin);
            cmd.args(["-NoProfile", "-NonInteractive", "-Command"])
                .arg(sapi_speak_script(voice, rate));
            cmd
        }
        Synth::Espeak(bin) => {
            let mut cmd = Command::new(bin);
            if let Some(v) = voice {
                cmd.arg("-v").arg(v);
            }
            cmd.arg("-s").arg(rate.to_string()).arg("--stdin");
            cmd
        }
    };
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    debug!(target: "tts.system", command = ?cmd, "Running synthesizer");
    let mut child = cmd.spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl AudioBackend for SystemBackend {
    fn name(&self) -> &'static str {
        SYSTEM_ENGINE_NAME
    }

    async fn voices(&self) -> Result<Vec<VoiceDescriptor>, BackendError> {
        let synth = self.synth.clone();
        let voices = run_blocking(move || match &synth {
            Synth::Say(bin) => {
                let mut cmd = Command::new(bin);
                cmd.args(["-v", "?"]);
                capture(cmd).map(|out| parse_say_voices(&out))
            }
            Synth::Sapi(bin) => {
                let mut cmd = Command::new(bin);
                cmd.args(["-NoProfile", "-NonInteractive", "-Command", SAPI_LIST_VOICES]);
                capture(cmd).map(|out| {
                    out.lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(|name| VoiceDescriptor::new(name, name))
                        .collect()
                })
            }
            Synth::Espeak(bin) => {
                let mut cmd = Command::new(bin);
                cmd.arg("--voices");
                capture(cmd).map(|out| parse_espeak_voices(&out))
            }
        })
        .await
        .map_err(|e| BackendError::VoiceEnumeration(e.to_string()))?;

        info!(target: "tts.system", voices = voices.len(), "Enumerated system voices");
        Ok(voices)
    }

    async fn play(&self, request: &PlaybackRequest) -> Result<(), BackendError> {
        let synth = self.synth.clone();
        let voice = request.voice.as_ref().map(|v| v.handle.clone());
        let rate = request.rate;
        let text = request.text.clone();

        run_blocking(move || speak_blocking(&synth, voice.as_deref(), rate, &text))
            .await
            .map_err(|e| match e {
                BackendError::Io(io) => BackendError::Playback(io.to_string()),
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn say_output_keeps_multiword_names() {
        let out = "Albert              en_US    # Hello! My name is Albert.\n\
                   Bad News            en_US    # The light you see at the end of the tunnel\n\
                   Eddy (English (US)) en_US    # Hello! My name is Eddy.\n";
        let names: Vec<String> = parse_say_voices(out).into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Albert", "Bad News", "Eddy (English (US))"]);
    }

    #[test]
    fn espeak_output_uses_language_as_handle() {
        let out = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                   5  af              --/M      Afrikaans          gmw/af\n \
                   5  en-gb           --/M      English_(Great_Britain) gmw/en\n";
        let voices = parse_espeak_voices(out);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[1].handle, "en-gb");
    }

    #[test]
    fn sapi_rate_is_clamped() {
        assert_eq!(sapi_rate(150), 0);
        assert_eq!(sapi_rate(400), 10);
        assert_eq!(sapi_rate(50), -4);
    }

    #[test]
    fn no_engine_is_unavailable() {
        let cfg = SystemConfig {
            say_bin: None,
            powershell_bin: None,
            espeak_bin: None,
        };
        assert!(matches!(
            SystemBackend::new(cfg),
            Err(BackendError::Unavailable(_))
        ));
    }
}
