//! # Video Conversion Module
//!
//! Questo modulo esegue una singola conversione invocando l'encoder esterno.
//!
//! ## Responsabilità:
//! - Costruisce la command line fissa di ffmpeg dal profilo di encoding
//! - Avvia il processo, cattura stdout/stderr e interpreta l'exit status
//! - Verifica che il file di output esista e non sia vuoto
//! - Applica il timeout per file (se configurato) terminando il processo
//! - Termina il processo se la conversione viene abbandonata (cancellazione)
//!
//! ## Command line:
//! ```text
//! ffmpeg -y -i <input> -c:v libx264 -c:a aac -b:a 192k -preset fast -v error <output>
//! ```
//!
//! ## Esito:
//! - Exit 0 + output non vuoto: successo
//! - Exit diverso da 0: `ConversionFailed` con l'output diagnostico del tool
//! - Avvio fallito (binario mancante, permessi): `ToolUnavailable`
//! - Exit 0 ma output assente o vuoto: `ConversionFailed`
//!
//! Nessun retry: un tentativo fallito è definitivo.
//!
//! ## Esempio:
//! ```ignore
//! let converter = Converter::new(&config);
//! converter.convert(&staged_input, &staged_output).await?;
//! ```

use crate::config::{Config, EncodingProfile};
use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs the external encoder on one file
#[derive(Debug, Clone)]
pub struct Converter {
    tool: PathBuf,
    profile: EncodingProfile,
    timeout: Option<Duration>,
}

impl Converter {
    pub fn new(config: &Config) -> Self {
        let tool = PlatformCommands::instance().resolve_encoder(config.ffmpeg_path.as_deref());
        Self {
            tool,
            profile: config.profile.clone(),
            timeout: config.task_timeout(),
        }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    /// Check if the encoder can be found
    pub async fn is_available(&self) -> bool {
        PlatformCommands::instance().is_command_available(&self.tool).await
    }

    /// Arguments passed to the encoder for one conversion
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let profile = &self.profile;
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
        for (flag, value) in [
            ("-c:v", &profile.video_codec),
            ("-c:a", &profile.audio_codec),
            ("-b:a", &profile.audio_bitrate),
            ("-preset", &profile.preset),
        ] {
            args.push(flag.into());
            args.push(value.into());
        }
        args.extend([OsString::from("-v"), OsString::from("error"), output.into()]);
        args
    }

    /// Convert `input` into `output`.
    ///
    /// The caller owns both locations; the parent of `output` must exist.
    /// Dropping the returned future kills the encoder process.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        debug!(
            "🎬 Converting {} (video: {}, audio: {} @ {}, preset: {})",
            input.display(),
            self.profile.video_codec,
            self.profile.audio_codec,
            self.profile.audio_bitrate,
            self.profile.preset
        );

        let mut cmd = Command::new(&self.tool);
        cmd.args(self.build_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start_time = Instant::now();
        let child = cmd.spawn().map_err(|e| {
            ConvertError::ToolUnavailable(format!("Failed to execute {}: {}", self.tool.display(), e))
        })?;

        let output_result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Encoder killed after {}s on {}", limit.as_secs(), input.display());
                    return Err(ConvertError::Timeout(limit));
                }
            },
            None => child.wait_with_output().await,
        };
        let process_output = output_result?;
        let duration = start_time.elapsed();

        if !process_output.status.success() {
            debug!("❌ Encoder failed after {:.1}s", duration.as_secs_f64());
            return Err(ConvertError::ConversionFailed(diagnostic_text(&process_output)));
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => {
                debug!("✅ Conversion completed in {:.1}s", duration.as_secs_f64());
                Ok(())
            }
            Ok(_) => Err(ConvertError::ConversionFailed(format!(
                "{} exited successfully but produced an empty file: {}",
                self.tool.display(),
                output.display()
            ))),
            Err(e) => Err(ConvertError::ConversionFailed(format!(
                "{} exited successfully but {} is missing: {}",
                self.tool.display(),
                output.display(),
                e
            ))),
        }
    }
}

/// Encoder diagnostics: stderr first, then stdout, or the exit status if both are empty.
fn diagnostic_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut text = stderr.trim_end().to_string();
    if !stdout.trim().is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(stdout.trim_end());
    }

    if text.is_empty() {
        format!("encoder exited with {}", output.status)
    } else {
        text
    }
}
