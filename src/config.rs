//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della conversione batch.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` passata esplicitamente al coordinator
//! - Definisce `EncodingProfile`, i parametri fissi passati a ffmpeg
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `ffmpeg_path`: Path dell'encoder (default: None = ffmpeg di sistema)
//! - `profile`: Codec video/audio, bitrate audio, preset (default: libx264/aac/192k/fast)
//! - `workers`: Numero massimo di conversioni parallele (default: 2)
//! - `task_timeout_secs`: Timeout per singolo file (default: None = disabilitato)
//! - `work_dir`: Directory per i file temporanei (default: None = temp di sistema)
//! - `output_path`: Directory dove salvare i file convertiti (default: converted_videos)
//! - `input_extensions`: Estensioni accettate nella discovery (default: avi)
//! - `max_input_mb`: Dimensione massima di un file in ingresso (default: 500)
//! - `abort_on_missing_tool`: Interrompe i task rimanenti se l'encoder manca (default: true)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     workers: 4,
//!     task_timeout_secs: Some(900),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed encoder parameters applied to every conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingProfile {
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub preset: String,
    /// Extension of the produced artifact, without the dot
    pub output_extension: String,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            preset: "fast".to_string(),
            output_extension: "mp4".to_string(),
        }
    }
}

/// Configuration for a conversion batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Encoder binary (None = platform ffmpeg from PATH)
    pub ffmpeg_path: Option<PathBuf>,
    /// Encoder parameters
    pub profile: EncodingProfile,
    /// Maximum number of conversions in flight
    pub workers: usize,
    /// Per-file timeout in seconds (None = wait for the encoder indefinitely)
    pub task_timeout_secs: Option<u64>,
    /// Parent directory for staged files (None = system temp directory)
    pub work_dir: Option<PathBuf>,
    /// Where converted files are written by the CLI
    pub output_path: PathBuf,
    /// Extensions picked up when scanning directories
    pub input_extensions: Vec<String>,
    /// Inputs larger than this are skipped
    pub max_input_mb: u64,
    /// Fail every pending task once the encoder could not be launched
    pub abort_on_missing_tool: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            profile: EncodingProfile::default(),
            workers: 2,
            task_timeout_secs: None,
            work_dir: None,
            output_path: PathBuf::from("converted_videos"),
            input_extensions: vec!["avi".to_string()],
            max_input_mb: 500,
            abort_on_missing_tool: true,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if self.task_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("Task timeout must be greater than 0 seconds"));
        }

        if self.max_input_mb == 0 {
            return Err(anyhow::anyhow!("Maximum input size must be greater than 0 MB"));
        }

        let profile = &self.profile;
        for (name, value) in [
            ("video codec", &profile.video_codec),
            ("audio codec", &profile.audio_codec),
            ("audio bitrate", &profile.audio_bitrate),
            ("preset", &profile.preset),
            ("output extension", &profile.output_extension),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("Encoding profile {} must not be empty", name));
            }
        }

        if let Some(ref work_dir) = self.work_dir {
            if !work_dir.is_dir() {
                return Err(anyhow::anyhow!("Work directory is not a directory: {}", work_dir.display()));
            }
        }

        Ok(())
    }

    /// Per-task timeout as a `Duration`
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }

    /// Directory where per-task staging directories are created
    pub fn staging_root(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Maximum accepted input size in bytes
    pub fn max_input_bytes(&self) -> u64 {
        self.max_input_mb.saturating_mul(1024 * 1024)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
