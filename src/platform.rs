//! # Platform-specific utilities
//!
//! Questo modulo centralizza la risoluzione cross-platform dell'encoder
//! esterno: nome dell'eseguibile per sistema operativo e verifica della
//! sua disponibilità prima di avviare un batch.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Platform-specific command names for the external tools
pub struct PlatformCommands {
    ffmpeg: &'static str,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        if cfg!(windows) {
            Self { ffmpeg: "ffmpeg.exe", which_command: "where" }
        } else {
            Self { ffmpeg: "ffmpeg", which_command: "which" }
        }
    }

    /// Default encoder command name for this platform
    pub fn ffmpeg(&self) -> &'static str {
        self.ffmpeg
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &'static str {
        self.which_command
    }

    /// Resolve the encoder to run: the configured path, or the platform default
    pub fn resolve_encoder(&self, configured: Option<&Path>) -> PathBuf {
        configured
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(self.ffmpeg))
    }

    /// Check if a command is available.
    ///
    /// Paths with a directory component are checked on disk, bare names
    /// through `which`/`where`.
    pub async fn is_command_available(&self, command: &Path) -> bool {
        if command.components().count() > 1 {
            let available = command.is_file();
            debug!("Encoder {} present on disk: {}", command.display(), available);
            return available;
        }

        let result = tokio::process::Command::new(self.which_command)
            .arg(command)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }

    /// Get system information for debugging
    pub fn system_info() -> SystemInfo {
        SystemInfo {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            family: std::env::consts::FAMILY,
        }
    }
}

/// System information structure
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub family: &'static str,
}

impl std::fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.os, self.arch, self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_platform_commands() {
        let platform = PlatformCommands::instance();
        assert!(platform.ffmpeg().starts_with("ffmpeg"));
        assert!(!platform.which_command().is_empty());
    }

    #[test]
    fn test_resolve_encoder_prefers_configured_path() {
        let platform = PlatformCommands::instance();
        let custom = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(platform.resolve_encoder(Some(&custom)), custom);
        assert_eq!(platform.resolve_encoder(None), PathBuf::from(platform.ffmpeg()));
    }

    #[tokio::test]
    async fn test_command_availability_for_paths() {
        let platform = PlatformCommands::instance();
        let temp_dir = TempDir::new().unwrap();
        let tool = temp_dir.path().join("encoder");

        assert!(!platform.is_command_available(&tool).await);
        std::fs::write(&tool, b"#!/bin/sh\n").unwrap();
        assert!(platform.is_command_available(&tool).await);
    }

    #[tokio::test]
    async fn test_unknown_bare_command_is_unavailable() {
        let platform = PlatformCommands::instance();
        let missing = Path::new("definitely-not-an-encoder-4242");
        assert!(!platform.is_command_available(missing).await);
    }

    #[test]
    fn test_system_info() {
        let info = PlatformCommands::system_info();
        assert!(!info.os.is_empty());
        assert!(!info.to_string().is_empty());
    }
}
