//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file lato CLI.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva dei video in ingresso (file espliciti o directory)
//! - Filtro per estensione e per dimensione massima
//! - Consegna degli output nella directory di output appena un task termina
//! - Formattazione human-readable delle dimensioni
//!
//! ## Operazioni sui file:
//! - `collect_inputs()`: Trasforma i path della command line in `NamedInput`
//! - `deliver_output()`: Sposta un file convertito nella directory di output
//! - `format_size()`: Converte bytes in formato leggibile (KB, MB, GB)
//!
//! ## Esempio:
//! ```ignore
//! let inputs = FileManager::collect_inputs(&paths, &config)?;
//! let report = coordinator.run(inputs, cancel).await?;
//! ```

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::batch::NamedInput;
use crate::config::Config;

/// Manages input discovery and output hand-off
pub struct FileManager;

impl FileManager {
    /// Collect the inputs of a batch from files and directories.
    ///
    /// Explicit files are accepted whatever their extension; directories are
    /// scanned for `config.input_extensions`. Files over the size limit are skipped.
    pub fn collect_inputs(paths: &[PathBuf], config: &Config) -> Result<Vec<NamedInput>> {
        let mut inputs = Vec::new();
        let limit = config.max_input_bytes();

        for path in paths {
            if path.is_dir() {
                let mut found: Vec<PathBuf> = WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| Self::has_accepted_extension(p, &config.input_extensions))
                    .collect();
                found.sort();
                debug!("Found {} video files in {}", found.len(), path.display());

                for file in found {
                    Self::push_if_within_limit(&mut inputs, file, limit)?;
                }
            } else if path.is_file() {
                Self::push_if_within_limit(&mut inputs, path.clone(), limit)?;
            } else {
                return Err(anyhow::anyhow!("Input does not exist: {}", path.display()));
            }
        }

        Ok(inputs)
    }

    fn push_if_within_limit(inputs: &mut Vec<NamedInput>, path: PathBuf, limit: u64) -> Result<()> {
        let size = std::fs::metadata(&path)?.len();
        if size > limit {
            warn!(
                "Skipping {}: {} exceeds the {} limit",
                path.display(),
                Self::format_size(size),
                Self::format_size(limit)
            );
            return Ok(());
        }
        inputs.push(NamedInput::from_path(path));
        Ok(())
    }

    /// Check the file extension against the accepted list (case-insensitive)
    pub fn has_accepted_extension(path: &Path, extensions: &[String]) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                extensions.iter().any(|accepted| accepted.eq_ignore_ascii_case(&ext_lower))
            }
            None => false,
        }
    }

    /// Move a converted file into `output_dir` and return its new path.
    ///
    /// Falls back to copy + remove when `staged` sits on another filesystem.
    /// An existing file with the same name is replaced.
    pub async fn deliver_output(output_dir: &Path, output_name: &str, staged: &Path) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let target = output_dir.join(output_name);

        if let Err(e) = tokio::fs::rename(staged, &target).await {
            debug!("Rename into {} failed ({}), copying", output_dir.display(), e);
            tokio::fs::copy(staged, &target).await.map_err(|e| {
                io::Error::new(e.kind(), format!("Failed to write {}: {}", target.display(), e))
            })?;
            tokio::fs::remove_file(staged).await?;
        }
        Ok(target)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_has_accepted_extension() {
        let accepted = vec!["avi".to_string()];
        assert!(FileManager::has_accepted_extension(Path::new("clip.avi"), &accepted));
        assert!(FileManager::has_accepted_extension(Path::new("CLIP.AVI"), &accepted));
        assert!(!FileManager::has_accepted_extension(Path::new("clip.mp4"), &accepted));
        assert!(!FileManager::has_accepted_extension(Path::new("README"), &accepted));
    }

    #[test]
    fn test_collect_inputs_scans_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("day1");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join("a.avi"), b"a").unwrap();
        std::fs::write(nested.join("b.AVI"), b"b").unwrap();
        std::fs::write(nested.join("notes.txt"), b"skip").unwrap();

        let explicit = temp_dir.path().join("extra.mkv");
        std::fs::write(&explicit, b"mkv").unwrap();

        let inputs = FileManager::collect_inputs(
            &[temp_dir.path().to_path_buf(), explicit],
            &Config::default(),
        )
        .unwrap();

        let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.avi", "b.AVI", "extra.mkv"]);
    }

    #[test]
    fn test_collect_inputs_skips_oversized_files() {
        let temp_dir = TempDir::new().unwrap();
        let big = temp_dir.path().join("big.avi");
        std::fs::write(&big, vec![0u8; 1024 * 1024 + 1]).unwrap();

        let config = Config { max_input_mb: 1, ..Default::default() };
        let inputs = FileManager::collect_inputs(&[big], &config).unwrap();
        assert!(inputs.is_empty());
    }

    #[test]
    fn test_collect_inputs_rejects_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.avi");
        assert!(FileManager::collect_inputs(&[missing], &Config::default()).is_err());
    }

    #[tokio::test]
    async fn test_deliver_output_moves_file() {
        let temp_dir = TempDir::new().unwrap();
        let staged = temp_dir.path().join("staged.mp4");
        std::fs::write(&staged, b"mp4").unwrap();
        let out_dir = temp_dir.path().join("converted_videos");

        let saved = FileManager::deliver_output(&out_dir, "clip-0.mp4", &staged).await.unwrap();
        assert_eq!(saved, out_dir.join("clip-0.mp4"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"mp4");
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_deliver_output_replaces_previous_run() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("converted_videos");
        std::fs::create_dir_all(&out_dir).unwrap();
        std::fs::write(out_dir.join("clip-0.mp4"), b"old").unwrap();
        let staged = temp_dir.path().join("staged.mp4");
        std::fs::write(&staged, b"new").unwrap();

        let saved = FileManager::deliver_output(&out_dir, "clip-0.mp4", &staged).await.unwrap();
        assert_eq!(std::fs::read(&saved).unwrap(), b"new");
    }
}
