//! Fake encoder used by the converter and coordinator tests.
//!
//! The generated script accepts the same command line as ffmpeg and decides
//! what to do from markers inside the input file:
//! - `FAIL`: prints "invalid data" on stderr and exits 1
//! - `SLEEP`: sleeps 5 seconds before converting
//! - `PAUSE`: sleeps 1 second before converting
//! - `EMPTY`: creates an empty output and exits 0
//! - `NOWRITE`: exits 0 without creating the output
//! - anything else: copies the input to the output
//!
//! Every run registers itself in `running/` while active and appends the
//! number of concurrently registered runs to `concurrency.log`.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct FakeEncoder {
    pub path: PathBuf,
    log: PathBuf,
}

impl FakeEncoder {
    pub fn install(dir: &Path) -> Self {
        let running_dir = dir.join("running");
        std::fs::create_dir_all(&running_dir).unwrap();
        let log = dir.join("concurrency.log");
        let path = dir.join("fake-ffmpeg");

        let script = format!(
            r#"#!/bin/sh
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    *) out="$1"; shift ;;
  esac
done
marker="{running}/run.$$"
mkdir "$marker"
ls "{running}" | wc -l >> "{log}"
if grep -q FAIL "$in"; then
  rmdir "$marker"
  echo "invalid data" >&2
  exit 1
fi
if grep -q SLEEP "$in"; then
  sleep 5
fi
if grep -q PAUSE "$in"; then
  sleep 1
fi
sleep 0.2
rmdir "$marker"
if grep -q EMPTY "$in"; then
  : > "$out"
  exit 0
fi
if grep -q NOWRITE "$in"; then
  exit 0
fi
cp "$in" "$out"
"#,
            running = running_dir.display(),
            log = log.display(),
        );

        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { path, log }
    }

    /// Highest number of simultaneous runs observed
    pub fn max_concurrency(&self) -> usize {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.trim().parse::<usize>().ok())
            .max()
            .unwrap_or(0)
    }

    /// Number of runs that were started
    pub fn launches(&self) -> usize {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .count()
    }
}

/// Entries left in a directory
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}
