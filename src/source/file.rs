//! File-based data source.
//!
//! Polls a JSON file holding a serialized [`ClusterSnapshot`], as written by
//! `rabbitwatch --dump`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::debug;

use super::{ClusterSnapshot, DataSource};

/// Identifies one version of the snapshot file.
///
/// The length is compared too because a `--dump` rewrite can land within the
/// filesystem's mtime resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

impl Stamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }
}

fn read_snapshot(path: &Path) -> Result<ClusterSnapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid snapshot in {}", path.display()))
}

/// Re-reads a snapshot file, as written by `rabbitwatch --dump`, whenever
/// it changes on disk.
///
/// A file that vanishes or stops parsing leaves the last good snapshot in
/// place; the failure is reported through [`DataSource::error`].
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    seen: Option<Stamp>,
    last_error: Option<String>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            description: format!("file: {}", path.display()),
            path,
            seen: None,
            last_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<ClusterSnapshot> {
        let stamp = Stamp::of(&self.path);
        if self.seen.is_some() && (stamp.is_none() || stamp == self.seen) {
            return None;
        }

        match read_snapshot(&self.path) {
            Ok(snapshot) => {
                debug!(path = %self.path.display(), queues = snapshot.queues.len(), "read snapshot file");
                self.seen = stamp;
                self.last_error = None;
                Some(snapshot)
            }
            Err(e) => {
                self.last_error = Some(format!("{:#}", e));
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
