use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::quiz::engine::SnapshotSink;
use crate::store::schema::SessionSnapshot;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot create save directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("cannot list saves in {}: {source}", .path.display())]
    List { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot encode session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to load {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to load {}: not a saved session ({source})", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to load {}: unsupported save version {version}", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },
}

/// Directory of saved sessions, one pretty-printed JSON file per save.
pub struct SnapshotStore {
    base_dir: PathBuf,
}

impl SnapshotStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, SnapshotError> {
        fs::create_dir_all(&base_dir).map_err(|source| SnapshotError::CreateDir {
            path: base_dir.clone(),
            source,
        })?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// `file_name`, or `<stem>_2.json`, `<stem>_3.json`... when saves made
    /// within the same second already took it.
    fn unused_path(&self, file_name: &str) -> PathBuf {
        let path = self.file_path(file_name);
        if !path.exists() {
            return path;
        }
        let stem = file_name.trim_end_matches(".json");
        (2..)
            .map(|n| self.file_path(&format!("{stem}_{n}.json")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }

    /// Write `snapshot` atomically and return the path it landed at.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<PathBuf, SnapshotError> {
        let path = self.unused_path(&snapshot.file_name());
        let json = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&path, json.as_bytes()).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "session saved");
        Ok(path)
    }

    /// Saved file names, newest first.
    pub fn list(&self) -> Result<Vec<String>, SnapshotError> {
        let entries = fs::read_dir(&self.base_dir).map_err(|source| SnapshotError::List {
            path: self.base_dir.clone(),
            source,
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        // timestamped names sort chronologically
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Load a saved session verbatim. Any failure means the caller should
    /// start fresh rather than use a partial state.
    pub fn load(&self, name: &str) -> Result<SessionSnapshot, SnapshotError> {
        let path = self.file_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(source) => return Err(SnapshotError::Read { path, source }),
        };
        let snapshot: SessionSnapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(source) => return Err(SnapshotError::Corrupt { path, source }),
        };
        if snapshot.needs_reset() {
            return Err(SnapshotError::UnsupportedVersion {
                path,
                version: snapshot.schema_version,
            });
        }
        Ok(snapshot)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)
}

impl SnapshotSink for SnapshotStore {
    fn persist(&mut self, snapshot: &SessionSnapshot) -> anyhow::Result<String> {
        let path = self.save(snapshot)?;
        Ok(path.display().to_string())
    }
}
