use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const HISTORY_CAPACITY: usize = 50;

/// Identifiers that were already posted, oldest first.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct HistorySet {
    ids: Vec<String>,
}

impl HistorySet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|seen| seen == id)
    }

    /// Appends `id` unless it is already present. An existing id keeps its position.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Drops the oldest entries until at most `cap` remain.
    pub fn truncate_oldest(&mut self, cap: usize) {
        if self.ids.len() > cap {
            let excess = self.ids.len() - cap;
            self.ids.drain(0..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// JSON-file backed post history.
pub struct HistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: HISTORY_CAPACITY,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield an empty set; dedup is best-effort.
    pub fn load(&self) -> HistorySet {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no history file yet");
                return HistorySet::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history unreadable, starting empty");
                return HistorySet::default();
            }
        };

        match serde_json::from_str::<Vec<String>>(&data) {
            Ok(ids) => {
                // Files edited by hand may carry duplicates.
                let mut set = HistorySet::default();
                for id in &ids {
                    set.insert(id);
                }
                set
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history corrupt, starting empty");
                HistorySet::default()
            }
        }
    }

    /// Adds `id`, trims to the most recent entries and rewrites the file.
    pub fn record(&self, id: &str) -> io::Result<HistorySet> {
        let mut history = self.load();
        history.insert(id);
        history.truncate_oldest(self.capacity);
        self.save(&history)?;
        debug!(id, size = history.len(), "history recorded");
        Ok(history)
    }

    /// Writes to a temp file next to the target and renames it into place, so
    /// readers see either the old content or the new one.
    pub fn save(&self, history: &HistorySet) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let data = serde_json::to_string_pretty(history)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(data.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
