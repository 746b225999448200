// core/src/store.rs
// Result persistence: one JSON array per (test key, club id), replaced wholesale on save.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::models::Athlete;

/// Record persistence collaborator.
pub trait ResultStore {
    /// Ordered rows, empty when nothing was saved yet.
    fn get_results(&self, test_key: &str, club_id: &str) -> Result<Vec<Value>>;
    /// Replaces the whole array.
    fn save_results(&self, test_key: &str, club_id: &str, rows: &[Value]) -> Result<()>;
    fn delete_results(&self, test_key: &str, club_id: &str) -> Result<()>;
}

/// Roster collaborator.
pub trait RosterSource {
    fn athletes_by_club(&self, club_id: &str) -> Result<Vec<Athlete>>;
}

/// Typed load. Rows that do not fit `R` are skipped with a warning.
pub fn load_rows<R: DeserializeOwned>(
    store: &dyn ResultStore,
    test_key: &str,
    club_id: &str,
) -> Result<Vec<R>> {
    load_rows_with(store, test_key, club_id, |_| {})
}

/// Same as [`load_rows`], with `fix` applied to every stored value before decoding.
pub fn load_rows_with<R, F>(
    store: &dyn ResultStore,
    test_key: &str,
    club_id: &str,
    mut fix: F,
) -> Result<Vec<R>>
where
    R: DeserializeOwned,
    F: FnMut(&mut Value),
{
    let raw = store.get_results(test_key, club_id)?;
    let mut rows = Vec::with_capacity(raw.len());
    for (i, mut value) in raw.into_iter().enumerate() {
        fix(&mut value);
        match serde_json::from_value::<R>(value) {
            Ok(row) => rows.push(row),
            Err(e) => warn!("⚠️ skipping unreadable row {} in {}/{}: {}", i, test_key, club_id, e),
        }
    }
    Ok(rows)
}

pub fn save_rows<R: Serialize>(
    store: &dyn ResultStore,
    test_key: &str,
    club_id: &str,
    rows: &[R],
) -> Result<()> {
    let values = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    store.save_results(test_key, club_id, &values)
}

/// Stored document shape shared by the file and http backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsDocument {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ResultsDocument {
    pub fn new(rows: &[Value]) -> Self {
        ResultsDocument {
            results: rows.to_vec(),
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Anything outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn path_segment(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// `{test}_{club}`, path safe.
pub fn document_id(test_key: &str, club_id: &str) -> String {
    format!("{}_{}", path_segment(test_key), path_segment(club_id))
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

type Key = (String, String);

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    docs: Arc<Mutex<HashMap<Key, Vec<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Key, Vec<Value>>>> {
        self.docs
            .lock()
            .map_err(|_| CoreError::Store("memory store lock poisoned".into()))
    }
}

impl ResultStore for MemoryStore {
    fn get_results(&self, test_key: &str, club_id: &str) -> Result<Vec<Value>> {
        let docs = self.lock()?;
        Ok(docs
            .get(&(test_key.to_string(), club_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn save_results(&self, test_key: &str, club_id: &str, rows: &[Value]) -> Result<()> {
        self.lock()?
            .insert((test_key.to_string(), club_id.to_string()), rows.to_vec());
        Ok(())
    }

    fn delete_results(&self, test_key: &str, club_id: &str) -> Result<()> {
        self.lock()?.remove(&(test_key.to_string(), club_id.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryRoster {
    clubs: HashMap<String, Vec<Athlete>>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_club(mut self, club_id: &str, athletes: Vec<Athlete>) -> Self {
        self.clubs.insert(club_id.to_string(), athletes);
        self
    }
}

impl RosterSource for MemoryRoster {
    fn athletes_by_club(&self, club_id: &str) -> Result<Vec<Athlete>> {
        Ok(self.clubs.get(club_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// JSON files on disk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn path_for(&self, test_key: &str, club_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", document_id(test_key, club_id)))
    }
}

impl ResultStore for FileStore {
    /// Missing file → empty array.
    fn get_results(&self, test_key: &str, club_id: &str) -> Result<Vec<Value>> {
        let path = self.path_for(test_key, club_id);
        if !Path::new(&path).exists() {
            info!("📂 no results at {}, starting empty", path.display());
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        let doc: ResultsDocument = serde_json::from_str(&contents)?;
        info!("📂 loaded {} rows from {}", doc.results.len(), path.display());
        Ok(doc.results)
    }

    fn save_results(&self, test_key: &str, club_id: &str, rows: &[Value]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(test_key, club_id);
        let json = serde_json::to_string_pretty(&ResultsDocument::new(rows))?;
        std::fs::write(&path, json)?;
        info!("✅ saved {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    fn delete_results(&self, test_key: &str, club_id: &str) -> Result<()> {
        let path = self.path_for(test_key, club_id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("🗑️ removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
