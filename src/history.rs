//! Durable, ordered record of question/answer pairs.
//!
//! The whole log lives in one JSON file that is rewritten on every mutation.
//! Reads never fail the caller: a missing, unreadable or corrupt file yields an
//! empty log. Writes always surface their errors.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    question: String,
    answer: String,
}

impl HistoryEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Entries in insertion order, which is also display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How `load_with_status` arrived at the log it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    Missing,
    Unreadable,
    Corrupt,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to serialize chat history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to create history directory '{}': {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write chat history to '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to replace chat history at '{}': {source}", path.display())]
    Replace { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> HistoryLog {
        self.load_with_status().0
    }

    pub fn load_with_status(&self) -> (HistoryLog, LoadStatus) {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no chat history yet, starting empty");
                return (HistoryLog::new(), LoadStatus::Missing);
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "chat history is unreadable, starting empty"
                );
                return (HistoryLog::new(), LoadStatus::Unreadable);
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => {
                debug!(
                    path = %self.path.display(),
                    entry_count = entries.len(),
                    "loaded chat history"
                );
                (HistoryLog { entries }, LoadStatus::Loaded)
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "chat history is corrupt, starting empty"
                );
                (HistoryLog::new(), LoadStatus::Corrupt)
            }
        }
    }

    /// Appends `entry` and rewrites the whole file. On failure the log is left
    /// as it was before the call.
    pub fn append(&self, log: &mut HistoryLog, entry: HistoryEntry) -> Result<(), HistoryError> {
        log.entries.push(entry);
        if let Err(err) = self.save(&log.entries) {
            log.entries.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Overwrites the file with an empty log. There is no backup.
    pub fn clear(&self, log: &mut HistoryLog) -> Result<(), HistoryError> {
        self.save(&[])?;
        log.entries.clear();
        Ok(())
    }

    pub fn list<'a>(&self, log: &'a HistoryLog) -> &'a [HistoryEntry] {
        log.list()
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let content = serde_json::to_string_pretty(entries)?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| HistoryError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.temp_path();
        write_synced(&temp_path, content.as_bytes()).map_err(|source| HistoryError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            HistoryError::Replace {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(
            path = %self.path.display(),
            entry_count = entries.len(),
            "saved chat history"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "chat_history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Writes and flushes to disk so a later rename never exposes an empty file.
fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{HistoryEntry, HistoryError, HistoryLog, HistoryStore, LoadStatus, write_synced};

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("chat_history.json"))
    }

    #[test]
    fn load_missing_file_yields_empty_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let (log, status) = store.load_with_status();
        assert!(log.is_empty());
        assert_eq!(status, LoadStatus::Missing);
        assert!(store.load().is_empty());
        assert!(!store.path().exists(), "load must not create the file");
    }

    #[test]
    fn load_corrupt_file_yields_empty_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").expect("write corrupt file");

        let (log, status) = store.load_with_status();
        assert!(log.is_empty());
        assert_eq!(status, LoadStatus::Corrupt);
    }

    #[test]
    fn load_wrong_shape_is_treated_as_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), r#"[{"question":"only"}]"#).expect("write file");

        assert_eq!(store.load_with_status().1, LoadStatus::Corrupt);
    }

    #[test]
    fn load_directory_in_place_of_file_is_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::create_dir(store.path()).expect("create dir");

        let (log, status) = store.load_with_status();
        assert!(log.is_empty());
        assert_eq!(status, LoadStatus::Unreadable);
    }

    #[test]
    fn append_persists_entry_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut log = store.load();

        store
            .append(&mut log, HistoryEntry::new("Q1", "A1"))
            .expect("append should succeed");

        assert_eq!(log.len(), 1);
        assert_eq!(store.load(), log);
        assert!(!dir.path().join("chat_history.json.tmp").exists());
    }

    #[test]
    fn on_disk_format_is_array_of_question_answer_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut log = HistoryLog::new();
        store
            .append(&mut log, HistoryEntry::new("Q1", "A1"))
            .expect("append should succeed");

        let raw = fs::read_to_string(store.path()).expect("read file");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(
            value,
            serde_json::json!([{ "question": "Q1", "answer": "A1" }])
        );
    }

    #[test]
    fn duplicate_questions_are_kept_as_separate_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut log = HistoryLog::new();
        store
            .append(&mut log, HistoryEntry::new("same", "first"))
            .expect("append");
        store
            .append(&mut log, HistoryEntry::new("same", "second"))
            .expect("append");

        let reloaded = store.load();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.list()[1].answer(), "second");
    }

    #[test]
    fn append_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HistoryStore::new(dir.path().join("nested/deeper/history.json"));
        let mut log = HistoryLog::new();

        store
            .append(&mut log, HistoryEntry::new("Q", "A"))
            .expect("append should create parents");
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn failed_append_keeps_in_memory_log_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "block").expect("write blocker");
        let store = HistoryStore::new(blocker.join("history.json"));
        let mut log = HistoryLog::new();

        let err = store
            .append(&mut log, HistoryEntry::new("Q", "A"))
            .expect_err("append should fail");
        assert!(matches!(err, HistoryError::CreateDir { .. }), "got {err:?}");
        assert!(log.is_empty());
    }

    #[test]
    fn write_synced_writes_full_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.json");

        write_synced(&path, b"[]").expect("write should succeed");
        write_synced(&path, b"[1]").expect("overwrite should succeed");

        assert_eq!(fs::read(&path).expect("read"), b"[1]");
    }

    #[test]
    fn failed_temp_write_keeps_previous_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut log = HistoryLog::new();
        store
            .append(&mut log, HistoryEntry::new("Q1", "A1"))
            .expect("append");
        fs::create_dir(dir.path().join("chat_history.json.tmp")).expect("block temp path");

        let err = store
            .append(&mut log, HistoryEntry::new("Q2", "A2"))
            .expect_err("append should fail");

        assert!(matches!(err, HistoryError::Write { .. }), "got {err:?}");
        assert_eq!(log.list(), &[HistoryEntry::new("Q1", "A1")]);
        assert_eq!(store.load(), log);
    }

    #[test]
    fn clear_overwrites_persisted_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut log = HistoryLog::new();
        store
            .append(&mut log, HistoryEntry::new("Q", "A"))
            .expect("append");

        store.clear(&mut log).expect("clear should succeed");

        assert!(log.is_empty());
        let (reloaded, status) = store.load_with_status();
        assert!(reloaded.is_empty());
        assert_eq!(status, LoadStatus::Loaded);
    }

    #[test]
    fn list_returns_entries_in_insertion_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut log = HistoryLog::new();
        store
            .append(&mut log, HistoryEntry::new("Q1", "A1"))
            .expect("append");
        store
            .append(&mut log, HistoryEntry::new("Q2", "A2"))
            .expect("append");

        let listed = store.list(&log);
        assert_eq!(
            listed,
            &[HistoryEntry::new("Q1", "A1"), HistoryEntry::new("Q2", "A2")]
        );
    }
}
