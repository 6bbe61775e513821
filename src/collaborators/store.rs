//! Last attempted email persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Remembers the last email a reset was requested for.
pub trait EmailStore: Send + Sync {
    fn save_last_email(&self, email: &str) -> std::io::Result<()>;

    fn last_email(&self) -> std::io::Result<Option<String>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEmail {
    email: String,
}

/// JSON file backed store.
#[derive(Debug, Clone)]
pub struct FileEmailStore {
    path: PathBuf,
}

impl FileEmailStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EmailStore for FileEmailStore {
    fn save_last_email(&self, email: &str) -> std::io::Result<()> {
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(
            writer,
            &StoredEmail {
                email: email.to_string(),
            },
        )?;
        tracing::debug!(path = ?self.path, "Saved last attempted email");
        Ok(())
    }

    fn last_email(&self) -> std::io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        let stored: StoredEmail = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(stored.email))
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryEmailStore {
    email: Mutex<Option<String>>,
}

impl EmailStore for MemoryEmailStore {
    fn save_last_email(&self, email: &str) -> std::io::Result<()> {
        *self.email.lock().expect("store mutex poisoned") = Some(email.to_string());
        Ok(())
    }

    fn last_email(&self) -> std::io::Result<Option<String>> {
        Ok(self.email.lock().expect("store mutex poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists() {
        let path = std::env::temp_dir().join(format!("reset-watch-{}.json", uuid::Uuid::new_v4()));
        let store = FileEmailStore::new(&path);
        assert_eq!(store.last_email().unwrap(), None);

        store.save_last_email("user@domain.tld").unwrap();
        let reopened = FileEmailStore::new(&path);
        assert_eq!(reopened.last_email().unwrap().as_deref(), Some("user@domain.tld"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let path = std::env::temp_dir().join(format!("reset-watch-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "not json").unwrap();
        assert!(FileEmailStore::new(&path).last_email().is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryEmailStore::default();
        store.save_last_email("a@b.c").unwrap();
        store.save_last_email("d@e.f").unwrap();
        assert_eq!(store.last_email().unwrap().as_deref(), Some("d@e.f"));
    }
}
