//! Local key-value persistence
//!
//! The widget keeps two string keys: the serialized transcript and the theme
//! token. [`Persistence`] is the only code that knows those keys.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::Transcript;
use crate::theme::Theme;

pub const TRANSCRIPT_KEY: &str = "saved-chats";
pub const THEME_KEY: &str = "themeColor";

/// String-keyed storage in the style of browser local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten after every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unparseable file starts empty.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring unreadable store {:?}: {}", path, e);
                    BTreeMap::new()
                })
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    // Write beside the file and rename over it so a crash never leaves half a file
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// What the widget restores at startup
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub transcript: Transcript,
    pub theme: Theme,
}

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self) -> Snapshot {
        let theme = Theme::from_token(self.store.get(THEME_KEY).as_deref());

        let transcript = match self.store.get(TRANSCRIPT_KEY).as_deref() {
            Some(raw) => Transcript::from_json(raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable saved transcript: {}", e);
                Transcript::new()
            }),
            None => Transcript::new(),
        };

        Snapshot { transcript, theme }
    }

    pub fn save(&mut self, transcript: &Transcript) -> Result<()> {
        let json = transcript.to_json()?;
        self.store.set(TRANSCRIPT_KEY, &json)?;
        tracing::debug!(messages = transcript.len(), "Saved transcript");
        Ok(())
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Drop the saved transcript; the theme preference survives
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(TRANSCRIPT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Message;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults() {
        let persistence = Persistence::new(MemoryStore::new());
        let snapshot = persistence.load();

        assert!(snapshot.transcript.is_empty());
        assert_eq!(snapshot.theme, Theme::Dark);
    }

    #[test]
    fn test_clear_keeps_theme() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let mut transcript = Transcript::new();
        transcript.push(Message::outgoing("hello"));

        persistence.save(&transcript).unwrap();
        persistence.save_theme(Theme::Light).unwrap();
        persistence.clear().unwrap();

        assert_eq!(persistence.store().get(TRANSCRIPT_KEY), None);
        assert_eq!(persistence.store().get(THEME_KEY).as_deref(), Some("light_mode"));
        assert_eq!(persistence.load().theme, Theme::Light);
    }

    #[test]
    fn test_unreadable_transcript_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(TRANSCRIPT_KEY, "<div class=\"message\">old markup</div>").unwrap();

        let snapshot = Persistence::new(store).load();
        assert!(snapshot.transcript.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("moodchat").join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set(THEME_KEY, "light_mode").unwrap();
        store.set(TRANSCRIPT_KEY, "[]").unwrap();
        store.remove(TRANSCRIPT_KEY).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("light_mode"));
        assert_eq!(reopened.get(TRANSCRIPT_KEY), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn test_file_store_truncated_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{"saved-chats": "[{\"role\":\"user\""#).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(TRANSCRIPT_KEY), None);

        store.set(THEME_KEY, "light_mode").unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("light_mode"));
    }
}
