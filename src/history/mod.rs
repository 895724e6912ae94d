pub mod backend;

use crate::{error::Result, models::GeneratedImage};
use std::sync::Arc;

pub use backend::{FileStorage, KeyValueStorage, MemoryStorage};

pub const HISTORY_KEY: &str = "popArtHistory";
pub const HISTORY_CAP: usize = 20;

/// Bounded, newest-first record of past generations.
pub trait HistoryStore: Send + Sync {
    /// Reloads from persistent storage. Missing or malformed data loads as empty.
    fn load(&mut self) -> Vec<GeneratedImage>;

    /// Prepends, truncates to the cap, persists.
    fn append(&mut self, image: GeneratedImage) -> Result<()>;

    /// Empties the history and drops its persisted form.
    fn clear(&mut self) -> Result<()>;

    fn entries(&self) -> &[GeneratedImage];
}

/// History kept in a [`KeyValueStorage`] under [`HISTORY_KEY`] as a JSON array.
pub struct LocalHistoryStore {
    storage: Arc<dyn KeyValueStorage>,
    entries: Vec<GeneratedImage>,
}

impl LocalHistoryStore {
    /// Creates the store and loads whatever is already persisted.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        let mut store = Self {
            storage,
            entries: Vec::new(),
        };
        store.load();
        store
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set_item(HISTORY_KEY, &json)
    }
}

impl HistoryStore for LocalHistoryStore {
    fn load(&mut self) -> Vec<GeneratedImage> {
        let raw = match self.storage.get_item(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.entries.clear();
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Could not read saved history, starting empty: {}", e);
                self.entries.clear();
                return Vec::new();
            }
        };

        self.entries = match serde_json::from_str::<Vec<GeneratedImage>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(HISTORY_CAP);
                entries
            }
            Err(e) => {
                log::warn!("Saved history is malformed, starting empty: {}", e);
                Vec::new()
            }
        };
        log::debug!("Loaded {} history entries", self.entries.len());
        self.entries.clone()
    }

    fn append(&mut self, image: GeneratedImage) -> Result<()> {
        self.entries.insert(0, image);
        self.entries.truncate(HISTORY_CAP);
        self.persist()
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.storage.remove_item(HISTORY_KEY)
    }

    fn entries(&self) -> &[GeneratedImage] {
        &self.entries
    }
}
