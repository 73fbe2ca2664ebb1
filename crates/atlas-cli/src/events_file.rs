//! # Events File
//!
//! The CLI works on a JSON array of event records. The file is read into an
//! in-memory store, the command runs against it, and the store is written
//! back sorted by event id.

use std::path::Path;

use anyhow::{Context, Result};

use atlas_engine::InMemoryEventStore;
use atlas_state::Event;

/// Load every event in `path` into a fresh store.
pub fn load_events(path: &Path) -> Result<InMemoryEventStore> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read events file {}", path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid events file {}", path.display()))?;

    let store = InMemoryEventStore::new();
    for event in events {
        store
            .insert(event)
            .with_context(|| format!("duplicate event in {}", path.display()))?;
    }
    tracing::debug!(path = %path.display(), count = store.len(), "loaded events");
    Ok(store)
}

/// Write every event in `store` to `path`.
pub fn save_events(path: &Path, store: &InMemoryEventStore) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write events file {}", path.display()))?;
    tracing::debug!(path = %path.display(), count = store.len(), "saved events");
    Ok(())
}
