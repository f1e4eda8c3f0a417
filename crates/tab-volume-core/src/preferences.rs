use crate::{CoreResult, Volume};

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

/// Persisted mapping from domain to last-applied volume.
///
/// The core never caches values read from a store beyond the current
/// operation.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored volume for a domain, `None` when the domain was never set.
    async fn get(&self, domain: &str) -> CoreResult<Option<Volume>>;

    /// Store the volume for a domain.
    async fn set(&self, domain: &str, volume: Volume) -> CoreResult<()>;
}

/// In-process store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, Volume>>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of domains with a stored volume.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no domain has a stored volume.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, domain: &str) -> CoreResult<Option<Volume>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(domain).copied())
    }

    async fn set(&self, domain: &str, volume: Volume) -> CoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(domain.to_string(), volume);
        Ok(())
    }
}
