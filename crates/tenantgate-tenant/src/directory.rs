//! In-memory tenant directory.

use std::collections::HashMap;

use parking_lot::RwLock;
use tenantgate_core::models::tenant::TenantRecord;

/// Cache of tenant records keyed by subdomain identifier.
///
/// Lookups take a shared lock; registrations take the write lock, so a
/// reader sees either no record or the complete one.
#[derive(Debug, Default)]
pub struct TenantDirectory {
    entries: RwLock<HashMap<String, TenantRecord>>,
}

impl TenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match lookup. Callers normalize the identifier.
    pub fn get(&self, identifier: &str) -> Option<TenantRecord> {
        self.entries.read().get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    /// Register a record. Returns `false` and leaves the directory
    /// untouched if the identifier is already present.
    pub fn insert(&self, record: TenantRecord) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(&record.subdomain_identifier) {
            return false;
        }
        entries.insert(record.subdomain_identifier.clone(), record);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
