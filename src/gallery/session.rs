//! Persisted visitor session: the age-confirmation flag.
//!
//! The flag is the only piece of gallery state that outlives a page. It is
//! read once when a [`Session`] is created (page mount), written when the
//! visitor confirms, and never cleared. The browser glue uses local storage
//! with the same key and value.

use std::collections::HashMap;
use thiserror::Error;

/// Storage key of the age flag.
pub const AGE_CONFIRMED_KEY: &str = "ageConfirmed";
/// Stored value meaning "confirmed". Anything else reads as unconfirmed.
pub const AGE_CONFIRMED_VALUE: &str = "true";

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected for key '{0}'")]
    WriteRejected(String),
}

/// String key/value storage that survives reloads.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a confirmation from an earlier visit.
    pub fn confirmed() -> Self {
        let mut store = Self::new();
        store
            .entries
            .insert(AGE_CONFIRMED_KEY.to_string(), AGE_CONFIRMED_VALUE.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The visitor session passed to the gallery state.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
    age_confirmed: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Read the persisted flag from `store`.
    pub fn init(store: S) -> Result<Self, StoreError> {
        let age_confirmed =
            store.get(AGE_CONFIRMED_KEY)?.as_deref() == Some(AGE_CONFIRMED_VALUE);
        Ok(Self {
            store,
            age_confirmed,
        })
    }

    pub fn age_confirmed(&self) -> bool {
        self.age_confirmed
    }

    /// Record the confirmation. The in-memory flag only flips once the write
    /// succeeded.
    pub fn confirm_age(&mut self) -> Result<(), StoreError> {
        self.store.set(AGE_CONFIRMED_KEY, AGE_CONFIRMED_VALUE)?;
        self.age_confirmed = true;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
