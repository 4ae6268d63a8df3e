//! Host capabilities injected into the synchronizer.
//!
//! The synchronizer never probes its environment. Whatever the host can offer
//! (key-value storage, a rewritable location, a style target) is handed in as
//! a [`Host`]; a missing capability simply turns the matching channel off.
//!
//! ```text
//! ColorManager ──get/set──────────▶ KeyValueStore  (MemoryStore, RedbStore)
//!              ──get/replace──────▶ QueryParams    (MemoryLocation)
//!              ──set_property─────▶ StyleSink      (StyleMap)
//! ```

use std::sync::Arc;

use crate::error::ContrastResult;

mod memory;

pub use memory::{MemoryLocation, MemoryStore, NavigationFailure, StoreFailure, StyleMap};

/// String key-value storage that survives a reload
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> ContrastResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> ContrastResult<()>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> ContrastResult<()>;
}

/// Query parameters of the current location
pub trait QueryParams: Send + Sync {
    /// First value of `name`, if present
    fn get(&self, name: &str) -> ContrastResult<Option<String>>;

    /// Set the given parameters in place without adding a history entry
    ///
    /// Parameters not named in `params` are preserved.
    fn replace(&self, params: &[(&str, String)]) -> ContrastResult<()>;
}

/// Target for CSS custom properties
pub trait StyleSink: Send + Sync {
    fn set_property(&self, name: &str, value: &str);
}

/// The capabilities available to a synchronizer
#[derive(Clone, Default)]
pub struct Host {
    pub storage: Option<Arc<dyn KeyValueStore>>,
    pub location: Option<Arc<dyn QueryParams>>,
    pub style: Option<Arc<dyn StyleSink>>,
}

impl Host {
    /// A host with no capabilities at all
    pub fn headless() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_location(mut self, location: Arc<dyn QueryParams>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_style(mut self, style: Arc<dyn StyleSink>) -> Self {
        self.style = Some(style);
        self
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("storage", &self.storage.is_some())
            .field("location", &self.location.is_some())
            .field("style", &self.style.is_some())
            .finish()
    }
}
