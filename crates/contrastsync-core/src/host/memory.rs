//! In-process host capabilities.
//!
//! Used by tests and by hosts that keep state only for the life of the
//! process. Store and location can be told to fail so callers can exercise
//! the degraded paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use url::Url;

use super::{KeyValueStore, QueryParams, StyleSink};
use crate::error::{ContrastError, ContrastResult};

/// Simulated storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    /// Reads succeed, writes are refused
    QuotaExceeded,
    /// Every access is refused
    Disabled,
}

/// Key-value store held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    failure: RwLock<Option<StoreFailure>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start failing (or stop, with `None`)
    pub fn fail_with(&self, failure: Option<StoreFailure>) {
        *self.failure.write() = failure;
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ContrastResult<Option<String>> {
        if *self.failure.read() == Some(StoreFailure::Disabled) {
            return Err(ContrastError::StorageUnavailable("storage disabled".into()));
        }
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ContrastResult<()> {
        match *self.failure.read() {
            Some(StoreFailure::Disabled) => {
                return Err(ContrastError::StorageUnavailable("storage disabled".into()))
            }
            Some(StoreFailure::QuotaExceeded) => {
                return Err(ContrastError::QuotaExceeded(key.to_string()))
            }
            None => {}
        }
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ContrastResult<()> {
        if *self.failure.read() == Some(StoreFailure::Disabled) {
            return Err(ContrastError::StorageUnavailable("storage disabled".into()));
        }
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Simulated location rewrite failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationFailure {
    /// The host refuses rewrites outright
    Denied,
    /// The host is rate limiting rewrites
    Throttled,
}

/// A location whose query string can be read and rewritten in place
#[derive(Debug)]
pub struct MemoryLocation {
    url: RwLock<Url>,
    writes: AtomicUsize,
    failure: RwLock<Option<NavigationFailure>>,
}

impl MemoryLocation {
    pub const BASE: &'static str = "http://localhost/";

    /// A location with an empty query string
    pub fn new() -> Self {
        Self::from_url(Self::base())
    }

    /// A location with the given query string (with or without leading `?`)
    pub fn with_query(query: &str) -> Self {
        let mut url = Self::base();
        let query = query.strip_prefix('?').unwrap_or(query);
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Self {
        Self {
            url: RwLock::new(url),
            writes: AtomicUsize::new(0),
            failure: RwLock::new(None),
        }
    }

    fn base() -> Url {
        Url::parse(Self::BASE).expect("base URL is valid")
    }

    pub fn url(&self) -> Url {
        self.url.read().clone()
    }

    /// Current query string without the leading `?`
    pub fn query(&self) -> String {
        self.url.read().query().unwrap_or_default().to_string()
    }

    /// Number of successful rewrites so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, failure: Option<NavigationFailure>) {
        *self.failure.write() = failure;
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParams for MemoryLocation {
    fn get(&self, name: &str) -> ContrastResult<Option<String>> {
        let url = self.url.read();
        Ok(url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned()))
    }

    fn replace(&self, params: &[(&str, String)]) -> ContrastResult<()> {
        match *self.failure.read() {
            Some(NavigationFailure::Denied) => {
                return Err(ContrastError::Navigation("location rewrite denied".into()))
            }
            Some(NavigationFailure::Throttled) => return Err(ContrastError::NavigationThrottled),
            None => {}
        }

        let mut url = self.url.write();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !params.iter().any(|(name, _)| key == name))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter())
            .extend_pairs(params.iter());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records custom properties the way a root element's inline style would
#[derive(Debug, Default)]
pub struct StyleMap {
    properties: RwLock<BTreeMap<String, String>>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.properties.read().get(name).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.properties.read().clone()
    }
}

impl StyleSink for StyleMap {
    fn set_property(&self, name: &str, value: &str) {
        self.properties
            .write()
            .insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_quota_blocks_writes_only() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.fail_with(Some(StoreFailure::QuotaExceeded));

        assert!(matches!(
            store.set("k", "w"),
            Err(ContrastError::QuotaExceeded(_))
        ));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_store_disabled_blocks_everything() {
        let store = MemoryStore::new();
        store.fail_with(Some(StoreFailure::Disabled));
        assert!(store.get("k").is_err());
        assert!(store.set("k", "v").is_err());
        assert!(store.remove("k").is_err());

        store.fail_with(None);
        assert!(store.set("k", "v").is_ok());
    }

    #[test]
    fn test_location_reads_params() {
        let location = MemoryLocation::with_query("?fg=000000&bg=ffffff");
        assert_eq!(location.get("fg").unwrap().as_deref(), Some("000000"));
        assert_eq!(location.get("bg").unwrap().as_deref(), Some("ffffff"));
        assert!(location.get("zoom").unwrap().is_none());
    }

    #[test]
    fn test_location_replace_preserves_other_params() {
        let location = MemoryLocation::with_query("lang=en&fg=111111");
        location
            .replace(&[("fg", "000000".to_string()), ("bg", "ffffff".to_string())])
            .unwrap();

        assert_eq!(location.query(), "lang=en&fg=000000&bg=ffffff");
        assert_eq!(location.write_count(), 1);
    }

    #[test]
    fn test_location_failures() {
        let location = MemoryLocation::new();
        location.fail_with(Some(NavigationFailure::Throttled));
        let err = location.replace(&[("fg", "000000".into())]).unwrap_err();
        assert!(err.is_benign());

        location.fail_with(Some(NavigationFailure::Denied));
        let err = location.replace(&[("fg", "000000".into())]).unwrap_err();
        assert!(!err.is_benign());
        assert_eq!(location.write_count(), 0);
        assert_eq!(location.query(), "");
    }

    #[test]
    fn test_style_map_records_properties() {
        let style = StyleMap::new();
        style.set_property("--color-foreground-base", "#000000");
        style.set_property("--color-foreground-base", "#111111");
        assert_eq!(
            style.get("--color-foreground-base").as_deref(),
            Some("#111111")
        );
        assert_eq!(style.snapshot().len(), 1);
    }
}
