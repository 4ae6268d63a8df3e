//! ColorManager - the single source of truth for the color pair
//!
//! ColorManager owns the foreground/background pair and keeps three channels
//! in step with it:
//! - Key-value storage (written synchronously on every change)
//! - URL query parameters `fg`/`bg` (rewritten after a debounce)
//! - CSS custom properties (written synchronously on every change)
//!
//! Every committed change is then announced through the [`EventHub`].
//!
//! # Load precedence
//!
//! 1. URL parameters, each validated independently; an invalid one is ignored
//! 2. The persisted record, only when no URL parameter was present at all
//! 3. Configured defaults
//!
//! # Example
//!
//! ```ignore
//! use contrastsync_core::{ColorConfig, ColorManager, Host, MemoryStore};
//! use std::sync::Arc;
//!
//! let host = Host::headless().with_storage(Arc::new(MemoryStore::new()));
//! let manager = ColorManager::new(host, ColorConfig::default());
//!
//! assert!(manager.set_foreground_color("black"));
//! assert!(manager.set_background_color("#fff"));
//! assert_eq!(manager.wcag_status().ratio, 21.0);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::color::{self, shade_ramp, Color, WcagStatus};
use crate::config::ColorConfig;
use crate::debounce::Debouncer;
use crate::events::{ChangeCause, ColorsChanged, EventHub, Subscription};
use crate::host::{Host, QueryParams};
use crate::types::{ColorPair, ColorState, PersistedColors};

const FOREGROUND_PROPERTY: &str = "--color-foreground";
const BACKGROUND_PROPERTY: &str = "--color-background";

#[derive(Debug, Clone, Copy)]
enum Slot {
    Foreground,
    Background,
}

/// Synchronizes a color pair across storage, URL, styles and listeners
pub struct ColorManager {
    config: ColorConfig,
    host: Host,
    pair: RwLock<ColorPair>,
    /// Held while a change is written to the channels, so they see changes
    /// in the same order memory does
    commit_lock: Mutex<()>,
    ready: AtomicBool,
    url_debounce: Debouncer,
    events: EventHub,
}

impl ColorManager {
    /// Create a manager and load the initial pair
    ///
    /// Loading follows the URL > storage > defaults precedence. Nothing is
    /// published until [`ColorManager::init`] or the first change.
    pub fn new(host: Host, config: ColorConfig) -> Self {
        let manager = Self {
            pair: RwLock::new(config.default_pair()),
            commit_lock: Mutex::new(()),
            ready: AtomicBool::new(false),
            url_debounce: Debouncer::new(config.debounce()),
            events: EventHub::new(config.event_capacity),
            host,
            config,
        };
        manager.load();
        debug!(pair = ?*manager.pair.read(), "ColorManager created");
        manager
    }

    pub fn config(&self) -> &ColorConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether the color parser accepts `input`
    pub fn is_valid_color(&self, input: &str) -> bool {
        color::is_valid_color(input)
    }

    /// Normalize any accepted color to `#rrggbb`
    pub fn to_hex(&self, input: &str) -> Option<Color> {
        color::to_hex(input)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════════

    /// Validate and apply a new foreground color.
    ///
    /// Returns `false` and changes nothing when `input` is not a color.
    pub fn set_foreground_color(&self, input: &str) -> bool {
        self.set_slot(Slot::Foreground, input)
    }

    /// Validate and apply a new background color.
    ///
    /// Returns `false` and changes nothing when `input` is not a color.
    pub fn set_background_color(&self, input: &str) -> bool {
        self.set_slot(Slot::Background, input)
    }

    /// Exchange foreground and background as a single change
    pub fn swap_colors(&self) -> ColorState {
        let commit = self.commit_lock.lock();
        let pair = {
            let mut pair = self.pair.write();
            *pair = pair.swapped();
            *pair
        };
        self.publish(&pair);
        drop(commit);

        self.emit(pair, ChangeCause::Swap);
        pair.state()
    }

    fn set_slot(&self, slot: Slot, input: &str) -> bool {
        let Some(color) = color::to_hex(input) else {
            debug!(?slot, input, "Rejected invalid color");
            return false;
        };

        let commit = self.commit_lock.lock();
        let pair = {
            let mut pair = self.pair.write();
            match slot {
                Slot::Foreground => pair.foreground = color,
                Slot::Background => pair.background = color,
            }
            *pair
        };

        self.publish(&pair);
        drop(commit);

        let cause = match slot {
            Slot::Foreground => ChangeCause::Foreground,
            Slot::Background => ChangeCause::Background,
        };
        self.emit(pair, cause);
        true
    }

    /// Write-through for a changed pair: styles and storage now, URL later.
    ///
    /// Callers hold `commit_lock`. Listeners are notified after it is
    /// released, so they may change colors themselves.
    fn publish(&self, pair: &ColorPair) {
        self.apply_styles(pair);
        self.persist(pair);
        self.schedule_url(*pair);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn foreground_color(&self) -> Color {
        self.pair.read().foreground
    }

    pub fn background_color(&self) -> Color {
        self.pair.read().background
    }

    pub fn pair(&self) -> ColorPair {
        *self.pair.read()
    }

    /// Contrast ratio of the current pair
    ///
    /// Both fields are validated colors, so there is no unparseable case to
    /// fall back from.
    pub fn contrast_ratio(&self) -> f64 {
        self.pair().contrast_ratio()
    }

    pub fn wcag_status(&self) -> WcagStatus {
        WcagStatus::from_ratio(self.contrast_ratio())
    }

    pub fn state(&self) -> ColorState {
        self.pair().state()
    }

    /// Custom properties for the current pair, in publication order
    pub fn css_properties(&self) -> Vec<(String, String)> {
        self.properties_for(&self.pair())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Reload, publish to every channel, mark ready and notify
    pub fn init(&self) {
        let commit = self.commit_lock.lock();
        // A pending rewrite carries newer colors than the location does
        self.flush_pending_url();
        self.load();
        let pair = self.pair();
        self.apply_styles(&pair);

        if let Some(location) = &self.host.location {
            rewrite_location(location.as_ref(), &self.config, &pair);
        }
        drop(commit);

        self.ready.store(true, Ordering::SeqCst);
        info!(
            foreground = %pair.foreground,
            background = %pair.background,
            "ColorManager initialized"
        );
        self.emit(pair, ChangeCause::Init);
    }

    /// Reload from storage only, republish styles and notify
    ///
    /// The URL is left untouched.
    pub fn refresh(&self) {
        let commit = self.commit_lock.lock();
        self.load_from_storage();
        let pair = self.pair();
        self.apply_styles(&pair);
        drop(commit);

        self.emit(pair, ChangeCause::Refresh);
    }

    /// Whether [`ColorManager::init`] has completed at least once
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Persist the current pair immediately
    pub fn save_to_storage(&self) {
        let _commit = self.commit_lock.lock();
        self.persist(&self.pair());
    }

    /// Write a pending debounced URL rewrite now
    ///
    /// Returns whether a rewrite was pending.
    pub fn flush_url(&self) -> bool {
        let _commit = self.commit_lock.lock();
        self.flush_pending_url()
    }

    fn flush_pending_url(&self) -> bool {
        if !self.url_debounce.cancel() {
            return false;
        }
        if let Some(location) = &self.host.location {
            rewrite_location(location.as_ref(), &self.config, &self.pair());
        }
        true
    }

    /// Whether a debounced URL rewrite is waiting
    pub fn url_update_pending(&self) -> bool {
        self.url_debounce.is_pending()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Notifications
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a listener called synchronously after every change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ColorsChanged) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Receiver for async consumers of change notifications
    pub fn events(&self) -> broadcast::Receiver<ColorsChanged> {
        self.events.receiver()
    }

    fn emit(&self, pair: ColorPair, cause: ChangeCause) {
        self.events.emit(ColorsChanged {
            state: pair.state(),
            cause,
        });
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Channels
    // ═══════════════════════════════════════════════════════════════════════

    fn load(&self) {
        if !self.load_from_url() {
            self.load_from_storage();
        }
    }

    /// Apply `fg`/`bg` parameters; returns whether either was present
    fn load_from_url(&self) -> bool {
        let Some(location) = &self.host.location else {
            return false;
        };

        let fg = read_param(location.as_ref(), &self.config.foreground_param);
        let bg = read_param(location.as_ref(), &self.config.background_param);
        if fg.is_none() && bg.is_none() {
            return false;
        }

        let mut pair = self.pair.write();
        if let Some(raw) = fg {
            match Color::from_param(&raw) {
                Ok(color) => pair.foreground = color,
                Err(e) => debug!(error = %e, "Ignoring invalid foreground URL parameter"),
            }
        }
        if let Some(raw) = bg {
            match Color::from_param(&raw) {
                Ok(color) => pair.background = color,
                Err(e) => debug!(error = %e, "Ignoring invalid background URL parameter"),
            }
        }
        true
    }

    fn load_from_storage(&self) {
        let Some(storage) = &self.host.storage else {
            return;
        };

        let raw = match storage.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to load colors from storage");
                return;
            }
        };

        let record: PersistedColors = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Ignoring corrupt stored colors");
                return;
            }
        };

        let mut pair = self.pair.write();
        if let Some(color) = record.foreground_color.as_deref().and_then(color::to_hex) {
            pair.foreground = color;
        }
        if let Some(color) = record.background_color.as_deref().and_then(color::to_hex) {
            pair.background = color;
        }
    }

    fn persist(&self, pair: &ColorPair) {
        let Some(storage) = &self.host.storage else {
            return;
        };

        let serialized = match serde_json::to_string(&PersistedColors::from(pair)) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(error = %e, "Failed to serialize colors");
                return;
            }
        };

        if let Err(e) = storage.set(&self.config.storage_key, &serialized) {
            warn!(error = %e, "Failed to save colors to storage");
        }
    }

    fn schedule_url(&self, pair: ColorPair) {
        let Some(location) = self.host.location.clone() else {
            return;
        };
        let fg_param = self.config.foreground_param.clone();
        let bg_param = self.config.background_param.clone();

        self.url_debounce.schedule(move || {
            write_params(location.as_ref(), &fg_param, &bg_param, &pair);
        });
    }

    fn apply_styles(&self, pair: &ColorPair) {
        let Some(style) = &self.host.style else {
            return;
        };
        for (name, value) in self.properties_for(pair) {
            style.set_property(&name, &value);
        }
    }

    fn properties_for(&self, pair: &ColorPair) -> Vec<(String, String)> {
        let mut properties = vec![
            (format!("{FOREGROUND_PROPERTY}-base"), pair.foreground.to_hex()),
            (format!("{BACKGROUND_PROPERTY}-base"), pair.background.to_hex()),
        ];

        if self.config.shade_ramps {
            for (prefix, color) in [
                (FOREGROUND_PROPERTY, &pair.foreground),
                (BACKGROUND_PROPERTY, &pair.background),
            ] {
                for (i, shade) in shade_ramp(color).iter().enumerate() {
                    properties.push((format!("{prefix}-{}", (i + 1) * 10), shade.to_hex()));
                }
            }
        }

        properties
    }
}

impl std::fmt::Debug for ColorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorManager")
            .field("pair", &self.pair())
            .field("ready", &self.is_ready())
            .field("host", &self.host)
            .field("events", &self.events)
            .finish()
    }
}

/// Non-empty value of a URL parameter; read failures count as absent
fn read_param(location: &dyn QueryParams, name: &str) -> Option<String> {
    match location.get(name) {
        Ok(value) => value.filter(|v| !v.trim().is_empty()),
        Err(e) => {
            warn!(error = %e, param = name, "Failed to read URL parameter");
            None
        }
    }
}

fn rewrite_location(location: &dyn QueryParams, config: &ColorConfig, pair: &ColorPair) {
    write_params(
        location,
        &config.foreground_param,
        &config.background_param,
        pair,
    );
}

fn write_params(location: &dyn QueryParams, fg_param: &str, bg_param: &str, pair: &ColorPair) {
    let params = [
        (fg_param, pair.foreground.without_hash()),
        (bg_param, pair.background.without_hash()),
    ];
    match location.replace(&params) {
        Ok(()) => debug!(fg = %params[0].1, bg = %params[1].1, "Updated URL parameters"),
        Err(e) if e.is_benign() => debug!(error = %e, "URL update skipped"),
        Err(e) => warn!(error = %e, "Failed to update URL parameters"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::host::{KeyValueStore, MemoryLocation, MemoryStore, StyleMap};

    struct Fixture {
        store: Arc<MemoryStore>,
        location: Arc<MemoryLocation>,
        style: Arc<StyleMap>,
    }

    impl Fixture {
        fn new(query: &str) -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                location: Arc::new(MemoryLocation::with_query(query)),
                style: Arc::new(StyleMap::new()),
            }
        }

        fn host(&self) -> Host {
            Host::headless()
                .with_storage(self.store.clone())
                .with_location(self.location.clone())
                .with_style(self.style.clone())
        }

        fn manager(&self) -> ColorManager {
            ColorManager::new(self.host(), ColorConfig::default())
        }
    }

    #[test]
    fn test_defaults_without_any_source() {
        let manager = ColorManager::new(Host::headless(), ColorConfig::default());
        assert_eq!(manager.foreground_color().to_hex(), "#4646ff");
        assert_eq!(manager.background_color().to_hex(), "#e6e64a");
        assert!(!manager.is_ready());
    }

    #[test]
    fn test_setter_normalizes() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();

        assert!(manager.set_foreground_color("RED"));
        assert_eq!(manager.foreground_color().to_hex(), "#ff0000");
        assert!(manager.set_background_color("rgb(255, 255, 255)"));
        assert_eq!(manager.background_color().to_hex(), "#ffffff");
    }

    #[test]
    fn test_invalid_input_changes_nothing() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();
        let before = manager.pair();

        assert!(!manager.set_foreground_color("not-a-color"));
        assert!(!manager.set_background_color(""));

        assert_eq!(manager.pair(), before);
        assert!(fixture.store.is_empty());
        assert!(fixture.style.snapshot().is_empty());
    }

    #[test]
    fn test_setter_writes_styles_and_storage_synchronously() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();

        assert!(manager.set_foreground_color("#000000"));

        assert_eq!(
            fixture.style.get("--color-foreground-base").as_deref(),
            Some("#000000")
        );
        assert_eq!(
            fixture.style.get("--color-background-base").as_deref(),
            Some("#e6e64a")
        );
        assert!(fixture.style.get("--color-foreground-50").is_some());

        let stored = fixture.store.get("color-contrast-checker").unwrap().unwrap();
        assert_eq!(
            stored,
            r##"{"foregroundColor":"#000000","backgroundColor":"#e6e64a"}"##
        );
    }

    #[test]
    fn test_url_written_inline_without_runtime() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();

        manager.set_foreground_color("#000000");
        assert_eq!(fixture.location.query(), "fg=000000&bg=e6e64a");
    }

    #[test]
    fn test_css_properties_order_and_ramps() {
        let manager = ColorManager::new(Host::headless(), ColorConfig::default());
        let names: Vec<String> = manager
            .css_properties()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "--color-foreground-base");
        assert_eq!(names[1], "--color-background-base");
        assert_eq!(names[2], "--color-foreground-10");
        assert_eq!(names[6], "--color-foreground-50");
        assert_eq!(names[7], "--color-background-10");
        assert_eq!(names[11], "--color-background-50");
    }

    #[test]
    fn test_css_properties_without_ramps() {
        let config = ColorConfig {
            shade_ramps: false,
            ..ColorConfig::default()
        };
        let manager = ColorManager::new(Host::headless(), config);
        assert_eq!(manager.css_properties().len(), 2);
    }

    #[test]
    fn test_swap_colors() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();
        let state = manager.swap_colors();

        assert_eq!(state.foreground_color.to_hex(), "#e6e64a");
        assert_eq!(state.background_color.to_hex(), "#4646ff");
        assert_eq!(manager.pair(), state.pair());
    }

    #[test]
    fn test_stored_invalid_field_is_ignored() {
        let fixture = Fixture::new("");
        fixture
            .store
            .set(
                "color-contrast-checker",
                r##"{"foregroundColor":"#000000","backgroundColor":"bogus"}"##,
            )
            .unwrap();

        let manager = fixture.manager();
        assert_eq!(manager.foreground_color().to_hex(), "#000000");
        assert_eq!(manager.background_color().to_hex(), "#e6e64a");
    }

    #[test]
    fn test_present_but_invalid_url_param_blocks_storage_fallback() {
        let fixture = Fixture::new("fg=zzzzzz");
        fixture
            .store
            .set(
                "color-contrast-checker",
                r##"{"foregroundColor":"#000000","backgroundColor":"#ffffff"}"##,
            )
            .unwrap();

        let manager = fixture.manager();
        assert_eq!(manager.foreground_color().to_hex(), "#4646ff");
        assert_eq!(manager.background_color().to_hex(), "#e6e64a");
    }

    #[test]
    fn test_init_marks_ready_and_publishes() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();
        let mut rx = manager.events();

        manager.init();

        assert!(manager.is_ready());
        assert_eq!(fixture.location.query(), "fg=4646ff&bg=e6e64a");
        assert_eq!(
            fixture.style.get("--color-foreground-base").as_deref(),
            Some("#4646ff")
        );
        assert_eq!(rx.try_recv().unwrap().cause, ChangeCause::Init);
    }

    #[test]
    fn test_refresh_leaves_url_alone() {
        let fixture = Fixture::new("");
        let manager = fixture.manager();
        fixture
            .store
            .set(
                "color-contrast-checker",
                r##"{"foregroundColor":"#111111","backgroundColor":"#eeeeee"}"##,
            )
            .unwrap();

        manager.refresh();

        assert_eq!(manager.foreground_color().to_hex(), "#111111");
        assert_eq!(fixture.location.write_count(), 0);
        assert!(!manager.is_ready());
    }
}
