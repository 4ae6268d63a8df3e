//! ContrastSync Core Library
//!
//! Foreground/background color state with WCAG contrast tracking.
//!
//! ## Overview
//!
//! ContrastSync keeps one color pair as the single source of truth for a page
//! of color widgets. The pair survives reloads through key-value storage and
//! URL query parameters, is republished as CSS custom properties, and every
//! change is announced to subscribers along with its contrast ratio and WCAG
//! pass/fail flags.
//!
//! ## Core Principles
//!
//! - **Always valid**: invalid input is rejected before it touches state
//! - **Never fatal**: storage and navigation failures are logged and absorbed
//! - **Injected host**: storage, location and styles are capabilities handed in
//!   at construction, so the same code runs in tests, a CLI or a page host
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use contrastsync_core::{ColorConfig, ColorContext, Host, MemoryLocation, MemoryStore, StyleMap};
//!
//! let host = Host::headless()
//!     .with_storage(Arc::new(MemoryStore::new()))
//!     .with_location(Arc::new(MemoryLocation::with_query("fg=000000&bg=ffffff")))
//!     .with_style(Arc::new(StyleMap::new()));
//!
//! let context = ColorContext::create(host, ColorConfig::default());
//! let _sub = context.manager().subscribe(|event| {
//!     println!("ratio is now {:.1}", event.state.contrast_ratio);
//! });
//! context.on_ready();
//!
//! assert!(context.manager().set_background_color("gold"));
//! ```

pub mod color;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod events;
pub mod host;
pub mod manager;
pub mod storage;
pub mod types;

// Re-exports
pub use color::{contrast_ratio, is_valid_color, to_hex, Color, WcagStatus};
pub use config::{ColorConfig, COLORS_STORAGE_KEY, INPUT_VALUES_STORAGE_KEY};
pub use context::ColorContext;
pub use debounce::Debouncer;
pub use error::{ContrastError, ContrastResult};
pub use events::{ChangeCause, ColorsChanged, EventHub, Subscription, COLORS_CHANGED};
pub use host::{
    Host, KeyValueStore, MemoryLocation, MemoryStore, NavigationFailure, QueryParams,
    StoreFailure, StyleMap, StyleSink,
};
pub use manager::ColorManager;
pub use storage::RedbStore;
pub use types::{ColorPair, ColorState, PersistedColors};
