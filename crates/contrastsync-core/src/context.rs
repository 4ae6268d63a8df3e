//! ColorContext - the shared, explicitly created home of one ColorManager
//!
//! A context wraps the manager that every widget on a page shares, adds the
//! raw input-value cache (last typed text per input control, valid or not),
//! and turns host lifecycle checkpoints into initialization passes:
//!
//! - `on_ready` / `on_page_load`: schedule `init` one frame later; requests
//!   that arrive while one is pending collapse into it
//! - `on_before_swap`: flush persistence immediately
//!
//! A context may be installed process-wide with [`ColorContext::install`] for
//! hosts that cannot thread it through explicitly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::ColorConfig;
use crate::error::ContrastError;
use crate::host::{Host, KeyValueStore};
use crate::manager::ColorManager;

static GLOBAL: OnceLock<Arc<ColorContext>> = OnceLock::new();

pub struct ColorContext {
    manager: ColorManager,
    init_pending: AtomicBool,
    frame_delay: Duration,
}

impl ColorContext {
    /// Build a context and its manager
    pub fn create(host: Host, config: ColorConfig) -> Arc<Self> {
        let frame_delay = config.frame_delay();
        Arc::new(Self {
            manager: ColorManager::new(host, config),
            init_pending: AtomicBool::new(false),
            frame_delay,
        })
    }

    pub fn manager(&self) -> &ColorManager {
        &self.manager
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Process-wide instance
    // ═══════════════════════════════════════════════════════════════════════

    /// Make `context` the process-wide instance
    ///
    /// Only the first install succeeds; later ones hand the context back.
    pub fn install(context: Arc<Self>) -> Result<(), Arc<Self>> {
        GLOBAL.set(context)
    }

    /// The process-wide instance, if one was installed
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Input-value cache
    // ═══════════════════════════════════════════════════════════════════════

    /// Remember the raw text of an input control
    pub fn store_input_value(&self, input_id: &str, value: &str) {
        let Some(storage) = &self.manager.host().storage else {
            return;
        };
        let key = &self.manager.config().input_values_key;

        let mut values = match read_input_values(storage.as_ref(), key) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Failed to store input value");
                return;
            }
        };
        values.insert(input_id.to_string(), Value::String(value.to_string()));

        let serialized = Value::Object(values).to_string();
        if let Err(e) = storage.set(key, &serialized) {
            warn!(error = %e, "Failed to store input value");
        }
    }

    /// Last stored raw text of an input control, or an empty string
    pub fn get_stored_input_value(&self, input_id: &str) -> String {
        let Some(storage) = &self.manager.host().storage else {
            return String::new();
        };
        let key = &self.manager.config().input_values_key;

        match read_input_values(storage.as_ref(), key) {
            Ok(values) => values
                .get(input_id)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to get stored input value");
                String::new()
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle checkpoints
    // ═══════════════════════════════════════════════════════════════════════

    /// The host finished loading the initial page
    pub fn on_ready(self: &Arc<Self>) -> bool {
        self.request_init()
    }

    /// The host completed a page transition
    pub fn on_page_load(self: &Arc<Self>) -> bool {
        self.request_init()
    }

    /// The host is about to swap pages
    pub fn on_before_swap(&self) {
        self.manager.save_to_storage();
        self.manager.flush_url();
    }

    /// Whether an initialization pass is scheduled but has not run yet
    pub fn init_pending(&self) -> bool {
        self.init_pending.load(Ordering::SeqCst)
    }

    /// Schedule one init pass a frame from now
    ///
    /// Returns false when a pass is already pending. Without a tokio runtime
    /// the pass runs inline.
    fn request_init(self: &Arc<Self>) -> bool {
        if self.init_pending.swap(true, Ordering::SeqCst) {
            debug!("Initialization already pending");
            return false;
        }

        let context = Arc::clone(self);
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(context.frame_delay).await;
                    context.run_init();
                });
            }
            Err(_) => context.run_init(),
        }
        true
    }

    fn run_init(&self) {
        let _pending = PendingInit(&self.init_pending);
        self.manager.init();
    }
}

/// Clears the pending flag when the init pass ends, even by unwinding
struct PendingInit<'a>(&'a AtomicBool);

impl Drop for PendingInit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for ColorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorContext")
            .field("manager", &self.manager)
            .field("init_pending", &self.init_pending())
            .finish()
    }
}

/// Parse the input-value blob; absent means empty, corrupt is an error
fn read_input_values(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Result<Map<String, Value>, ContrastError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(values) => Ok(values),
        other => Err(ContrastError::Serialization(format!(
            "expected an object of input values, found {other}"
        ))),
    }
}
