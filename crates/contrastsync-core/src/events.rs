//! Change notifications for the color pair.
//!
//! Two ways to observe changes:
//!
//! - [`EventHub::subscribe`] registers a callback that runs synchronously,
//!   in subscription order, right after each committed change.
//! - [`EventHub::receiver`] hands out a `tokio::sync::broadcast` receiver for
//!   async consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::ColorState;

/// Name under which change notifications are published
pub const COLORS_CHANGED: &str = "colorsChanged";

/// What produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeCause {
    Foreground,
    Background,
    Swap,
    Init,
    Refresh,
}

/// Payload of a `colorsChanged` notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorsChanged {
    #[serde(flatten)]
    pub state: ColorState,
    pub cause: ChangeCause,
}

type Listener = Arc<dyn Fn(&ColorsChanged) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, Listener)>>,
}

impl Registry {
    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }
}

/// Handle returned by [`EventHub::subscribe`]
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the listener; returns false if it was already gone
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

/// Fan-out point for [`ColorsChanged`] notifications
pub struct EventHub {
    registry: Arc<Registry>,
    tx: broadcast::Sender<ColorsChanged>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            registry: Arc::new(Registry::default()),
            tx,
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ColorsChanged) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .write()
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn receiver(&self) -> broadcast::Receiver<ColorsChanged> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listeners.read().len()
    }

    /// Deliver to every listener, then to broadcast receivers
    pub fn emit(&self, event: ColorsChanged) {
        // Snapshot so listeners may subscribe, unsubscribe or read state re-entrantly
        let listeners: Vec<Listener> = self
            .registry
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(&event);
        }

        // No receivers is fine
        let _ = self.tx.send(event);
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .field("receivers", &self.tx.receiver_count())
            .finish()
    }
}
