//! Pub/sub notifications between the host, the engine and the app shell.
//!
//! - `subscribe()` registers a callback invoked synchronously by `emit()`
//! - `emit()` also queues the event; `poll()` drains the queue once per frame
//!
//! Log arrival is the only notification that may come from another thread
//! (hosts often receive log messages on a logging thread), so the bus is
//! `Send + Sync`. Subscribers must only flip flags; real work happens on the
//! UI thread when the queue is polled or on the next idle tick.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

use super::log_index::Severity;

/// Events kept before the oldest half is dropped.
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type BoxedEvent = Box<dyn Event>;

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// A message was appended to the host log. Fire-and-forget.
#[derive(Clone, Debug, PartialEq)]
pub struct LogMessageEvent {
    pub severity: Severity,
}

/// The engine was switched on or off (hotkey or circuit breaker).
#[derive(Clone, Debug, PartialEq)]
pub struct DecorationsToggledEvent {
    pub enabled: bool,
}

/// Preferences were edited; the owner should rebuild the config snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefsChangedEvent;

#[derive(Default)]
struct Inner {
    subscribers: RwLock<HashMap<TypeId, Vec<Callback>>>,
    queue: Mutex<Vec<BoxedEvent>>,
}

impl Inner {
    fn dispatch(&self, type_id: TypeId, event: BoxedEvent) {
        if let Some(cbs) = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&type_id)
        {
            for cb in cbs {
                // Deref to `dyn Event` so `as_any` sees the concrete type
                cb((*event).as_any());
            }
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict = queue.len() / 2;
            warn!("Event queue full ({} events), dropping oldest {}", queue.len(), evict);
            queue.drain(0..evict);
        }
        queue.push(event);
    }
}

/// Shared event bus. Cloning shares subscribers and queue.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queue_len", &self.queue_len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of type `E`. Callbacks run in
    /// subscription order, on the emitting thread.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event>(&self, event: E) {
        self.inner.dispatch(TypeId::of::<E>(), Box::new(event));
    }

    /// Drain queued events.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.inner.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().map(|q| q.len()).unwrap_or(0)
    }
}

/// Downcast a queued event to `E`.
///
/// Derefs explicitly: calling `as_any` on the `Box` itself would hit the
/// blanket impl for `Box<dyn Event>` and never match.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
