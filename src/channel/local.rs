//! Local Channel - In-process handler registry
//!
//! One registry per channel instance (no thread-local or global state), so
//! two forms never see each other's events. Handlers are identified by a
//! monotonically increasing id for removal.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{EventChannel, Handler, Unsubscribe};

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

type SharedHandler<P> = Rc<dyn Fn(&P)>;

struct HandlerRegistry<P> {
    topics: HashMap<String, Vec<(usize, SharedHandler<P>)>>,
    next_id: usize,
}

impl<P> HandlerRegistry<P> {
    fn new() -> Self {
        Self {
            topics: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn contains(&self, topic: &str, id: usize) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|handlers| handlers.iter().any(|(handler_id, _)| *handler_id == id))
    }

    fn remove(&mut self, topic: &str, id: usize) {
        if let Some(handlers) = self.topics.get_mut(topic) {
            handlers.retain(|(handler_id, _)| *handler_id != id);
            if handlers.is_empty() {
                self.topics.remove(topic);
            }
        }
    }
}

// =============================================================================
// LOCAL CHANNEL
// =============================================================================

/// Single-threaded [`EventChannel`].
///
/// Emission snapshots the topic's handlers first, so handlers may subscribe
/// or unsubscribe while being called. Handlers added mid-emission are not
/// called for that emission; handlers removed mid-emission are skipped.
pub struct LocalChannel<P> {
    registry: Rc<RefCell<HandlerRegistry<P>>>,
}

impl<P: 'static> LocalChannel<P> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(HandlerRegistry::new())),
        }
    }

    /// Number of live handlers on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry
            .borrow()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Drop every handler on every topic.
    pub fn clear(&self) {
        self.registry.borrow_mut().topics.clear();
    }
}

impl<P: 'static> Default for LocalChannel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for LocalChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("LocalChannel")
            .field("topics", &registry.topics.len())
            .field("next_id", &registry.next_id)
            .finish()
    }
}

impl<P: 'static> EventChannel<P> for LocalChannel<P> {
    fn emit(&self, topic: &str, payload: &P) {
        let handlers: Vec<(usize, SharedHandler<P>)> = match self.registry.borrow().topics.get(topic) {
            Some(handlers) => handlers.clone(),
            None => return,
        };

        tracing::trace!(topic, subscribers = handlers.len(), "emit");

        for (id, handler) in handlers {
            if !self.registry.borrow().contains(topic, id) {
                continue;
            }
            handler(payload);
        }
    }

    fn subscribe(&self, topic: &str, handler: Handler<P>) -> Unsubscribe {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            reg.topics
                .entry(topic.to_string())
                .or_default()
                .push((id, Rc::from(handler)));
            id
        };
        tracing::trace!(topic, id, "subscribe");

        let registry: Weak<RefCell<HandlerRegistry<P>>> = Rc::downgrade(&self.registry);
        let topic = topic.to_string();
        Unsubscribe::new(move || {
            // Channel already dropped: nothing left to remove.
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().remove(&topic, id);
                tracing::trace!(topic = topic.as_str(), id, "unsubscribe");
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
