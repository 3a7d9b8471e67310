//! Channel Module - Named-topic publish/subscribe
//!
//! The form manager never owns subscriber lists. It publishes through an
//! injected [`EventChannel`], one per form instance:
//!
//! - **EventChannel** - the two-operation contract (`emit`, `subscribe`)
//! - **Unsubscribe** - capability that removes exactly one registration
//! - **LocalChannel** - in-process, single-threaded implementation
//! - **topics** - topic names shared with render layers
//!
//! # Example
//!
//! ```ignore
//! use form_state::channel::{EventChannel, LocalChannel};
//!
//! let channel = LocalChannel::<String>::new();
//! let sub = channel.subscribe("greeting", Box::new(|msg| println!("{msg}")));
//!
//! channel.emit("greeting", &"hello".to_string());
//! sub.unsubscribe();
//! ```

use std::cell::RefCell;
use std::fmt;

mod local;

pub use local::LocalChannel;

// =============================================================================
// CONTRACT
// =============================================================================

/// Handler registered on a topic.
pub type Handler<P> = Box<dyn Fn(&P)>;

/// Named-topic publish/subscribe capability.
///
/// `emit` delivers synchronously, in subscription order, to the handlers
/// registered on `topic` when the emission starts. A panicking handler
/// unwinds into the caller of `emit`.
pub trait EventChannel<P> {
    fn emit(&self, topic: &str, payload: &P);

    fn subscribe(&self, topic: &str, handler: Handler<P>) -> Unsubscribe;
}

// =============================================================================
// UNSUBSCRIBE
// =============================================================================

/// Removes one subscription when invoked.
///
/// Calling [`unsubscribe`](Self::unsubscribe) more than once has no further
/// effect. Dropping the value keeps the subscription alive.
#[must_use = "dropping an Unsubscribe leaves the handler registered"]
pub struct Unsubscribe {
    cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Unsubscribe {
    pub fn new<F>(cleanup: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            cleanup: RefCell::new(Some(Box::new(cleanup))),
        }
    }

    pub fn unsubscribe(&self) {
        // Release the borrow before running: the cleanup may re-enter.
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    /// True until the first call to `unsubscribe`.
    pub fn is_active(&self) -> bool {
        self.cleanup.borrow().is_some()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// TOPICS
// =============================================================================

/// Topic names. These strings are part of the render-layer contract.
pub mod topics {
    /// Full form data after any value change.
    pub const DATA_CHANGED: &str = "form:data:changed";

    /// Form-level validation failures.
    pub const FORM_VALIDATION: &str = "form:validation";

    /// Per-field validation results.
    pub fn field_validation(name: &str) -> String {
        format!("{name}:validation")
    }

    /// Per-field state after a field operation.
    pub fn field_changed(name: &str) -> String {
        format!("{name}:changed")
    }
}
