//! Form Module - Form state machine
//!
//! - **Types** - field configuration, field state, validation results
//! - **Fields** - arena of field slots keyed by name
//! - **Validation** - first-failure-wins pipeline
//! - **History** - undo/redo snapshots
//! - **Manager** - the public mutation/query/subscription surface

mod event;
mod fields;
mod history;
mod manager;
mod types;
mod validation;

pub use event::*;
pub use manager::*;
pub use types::*;
