//! Form Options - Per-instance configuration.
//!
//! Options follow the props-struct pattern: override what you need and fill
//! the rest from `Default`.
//!
//! ```ignore
//! let options = FormOptions {
//!     history_limit: Some(50),
//!     ..FormOptions::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Message reported for required fields that were never touched.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "Field is required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Message stored on an untouched required field.
    pub required_message: String,
    /// Maximum number of undo snapshots. `None` disables undo/redo.
    pub history_limit: Option<usize>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            required_message: DEFAULT_REQUIRED_MESSAGE.to_string(),
            history_limit: None,
        }
    }
}

impl FormOptions {
    /// Parse options from JSON. Missing keys take their default.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Enable undo/redo with the given snapshot limit.
    pub fn with_history(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }
}
