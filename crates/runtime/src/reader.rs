//! Counter read state.
//!
//! [`ReadResult`] holds the last successfully read counter value. Failed
//! reads keep it intact (stale-but-valid); only a newer successful read
//! overwrites it. Overlap ordering between in-flight reads is handled by
//! the worker with sequence numbers; this type only records outcomes.

use serde::{Deserialize, Serialize};

/// Outcome of counter reads, as observed by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    /// Last successfully read value; `None` until the first success.
    pub value: Option<u128>,
    /// True while at least one read is in flight.
    pub fetching: bool,
    /// Message of the last failed read, cleared on a new attempt.
    pub error: Option<String>,
}

impl ReadResult {
    pub fn new() -> Self {
        Self {
            value: None,
            fetching: false,
            error: None,
        }
    }

    /// A new read attempt started.
    pub(crate) fn begin(&mut self) {
        self.fetching = true;
        self.error = None;
    }

    pub(crate) fn apply_success(&mut self, value: u128) {
        self.value = Some(value);
        self.fetching = false;
        self.error = None;
    }

    /// Records a failure; the last good value stays.
    pub(crate) fn apply_failure(&mut self, message: String) {
        self.fetching = false;
        self.error = Some(message);
    }
}

impl Default for ReadResult {
    fn default() -> Self {
        Self::new()
    }
}
