//! Progress reporting for festival loads.
//!
//! Fetchers report page completion through [`ProgressCallback`] without
//! knowing how (or whether) it is rendered. The CLI draws an `indicatif`
//! bar; the server and tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a running fetch.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of requests the fetch will issue.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` completed requests.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the fetch as complete with a final message.
    fn finish(&self, msg: String);

    /// Marks the fetch as complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
