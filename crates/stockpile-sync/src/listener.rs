//! # Listener and Callback Contract
//!
//! How `fetch_all` and `save` report back to their caller.
//!
//! ```text
//! fetch_all ──► LoadListener<Vec<Product>>
//!                 on_loaded(snapshot)      once or twice
//!                 on_failure(LoadFailure)  optional, default no-op
//!
//! save      ──► SaveCallback<Product>      one-shot, consumed on use
//!                 on_success(persisted)
//!                 on_failure(SaveFailure)
//! ```

use thiserror::Error;

use crate::error::SyncError;

// =============================================================================
// Failures
// =============================================================================

/// Why a `fetch_all` could not deliver fresh data.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// The remote refresh failed. Only reported under `RefreshErrorPolicy::Report`.
    #[error("refresh failed: {0}")]
    Refresh(SyncError),

    /// The local store could not be read or written. Ends the flow.
    #[error("local store failure: {0}")]
    LocalStore(SyncError),

    /// The repository was shut down.
    #[error("worker pool closed")]
    WorkerPoolClosed,
}

/// Why a `save` did not produce a persisted product.
#[derive(Debug, Error)]
pub enum SaveFailure {
    /// No response was received from the remote.
    #[error("communication failure: {0}")]
    Communication(SyncError),

    /// The remote answered with a non-success status.
    #[error("unsuccessful response")]
    UnsuccessfulResponse {
        /// Status code returned by the remote.
        status: u16,
    },

    /// The remote confirmed the save without returning the product.
    #[error("empty response body")]
    EmptyBody,

    /// The confirmed product could not be persisted or read back.
    #[error("local store failure: {0}")]
    LocalStore(SyncError),

    /// The repository was shut down.
    #[error("worker pool closed")]
    WorkerPoolClosed,
}

impl SaveFailure {
    /// Human-readable reason, the same text as `Display`.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// Load Listener
// =============================================================================

/// Receives snapshots of the local collection.
///
/// Any `Fn(T)` closure is a listener that ignores failures.
pub trait LoadListener<T>: Send + Sync + 'static {
    /// A snapshot of local store contents.
    fn on_loaded(&self, value: T);

    /// A failure during the flow.
    fn on_failure(&self, failure: LoadFailure) {
        let _ = failure;
    }
}

impl<T, F> LoadListener<T> for F
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn on_loaded(&self, value: T) {
        self(value)
    }
}

// =============================================================================
// Save Callback
// =============================================================================

/// One-shot outcome of a `save`.
pub trait SaveCallback<T>: Send + 'static {
    /// The remote accepted the product and the store's copy is `value`.
    fn on_success(self, value: T);

    /// The save failed.
    fn on_failure(self, failure: SaveFailure);
}

/// [`SaveCallback`] built from two closures. See [`callback`].
pub struct FnCallback<S, F> {
    on_success: S,
    on_failure: F,
}

impl<T, S, F> SaveCallback<T> for FnCallback<S, F>
where
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(SaveFailure) + Send + 'static,
{
    fn on_success(self, value: T) {
        (self.on_success)(value)
    }

    fn on_failure(self, failure: SaveFailure) {
        (self.on_failure)(failure)
    }
}

/// Builds a [`SaveCallback`] from a success and a failure closure.
///
/// ```rust,ignore
/// repository.save(
///     Product::new("Pen", 150, 10),
///     callback(
///         |saved| println!("saved #{:?}", saved.id),
///         |failure| eprintln!("{failure}"),
///     ),
/// );
/// ```
pub fn callback<S, F>(on_success: S, on_failure: F) -> FnCallback<S, F> {
    FnCallback {
        on_success,
        on_failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_failure_reasons() {
        assert_eq!(
            SaveFailure::UnsuccessfulResponse { status: 400 }.reason(),
            "unsuccessful response"
        );
        assert_eq!(
            SaveFailure::Communication(SyncError::ConnectionFailed("refused".into())).reason(),
            "communication failure: Connection failed: refused"
        );
        assert_eq!(
            SaveFailure::LocalStore(SyncError::DatabaseError("locked".into())).to_string(),
            "local store failure: Database error: locked"
        );
        assert_eq!(
            LoadFailure::Refresh(SyncError::Timeout).to_string(),
            "refresh failed: Request timed out"
        );
    }

    #[test]
    fn test_closure_listener_ignores_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = move |value: u32| sink.lock().unwrap().push(value);

        LoadListener::<u32>::on_loaded(&listener, 3);
        LoadListener::<u32>::on_failure(&listener, LoadFailure::WorkerPoolClosed);
        LoadListener::<u32>::on_loaded(&listener, 4);

        assert_eq!(*seen.lock().unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_callback_routes_outcomes() {
        let outcome = Arc::new(Mutex::new(None));

        let ok = Arc::clone(&outcome);
        let err = Arc::clone(&outcome);
        let cb = callback(
            move |value: u32| *ok.lock().unwrap() = Some(Ok(value)),
            move |failure: SaveFailure| *err.lock().unwrap() = Some(Err(failure.reason())),
        );
        SaveCallback::<u32>::on_failure(cb, SaveFailure::EmptyBody);

        assert_eq!(
            *outcome.lock().unwrap(),
            Some(Err("empty response body".to_string()))
        );
    }
}
