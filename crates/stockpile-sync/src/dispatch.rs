//! # Completion Context
//!
//! Listener and callback notifications are never invoked directly by the
//! repository's worker tasks. They are handed to a [`Dispatcher`], which
//! decides where they run.
//!
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │  worker task (tokio pool)    │        │  caller's logical thread     │
//! │                              │        │  (UI loop, CLI main task)    │
//! │  dispatcher.dispatch(n) ─────┼──mpsc──┼─► queue.run_next().await     │
//! │                              │        │       n()                    │
//! └──────────────────────────────┘        └──────────────────────────────┘
//!
//!   InlineDispatcher   : n() runs immediately on the worker task
//!   ChannelDispatcher  : n() runs wherever the NotificationQueue is drained
//! ```

use tokio::sync::mpsc;
use tracing::debug;

/// A deferred listener or callback invocation.
pub type Notification = Box<dyn FnOnce() + Send + 'static>;

/// Delivers notifications to the caller's completion context.
pub trait Dispatcher: Send + Sync {
    /// Hands off one notification.
    ///
    /// Returns `false` when the context is gone and the notification was
    /// dropped without running.
    fn dispatch(&self, notification: Notification) -> bool;
}

/// Runs every notification immediately on the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, notification: Notification) -> bool {
        notification();
        true
    }
}

/// Sends notifications to a [`NotificationQueue`].
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, notification: Notification) -> bool {
        match self.tx.send(notification) {
            Ok(()) => true,
            Err(_) => {
                debug!("Notification queue closed, dropping notification");
                false
            }
        }
    }
}

/// The receiving end of a [`ChannelDispatcher`], drained by its owner.
pub struct NotificationQueue {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationQueue {
    /// Waits for the next notification and runs it.
    ///
    /// Returns `false` once every dispatcher has been dropped and the queue
    /// is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(notification) => {
                notification();
                true
            }
            None => false,
        }
    }

    /// Runs whatever is already queued without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(notification) = self.rx.try_recv() {
            notification();
            ran += 1;
        }
        ran
    }

    /// Runs notifications until every dispatcher has been dropped.
    pub async fn run(mut self) {
        while self.run_next().await {}
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue").finish_non_exhaustive()
    }
}

/// Creates a connected dispatcher/queue pair.
pub fn notification_channel() -> (ChannelDispatcher, NotificationQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelDispatcher { tx }, NotificationQueue { rx })
}
