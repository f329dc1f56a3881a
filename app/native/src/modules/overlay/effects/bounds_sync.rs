//! Debounced synchronization of window bounds with the current mode.
//!
//! Every accepted mode change schedules a resize intent, but the intent only
//! reaches the window host after the mode has been stable for the quiescence
//! window. A change arriving inside the window cancels the pending send and
//! schedules a fresh one, so a rapid flip (hover ↔ pill) produces exactly one
//! resize sized for the final settled mode instead of visible size thrash.
//!
//! Cancel-and-reschedule is a single atomic step: the pending task handle is
//! swapped under one lock, aborting the old task before the new one is
//! registered. Teardown aborts whatever is pending; nothing fires afterwards.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::super::actor::StoreMessage;
use super::super::dimensions::dimensions_for;
use super::super::host::{ScreenSource, WindowHost};
use super::super::mode::Mode;

/// Debounced resize dispatch for mode changes.
pub struct BoundsSynchronizer {
    host: Arc<dyn WindowHost>,
    screen: Arc<dyn ScreenSource>,
    debounce: Duration,
    store: mpsc::Sender<StoreMessage>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl BoundsSynchronizer {
    /// Creates a new synchronizer issuing commands to `host`.
    pub(crate) fn new(
        host: Arc<dyn WindowHost>,
        screen: Arc<dyn ScreenSource>,
        debounce: Duration,
        store: mpsc::Sender<StoreMessage>,
    ) -> Self {
        Self {
            host,
            screen,
            debounce,
            store,
            pending: Mutex::new(None),
        }
    }

    /// Reacts to a mode change by (re)scheduling the debounced resize.
    ///
    /// `generation` identifies the transition this dispatch belongs to; it is
    /// echoed back to the store so a superseded dispatch cannot clear a newer
    /// transition's busy flag.
    pub(crate) fn mode_changed(&self, mode: Mode, generation: u64) {
        let host = self.host.clone();
        let screen = self.screen.clone();
        let store = self.store.clone();
        let debounce = self.debounce;

        let mut pending = self.pending.lock();
        if let Some(task) = pending.take() {
            task.abort();
            tracing::trace!("overlay: superseded pending resize cancelled");
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Screen size is read at dispatch time so the expanded mode picks
            // up display changes that happened during the quiescence window.
            let dims = dimensions_for(mode, screen.screen_size());
            if let Err(err) = host.resize_window(dims.width, dims.height) {
                tracing::warn!("overlay: resize for mode {mode} failed: {err}");
            }
            if let Err(err) = host.set_window_resizable(mode.is_user_resizable()) {
                tracing::warn!("overlay: resizable toggle for mode {mode} failed: {err}");
            }

            if store.send(StoreMessage::ResizeDispatched { generation }).await.is_err() {
                tracing::trace!("overlay: mode store gone before resize acknowledgement");
            }
        }));
    }

    /// Cancels the pending send, if any. It will never fire.
    pub(crate) fn cancel_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
            tracing::trace!("overlay: pending resize cancelled on teardown");
        }
    }

    /// Whether a debounced send is currently scheduled.
    #[cfg(test)]
    fn has_pending(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for BoundsSynchronizer {
    fn drop(&mut self) { self.cancel_pending(); }
}

// ============================================================================
// Tests
// ============================================================================
