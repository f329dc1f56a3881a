//! Handle for communicating with the mode store actor.
//!
//! The `ModeStoreHandle` is the only way feature code touches mode state.
//! It is cheap to clone and can be shared across tasks; all mutation funnels
//! through the actor's mailbox, so concurrent requests serialize and each is
//! validated against the mode that is current when its turn comes.

use std::time::Duration;

use eyeball::{SharedObservable, Subscriber};
use smallvec::SmallVec;
use tokio::sync::{mpsc, oneshot};

use super::messages::{QueryResult, StoreMessage, StoreQuery, SwitchOutcome};
use crate::modules::overlay::mode::{IllegalTransition, Mode, TransitionState};

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("failed to send message to mode store: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("failed to receive response from mode store: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("mode store query timed out after {0:?}")]
    Timeout(Duration),
}

/// Why a mode request did not switch the mode.
#[derive(Debug, thiserror::Error)]
pub enum ModeRequestError {
    /// The target is not reachable from the current mode.
    #[error(transparent)]
    Rejected(#[from] IllegalTransition),

    /// The actor is gone or the reply channel broke.
    #[error(transparent)]
    Actor(#[from] ActorError),
}

/// Handle for communicating with the mode store actor.
#[derive(Clone)]
pub struct ModeStoreHandle {
    sender: mpsc::Sender<StoreMessage>,
    state: SharedObservable<TransitionState>,
}

impl ModeStoreHandle {
    /// Creates a new handle over the actor's mailbox and published state.
    pub(crate) const fn new(
        sender: mpsc::Sender<StoreMessage>,
        state: SharedObservable<TransitionState>,
    ) -> Self {
        Self { sender, state }
    }

    // ========================================================================
    // Mode requests
    // ========================================================================

    /// Requests a switch to `target`.
    ///
    /// Requesting the current mode is an idempotent no-op
    /// ([`SwitchOutcome::AlreadyCurrent`]); an unreachable target is rejected
    /// without any state change. Requests that arrive while another
    /// transition is in flight queue behind it and are validated against the
    /// mode that is current when they are processed.
    ///
    /// # Errors
    ///
    /// [`ModeRequestError::Rejected`] for an illegal transition, or
    /// [`ModeRequestError::Actor`] if the store is gone.
    pub async fn request_mode(&self, target: Mode) -> Result<SwitchOutcome, ModeRequestError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(StoreMessage::RequestMode { target, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        let outcome = rx.await.map_err(|_| ActorError::ReceiveFailed)?;
        Ok(outcome?)
    }

    // ========================================================================
    // Observed state (synchronous snapshots)
    // ========================================================================

    /// The latest published transition state.
    ///
    /// This reads the observable, not the mailbox: a request that is still
    /// queued is not reflected yet.
    #[must_use]
    pub fn state(&self) -> TransitionState { self.state.get() }

    /// The latest published mode.
    #[must_use]
    pub fn current_mode(&self) -> Mode { self.state.get().current_mode }

    /// Whether a transition is currently in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool { self.state.get().is_transitioning }

    /// Subscribes to transition-state updates.
    #[must_use]
    pub fn subscribe(&self) -> Subscriber<TransitionState> { self.state.subscribe() }

    // ========================================================================
    // Queries (serialized through the mailbox)
    // ========================================================================

    /// Executes a query and waits for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: StoreQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(StoreMessage::Query { query, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Executes a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in
    /// time, or any error from [`Self::query`].
    pub async fn query_timeout(
        &self,
        query: StoreQuery,
        timeout: Duration,
    ) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    /// The modes reachable from the current mode, as the actor sees it.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn valid_targets(&self) -> Result<SmallVec<[Mode; 3]>, ActorError> {
        let result = self.query(StoreQuery::GetValidTargets).await?;
        result.into_targets().ok_or(ActorError::ReceiveFailed)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Requests shutdown of the actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub fn shutdown(&self) -> Result<(), ActorError> {
        self.sender.try_send(StoreMessage::Shutdown).map_err(|_| ActorError::SendFailed)
    }

    /// Checks if the actor is still running (channel is open).
    #[must_use]
    pub fn is_alive(&self) -> bool { !self.sender.is_closed() }
}

impl std::fmt::Debug for ModeStoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeStoreHandle")
            .field("alive", &self.is_alive())
            .field("state", &self.state.get())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
