//! The mode store actor.
//!
//! The actor owns the authoritative [`TransitionState`] and processes
//! messages sequentially. Sequential processing is what implements the
//! concurrency contract for mode requests: a request that arrives while a
//! transition is in flight waits in the mailbox and is validated against
//! whatever mode is current when it is dequeued, never a stale snapshot.
//!
//! Accepting a request flips the mode synchronously within the actor turn
//! and marks the store busy; the busy flag clears when the bounds
//! synchronizer acknowledges that the (debounced) resize intent was handed
//! to the window host, or when the transition timeout elapses. A generation
//! counter ties acknowledgements and timeouts to the transition that armed
//! them, so a superseded transition can never clear its successor's flag.

mod handle;
mod messages;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

pub use handle::{ActorError, ModeRequestError, ModeStoreHandle};
pub use messages::{QueryResult, StoreMessage, StoreQuery, SwitchOutcome};

use eyeball::SharedObservable;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::effects::BoundsSynchronizer;
use super::host::{ScreenSource, WindowHost};
use super::mode::{self, IllegalTransition, Mode, TransitionState};
use crate::config::OverlayConfig;

/// Channel buffer size for the mode store actor.
const CHANNEL_BUFFER_SIZE: usize = 64;

/// The actor that owns all view-mode state.
pub struct ModeActor {
    /// The authoritative transition state.
    state: TransitionState,

    /// Published copy of the state, readable without touching the mailbox.
    observable: SharedObservable<TransitionState>,

    /// Receiver for incoming messages.
    receiver: mpsc::Receiver<StoreMessage>,

    /// Self-sender, cloned into timeout tasks.
    sender: mpsc::Sender<StoreMessage>,

    /// Debounced resize dispatch to the window host.
    bounds: BoundsSynchronizer,

    /// Monotonic counter identifying the most recent accepted transition.
    generation: u64,

    /// Safety net that clears a wedged busy flag.
    transition_timeout: Duration,

    /// The armed timeout task for the current transition, if any.
    timeout_task: Option<JoinHandle<()>>,
}

impl ModeActor {
    /// Spawns the mode store actor and returns a handle for communication.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(
        host: Arc<dyn WindowHost>,
        screen: Arc<dyn ScreenSource>,
        config: &OverlayConfig,
    ) -> ModeStoreHandle {
        tracing::debug!("overlay: spawning mode store actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let observable = SharedObservable::new(TransitionState::initial());
        let bounds = BoundsSynchronizer::new(host, screen, config.resize_debounce(), sender.clone());

        let actor = Self {
            state: TransitionState::initial(),
            observable: observable.clone(),
            receiver,
            sender: sender.clone(),
            bounds,
            generation: 0,
            transition_timeout: config.transition_timeout(),
            timeout_task: None,
        };

        tokio::spawn(actor.run());

        ModeStoreHandle::new(sender, observable)
    }

    /// Runs the actor's message loop.
    ///
    /// A panicking handler is caught and logged so a single bad request
    /// cannot take down mode coordination for the rest of the session.
    async fn run(mut self) {
        tracing::trace!("overlay: mode actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, StoreMessage::Shutdown) {
                tracing::debug!("overlay: mode actor received shutdown");
                self.teardown();
                return;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
            }));

            if result.is_err() {
                tracing::error!("overlay: panic in mode actor while handling '{msg_name}'");
            }
        }

        tracing::debug!("overlay: mode actor channel closed, exiting");
        self.teardown();
    }

    /// Cancels pending timers so nothing fires after the actor is gone.
    fn teardown(&mut self) {
        self.bounds.cancel_pending();
        if let Some(task) = self.timeout_task.take() {
            task.abort();
        }
    }

    /// Handles a single message.
    fn handle_message(&mut self, msg: StoreMessage) {
        match msg {
            StoreMessage::RequestMode { target, respond_to } => {
                let outcome = self.apply_request(target);
                if respond_to.send(outcome).is_err() {
                    tracing::trace!("overlay: mode request reply dropped (caller gone)");
                }
            }

            StoreMessage::ResizeDispatched { generation } => {
                if generation == self.generation {
                    self.clear_transitioning();
                } else {
                    tracing::trace!(
                        "overlay: stale resize dispatch for generation {generation} ignored"
                    );
                }
            }

            StoreMessage::TransitionTimedOut { generation } => {
                if generation == self.generation && self.state.is_transitioning {
                    tracing::warn!(
                        "overlay: transition to {} not acknowledged within {:?}, clearing busy flag",
                        self.state.current_mode,
                        self.transition_timeout
                    );
                    self.clear_transitioning();
                }
            }

            StoreMessage::Query { query, respond_to } => {
                let result = self.execute_query(query);
                if respond_to.send(result).is_err() {
                    tracing::trace!("overlay: query reply dropped (caller gone)");
                }
            }

            // Handled in run()
            StoreMessage::Shutdown => unreachable!(),
        }
    }

    /// Validates and applies a mode request.
    fn apply_request(&mut self, target: Mode) -> Result<SwitchOutcome, IllegalTransition> {
        let from = self.state.current_mode;

        if target == from {
            tracing::trace!("overlay: already in mode {target}, nothing to do");
            return Ok(SwitchOutcome::AlreadyCurrent);
        }

        if !mode::is_valid(from, target) {
            tracing::debug!("overlay: rejected mode request {from} -> {target}");
            return Err(IllegalTransition { from, to: target });
        }

        self.generation += 1;
        self.state.current_mode = target;
        self.state.is_transitioning = true;
        self.observable.set(self.state);

        self.bounds.mode_changed(target, self.generation);
        self.arm_transition_timeout();

        tracing::debug!("overlay: mode {from} -> {target}");
        Ok(SwitchOutcome::Switched { from, to: target })
    }

    /// Marks the in-flight transition as settled.
    fn clear_transitioning(&mut self) {
        if let Some(task) = self.timeout_task.take() {
            task.abort();
        }
        if self.state.is_transitioning {
            self.state.is_transitioning = false;
            self.observable.set(self.state);
        }
    }

    /// Arms the safety timeout for the current transition.
    ///
    /// The previous timeout is always aborted first so exactly one timer is
    /// live per transition concern.
    fn arm_transition_timeout(&mut self) {
        if let Some(task) = self.timeout_task.take() {
            task.abort();
        }

        let sender = self.sender.clone();
        let generation = self.generation;
        let timeout = self.transition_timeout;

        self.timeout_task = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if sender.send(StoreMessage::TransitionTimedOut { generation }).await.is_err() {
                tracing::trace!("overlay: mode actor gone before transition timeout fired");
            }
        }));
    }

    fn execute_query(&self, query: StoreQuery) -> QueryResult {
        match query {
            StoreQuery::GetMode => QueryResult::Mode(self.state.current_mode),
            StoreQuery::GetState => QueryResult::State(self.state),
            StoreQuery::GetValidTargets => {
                QueryResult::Targets(mode::valid_targets(self.state.current_mode))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::overlay::dimensions::ScreenSize;
    use crate::modules::overlay::host::{RecordingHost, StaticScreen};

    fn spawn_actor(host: &Arc<RecordingHost>) -> ModeStoreHandle {
        let screen = Arc::new(StaticScreen(ScreenSize::new(1920.0, 1080.0)));
        ModeActor::spawn(host.clone(), screen, &OverlayConfig::default())
    }

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);
        assert!(handle.is_alive());

        handle.shutdown().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn test_initial_mode_is_pill() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        let result = handle.query(StoreQuery::GetMode).await.unwrap();
        assert_eq!(result.into_mode(), Some(Mode::Pill));

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_request_current_mode_is_idempotent() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        let outcome = handle.request_mode(Mode::Pill).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::AlreadyCurrent);

        // No side effects at all: no busy window, no host commands.
        let state = handle.query(StoreQuery::GetState).await.unwrap().into_state().unwrap();
        assert!(!state.is_transitioning);
        assert!(host.commands().is_empty());

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_illegal_request_is_rejected_without_state_change() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        // pill -> hover is legal; hover -> default is not.
        handle.request_mode(Mode::Hover).await.unwrap();
        let err = handle.request_mode(Mode::Default).await.unwrap_err();

        match err {
            ModeRequestError::Rejected(illegal) => {
                assert_eq!(illegal.from, Mode::Hover);
                assert_eq!(illegal.to, Mode::Default);
            }
            ModeRequestError::Actor(other) => panic!("unexpected actor error: {other}"),
        }

        let result = handle.query(StoreQuery::GetMode).await.unwrap();
        assert_eq!(result.into_mode(), Some(Mode::Hover));

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_sequential_requests_fold_in_order() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        // pill -> hover -> pill -> default, every step legal.
        for target in [Mode::Hover, Mode::Pill, Mode::Default] {
            let outcome = handle.request_mode(target).await.unwrap();
            assert!(matches!(outcome, SwitchOutcome::Switched { .. }));
        }

        assert_eq!(
            handle.query(StoreQuery::GetMode).await.unwrap().into_mode(),
            Some(Mode::Default)
        );

        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_valid_targets_follow_current_mode() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        handle.request_mode(Mode::Hover).await.unwrap();
        let targets = handle.valid_targets().await.unwrap();
        assert_eq!(targets.as_slice(), &[Mode::Pill]);

        handle.shutdown().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_mode_flips_coalesce_into_one_resize() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        // Three changes well inside the 150ms debounce window.
        handle.request_mode(Mode::Default).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.request_mode(Mode::Pill).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.request_mode(Mode::Hover).await.unwrap();

        // Let the debounce window settle.
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Exactly one resize, sized for the final mode.
        assert_eq!(host.resizes(), vec![(280, 280)]);

        handle.shutdown().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transitioning_clears_after_dispatch() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        handle.request_mode(Mode::Default).await.unwrap();
        assert!(handle.is_transitioning());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!handle.is_transitioning());
        assert_eq!(handle.current_mode(), Mode::Default);

        handle.shutdown().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_resizable_toggled_with_mode() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);

        handle.request_mode(Mode::Default).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        use crate::modules::overlay::host::HostCommand;
        assert!(
            host.commands().contains(&HostCommand::SetResizable { resizable: true }),
            "default mode should enable the native resize handle"
        );

        handle.shutdown().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_failure_does_not_roll_back_mode() {
        let host = Arc::new(RecordingHost::new());
        let handle = spawn_actor(&host);
        host.set_fail_commands(true);

        handle.request_mode(Mode::Expanded).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The resize was attempted and failed; the mode stays committed.
        assert_eq!(host.resizes(), vec![(384, 540)]);
        assert_eq!(handle.current_mode(), Mode::Expanded);
        assert!(!handle.is_transitioning());

        handle.shutdown().unwrap();
    }
}
