//! Message and query types for the mode store actor.

use smallvec::SmallVec;
use tokio::sync::oneshot;

use crate::modules::overlay::mode::{IllegalTransition, Mode, TransitionState};

/// The outcome of an accepted mode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The target was already the current mode; nothing happened.
    AlreadyCurrent,
    /// The transition was accepted and the mode changed.
    Switched {
        /// The mode before the switch.
        from: Mode,
        /// The mode after the switch.
        to: Mode,
    },
}

/// Messages processed by the mode store actor.
#[derive(Debug)]
pub enum StoreMessage {
    /// A request to switch the overlay to `target`.
    RequestMode {
        /// The requested mode.
        target: Mode,
        /// Reply channel for the validated outcome.
        respond_to: oneshot::Sender<Result<SwitchOutcome, IllegalTransition>>,
    },

    /// The bounds synchronizer dispatched the resize intent for the
    /// transition identified by `generation`.
    ResizeDispatched {
        /// The transition generation the dispatch belongs to.
        generation: u64,
    },

    /// The safety timeout for the transition identified by `generation`
    /// elapsed before its dispatch acknowledgement arrived.
    TransitionTimedOut {
        /// The transition generation the timeout was armed for.
        generation: u64,
    },

    /// A read-only query.
    Query {
        /// The query to execute.
        query: StoreQuery,
        /// Reply channel for the result.
        respond_to: oneshot::Sender<QueryResult>,
    },

    /// Stop the actor loop.
    Shutdown,
}

impl StoreMessage {
    /// A short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestMode { .. } => "RequestMode",
            Self::ResizeDispatched { .. } => "ResizeDispatched",
            Self::TransitionTimedOut { .. } => "TransitionTimedOut",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

/// Read-only queries against the actor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreQuery {
    /// The current mode.
    GetMode,
    /// The full transition state.
    GetState,
    /// The modes legally reachable from the current mode.
    GetValidTargets,
}

/// Results of [`StoreQuery`] execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Result of [`StoreQuery::GetMode`].
    Mode(Mode),
    /// Result of [`StoreQuery::GetState`].
    State(TransitionState),
    /// Result of [`StoreQuery::GetValidTargets`].
    Targets(SmallVec<[Mode; 3]>),
}

impl QueryResult {
    /// Extracts the mode, if this is a mode result.
    #[must_use]
    pub fn into_mode(self) -> Option<Mode> {
        match self {
            Self::Mode(mode) => Some(mode),
            _ => None,
        }
    }

    /// Extracts the transition state, if this is a state result.
    #[must_use]
    pub fn into_state(self) -> Option<TransitionState> {
        match self {
            Self::State(state) => Some(state),
            _ => None,
        }
    }

    /// Extracts the valid targets, if this is a targets result.
    #[must_use]
    pub fn into_targets(self) -> Option<SmallVec<[Mode; 3]>> {
        match self {
            Self::Targets(targets) => Some(targets),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names() {
        assert_eq!(StoreMessage::Shutdown.name(), "Shutdown");
        assert_eq!(
            StoreMessage::ResizeDispatched { generation: 1 }.name(),
            "ResizeDispatched"
        );
    }

    #[test]
    fn test_query_result_accessors() {
        assert_eq!(QueryResult::Mode(Mode::Pill).into_mode(), Some(Mode::Pill));
        assert_eq!(QueryResult::Mode(Mode::Pill).into_state(), None);

        let state = TransitionState::initial();
        assert_eq!(QueryResult::State(state).into_state(), Some(state));

        let targets = QueryResult::Targets(SmallVec::from_slice(&[Mode::Pill]));
        assert_eq!(targets.into_targets().unwrap().as_slice(), &[Mode::Pill]);
    }
}
