//! Error types for Halo.
//!
//! Each subsystem defines its own error; this module provides the
//! application-level aggregate returned from the top-level entry points.

use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::overlay::{ActorError, HostError, IllegalTransition, ModeRequestError};

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum HaloError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Communication with the mode store failed.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// A mode transition was rejected.
    #[error(transparent)]
    Transition(#[from] IllegalTransition),

    /// A window host command failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl From<ModeRequestError> for HaloError {
    fn from(err: ModeRequestError) -> Self {
        match err {
            ModeRequestError::Rejected(illegal) => Self::Transition(illegal),
            ModeRequestError::Actor(actor) => Self::Actor(actor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::overlay::Mode;

    #[test]
    fn test_transition_error_display_is_transparent() {
        let err: HaloError = IllegalTransition { from: Mode::Hover, to: Mode::Expanded }.into();
        assert_eq!(err.to_string(), "illegal mode transition: hover -> expanded");
    }

    #[test]
    fn test_host_error_display_is_transparent() {
        let err: HaloError = HostError::new("set_window_opacity", "no window").into();
        assert!(err.to_string().contains("set_window_opacity"));
    }

    #[test]
    fn test_mode_request_error_conversion() {
        let rejected: HaloError =
            ModeRequestError::Rejected(IllegalTransition { from: Mode::Pill, to: Mode::Pill })
                .into();
        assert!(matches!(rejected, HaloError::Transition(_)));

        let actor: HaloError = ModeRequestError::Actor(ActorError::SendFailed).into();
        assert!(matches!(actor, HaloError::Actor(_)));
    }
}
