//! View modes and the transition policy between them.
//!
//! The overlay window is always in exactly one [`Mode`]. Switching between
//! modes is constrained by a fixed directed graph: `pill` is the hub every
//! mode can reach and return from, while `hover` is a leaf that is only
//! reachable from (and only escapes back to) `pill`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

// ============================================================================
// Mode
// ============================================================================

/// A presentation mode of the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The regular panel presentation.
    Default,
    /// The collapsed pill presentation. This is the startup mode.
    Pill,
    /// The compact preview shown while hovering the pill.
    Hover,
    /// The enlarged presentation, sized from the screen resolution.
    Expanded,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 4] = [Self::Default, Self::Pill, Self::Hover, Self::Expanded];

    /// Whether this mode exposes a manual resize handle to the user.
    ///
    /// Only the full panel presentations can be resized by hand; the pill
    /// and hover presentations have fixed dimensions.
    #[must_use]
    pub const fn is_user_resizable(self) -> bool { matches!(self, Self::Default | Self::Expanded) }

    /// The lowercase name used in logs and serialized state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pill => "pill",
            Self::Hover => "hover",
            Self::Expanded => "expanded",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Transition policy
// ============================================================================

/// Returns whether switching from `from` to `to` is a legal transition.
///
/// Self-transitions are never legal; "already there" is handled separately by
/// the store as an idempotent no-op. The relation is neither symmetric nor
/// transitive.
#[must_use]
pub const fn is_valid(from: Mode, to: Mode) -> bool {
    matches!(
        (from, to),
        (Mode::Default, Mode::Pill | Mode::Expanded)
            | (Mode::Pill, Mode::Default | Mode::Hover | Mode::Expanded)
            | (Mode::Hover, Mode::Pill)
            | (Mode::Expanded, Mode::Default | Mode::Pill)
    )
}

/// Returns every mode reachable from `from` in a single legal transition.
///
/// Used by view code to enable or disable mode controls.
#[must_use]
pub fn valid_targets(from: Mode) -> SmallVec<[Mode; 3]> {
    Mode::ALL.into_iter().filter(|to| is_valid(from, *to)).collect()
}

// ============================================================================
// State
// ============================================================================

/// The authoritative mode state published by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionState {
    /// The current mode.
    pub current_mode: Mode,
    /// Whether a transition has been accepted but its resize intent has not
    /// yet been dispatched to the window host.
    pub is_transitioning: bool,
}

impl TransitionState {
    /// The process-start state: pill, not transitioning.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            current_mode: Mode::Pill,
            is_transitioning: false,
        }
    }
}

impl Default for TransitionState {
    fn default() -> Self { Self::initial() }
}

/// A mode change request whose target is not reachable from the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal mode transition: {from} -> {to}")]
pub struct IllegalTransition {
    /// The mode the overlay was in when the request was rejected.
    pub from: Mode,
    /// The requested target mode.
    pub to: Mode,
}

// ============================================================================
// Tests
// ============================================================================
