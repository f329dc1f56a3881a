//! View-mode coordination for the overlay window.
//!
//! The overlay window cycles through four presentations (`pill`, `default`,
//! `hover`, `expanded`). This module owns everything between a mode-change
//! request and the native window matching it: transition legality, the
//! authoritative mode state, debounced geometry sync, idle-driven opacity,
//! and manual drag/resize gestures.
//!
//! # Architecture
//!
//! ```text
//! feature panels ──┐
//!                  ▼ request_mode()
//!        ┌──────────────────┐   mode changed    ┌────────────────────┐
//!        │    ModeActor     │ ────────────────► │ BoundsSynchronizer │
//!        │ (TransitionState)│ ◄──────────────── │  (debounced send)  │
//!        └──────────────────┘   dispatch ack    └─────────┬──────────┘
//!                                                         │ resize
//! input events ──► IdleActivityMonitor ── opacity ──►  WindowHost
//! pointer drags ─► Drag/ResizeController ─ position ──►  (native)
//! ```
//!
//! The three window attributes have exactly one writer each — size belongs
//! to the bounds synchronizer, opacity to the idle monitor, position to the
//! gesture controllers — so concurrent intents never conflict at the host.

pub mod actor;
pub mod constants;
pub mod dimensions;
pub mod effects;
pub mod events;
pub mod host;
pub mod mode;

use std::sync::Arc;

pub use actor::{
    ActorError, ModeActor, ModeRequestError, ModeStoreHandle, QueryResult, StoreQuery,
    SwitchOutcome,
};
pub use dimensions::{Dimensions, ScreenSize, dimensions_for};
pub use events::{DragController, IdleActivityMonitor, InputEvent, VerticalResizeController};
pub use host::{
    HostCommand, HostError, LoggingHost, RecordingHost, ScreenSource, StaticScreen, WindowHost,
};
pub use mode::{IllegalTransition, Mode, TransitionState, is_valid, valid_targets};

use crate::config::{ConfigError, OverlayConfig};

/// The assembled view-mode coordination runtime.
///
/// This is the single construction point for all overlay subsystems: one
/// instance exists for the process lifetime, owns the mode actor and the
/// window-mutating controllers, and is torn down explicitly via
/// [`Self::shutdown`].
pub struct Overlay {
    mode: ModeStoreHandle,
    activity: IdleActivityMonitor,
    drag: DragController,
    vertical_resize: VerticalResizeController,
}

impl Overlay {
    /// Builds and starts the coordination runtime against `host`.
    ///
    /// The process starts in pill mode with the user considered active, so
    /// the first opacity intent goes out immediately.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(
        host: Arc<dyn WindowHost>,
        screen: Arc<dyn ScreenSource>,
        config: &OverlayConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mode = ModeActor::spawn(host.clone(), screen, config);
        let activity = IdleActivityMonitor::new(host.clone(), config);
        activity.start();

        let drag = DragController::new(host.clone());
        let vertical_resize = VerticalResizeController::new(host);

        tracing::debug!("overlay: runtime started in {} mode", mode.current_mode());

        Ok(Self {
            mode,
            activity,
            drag,
            vertical_resize,
        })
    }

    /// Handle to the mode store.
    #[must_use]
    pub const fn mode_handle(&self) -> &ModeStoreHandle { &self.mode }

    /// The idle activity monitor; feed raw input events into it.
    #[must_use]
    pub const fn activity(&self) -> &IdleActivityMonitor { &self.activity }

    /// The drag-to-move gesture controller.
    #[must_use]
    pub const fn drag(&self) -> &DragController { &self.drag }

    /// The vertical-resize gesture controller.
    #[must_use]
    pub const fn vertical_resize(&self) -> &VerticalResizeController { &self.vertical_resize }

    /// Tears the runtime down: cancels timers, drops live gesture sessions,
    /// and stops the mode actor. No host command fires after this returns.
    pub fn shutdown(&self) {
        self.activity.dispose();
        self.drag.cancel();
        self.vertical_resize.cancel();

        if self.mode.shutdown().is_err() {
            tracing::debug!("overlay: mode actor already stopped");
        }
        tracing::debug!("overlay: runtime shut down");
    }
}

// ============================================================================
// Tests
// ============================================================================
