//! Manual window gestures: drag-to-move and vertical resize.
//!
//! Each gesture kind is a three-operation protocol against the window host:
//! `start` anchors the session, `update` forwards live pointer coordinates
//! (the host owns absolute position truth — nothing accumulates here), and
//! `end` closes it. Sessions are ephemeral: at most one per kind is live,
//! a new `start` implicitly ends a stale predecessor, and `update`/`end`
//! without a session are ignored rather than treated as errors.

use std::sync::Arc;

use parking_lot::Mutex;

use super::super::host::WindowHost;

/// State for one in-flight drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    /// Pointer position when the gesture started.
    anchor: (f64, f64),
}

/// Drives manual drag-to-move gestures on the overlay window.
pub struct DragController {
    host: Arc<dyn WindowHost>,
    session: Mutex<Option<DragSession>>,
}

impl DragController {
    /// Creates a controller with no live session.
    #[must_use]
    pub fn new(host: Arc<dyn WindowHost>) -> Self {
        Self { host, session: Mutex::new(None) }
    }

    /// Begins a drag anchored at the given pointer position.
    ///
    /// If a session is already live it is implicitly ended first
    /// (last-start-wins); gestures never queue.
    pub fn start(&self, x: f64, y: f64) {
        let mut session = self.session.lock();

        if session.take().is_some() {
            tracing::debug!("overlay: drag restarted before previous gesture ended");
            if let Err(err) = self.host.end_drag() {
                tracing::warn!("overlay: ending stale drag failed: {err}");
            }
        }

        if let Err(err) = self.host.start_drag(x, y) {
            tracing::warn!("overlay: start_drag failed: {err}");
        }
        *session = Some(DragSession { anchor: (x, y) });
    }

    /// Forwards a pointer position for the live drag.
    ///
    /// A call with no live session is a caller error and is ignored.
    pub fn update(&self, x: f64, y: f64) {
        if self.session.lock().is_none() {
            tracing::trace!("overlay: drag update with no live session ignored");
            return;
        }

        if let Err(err) = self.host.update_drag(x, y) {
            tracing::warn!("overlay: update_drag failed: {err}");
        }
    }

    /// Ends the live drag and snapshots the window position for restart
    /// restore (best effort).
    pub fn end(&self) {
        if self.session.lock().take().is_none() {
            tracing::trace!("overlay: drag end with no live session ignored");
            return;
        }

        if let Err(err) = self.host.end_drag() {
            tracing::warn!("overlay: end_drag failed: {err}");
        }
        if let Err(err) = self.host.persist_window_position() {
            tracing::debug!("overlay: position snapshot failed: {err}");
        }
    }

    /// Drops the live session without issuing host commands.
    ///
    /// Used on teardown, where the window is going away anyway.
    pub fn cancel(&self) {
        if self.session.lock().take().is_some() {
            tracing::debug!("overlay: live drag session cancelled");
        }
    }

    /// Whether a drag session is live.
    #[must_use]
    pub fn is_active(&self) -> bool { self.session.lock().is_some() }

    /// The anchor of the live session, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<(f64, f64)> {
        self.session.lock().map(|session| session.anchor)
    }
}

/// State for one in-flight vertical-resize gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeSession {
    /// Pointer height when the gesture started.
    anchor_y: f64,
}

/// Drives manual vertical-resize gestures on the overlay window.
///
/// This is the restricted, height-only variant of [`DragController`] used by
/// the edge handle of the resizable presentations.
pub struct VerticalResizeController {
    host: Arc<dyn WindowHost>,
    session: Mutex<Option<ResizeSession>>,
}

impl VerticalResizeController {
    /// Creates a controller with no live session.
    #[must_use]
    pub fn new(host: Arc<dyn WindowHost>) -> Self {
        Self { host, session: Mutex::new(None) }
    }

    /// Begins a vertical resize anchored at the given pointer height.
    ///
    /// If a session is already live it is implicitly ended first.
    pub fn start(&self, y: f64) {
        let mut session = self.session.lock();

        if session.take().is_some() {
            tracing::debug!("overlay: vertical resize restarted before previous gesture ended");
            if let Err(err) = self.host.end_vertical_resize() {
                tracing::warn!("overlay: ending stale vertical resize failed: {err}");
            }
        }

        if let Err(err) = self.host.start_vertical_resize(y) {
            tracing::warn!("overlay: start_vertical_resize failed: {err}");
        }
        *session = Some(ResizeSession { anchor_y: y });
    }

    /// Forwards a pointer height for the live resize.
    ///
    /// A call with no live session is a caller error and is ignored.
    pub fn update(&self, y: f64) {
        if self.session.lock().is_none() {
            tracing::trace!("overlay: vertical resize update with no live session ignored");
            return;
        }

        if let Err(err) = self.host.update_vertical_resize(y) {
            tracing::warn!("overlay: update_vertical_resize failed: {err}");
        }
    }

    /// Ends the live resize.
    pub fn end(&self) {
        if self.session.lock().take().is_none() {
            tracing::trace!("overlay: vertical resize end with no live session ignored");
            return;
        }

        if let Err(err) = self.host.end_vertical_resize() {
            tracing::warn!("overlay: end_vertical_resize failed: {err}");
        }
    }

    /// Drops the live session without issuing host commands.
    pub fn cancel(&self) {
        if self.session.lock().take().is_some() {
            tracing::debug!("overlay: live vertical resize session cancelled");
        }
    }

    /// Whether a resize session is live.
    #[must_use]
    pub fn is_active(&self) -> bool { self.session.lock().is_some() }

    /// The anchor height of the live session, if any.
    #[must_use]
    pub fn anchor_y(&self) -> Option<f64> {
        self.session.lock().map(|session| session.anchor_y)
    }
}

// ============================================================================
// Tests
// ============================================================================
