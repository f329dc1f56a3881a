//! The window host command boundary.
//!
//! The overlay core never touches a native window directly. Everything it
//! wants from the windowing layer goes through the narrow [`WindowHost`]
//! capability: fire-and-forget commands that the host applies on its own
//! schedule. A rejected command is logged by the caller and never rolls back
//! application state, so every implementation is free to fail without
//! destabilizing the mode store.
//!
//! Screen geometry is a separate read-only capability ([`ScreenSource`])
//! because it is an input from the environment, not a command.

use parking_lot::Mutex;
use thiserror::Error;

use super::dimensions::ScreenSize;

/// A window host command that was rejected or failed to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("window host rejected {command}: {reason}")]
pub struct HostError {
    /// The command that failed, e.g. `resize_window`.
    pub command: &'static str,
    /// Host-provided failure detail.
    pub reason: String,
}

impl HostError {
    /// Creates a new host error for `command`.
    #[must_use]
    pub fn new(command: &'static str, reason: impl Into<String>) -> Self {
        Self { command, reason: reason.into() }
    }
}

/// Commands the overlay core issues to the native window host.
///
/// Implementations must be callable from any task; each call is a
/// fire-and-forget intent whose completion the core never awaits. The host
/// applies commands of the same kind in the order received.
pub trait WindowHost: Send + Sync {
    /// Resizes the overlay window.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the resize.
    fn resize_window(&self, width: u32, height: u32) -> Result<(), HostError>;

    /// Sets the overlay window opacity (`0.0..=1.0`).
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the opacity change.
    fn set_window_opacity(&self, alpha: f64) -> Result<(), HostError>;

    /// Begins a manual window drag anchored at the given pointer position.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host cannot start the drag.
    fn start_drag(&self, x: f64, y: f64) -> Result<(), HostError>;

    /// Forwards a pointer position during a manual drag.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the update.
    fn update_drag(&self, x: f64, y: f64) -> Result<(), HostError>;

    /// Ends the manual window drag.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the command.
    fn end_drag(&self) -> Result<(), HostError>;

    /// Begins a manual vertical resize anchored at the given pointer height.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host cannot start the resize.
    fn start_vertical_resize(&self, y: f64) -> Result<(), HostError>;

    /// Forwards a pointer height during a manual vertical resize.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the update.
    fn update_vertical_resize(&self, y: f64) -> Result<(), HostError>;

    /// Ends the manual vertical resize.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the command.
    fn end_vertical_resize(&self) -> Result<(), HostError>;

    /// Enables or disables the window's native resize handles.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host rejects the change.
    fn set_window_resizable(&self, resizable: bool) -> Result<(), HostError>;

    /// Asks the host to snapshot the window position for restart restore.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the snapshot fails. Best effort either way.
    fn persist_window_position(&self) -> Result<(), HostError>;
}

/// Read-only access to the geometry of the display hosting the overlay.
pub trait ScreenSource: Send + Sync {
    /// The current logical screen size, queried on demand.
    fn screen_size(&self) -> ScreenSize;
}

/// A screen source with a fixed size.
///
/// Used for headless runs and tests where no display server is available.
#[derive(Debug, Clone, Copy)]
pub struct StaticScreen(pub ScreenSize);

impl ScreenSource for StaticScreen {
    fn screen_size(&self) -> ScreenSize { self.0 }
}

// ============================================================================
// Logging host
// ============================================================================

/// A host that logs every command and applies nothing.
///
/// Lets the overlay run headless (demos, development on machines without a
/// compositor) while still exercising the full coordination pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl WindowHost for LoggingHost {
    fn resize_window(&self, width: u32, height: u32) -> Result<(), HostError> {
        tracing::debug!("host: resize_window {width}x{height}");
        Ok(())
    }

    fn set_window_opacity(&self, alpha: f64) -> Result<(), HostError> {
        tracing::debug!("host: set_window_opacity {alpha}");
        Ok(())
    }

    fn start_drag(&self, x: f64, y: f64) -> Result<(), HostError> {
        tracing::debug!("host: start_drag ({x}, {y})");
        Ok(())
    }

    fn update_drag(&self, x: f64, y: f64) -> Result<(), HostError> {
        tracing::trace!("host: update_drag ({x}, {y})");
        Ok(())
    }

    fn end_drag(&self) -> Result<(), HostError> {
        tracing::debug!("host: end_drag");
        Ok(())
    }

    fn start_vertical_resize(&self, y: f64) -> Result<(), HostError> {
        tracing::debug!("host: start_vertical_resize ({y})");
        Ok(())
    }

    fn update_vertical_resize(&self, y: f64) -> Result<(), HostError> {
        tracing::trace!("host: update_vertical_resize ({y})");
        Ok(())
    }

    fn end_vertical_resize(&self) -> Result<(), HostError> {
        tracing::debug!("host: end_vertical_resize");
        Ok(())
    }

    fn set_window_resizable(&self, resizable: bool) -> Result<(), HostError> {
        tracing::debug!("host: set_window_resizable {resizable}");
        Ok(())
    }

    fn persist_window_position(&self) -> Result<(), HostError> {
        tracing::debug!("host: persist_window_position");
        Ok(())
    }
}

// ============================================================================
// Recording host
// ============================================================================

/// A single recorded host command.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// `resize_window` with the requested size.
    Resize { width: u32, height: u32 },
    /// `set_window_opacity` with the requested alpha.
    SetOpacity { alpha: f64 },
    /// `start_drag` with the anchor position.
    StartDrag { x: f64, y: f64 },
    /// `update_drag` with the live position.
    UpdateDrag { x: f64, y: f64 },
    /// `end_drag`.
    EndDrag,
    /// `start_vertical_resize` with the anchor height.
    StartVerticalResize { y: f64 },
    /// `update_vertical_resize` with the live height.
    UpdateVerticalResize { y: f64 },
    /// `end_vertical_resize`.
    EndVerticalResize,
    /// `set_window_resizable`.
    SetResizable { resizable: bool },
    /// `persist_window_position`.
    PersistPosition,
}

/// A host that records every command instead of applying it.
///
/// This is the test double for the whole coordination layer: assertions run
/// against the recorded command stream. `fail_commands` makes every command
/// return an error, for exercising the log-and-continue failure policy.
#[derive(Debug, Default)]
pub struct RecordingHost {
    commands: Mutex<Vec<HostCommand>>,
    fail_commands: std::sync::atomic::AtomicBool,
}

impl RecordingHost {
    /// Creates an empty recording host.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Makes every subsequent command fail (or succeed again).
    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Returns a copy of all recorded commands, in call order.
    #[must_use]
    pub fn commands(&self) -> Vec<HostCommand> { self.commands.lock().clone() }

    /// Removes and returns all recorded commands.
    pub fn take_commands(&self) -> Vec<HostCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    /// All recorded resize sizes, in call order.
    #[must_use]
    pub fn resizes(&self) -> Vec<(u32, u32)> {
        self.commands
            .lock()
            .iter()
            .filter_map(|cmd| match cmd {
                HostCommand::Resize { width, height } => Some((*width, *height)),
                _ => None,
            })
            .collect()
    }

    /// All recorded opacity values, in call order.
    #[must_use]
    pub fn opacity_calls(&self) -> Vec<f64> {
        self.commands
            .lock()
            .iter()
            .filter_map(|cmd| match cmd {
                HostCommand::SetOpacity { alpha } => Some(*alpha),
                _ => None,
            })
            .collect()
    }

    fn record(&self, name: &'static str, command: HostCommand) -> Result<(), HostError> {
        self.commands.lock().push(command);
        if self.fail_commands.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(HostError::new(name, "injected failure"));
        }
        Ok(())
    }
}

impl WindowHost for RecordingHost {
    fn resize_window(&self, width: u32, height: u32) -> Result<(), HostError> {
        self.record("resize_window", HostCommand::Resize { width, height })
    }

    fn set_window_opacity(&self, alpha: f64) -> Result<(), HostError> {
        self.record("set_window_opacity", HostCommand::SetOpacity { alpha })
    }

    fn start_drag(&self, x: f64, y: f64) -> Result<(), HostError> {
        self.record("start_drag", HostCommand::StartDrag { x, y })
    }

    fn update_drag(&self, x: f64, y: f64) -> Result<(), HostError> {
        self.record("update_drag", HostCommand::UpdateDrag { x, y })
    }

    fn end_drag(&self) -> Result<(), HostError> {
        self.record("end_drag", HostCommand::EndDrag)
    }

    fn start_vertical_resize(&self, y: f64) -> Result<(), HostError> {
        self.record("start_vertical_resize", HostCommand::StartVerticalResize { y })
    }

    fn update_vertical_resize(&self, y: f64) -> Result<(), HostError> {
        self.record("update_vertical_resize", HostCommand::UpdateVerticalResize { y })
    }

    fn end_vertical_resize(&self) -> Result<(), HostError> {
        self.record("end_vertical_resize", HostCommand::EndVerticalResize)
    }

    fn set_window_resizable(&self, resizable: bool) -> Result<(), HostError> {
        self.record("set_window_resizable", HostCommand::SetResizable { resizable })
    }

    fn persist_window_position(&self) -> Result<(), HostError> {
        self.record("persist_window_position", HostCommand::PersistPosition)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_host_records_in_order() {
        let host = RecordingHost::new();
        host.resize_window(100, 40).unwrap();
        host.set_window_opacity(0.4).unwrap();
        host.persist_window_position().unwrap();

        assert_eq!(
            host.commands(),
            vec![
                HostCommand::Resize { width: 100, height: 40 },
                HostCommand::SetOpacity { alpha: 0.4 },
                HostCommand::PersistPosition,
            ]
        );
    }

    #[test]
    fn test_recording_host_failure_injection() {
        let host = RecordingHost::new();
        host.set_fail_commands(true);

        let err = host.resize_window(512, 512).unwrap_err();
        assert_eq!(err.command, "resize_window");

        // The command is still recorded so tests can see what was attempted.
        assert_eq!(host.resizes(), vec![(512, 512)]);

        host.set_fail_commands(false);
        assert!(host.set_window_opacity(1.0).is_ok());
    }

    #[test]
    fn test_take_commands_drains() {
        let host = RecordingHost::new();
        host.end_drag().unwrap();
        assert_eq!(host.take_commands().len(), 1);
        assert!(host.commands().is_empty());
    }

    #[test]
    fn test_logging_host_accepts_everything() {
        let host = LoggingHost;
        assert!(host.resize_window(1, 1).is_ok());
        assert!(host.set_window_opacity(0.5).is_ok());
        assert!(host.start_drag(0.0, 0.0).is_ok());
        assert!(host.end_drag().is_ok());
        assert!(host.set_window_resizable(true).is_ok());
    }

    #[test]
    fn test_static_screen() {
        let screen = StaticScreen(ScreenSize::new(1920.0, 1080.0));
        assert_eq!(screen.screen_size().width as u32, 1920);
    }

    #[test]
    fn test_host_error_display() {
        let err = HostError::new("resize_window", "window destroyed");
        assert_eq!(err.to_string(), "window host rejected resize_window: window destroyed");
    }
}
