//! Idle detection driving window opacity.
//!
//! The monitor watches a fixed set of qualifying input events. Every
//! qualifying event immediately restores the active opacity and restarts the
//! single idle timer; if the timer runs out without being reset, the idle
//! opacity is applied once and the monitor waits for the next event.
//!
//! Opacity is this monitor's attribute alone — no other subsystem writes it,
//! so there is nothing to coordinate with at the host boundary.
//!
//! # Invariant
//!
//! At most one idle timer is outstanding at any time. Resetting aborts the
//! previous timer before starting a new one, both under the same lock, so
//! two timers can never fire for the same idle period.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::super::host::WindowHost;
use crate::config::OverlayConfig;

/// Input events that count as user activity.
///
/// Exactly these five reset the idle timer; nothing else does. Pointer
/// re-entry into the window body is handled separately by
/// [`IdleActivityMonitor::pointer_entered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The pointer moved.
    PointerMove,
    /// A pointer button was pressed.
    PointerDown,
    /// The wheel scrolled.
    Scroll,
    /// A key was pressed.
    KeyDown,
    /// A touch began.
    TouchStart,
}

/// State shared with the idle timer task.
struct MonitorShared {
    host: Arc<dyn WindowHost>,
    active_alpha: f64,
    idle_alpha: f64,
    is_idle: AtomicBool,
    disposed: AtomicBool,
}

/// Watches user activity and fades the overlay window when idle.
pub struct IdleActivityMonitor {
    shared: Arc<MonitorShared>,
    idle_delay: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    last_activity: Mutex<Instant>,
}

impl IdleActivityMonitor {
    /// Creates a monitor without starting it; call [`Self::start`] once the
    /// overlay window exists.
    #[must_use]
    pub fn new(host: Arc<dyn WindowHost>, config: &OverlayConfig) -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                host,
                active_alpha: config.active_alpha,
                idle_alpha: config.idle_alpha,
                is_idle: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
            idle_delay: config.idle_delay(),
            timer: Mutex::new(None),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// Enters the active state: applies the active opacity and starts the
    /// idle timer. The process starts active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) { self.mark_active(); }

    /// Records a qualifying input event.
    pub fn record_event(&self, event: InputEvent) {
        tracing::trace!("overlay: activity event {event:?}");
        self.mark_active();
    }

    /// Records the pointer re-entering the window body.
    ///
    /// The active opacity is applied synchronously before the timer is
    /// touched, so re-entry always forces the active alpha even if a timer
    /// reset is racing.
    pub fn pointer_entered(&self) {
        tracing::trace!("overlay: pointer entered window body");
        self.mark_active();
    }

    /// Whether the monitor currently considers the user idle.
    #[must_use]
    pub fn is_idle(&self) -> bool { self.shared.is_idle.load(Ordering::SeqCst) }

    /// When the last qualifying activity was recorded.
    #[must_use]
    pub fn last_activity(&self) -> Instant { *self.last_activity.lock() }

    /// Stops the monitor: the outstanding timer is cancelled and no opacity
    /// intent fires after this call returns.
    pub fn dispose(&self) {
        self.shared.disposed.store(true, Ordering::SeqCst);
        if let Some(task) = self.timer.lock().take() {
            task.abort();
        }
        tracing::debug!("overlay: idle monitor disposed");
    }

    /// Applies the active opacity and atomically restarts the idle timer.
    fn mark_active(&self) {
        if self.shared.disposed.load(Ordering::SeqCst) {
            return;
        }

        *self.last_activity.lock() = Instant::now();
        self.shared.is_idle.store(false, Ordering::SeqCst);

        // Opacity first: the window must brighten even if the timer task
        // below is never scheduled (e.g. shutdown races the event).
        if let Err(err) = self.shared.host.set_window_opacity(self.shared.active_alpha) {
            tracing::warn!("overlay: active opacity failed: {err}");
        }

        let mut timer = self.timer.lock();
        if let Some(task) = timer.take() {
            task.abort();
        }

        let shared = self.shared.clone();
        let delay = self.idle_delay;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if shared.disposed.load(Ordering::SeqCst) {
                return;
            }

            shared.is_idle.store(true, Ordering::SeqCst);
            tracing::debug!("overlay: idle after {delay:?} without input");
            if let Err(err) = shared.host.set_window_opacity(shared.idle_alpha) {
                tracing::warn!("overlay: idle opacity failed: {err}");
            }
        }));
    }
}

impl Drop for IdleActivityMonitor {
    fn drop(&mut self) { self.dispose(); }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::overlay::host::RecordingHost;

    fn monitor(host: &Arc<RecordingHost>, idle_delay_ms: u64) -> IdleActivityMonitor {
        let config = OverlayConfig {
            idle_delay_ms,
            ..OverlayConfig::default()
        };
        IdleActivityMonitor::new(host.clone(), &config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_alpha_after_delay() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);

        monitor.start();
        assert!(!monitor.is_idle());

        tokio::time::sleep(Duration::from_millis(1_100)).await;

        assert!(monitor.is_idle());
        // Exactly one active call (startup) and one idle call.
        assert_eq!(host.opacity_calls(), vec![1.0, 0.4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_resets_timer() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);

        monitor.start();
        tokio::time::sleep(Duration::from_millis(800)).await;
        monitor.record_event(InputEvent::PointerMove);
        tokio::time::sleep(Duration::from_millis(800)).await;

        // 1.6s elapsed but never a full idle period without input.
        assert!(!monitor.is_idle());
        assert_eq!(host.opacity_calls(), vec![1.0, 1.0]);

        // Quiet from here on: idle fires once.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(monitor.is_idle());
        assert_eq!(host.opacity_calls(), vec![1.0, 1.0, 0.4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_qualifying_event_restores_active_alpha() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);

        monitor.start();
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(monitor.is_idle());

        monitor.record_event(InputEvent::KeyDown);
        assert!(!monitor.is_idle());
        assert_eq!(host.opacity_calls(), vec![1.0, 0.4, 1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_reentry_forces_active_alpha() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);

        monitor.start();
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        monitor.pointer_entered();
        let calls = host.opacity_calls();
        assert_eq!(calls.last(), Some(&1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_scheduled_timer() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);

        monitor.start();
        monitor.dispose();

        tokio::time::sleep(Duration::from_millis(2_000)).await;

        // Only the startup active call; the scheduled idle fade never fired.
        assert_eq!(host.opacity_calls(), vec![1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_after_dispose_are_ignored() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);

        monitor.start();
        monitor.dispose();
        monitor.record_event(InputEvent::Scroll);
        monitor.pointer_entered();

        assert_eq!(host.opacity_calls(), vec![1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_opacity_failure_is_non_fatal() {
        let host = Arc::new(RecordingHost::new());
        let monitor = monitor(&host, 1_000);
        host.set_fail_commands(true);

        monitor.start();
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        // Both calls were attempted despite failing.
        assert_eq!(host.opacity_calls(), vec![1.0, 0.4]);
        assert!(monitor.is_idle());
    }
}
