//! Halo - a desktop overlay with mode-aware window coordination.
//!
//! The library implements the coordination layer between the overlay's view
//! modes and the native window hosting them: transition arbitration,
//! debounced geometry sync, idle-driven opacity, and manual gestures. The
//! native window itself lives behind the
//! [`WindowHost`](modules::overlay::WindowHost) capability, so the same core
//! drives a real compositor window, a logging stub, or a test recorder.

pub mod config;
pub mod error;
pub mod modules;

use std::sync::Arc;

use config::OverlayConfig;
use error::HaloError;
use modules::overlay::{LoggingHost, Overlay, ScreenSize, StaticScreen};

/// Runs the overlay headless against a logging window host until ctrl-c.
///
/// This is the development entry point: the full coordination pipeline runs
/// and every window intent is logged instead of applied.
///
/// # Errors
///
/// Returns [`HaloError`] if the configuration fails validation.
///
/// # Panics
///
/// Panics if the tokio runtime cannot be built.
pub fn run(config: OverlayConfig) -> Result<(), HaloError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    runtime.block_on(async move {
        let host = Arc::new(LoggingHost);
        // Headless default until a real host backs the screen query.
        let screen = Arc::new(StaticScreen(ScreenSize::new(1920.0, 1080.0)));

        let overlay = Overlay::new(host, screen, &config)?;
        tracing::info!(
            "halo: overlay running in {} mode, ctrl-c to exit",
            overlay.mode_handle().current_mode()
        );

        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("halo: failed to wait for ctrl-c: {err}");
        }

        overlay.shutdown();
        Ok(())
    })
}
