//! Per-mode window dimension policy.
//!
//! Three modes have fixed dimensions; `expanded` is derived from the live
//! screen resolution at query time, so an external display change is picked
//! up by the next resize dispatch without any bookkeeping here.

use serde::{Deserialize, Serialize};

use super::constants::window_size;
use super::mode::Mode;

/// A window size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self { Self { width, height } }
}

/// The logical size of the display hosting the overlay window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    /// Screen width in logical pixels.
    pub width: f64,
    /// Screen height in logical pixels.
    pub height: f64,
}

impl ScreenSize {
    /// Creates a new screen size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

/// Returns the window dimensions required by `mode` on `screen`.
///
/// The `expanded` presentation takes 20% of the screen width by 50% of the
/// screen height, rounded half away from zero; the other modes use fixed
/// constants.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn dimensions_for(mode: Mode, screen: ScreenSize) -> Dimensions {
    match mode {
        Mode::Default => Dimensions::new(window_size::DEFAULT_SIZE, window_size::DEFAULT_SIZE),
        Mode::Pill => Dimensions::new(window_size::PILL_WIDTH, window_size::PILL_HEIGHT),
        Mode::Hover => Dimensions::new(window_size::HOVER_SIZE, window_size::HOVER_SIZE),
        Mode::Expanded => Dimensions::new(
            (screen.width * window_size::EXPANDED_WIDTH_RATIO).round() as u32,
            (screen.height * window_size::EXPANDED_HEIGHT_RATIO).round() as u32,
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
