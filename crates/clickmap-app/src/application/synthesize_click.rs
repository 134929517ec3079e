//! ClickSynthesizer: turns a screen point into a real left click.
//!
//! The sequence is move, settle, press and release, then optionally return
//! the pointer to where it was:
//!
//! ```text
//! [record cursor] → move(point) → sleep(settle) → left down+up → [sleep(restore) → move(back)]
//! ```
//!
//! The settle delay gives the window under the new pointer position time to
//! receive the hover before the press arrives. OS access goes through a
//! [`PointerInjector`]; the adapters live in
//! `infrastructure::pointer_injection`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clickmap_core::ScreenPoint;
use thiserror::Error;
use tracing::{debug, trace};

/// Error type for pointer injection.
#[derive(Debug, Error)]
pub enum ClickError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("pointer injection is not available: {0}")]
    Unavailable(String),
}

/// Platform pointer primitives in absolute virtual-desktop pixels.
pub trait PointerInjector: Send + Sync {
    /// Current pointer position.
    fn cursor_position(&self) -> Result<ScreenPoint, ClickError>;

    /// Warps the pointer to `point`. Coordinates may be negative on
    /// multi-monitor layouts.
    fn move_cursor(&self, point: ScreenPoint) -> Result<(), ClickError>;

    /// Presses and releases the left button at the current position.
    fn left_click(&self) -> Result<(), ClickError>;

    /// Top-left corner of the virtual desktop.
    fn desktop_origin(&self) -> Result<ScreenPoint, ClickError>;
}

/// Timing of a synthesized click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickSettings {
    /// Pause between moving the pointer and pressing the button.
    pub settle_delay: Duration,
    /// Whether clicks return the pointer to its previous position by default.
    pub restore_cursor: bool,
    /// Pause between releasing the button and moving the pointer back.
    pub restore_delay: Duration,
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(10),
            restore_cursor: false,
            restore_delay: Duration::from_millis(10),
        }
    }
}

/// Executes clicks on a [`PointerInjector`].
pub struct ClickSynthesizer {
    injector: Arc<dyn PointerInjector>,
    settings: ClickSettings,
}

impl ClickSynthesizer {
    pub fn new(injector: Arc<dyn PointerInjector>, settings: ClickSettings) -> Self {
        Self { injector, settings }
    }

    /// Clicks at `point`, restoring the pointer if the settings ask for it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClickError`] reported by the injector. Nothing is
    /// retried; a failed move means no button event is sent.
    pub fn click_at(&self, point: ScreenPoint) -> Result<(), ClickError> {
        self.click(point, self.settings.restore_cursor)
    }

    /// Clicks at `point`; when `restore_cursor` is set the pointer returns to
    /// its previous position afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClickError`] reported by the injector.
    pub fn click(&self, point: ScreenPoint, restore_cursor: bool) -> Result<(), ClickError> {
        let original = if restore_cursor {
            Some(self.injector.cursor_position()?)
        } else {
            None
        };

        self.injector.move_cursor(point)?;
        pause(self.settings.settle_delay);
        self.injector.left_click()?;
        debug!(x = point.x, y = point.y, "clicked");

        if let Some(back) = original {
            pause(self.settings.restore_delay);
            self.injector.move_cursor(back)?;
            trace!(x = back.x, y = back.y, "pointer restored");
        }
        Ok(())
    }

    /// Virtual-desktop origin as reported by the platform.
    pub fn desktop_origin(&self) -> Result<ScreenPoint, ClickError> {
        self.injector.desktop_origin()
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
