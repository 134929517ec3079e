//! System-wide key-down interception.
//!
//! A [`KeyListener`] sees every key-down on the desktop regardless of which
//! window has focus and asks a [`KeySink`] whether to swallow it. On Windows
//! this is a `WH_KEYBOARD_LL` hook running on its own message-loop thread.
//!
//! # Timing
//!
//! The sink is called synchronously from the OS callback. Windows silently
//! removes a low-level hook whose callback regularly takes longer than about
//! 300 ms, so sinks must answer quickly and defer real work.
//!
//! # Testability
//!
//! [`mock::MockKeyListener`] lets tests press keys without an OS hook.

use std::sync::Arc;

use clickmap_core::Key;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// A key-down offered to a [`KeySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDownEvent {
    pub key: Key,
    /// Set by the sink to stop the key reaching other applications.
    pub consumed: bool,
}

impl KeyDownEvent {
    pub fn new(key: Key) -> Self {
        Self { key, consumed: false }
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }
}

/// Receives key-downs from a running listener.
pub trait KeySink: Send + Sync {
    fn on_key_down(&self, event: &mut KeyDownEvent);
}

/// Error type for key capture.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    HookInstallFailed(String),
    #[error("another key listener is already active in this process")]
    AlreadyActive,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Installs and removes a global key-down interception.
pub trait KeyListener: Send {
    /// Starts delivering key-downs to `sink`. Calling it while running is a
    /// no-op that keeps the current sink.
    fn start(&mut self, sink: Arc<dyn KeySink>) -> Result<(), CaptureError>;

    /// Stops delivery and releases the OS hook. Calling it while stopped is a
    /// no-op.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Listener reporting that this platform has no global key hook.
#[derive(Debug, Default)]
pub struct UnsupportedListener;

impl KeyListener for UnsupportedListener {
    fn start(&mut self, _sink: Arc<dyn KeySink>) -> Result<(), CaptureError> {
        Err(CaptureError::UnsupportedPlatform(format!(
            "no global key listener for {}",
            std::env::consts::OS
        )))
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}

/// Returns the listener for the platform this binary was built for.
pub fn platform_listener() -> Box<dyn KeyListener> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsKeyListener::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(UnsupportedListener)
    }
}
