//! Mock key listener for tests.
//!
//! Clones share state, so a test can hand one clone to the code under test
//! and keep another to press keys and inspect the start/stop history.

use std::sync::{Arc, Mutex, PoisonError};

use clickmap_core::Key;

use super::{CaptureError, KeyDownEvent, KeyListener, KeySink};

#[derive(Default)]
struct Shared {
    sink: Option<Arc<dyn KeySink>>,
    starts: u32,
    stops: u32,
}

/// A [`KeyListener`] driven by [`MockKeyListener::press`].
#[derive(Clone, Default)]
pub struct MockKeyListener {
    shared: Arc<Mutex<Shared>>,
    fail_start: bool,
}

impl MockKeyListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener whose `start` fails as if the OS denied the hook.
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// Delivers a key-down to the sink as the OS hook would.
    ///
    /// Returns whether the sink consumed it, or `None` when not running.
    pub fn press(&self, key: Key) -> Option<bool> {
        let sink = self.lock().sink.clone()?;
        let mut event = KeyDownEvent::new(key);
        sink.on_key_down(&mut event);
        Some(event.consumed)
    }

    /// Number of effective `start` calls.
    pub fn start_count(&self) -> u32 {
        self.lock().starts
    }

    /// Number of effective `stop` calls.
    pub fn stop_count(&self) -> u32 {
        self.lock().stops
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyListener for MockKeyListener {
    fn start(&mut self, sink: Arc<dyn KeySink>) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::HookInstallFailed("access denied".to_string()));
        }
        let mut shared = self.lock();
        if shared.sink.is_none() {
            shared.sink = Some(sink);
            shared.starts += 1;
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut shared = self.lock();
        if shared.sink.take().is_some() {
            shared.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.lock().sink.is_some()
    }
}
