//! Controller host: the thread that owns the [`ModeController`].
//!
//! # Threads
//!
//! ```text
//!  OS hook thread                 clickmap-controller thread
//!  ──────────────                 ──────────────────────────
//!  HostSink::on_key_down ──KeyDown──▶ handle_key_down(key)
//!        │ recv_timeout(budget)  ◀──decision──┘
//!        ▼                                    perform(decision)   (click)
//!  consume / pass through
//!
//!  UI / main ──ControllerHandle::with_controller(f)──▶ f(&mut controller)
//! ```
//!
//! Every mutation runs on the controller thread, in arrival order. Each
//! key-down carries a one-shot claim flag. The controller claims it before
//! deciding; the hook thread claims it when the decision budget runs out and
//! then lets the key through. Whichever side claims first owns the key: a
//! key-down abandoned by the hook is dropped without effect, and once the
//! controller has claimed one the hook waits for its decision.
//!
//! # Lifecycle
//!
//! [`ControllerHost::init`] spawns the thread and starts the listener.
//! [`ControllerHost::teardown`] stops the listener, then shuts the thread
//! down and joins it. It runs on `Drop` too and is safe to repeat.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clickmap_core::Key;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::key_listener::{CaptureError, KeyDownEvent, KeyListener, KeySink};
use crate::application::mode_controller::{KeyDecision, ModeController};

/// Error type for the controller host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("key listener failed to start: {0}")]
    Capture(#[from] CaptureError),
    #[error("failed to spawn controller thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("controller thread is not running")]
    Stopped,
}

type ControllerCall = Box<dyn FnOnce(&mut ModeController) + Send>;

enum Command {
    KeyDown {
        key: Key,
        claimed: Arc<AtomicBool>,
        reply: Sender<KeyDecision>,
    },
    Call(ControllerCall),
    Shutdown,
}

/// Cloneable access to the controller from any thread.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: Sender<Command>,
}

impl ControllerHandle {
    /// Runs `f` on the controller thread and returns its result.
    ///
    /// Blocks until the controller has processed every earlier command.
    ///
    /// # Errors
    ///
    /// [`HostError::Stopped`] once the host has been torn down.
    pub fn with_controller<R, F>(&self, f: F) -> Result<R, HostError>
    where
        R: Send + 'static,
        F: FnOnce(&mut ModeController) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        let call: ControllerCall = Box::new(move |controller| {
            let _ = reply_tx.send(f(controller));
        });
        self.tx
            .send(Command::Call(call))
            .map_err(|_| HostError::Stopped)?;
        reply_rx.recv().map_err(|_| HostError::Stopped)
    }

    /// Submits a key-down and waits up to `budget` for the decision.
    ///
    /// Returns `None` when the budget ran out before the controller took the
    /// key, or the host is stopped; the caller should then let the key
    /// through. A key the controller took in time always gets its decision.
    pub fn key_down(&self, key: Key, budget: Duration) -> Option<KeyDecision> {
        let (reply, decision) = mpsc::channel();
        let claimed = Arc::new(AtomicBool::new(false));
        let command = Command::KeyDown {
            key,
            claimed: Arc::clone(&claimed),
            reply,
        };
        self.tx.send(command).ok()?;
        match decision.recv_timeout(budget) {
            Ok(decision) => Some(decision),
            Err(RecvTimeoutError::Timeout) => {
                if claimed.swap(true, Ordering::AcqRel) {
                    // The controller is already deciding this key.
                    return decision.recv().ok();
                }
                warn!(key = %key, budget_ms = budget.as_millis() as u64, "controller too slow, passing key through");
                None
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// [`KeySink`] that forwards key-downs to the controller thread.
pub struct HostSink {
    handle: ControllerHandle,
    budget: Duration,
}

impl HostSink {
    pub fn new(handle: ControllerHandle, budget: Duration) -> Self {
        Self { handle, budget }
    }
}

impl KeySink for HostSink {
    fn on_key_down(&self, event: &mut KeyDownEvent) {
        if let Some(decision) = self.handle.key_down(event.key, self.budget) {
            if decision.is_consumed() {
                event.consume();
            }
        }
    }
}

/// Owns the controller thread and the key listener feeding it.
pub struct ControllerHost {
    handle: ControllerHandle,
    listener: Box<dyn KeyListener>,
    thread: Option<JoinHandle<()>>,
}

impl ControllerHost {
    /// Moves `controller` onto its own thread and starts `listener` with a
    /// [`HostSink`] using `decision_budget`.
    ///
    /// # Errors
    ///
    /// [`HostError::Spawn`] if the thread cannot be created and
    /// [`HostError::Capture`] if the listener fails to start. Nothing is left
    /// running on error.
    pub fn init(
        controller: ModeController,
        listener: Box<dyn KeyListener>,
        decision_budget: Duration,
    ) -> Result<Self, HostError> {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("clickmap-controller".to_string())
            .spawn(move || run_controller(controller, rx))
            .map_err(HostError::Spawn)?;

        let mut host = Self {
            handle: ControllerHandle { tx },
            listener,
            thread: Some(thread),
        };
        let sink = Arc::new(HostSink::new(host.handle.clone(), decision_budget));
        host.listener.start(sink)?;
        info!(budget_ms = decision_budget.as_millis() as u64, "controller host started");
        Ok(host)
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_running()
    }

    /// Stops the listener and joins the controller thread.
    pub fn teardown(&mut self) {
        self.listener.stop();
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.tx.send(Command::Shutdown);
            if thread.join().is_err() {
                error!("controller thread panicked");
            }
            info!("controller host stopped");
        }
    }
}

impl Drop for ControllerHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn run_controller(mut controller: ModeController, rx: mpsc::Receiver<Command>) {
    while let Ok(command) = rx.recv() {
        match command {
            Command::KeyDown {
                key,
                claimed,
                reply,
            } => {
                if claimed.swap(true, Ordering::AcqRel) {
                    debug!(key = %key, "dropping key-down the hook already passed through");
                    continue;
                }
                let decision = controller.handle_key_down(key);
                let _ = reply.send(decision);
                controller.perform(decision);
            }
            Command::Call(call) => call(&mut controller),
            Command::Shutdown => break,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
