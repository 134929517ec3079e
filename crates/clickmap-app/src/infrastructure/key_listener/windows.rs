//! Windows low-level keyboard hook.
//!
//! `WH_KEYBOARD_LL` callbacks are delivered on the thread that installed the
//! hook, and only while that thread pumps messages. [`WindowsKeyListener`]
//! therefore owns a dedicated thread that installs the hook, reports success
//! or failure back to `start`, then runs `GetMessageW` until `stop` posts
//! `WM_QUIT` to it. The hook is removed on that same thread before it exits.
//!
//! The OS callback has no user-data pointer, so the active sink sits in a
//! module-private static. Only one listener can be active per process.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use clickmap_core::KeyMapper;
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS,
    LLKHF_EXTENDED, MSG, PM_NOREMOVE, WH_KEYBOARD_LL, WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN,
};

use super::{CaptureError, KeyDownEvent, KeyListener, KeySink};

/// Sink of the active listener; `None` while no hook is installed.
static ACTIVE_SINK: Mutex<Option<Arc<dyn KeySink>>> = Mutex::new(None);

struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

/// Global key listener backed by `WH_KEYBOARD_LL`.
///
/// Dropping a running listener stops it.
#[derive(Default)]
pub struct WindowsKeyListener {
    worker: Option<HookThread>,
}

impl WindowsKeyListener {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyListener for WindowsKeyListener {
    fn start(&mut self, sink: Arc<dyn KeySink>) -> Result<(), CaptureError> {
        if self.worker.is_some() {
            return Ok(());
        }

        {
            let mut slot = ACTIVE_SINK.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return Err(CaptureError::AlreadyActive);
            }
            *slot = Some(sink);
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
        let spawned = thread::Builder::new()
            .name("clickmap-key-hook".to_string())
            .spawn(move || run_hook_thread(ready_tx));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                clear_sink();
                return Err(CaptureError::HookInstallFailed(e.to_string()));
            }
        };

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                info!(thread_id, "keyboard hook installed");
                self.worker = Some(HookThread { thread_id, handle });
                Ok(())
            }
            Ok(Err(reason)) => {
                let _ = handle.join();
                clear_sink();
                Err(CaptureError::HookInstallFailed(reason))
            }
            Err(_) => {
                let _ = handle.join();
                clear_sink();
                Err(CaptureError::HookInstallFailed(
                    "hook thread exited before reporting".to_string(),
                ))
            }
        }
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // SAFETY: posting to a thread id is valid even if that thread has
        // already exited; the call then fails and we only log it.
        let posted = unsafe { PostThreadMessageW(worker.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        match posted {
            Ok(()) => {
                if worker.handle.join().is_err() {
                    warn!("keyboard hook thread panicked");
                }
            }
            // The thread keeps its message loop; leave it detached.
            Err(e) => warn!("failed to signal keyboard hook thread: {e}"),
        }

        clear_sink();
        debug!("keyboard hook removed");
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for WindowsKeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn clear_sink() {
    *ACTIVE_SINK.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Body of the hook thread: install, report, pump, uninstall.
fn run_hook_thread(ready: mpsc::Sender<Result<u32, String>>) {
    // SAFETY: GetCurrentThreadId has no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };

    // SAFETY: the hook procedure is a valid `extern "system"` fn for the whole
    // process lifetime; hmod is None because the proc lives in this module.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    let mut msg = MSG::default();
    // SAFETY: forces creation of this thread's message queue so that a
    // WM_QUIT posted right after `start` returns is not lost.
    unsafe {
        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
    }

    if ready.send(Ok(thread_id)).is_err() {
        // SAFETY: `hook` was returned by SetWindowsHookExW on this thread.
        unsafe {
            let _ = UnhookWindowsHookEx(hook);
        }
        return;
    }

    // SAFETY: standard Win32 GetMessage/DispatchMessage loop. GetMessageW
    // returns 0 on WM_QUIT and -1 on error; both end the loop.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            DispatchMessageW(&msg);
        }
        let _ = UnhookWindowsHookEx(hook);
    }
}

/// Offers a key-down to the active sink. Returns whether it was consumed.
fn deliver(event: &mut KeyDownEvent) -> bool {
    let sink = ACTIVE_SINK
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match sink {
        Some(sink) => {
            sink.on_key_down(event);
            event.consumed
        }
        None => false,
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook thread. Must return quickly or the OS
/// removes the hook.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        let message = w_param.0 as u32;
        if message == WM_KEYDOWN || message == WM_SYSKEYDOWN {
            // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
            let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
            let extended = (kbs.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0);

            if let Some(key) = KeyMapper::windows_vk_to_key(kbs.vkCode as u8, extended) {
                let mut event = KeyDownEvent::new(key);
                if deliver(&mut event) {
                    return LRESULT(1);
                }
            }
        }
    }

    // SAFETY: forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
