//! Linux X11 pointer injection via the XTest extension.
//!
//! `XTestFakeMotionEvent` warps the pointer to absolute root-window pixels
//! and `XTestFakeButtonEvent` presses and releases button 1. The receiving
//! application cannot tell these from physical input. The X root window
//! spans every monitor with its origin at `(0, 0)`.
//!
//! Xlib connections are not thread-safe, so the display pointer is kept
//! behind a mutex and every call takes it.
//!
//! # Permissions
//!
//! The process needs access to the X display named by `DISPLAY`. Wayland
//! sessions without XWayland access are not supported.

use std::os::raw::{c_int, c_uint, c_ulong};
use std::ptr;
use std::sync::Mutex;

use clickmap_core::ScreenPoint;
use tracing::debug;
use x11::{xlib, xtest};

use crate::application::synthesize_click::{ClickError, PointerInjector};

/// `CurrentTime`: let the server timestamp the synthesized event.
const CURRENT_TIME: c_ulong = 0;

/// Screen number meaning "the screen the pointer is on".
const SCREEN_CURRENT: c_int = -1;

/// X11 button number of the left mouse button.
const LEFT_BUTTON: c_uint = 1;

struct Display(*mut xlib::Display);

// SAFETY: the pointer is only dereferenced by Xlib while the owning mutex is
// held, so at most one thread uses the connection at a time.
unsafe impl Send for Display {}

/// Linux X11/XTest implementation of [`PointerInjector`].
pub struct X11PointerInjector {
    display: Mutex<Display>,
}

impl X11PointerInjector {
    /// Connects to the X display and checks for the XTest extension.
    ///
    /// # Errors
    ///
    /// [`ClickError::Unavailable`] if the display cannot be opened or lacks
    /// XTest.
    pub fn open() -> Result<Self, ClickError> {
        // SAFETY: a null name makes Xlib use $DISPLAY.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(ClickError::Unavailable(
                "cannot open X display (is DISPLAY set?)".to_string(),
            ));
        }

        let (mut event_base, mut error_base, mut major, mut minor) = (0, 0, 0, 0);
        // SAFETY: `display` is a live connection; out-params point at locals.
        let has_xtest = unsafe {
            xtest::XTestQueryExtension(display, &mut event_base, &mut error_base, &mut major, &mut minor)
        };
        if has_xtest == 0 {
            // SAFETY: closing the connection opened above.
            unsafe { xlib::XCloseDisplay(display) };
            return Err(ClickError::Unavailable("X server lacks the XTest extension".to_string()));
        }

        debug!(major, minor, "XTest available");
        Ok(Self {
            display: Mutex::new(Display(display)),
        })
    }

    fn with_display<T>(&self, f: impl FnOnce(*mut xlib::Display) -> T) -> Result<T, ClickError> {
        let guard = self
            .display
            .lock()
            .map_err(|_| ClickError::Platform("X display lock poisoned".to_string()))?;
        Ok(f(guard.0))
    }
}

impl PointerInjector for X11PointerInjector {
    fn cursor_position(&self) -> Result<ScreenPoint, ClickError> {
        let found = self.with_display(|dpy| {
            let (mut root, mut child) = (0, 0);
            let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
            let mut mask = 0;
            // SAFETY: `dpy` is live for the duration of the lock; all
            // out-params point at locals.
            let same_screen = unsafe {
                xlib::XQueryPointer(
                    dpy,
                    xlib::XDefaultRootWindow(dpy),
                    &mut root,
                    &mut child,
                    &mut root_x,
                    &mut root_y,
                    &mut win_x,
                    &mut win_y,
                    &mut mask,
                )
            };
            (same_screen != 0).then_some(ScreenPoint::new(root_x, root_y))
        })?;
        found.ok_or_else(|| ClickError::Platform("pointer is on another screen".to_string()))
    }

    fn move_cursor(&self, point: ScreenPoint) -> Result<(), ClickError> {
        self.with_display(|dpy| {
            // SAFETY: `dpy` is live for the duration of the lock.
            unsafe {
                xtest::XTestFakeMotionEvent(dpy, SCREEN_CURRENT, point.x, point.y, CURRENT_TIME);
                xlib::XFlush(dpy);
            }
        })
    }

    fn left_click(&self) -> Result<(), ClickError> {
        self.with_display(|dpy| {
            // SAFETY: `dpy` is live for the duration of the lock.
            unsafe {
                xtest::XTestFakeButtonEvent(dpy, LEFT_BUTTON, xlib::True, CURRENT_TIME);
                xtest::XTestFakeButtonEvent(dpy, LEFT_BUTTON, xlib::False, CURRENT_TIME);
                xlib::XFlush(dpy);
            }
        })
    }

    fn desktop_origin(&self) -> Result<ScreenPoint, ClickError> {
        Ok(ScreenPoint::default())
    }
}

impl Drop for X11PointerInjector {
    fn drop(&mut self) {
        if let Ok(display) = self.display.get_mut() {
            // SAFETY: the connection was opened in `open` and is closed once.
            unsafe { xlib::XCloseDisplay(display.0) };
        }
    }
}
