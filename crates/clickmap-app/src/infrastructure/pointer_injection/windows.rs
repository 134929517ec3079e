//! Windows pointer injection via `SetCursorPos` and `SendInput`.
//!
//! `SetCursorPos` takes absolute virtual-desktop pixels directly, including
//! negative coordinates on monitors left of or above the primary one, so no
//! normalisation to the 0..65535 `MOUSEEVENTF_ABSOLUTE` range is needed.

#![cfg(target_os = "windows")]

use clickmap_core::ScreenPoint;
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSE_EVENT_FLAGS, MOUSEINPUT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SetCursorPos, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

use crate::application::synthesize_click::{ClickError, PointerInjector};

/// Windows implementation of [`PointerInjector`].
#[derive(Debug, Default)]
pub struct WindowsPointerInjector;

impl WindowsPointerInjector {
    pub fn new() -> Self {
        Self
    }
}

impl PointerInjector for WindowsPointerInjector {
    fn cursor_position(&self) -> Result<ScreenPoint, ClickError> {
        let mut point = POINT::default();
        // SAFETY: `point` is a valid, writable POINT on the stack.
        unsafe { GetCursorPos(&mut point) }
            .map_err(|e| ClickError::Platform(format!("GetCursorPos failed: {e}")))?;
        Ok(ScreenPoint::new(point.x, point.y))
    }

    fn move_cursor(&self, point: ScreenPoint) -> Result<(), ClickError> {
        // SAFETY: SetCursorPos has no pointer arguments.
        unsafe { SetCursorPos(point.x, point.y) }
            .map_err(|e| ClickError::Platform(format!("SetCursorPos failed: {e}")))
    }

    fn left_click(&self) -> Result<(), ClickError> {
        let inputs = [
            mouse_input(MOUSEEVENTF_LEFTDOWN),
            mouse_input(MOUSEEVENTF_LEFTUP),
        ];
        // SAFETY: `inputs` is a valid slice of INPUT structures and the size
        // argument matches the element type.
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(ClickError::Platform(format!(
                "SendInput injected {sent} of {} events: {}",
                inputs.len(),
                std::io::Error::last_os_error()
            )));
        }
        Ok(())
    }

    fn desktop_origin(&self) -> Result<ScreenPoint, ClickError> {
        // SAFETY: GetSystemMetrics is always safe to call.
        let (x, y) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
            )
        };
        Ok(ScreenPoint::new(x, y))
    }
}

/// A relative mouse event with no movement, carrying only `flags`.
fn mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}
