//! Windows Virtual-Key code → [`Key`] translation.
//!
//! The low-level keyboard hook reports side-specific modifier codes
//! (`VK_LSHIFT = 0xA0`, ...), never the generic `VK_SHIFT`, so only the
//! side-specific codes are mapped. Numpad Enter shares `VK_RETURN` with the
//! main Enter key and is told apart by the hook's extended-key flag.
//!
//! Reference: <https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes>

use super::key::Key;

/// `VK_RETURN`; Numpad Enter when the extended flag is set.
pub const VK_RETURN: u8 = 0x0D;

/// `(vk, key)` pairs. Each key appears at most once.
const VK_TABLE: &[(u8, Key)] = &[
    (0x08, Key::Backspace),
    (0x09, Key::Tab),
    (VK_RETURN, Key::Enter),
    (0x13, Key::Pause),
    (0x14, Key::CapsLock),
    (0x1B, Key::Escape),
    (0x20, Key::Space),
    (0x21, Key::PageUp),
    (0x22, Key::PageDown),
    (0x23, Key::End),
    (0x24, Key::Home),
    (0x25, Key::ArrowLeft),
    (0x26, Key::ArrowUp),
    (0x27, Key::ArrowRight),
    (0x28, Key::ArrowDown),
    (0x2C, Key::PrintScreen),
    (0x2D, Key::Insert),
    (0x2E, Key::Delete),
    (0x30, Key::Digit0),
    (0x31, Key::Digit1),
    (0x32, Key::Digit2),
    (0x33, Key::Digit3),
    (0x34, Key::Digit4),
    (0x35, Key::Digit5),
    (0x36, Key::Digit6),
    (0x37, Key::Digit7),
    (0x38, Key::Digit8),
    (0x39, Key::Digit9),
    (0x41, Key::KeyA),
    (0x42, Key::KeyB),
    (0x43, Key::KeyC),
    (0x44, Key::KeyD),
    (0x45, Key::KeyE),
    (0x46, Key::KeyF),
    (0x47, Key::KeyG),
    (0x48, Key::KeyH),
    (0x49, Key::KeyI),
    (0x4A, Key::KeyJ),
    (0x4B, Key::KeyK),
    (0x4C, Key::KeyL),
    (0x4D, Key::KeyM),
    (0x4E, Key::KeyN),
    (0x4F, Key::KeyO),
    (0x50, Key::KeyP),
    (0x51, Key::KeyQ),
    (0x52, Key::KeyR),
    (0x53, Key::KeyS),
    (0x54, Key::KeyT),
    (0x55, Key::KeyU),
    (0x56, Key::KeyV),
    (0x57, Key::KeyW),
    (0x58, Key::KeyX),
    (0x59, Key::KeyY),
    (0x5A, Key::KeyZ),
    (0x5B, Key::MetaLeft),
    (0x5C, Key::MetaRight),
    (0x5D, Key::ContextMenu),
    (0x60, Key::Numpad0),
    (0x61, Key::Numpad1),
    (0x62, Key::Numpad2),
    (0x63, Key::Numpad3),
    (0x64, Key::Numpad4),
    (0x65, Key::Numpad5),
    (0x66, Key::Numpad6),
    (0x67, Key::Numpad7),
    (0x68, Key::Numpad8),
    (0x69, Key::Numpad9),
    (0x6A, Key::NumpadMultiply),
    (0x6B, Key::NumpadAdd),
    (0x6D, Key::NumpadSubtract),
    (0x6E, Key::NumpadDecimal),
    (0x6F, Key::NumpadDivide),
    (0x70, Key::F1),
    (0x71, Key::F2),
    (0x72, Key::F3),
    (0x73, Key::F4),
    (0x74, Key::F5),
    (0x75, Key::F6),
    (0x76, Key::F7),
    (0x77, Key::F8),
    (0x78, Key::F9),
    (0x79, Key::F10),
    (0x7A, Key::F11),
    (0x7B, Key::F12),
    (0x90, Key::NumLock),
    (0x91, Key::ScrollLock),
    (0xA0, Key::ShiftLeft),
    (0xA1, Key::ShiftRight),
    (0xA2, Key::ControlLeft),
    (0xA3, Key::ControlRight),
    (0xA4, Key::AltLeft),
    (0xA5, Key::AltRight),
    (0xBA, Key::Semicolon),
    (0xBB, Key::Equal),
    (0xBC, Key::Comma),
    (0xBD, Key::Minus),
    (0xBE, Key::Period),
    (0xBF, Key::Slash),
    (0xC0, Key::Backquote),
    (0xDB, Key::BracketLeft),
    (0xDC, Key::Backslash),
    (0xDD, Key::BracketRight),
    (0xDE, Key::Quote),
];

/// Dense lookup built from [`VK_TABLE`] at compile time; the hook hits this
/// on every key-down.
const VK_LOOKUP: [Option<Key>; 256] = {
    let mut lookup = [None; 256];
    let mut i = 0;
    while i < VK_TABLE.len() {
        let (vk, key) = VK_TABLE[i];
        lookup[vk as usize] = Some(key);
        i += 1;
    }
    lookup
};

/// Translates a virtual-key code from the keyboard hook.
///
/// Returns `None` for codes without a keyboard key (mouse buttons, media keys).
pub fn vk_to_key(vk: u8, extended: bool) -> Option<Key> {
    if vk == VK_RETURN && extended {
        return Some(Key::NumpadEnter);
    }
    VK_LOOKUP[vk as usize]
}
