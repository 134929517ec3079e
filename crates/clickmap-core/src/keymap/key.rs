//! Platform-independent key identity.
//!
//! A [`Key`] names a *physical* key position. The discriminant of each variant
//! is its USB HID Usage ID on the Keyboard/Keypad page (0x07), so the same key
//! has the same identity no matter which OS adapter captured it.
//!
//! # String form
//!
//! Profiles store keys by their canonical name, which is the variant name
//! (`"KeyA"`, `"Digit1"`, `"NumpadEnter"`, `"Escape"`). [`Key::from_str`] also
//! accepts the names written by older ClickMapper profile files (`"A"`, `"D1"`,
//! `"NumPad1"`, `"OemComma"`, `"Return"`, ...), so those files keep their key
//! bindings when imported.
//!
//! # Labels
//!
//! [`Key::label`] returns a short (at most three character) caption for
//! drawing on a target marker.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string does not name any known key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name: {0:?}")]
pub struct ParseKeyError(pub String);

macro_rules! define_keys {
    ($($variant:ident = $usage:literal => $label:literal,)*) => {
        /// A physical keyboard key, numbered by its USB HID Usage ID.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Key {
            $($variant = $usage,)*
        }

        impl Key {
            /// Every key, in HID usage order.
            pub const ALL: &'static [Key] = &[$(Key::$variant,)*];

            /// Canonical name used in profile files.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => stringify!($variant),)*
                }
            }

            /// Short caption for a target marker.
            pub fn label(self) -> &'static str {
                match self {
                    $(Key::$variant => $label,)*
                }
            }

            /// Looks up a key by its HID Usage ID.
            pub fn from_usage(usage: u16) -> Option<Key> {
                match usage {
                    $($usage => Some(Key::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_keys! {
    KeyA = 0x04 => "A",
    KeyB = 0x05 => "B",
    KeyC = 0x06 => "C",
    KeyD = 0x07 => "D",
    KeyE = 0x08 => "E",
    KeyF = 0x09 => "F",
    KeyG = 0x0A => "G",
    KeyH = 0x0B => "H",
    KeyI = 0x0C => "I",
    KeyJ = 0x0D => "J",
    KeyK = 0x0E => "K",
    KeyL = 0x0F => "L",
    KeyM = 0x10 => "M",
    KeyN = 0x11 => "N",
    KeyO = 0x12 => "O",
    KeyP = 0x13 => "P",
    KeyQ = 0x14 => "Q",
    KeyR = 0x15 => "R",
    KeyS = 0x16 => "S",
    KeyT = 0x17 => "T",
    KeyU = 0x18 => "U",
    KeyV = 0x19 => "V",
    KeyW = 0x1A => "W",
    KeyX = 0x1B => "X",
    KeyY = 0x1C => "Y",
    KeyZ = 0x1D => "Z",
    Digit1 = 0x1E => "1",
    Digit2 = 0x1F => "2",
    Digit3 = 0x20 => "3",
    Digit4 = 0x21 => "4",
    Digit5 = 0x22 => "5",
    Digit6 = 0x23 => "6",
    Digit7 = 0x24 => "7",
    Digit8 = 0x25 => "8",
    Digit9 = 0x26 => "9",
    Digit0 = 0x27 => "0",
    Enter = 0x28 => "↵",
    Escape = 0x29 => "Esc",
    Backspace = 0x2A => "←",
    Tab = 0x2B => "Tab",
    Space = 0x2C => "␣",
    Minus = 0x2D => "-",
    Equal = 0x2E => "+",
    BracketLeft = 0x2F => "[",
    BracketRight = 0x30 => "]",
    Backslash = 0x31 => "\\",
    Semicolon = 0x33 => ";",
    Quote = 0x34 => "'",
    Backquote = 0x35 => "`",
    Comma = 0x36 => ",",
    Period = 0x37 => ".",
    Slash = 0x38 => "/",
    CapsLock = 0x39 => "Cap",
    F1 = 0x3A => "F1",
    F2 = 0x3B => "F2",
    F3 = 0x3C => "F3",
    F4 = 0x3D => "F4",
    F5 = 0x3E => "F5",
    F6 = 0x3F => "F6",
    F7 = 0x40 => "F7",
    F8 = 0x41 => "F8",
    F9 = 0x42 => "F9",
    F10 = 0x43 => "F10",
    F11 = 0x44 => "F11",
    F12 = 0x45 => "F12",
    PrintScreen = 0x46 => "Prt",
    ScrollLock = 0x47 => "Scr",
    Pause = 0x48 => "Pau",
    Insert = 0x49 => "Ins",
    Home = 0x4A => "Hom",
    PageUp = 0x4B => "PgU",
    Delete = 0x4C => "Del",
    End = 0x4D => "End",
    PageDown = 0x4E => "PgD",
    ArrowRight = 0x4F => "►",
    ArrowLeft = 0x50 => "◄",
    ArrowDown = 0x51 => "▼",
    ArrowUp = 0x52 => "▲",
    NumLock = 0x53 => "Num",
    NumpadDivide = 0x54 => "N/",
    NumpadMultiply = 0x55 => "N*",
    NumpadSubtract = 0x56 => "N-",
    NumpadAdd = 0x57 => "N+",
    NumpadEnter = 0x58 => "N↵",
    Numpad1 = 0x59 => "N1",
    Numpad2 = 0x5A => "N2",
    Numpad3 = 0x5B => "N3",
    Numpad4 = 0x5C => "N4",
    Numpad5 = 0x5D => "N5",
    Numpad6 = 0x5E => "N6",
    Numpad7 = 0x5F => "N7",
    Numpad8 = 0x60 => "N8",
    Numpad9 = 0x61 => "N9",
    Numpad0 = 0x62 => "N0",
    NumpadDecimal = 0x63 => "N.",
    ContextMenu = 0x65 => "App",
    ControlLeft = 0xE0 => "Ctl",
    ShiftLeft = 0xE1 => "Sft",
    AltLeft = 0xE2 => "Alt",
    MetaLeft = 0xE3 => "Win",
    ControlRight = 0xE4 => "Ctl",
    ShiftRight = 0xE5 => "Sft",
    AltRight = 0xE6 => "Alt",
    MetaRight = 0xE7 => "Win",
}

impl Key {
    /// Maps a key name from the original ClickMapper profile format.
    fn from_legacy_name(name: &str) -> Option<Key> {
        let bytes = name.as_bytes();
        if bytes.len() == 1 && bytes[0].is_ascii_uppercase() {
            return Key::from_usage(0x04 + u16::from(bytes[0] - b'A'));
        }
        if let Some(digit) = name.strip_prefix('D').and_then(single_digit) {
            return Some(digit_key(digit));
        }
        if let Some(digit) = name.strip_prefix("NumPad").and_then(single_digit) {
            return Some(numpad_key(digit));
        }
        let key = match name {
            "Return" => Key::Enter,
            "Back" => Key::Backspace,
            "Left" => Key::ArrowLeft,
            "Right" => Key::ArrowRight,
            "Up" => Key::ArrowUp,
            "Down" => Key::ArrowDown,
            "Prior" => Key::PageUp,
            "Next" => Key::PageDown,
            "Capital" => Key::CapsLock,
            "Snapshot" => Key::PrintScreen,
            "Scroll" => Key::ScrollLock,
            "Apps" => Key::ContextMenu,
            "Multiply" => Key::NumpadMultiply,
            "Add" => Key::NumpadAdd,
            "Subtract" => Key::NumpadSubtract,
            "Divide" => Key::NumpadDivide,
            "Decimal" => Key::NumpadDecimal,
            "LeftCtrl" => Key::ControlLeft,
            "RightCtrl" => Key::ControlRight,
            "LeftShift" => Key::ShiftLeft,
            "RightShift" => Key::ShiftRight,
            "LeftAlt" => Key::AltLeft,
            "RightAlt" => Key::AltRight,
            "LWin" => Key::MetaLeft,
            "RWin" => Key::MetaRight,
            "OemComma" => Key::Comma,
            "OemPeriod" => Key::Period,
            "OemMinus" => Key::Minus,
            "OemPlus" => Key::Equal,
            "OemSemicolon" | "Oem1" => Key::Semicolon,
            "OemQuestion" | "Oem2" => Key::Slash,
            "OemTilde" | "Oem3" => Key::Backquote,
            "OemOpenBrackets" | "Oem4" => Key::BracketLeft,
            "OemPipe" | "Oem5" => Key::Backslash,
            "OemCloseBrackets" | "Oem6" => Key::BracketRight,
            "OemQuotes" | "Oem7" => Key::Quote,
            _ => return None,
        };
        Some(key)
    }
}

fn single_digit(rest: &str) -> Option<u8> {
    match rest.as_bytes() {
        [d] if d.is_ascii_digit() => Some(d - b'0'),
        _ => None,
    }
}

fn digit_key(digit: u8) -> Key {
    match digit {
        0 => Key::Digit0,
        1 => Key::Digit1,
        2 => Key::Digit2,
        3 => Key::Digit3,
        4 => Key::Digit4,
        5 => Key::Digit5,
        6 => Key::Digit6,
        7 => Key::Digit7,
        8 => Key::Digit8,
        _ => Key::Digit9,
    }
}

fn numpad_key(digit: u8) -> Key {
    match digit {
        0 => Key::Numpad0,
        1 => Key::Numpad1,
        2 => Key::Numpad2,
        3 => Key::Numpad3,
        4 => Key::Numpad4,
        5 => Key::Numpad5,
        6 => Key::Numpad6,
        7 => Key::Numpad7,
        8 => Key::Numpad8,
        _ => Key::Numpad9,
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Key::ALL
            .iter()
            .copied()
            .find(|k| k.name() == trimmed)
            .or_else(|| Key::from_legacy_name(trimmed))
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}
