//! Key identities and platform key-code translation.
//!
//! [`Key`] is the canonical representation used by the registry and profile
//! files. Platform codes are translated to it at the capture boundary.

pub mod key;
pub mod windows_vk;

pub use key::{Key, ParseKeyError};

/// Key used to abort a pending spawn-point capture.
pub const CANCEL_KEY: Key = Key::Escape;

/// Unified entry point for platform code translation.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a Windows virtual-key code (plus the hook's extended flag).
    pub fn windows_vk_to_key(vk: u8, extended: bool) -> Option<Key> {
        windows_vk::vk_to_key(vk, extended)
    }
}
