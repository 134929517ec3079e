//! # clickmap-core
//!
//! Platform-independent building blocks for ClickMap: the click-target
//! registry, canvas geometry, the persisted profile schema and key identities.
//!
//! Nothing in this crate talks to the OS. The application crate wires these
//! types to a keyboard hook, a pointer injector and the file system.
//!
//! - **`domain`** – targets, the key→target registry with its single-owner
//!   invariant, canvas→screen coordinate resolution, and the profile document.
//! - **`keymap`** – the [`Key`] enum (HID-numbered) and platform code tables.

pub mod domain;
pub mod keymap;

pub use domain::geometry::{CanvasGeometry, CanvasPoint, ScreenPoint};
pub use domain::profile::{decode_profile, encode_profile, Profile, ProfileFormatError};
pub use domain::registry::{RegistryError, TargetRegistry, MAX_TARGET_ID};
pub use domain::target::{ClickTarget, TargetId};
pub use keymap::{Key, KeyMapper, CANCEL_KEY};
