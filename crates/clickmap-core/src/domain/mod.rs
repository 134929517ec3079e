//! Domain model: pure data and rules, no I/O.
//!
//! - **`target`** – a click target and its identifier.
//! - **`registry`** – the ordered target collection plus the key index.
//! - **`geometry`** – canvas-local and virtual-desktop coordinates.
//! - **`profile`** – the persisted snapshot and its JSON schema.

pub mod geometry;
pub mod profile;
pub mod registry;
pub mod target;
