//! Application layer: use cases that orchestrate the domain.
//!
//! Nothing here calls the OS or touches the file system. Platform
//! capabilities arrive as trait objects:
//!
//! - **`synthesize_click`** – moves the pointer and clicks, through a
//!   [`synthesize_click::PointerInjector`].
//! - **`manage_profiles`** – the [`manage_profiles::ProfileRepository`]
//!   abstraction over named profile storage.
//! - **`mode_controller`** – the Edit/Play state machine that owns the
//!   registry and decides, for every key-down, whether to consume it and
//!   whether to click.

pub mod manage_profiles;
pub mod mode_controller;
pub mod synthesize_click;
