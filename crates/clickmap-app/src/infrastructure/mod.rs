//! Infrastructure layer: OS-facing adapters and the controller host.
//!
//! Contains the global key listener, pointer injection, profile and config
//! storage, the thread that owns the controller, and the UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `clickmap_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod controller_host;
pub mod key_listener;
pub mod pointer_injection;
pub mod storage;
pub mod ui_bridge;
