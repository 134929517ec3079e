//! Storage infrastructure: configuration and profile files.
//!
//! - `config` reads the TOML application config from the platform config
//!   directory, falling back to defaults on first run.
//! - `profile_store` keeps one JSON file per named profile and implements the
//!   application's `ProfileRepository`.

pub mod config;
pub mod profile_store;
