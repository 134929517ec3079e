//! Platform pointer injection.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`; [`platform_injector`] returns it behind the
//! application's [`PointerInjector`] trait.

use std::sync::Arc;

use crate::application::synthesize_click::{ClickError, PointerInjector};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

/// Opens the pointer injector for the platform this binary was built for.
///
/// # Errors
///
/// [`ClickError::Unavailable`] when the platform has no injector or the
/// display server cannot be reached.
pub fn platform_injector() -> Result<Arc<dyn PointerInjector>, ClickError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsPointerInjector::new()))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(linux::X11PointerInjector::open()?))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    {
        Err(ClickError::Unavailable(format!(
            "no pointer injector for {}",
            std::env::consts::OS
        )))
    }
}
