//! Named profile storage, as seen by the controller.
//!
//! The controller only knows the [`ProfileRepository`] trait. The file-system
//! implementation is `infrastructure::storage::profile_store::ProfileStore`;
//! an in-memory one backs tests and dry runs.

use std::path::PathBuf;

use clickmap_core::Profile;
use thiserror::Error;

/// Error type for profile persistence.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile {0:?} not found")]
    NotFound(String),

    #[error("profile {name:?} is malformed: {reason}")]
    Parse { name: String, reason: String },

    #[error("profile {name:?} could not be encoded: {reason}")]
    Encode { name: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile name: {0:?}")]
    InvalidName(String),
}

/// Storage of named [`Profile`]s.
///
/// Names are user-facing; implementations map them to storage keys and must
/// map a name the same way on save, load and delete.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileRepository: Send {
    /// Writes `profile` under `name`, replacing any existing one. Returns the
    /// location it was written to.
    fn save(&self, name: &str, profile: &Profile) -> Result<PathBuf, ProfileError>;

    /// Names of all stored profiles, sorted.
    fn list(&self) -> Result<Vec<String>, ProfileError>;

    /// Reads the profile stored under `name`.
    fn load(&self, name: &str) -> Result<Profile, ProfileError>;

    /// Removes the profile stored under `name`.
    fn delete(&self, name: &str) -> Result<(), ProfileError>;
}
