//! File-system profile store: one `<name>.json` per profile.
//!
//! Profile names come from users, so they are sanitized into file names:
//! characters Windows forbids in file names (`< > : " / \ | ? *`) and control
//! characters become `_`, surrounding whitespace and dots are trimmed, and a
//! name left empty by trimming becomes `profile`. The same mapping is used by
//! save, load and delete, so a name always finds its own file.
//!
//! The directory is created on first save. Saving writes a `.tmp` sibling and
//! renames it over the profile file, so an interrupted save leaves the previous
//! version intact. Listing a directory that does not exist yet yields no
//! profiles, and files whose stem is not a sanitized name are skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clickmap_core::{decode_profile, encode_profile, Profile};
use tracing::debug;

use crate::application::manage_profiles::{ProfileError, ProfileRepository};

const EXTENSION: &str = "json";
const FALLBACK_NAME: &str = "profile";
const TEMP_SUFFIX: &str = ".tmp";

/// Maps a user-facing profile name to a safe file stem.
///
/// # Errors
///
/// [`ProfileError::InvalidName`] if `name` is empty or only whitespace.
pub fn sanitize_profile_name(name: &str) -> Result<String, ProfileError> {
    if name.trim().is_empty() {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    Ok(if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    })
}

/// [`ProfileRepository`] backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a profile called `name` is stored in.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, ProfileError> {
        let stem = sanitize_profile_name(name)?;
        Ok(self.dir.join(format!("{stem}.{EXTENSION}")))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProfileError + '_ {
        move |source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ProfileRepository for ProfileStore {
    fn save(&self, name: &str, profile: &Profile) -> Result<PathBuf, ProfileError> {
        let path = self.path_for(name)?;
        let text = encode_profile(profile).map_err(|e| ProfileError::Encode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;

        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);
        fs::write(&temp, text).map_err(Self::io_error(&temp))?;
        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(&path)(e));
        }
        debug!(profile = %name, path = %path.display(), "profile written");
        Ok(path)
    }

    fn list(&self) -> Result<Vec<String>, ProfileError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.dir)(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(Self::io_error(&self.dir))?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Only names that load back to this same file are listed.
            if sanitize_profile_name(stem).is_ok_and(|s| s == stem) {
                names.push(stem.to_string());
            } else {
                debug!(path = %path.display(), "skipping file with unsanitized name");
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<Profile, ProfileError> {
        let path = self.path_for(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProfileError::NotFound(name.to_string()))
            }
            Err(e) => return Err(Self::io_error(&path)(e)),
        };
        decode_profile(&text).map_err(|e| ProfileError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn delete(&self, name: &str) -> Result<(), ProfileError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ProfileError::NotFound(name.to_string())),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
