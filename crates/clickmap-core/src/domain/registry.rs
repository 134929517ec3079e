//! Target registry: the live set of click targets and the key index.
//!
//! # Single-owner invariant
//!
//! The registry keeps two structures in lock-step:
//!
//! - `targets`: every [`ClickTarget`] keyed by id (ordered by id, which is
//!   also creation order because ids are monotonic);
//! - `by_key`: a reverse index from [`Key`] to the id of the target holding it.
//!
//! `by_key` is always exactly the set of `(key, id)` pairs found in `targets`.
//! A key therefore belongs to at most one target, and assigning a key that is
//! already taken moves it to the new owner ("displace and clear"). The
//! invariant is re-checked after every mutation in debug builds; a violation
//! is a programming error and panics.
//!
//! # Id counter
//!
//! `last_id` only ever grows. Removing a target does not free its id, and
//! [`TargetRegistry::clear`] keeps the counter so that ids from a previously
//! loaded profile are never handed out again during the same process.
//! Ids stop at [`MAX_TARGET_ID`]; once the counter reaches it, [`TargetRegistry::add`]
//! fails instead of wrapping.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::geometry::CanvasPoint;
use super::target::{ClickTarget, TargetId};
use crate::keymap::Key;

/// Largest id the registry hands out or accepts.
pub const MAX_TARGET_ID: u32 = i32::MAX as u32;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no click target with id {0}")]
    UnknownTarget(TargetId),
    #[error("target id {0} is above the maximum of {max}", max = MAX_TARGET_ID)]
    IdOutOfRange(u32),
    #[error("all target ids are used up")]
    IdsExhausted,
}

/// Ordered collection of click targets with an O(1) key lookup.
#[derive(Debug, Default, Clone)]
pub struct TargetRegistry {
    targets: BTreeMap<TargetId, ClickTarget>,
    by_key: HashMap<Key, TargetId>,
    last_id: u32,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unkeyed target at `position` and returns its id.
    ///
    /// # Errors
    ///
    /// [`RegistryError::IdsExhausted`] once [`MAX_TARGET_ID`] has been handed
    /// out or loaded.
    pub fn add(&mut self, position: CanvasPoint) -> Result<TargetId, RegistryError> {
        if self.last_id >= MAX_TARGET_ID {
            return Err(RegistryError::IdsExhausted);
        }
        self.last_id += 1;
        let id = TargetId(self.last_id);
        self.targets.insert(id, ClickTarget::new(id, position));
        self.check_invariants();
        Ok(id)
    }

    /// Deletes a target together with its key binding.
    ///
    /// Returns the removed target, or `None` if `id` was not present.
    pub fn remove(&mut self, id: TargetId) -> Option<ClickTarget> {
        let removed = self.targets.remove(&id)?;
        if let Some(key) = removed.key {
            self.by_key.remove(&key);
        }
        self.check_invariants();
        Some(removed)
    }

    /// Moves a target to a new canvas position.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownTarget`] if `id` is not present.
    pub fn move_to(&mut self, id: TargetId, position: CanvasPoint) -> Result<(), RegistryError> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(RegistryError::UnknownTarget(id))?;
        target.position = position;
        Ok(())
    }

    /// Binds `key` to target `id`, enforcing the single-owner invariant.
    ///
    /// If another target held `key`, its binding is cleared and its id is
    /// returned. Any key previously held by `id` is released.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownTarget`] if `id` is not present; the registry is
    /// left unchanged in that case.
    pub fn assign_key(&mut self, id: TargetId, key: Key) -> Result<Option<TargetId>, RegistryError> {
        let previous = self
            .targets
            .get(&id)
            .ok_or(RegistryError::UnknownTarget(id))?
            .key;
        if previous == Some(key) {
            return Ok(None);
        }

        let displaced = self.by_key.get(&key).copied();
        if let Some(other) = displaced {
            if let Some(t) = self.targets.get_mut(&other) {
                t.key = None;
            }
        }
        if let Some(old_key) = previous {
            self.by_key.remove(&old_key);
        }

        self.by_key.insert(key, id);
        if let Some(t) = self.targets.get_mut(&id) {
            t.key = Some(key);
        }
        self.check_invariants();
        Ok(displaced)
    }

    /// Clears the key held by `id`, returning it.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownTarget`] if `id` is not present.
    pub fn unassign_key(&mut self, id: TargetId) -> Result<Option<Key>, RegistryError> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(RegistryError::UnknownTarget(id))?;
        let released = target.key.take();
        if let Some(key) = released {
            self.by_key.remove(&key);
        }
        self.check_invariants();
        Ok(released)
    }

    /// Returns the id of the target bound to `key`.
    pub fn lookup_by_key(&self, key: Key) -> Option<TargetId> {
        self.by_key.get(&key).copied()
    }

    pub fn get(&self, id: TargetId) -> Option<&ClickTarget> {
        self.targets.get(&id)
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    /// Iterates targets in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ClickTarget> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Copies all targets, in id order.
    pub fn snapshot(&self) -> Vec<ClickTarget> {
        self.targets.values().cloned().collect()
    }

    /// Removes every target and key binding. The id counter is kept.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.by_key.clear();
    }

    /// Replaces the whole registry with `targets` (clear, then rebuild).
    ///
    /// The counter advances to at least the largest loaded id. If two loaded
    /// targets claim the same key, the later one keeps it. A repeated id
    /// replaces the earlier entry.
    ///
    /// # Errors
    ///
    /// [`RegistryError::IdOutOfRange`] if any id is above [`MAX_TARGET_ID`];
    /// the registry is left unchanged in that case.
    pub fn replace_all(
        &mut self,
        targets: impl IntoIterator<Item = ClickTarget>,
    ) -> Result<(), RegistryError> {
        let targets: Vec<ClickTarget> = targets.into_iter().collect();
        if let Some(t) = targets.iter().find(|t| t.id.0 > MAX_TARGET_ID) {
            return Err(RegistryError::IdOutOfRange(t.id.0));
        }
        self.clear();
        for target in targets {
            self.last_id = self.last_id.max(target.id.0);
            let id = target.id;
            let key = target.key;
            if let Some(old) = self.targets.insert(id, ClickTarget::new(id, target.position)) {
                if let Some(old_key) = old.key {
                    self.by_key.remove(&old_key);
                }
            }
            if let Some(key) = key {
                // `id` was just inserted, so this cannot fail.
                let _ = self.assign_key(id, key);
            }
        }
        self.check_invariants();
        Ok(())
    }

    /// Panics if the reverse index disagrees with the target list.
    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for (key, id) in &self.by_key {
            let holder = self.targets.get(id).and_then(|t| t.key);
            assert_eq!(
                holder,
                Some(*key),
                "key index maps {key} to {id}, but that target holds {holder:?}"
            );
        }
        let keyed = self.targets.values().filter(|t| t.key.is_some()).count();
        assert_eq!(
            keyed,
            self.by_key.len(),
            "{keyed} targets hold keys but the key index has {} entries",
            self.by_key.len()
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
