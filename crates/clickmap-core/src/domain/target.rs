//! Click target entity.

use std::fmt;

use super::geometry::CanvasPoint;
use crate::keymap::Key;

/// Identifier of a click target.
///
/// Allocated from the registry's monotonic counter; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An on-screen point optionally bound to one key.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickTarget {
    pub id: TargetId,
    /// Top-left corner in canvas-local coordinates.
    pub position: CanvasPoint,
    pub key: Option<Key>,
}

impl ClickTarget {
    /// Creates an unkeyed target.
    pub fn new(id: TargetId, position: CanvasPoint) -> Self {
        Self {
            id,
            position,
            key: None,
        }
    }

    /// Builder-style helper that binds `key`.
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Caption for the target marker: the key label, or `?` when unbound.
    pub fn caption(&self) -> &'static str {
        self.key.map_or("?", Key::label)
    }
}
