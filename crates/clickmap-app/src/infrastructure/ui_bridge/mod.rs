//! Command bridge: exposes controller operations to a front-end.
//!
//! Every function takes a [`ControllerHandle`], runs its work on the
//! controller thread and answers with a [`CommandResult`], so a front-end
//! always receives the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.
//!
//! Targets and layouts cross the boundary as DTOs holding only plain JSON
//! types. Keys travel as their canonical names (`"KeyA"`, `"NumpadEnter"`).
//!
//! [`TracingViewNotifier`] is the view used when no front-end is attached: it
//! writes the controller's outbound signals to the log.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use clickmap_core::{CanvasPoint, ClickTarget, Key, Profile, ScreenPoint, TargetId};

use super::controller_host::ControllerHandle;
use crate::application::mode_controller::{
    ControllerError, ControllerSnapshot, Mode, ModeController, ViewNotifier,
};
use crate::application::synthesize_click::ClickError;

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One target as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDto {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    /// Canonical key name, `None` when unbound.
    pub key: Option<String>,
    /// Marker caption: the key label or `?`.
    pub caption: String,
}

impl From<&ClickTarget> for TargetDto {
    fn from(t: &ClickTarget) -> Self {
        Self {
            id: t.id.0,
            x: t.position.x,
            y: t.position.y,
            key: t.key.map(|k| k.name().to_string()),
            caption: t.caption().to_string(),
        }
    }
}

/// Full controller state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDto {
    /// `"edit"` or `"play"`.
    pub mode: String,
    pub spawn_x: f64,
    pub spawn_y: f64,
    pub targets: Vec<TargetDto>,
    pub pending_assignment: Option<u32>,
    pub capturing_spawn: bool,
}

impl From<&ControllerSnapshot> for LayoutDto {
    fn from(s: &ControllerSnapshot) -> Self {
        Self {
            mode: s.mode.to_string(),
            spawn_x: s.spawn_position.x,
            spawn_y: s.spawn_position.y,
            targets: s.targets.iter().map(TargetDto::from).collect(),
            pending_assignment: s.pending_assignment.map(|id| id.0),
            capturing_spawn: s.capturing_spawn,
        }
    }
}

/// A profile as returned by [`load_profile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub spawn_x: f64,
    pub spawn_y: f64,
    pub targets: Vec<TargetDto>,
}

impl From<&Profile> for ProfileDto {
    fn from(p: &Profile) -> Self {
        Self {
            spawn_x: p.spawn_position.x,
            spawn_y: p.spawn_position.y,
            targets: p.targets.iter().map(TargetDto::from).collect(),
        }
    }
}

/// Unified response wrapper for bridge commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

impl<T: Serialize, E: std::fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Runs `f` on the controller thread, flattening both error layers.
fn run<T, F>(handle: &ControllerHandle, f: F) -> CommandResult<T>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&mut ModeController) -> Result<T, ControllerError> + Send + 'static,
{
    match handle.with_controller(f) {
        Ok(result) => result.into(),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the current mode, spawn point, targets and capture state.
pub fn get_layout(handle: &ControllerHandle) -> CommandResult<LayoutDto> {
    run(handle, |c| Ok(LayoutDto::from(&c.snapshot())))
}

/// Creates a target at canvas position `(x, y)`. Returns its id.
pub fn add_target(handle: &ControllerHandle, x: f64, y: f64) -> CommandResult<u32> {
    run(handle, move |c| Ok(c.add_target(CanvasPoint::new(x, y))?.0))
}

/// Creates a target next to the spawn point. Returns its id.
pub fn add_target_at_spawn(handle: &ControllerHandle) -> CommandResult<u32> {
    run(handle, |c| Ok(c.add_target_at_spawn()?.0))
}

/// Deletes a target. `data` is `false` if it did not exist.
pub fn remove_target(handle: &ControllerHandle, id: u32) -> CommandResult<bool> {
    run(handle, move |c| Ok(c.remove_target(TargetId(id))))
}

pub fn move_target(handle: &ControllerHandle, id: u32, x: f64, y: f64) -> CommandResult<()> {
    run(handle, move |c| c.move_target(TargetId(id), CanvasPoint::new(x, y)))
}

/// Binds the next key pressed to target `id`.
pub fn request_assign_key(handle: &ControllerHandle, id: u32) -> CommandResult<()> {
    run(handle, move |c| c.request_assign_key(TargetId(id)))
}

/// Abandons a pending assignment. `data` is the target that was waiting.
pub fn cancel_assign_key(handle: &ControllerHandle) -> CommandResult<Option<u32>> {
    run(handle, |c| Ok(c.cancel_assign_key().map(|id| id.0)))
}

/// Clears the key bound to `id`. `data` is the released key's name.
pub fn unassign_key(handle: &ControllerHandle, id: u32) -> CommandResult<Option<String>> {
    run(handle, move |c| {
        Ok(c.unassign_key(TargetId(id))?.map(|k: Key| k.name().to_string()))
    })
}

pub fn request_spawn_capture(handle: &ControllerHandle) -> CommandResult<()> {
    run(handle, |c| c.request_spawn_capture())
}

pub fn cancel_spawn_capture(handle: &ControllerHandle) -> CommandResult<()> {
    run(handle, |c| {
        c.cancel_spawn_capture();
        Ok(())
    })
}

pub fn set_spawn_position(handle: &ControllerHandle, x: f64, y: f64) -> CommandResult<()> {
    run(handle, move |c| {
        c.set_spawn_position(CanvasPoint::new(x, y));
        Ok(())
    })
}

/// Switches to `"edit"` or `"play"`.
pub fn set_mode(handle: &ControllerHandle, mode: &str) -> CommandResult<String> {
    let mode: Mode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => return CommandResult::err(e),
    };
    run(handle, move |c| {
        c.set_mode(mode);
        Ok(c.mode().to_string())
    })
}

/// Flips the mode. `data` is the new one.
pub fn toggle_mode(handle: &ControllerHandle) -> CommandResult<String> {
    run(handle, |c| Ok(c.toggle_mode().to_string()))
}

/// Saves the layout under `name`. `data` is the written file's path.
pub fn save_profile(handle: &ControllerHandle, name: String) -> CommandResult<String> {
    run(handle, move |c| {
        Ok(c.save_profile(&name)?.display().to_string())
    })
}

/// Replaces the layout with profile `name`.
pub fn load_profile(handle: &ControllerHandle, name: String) -> CommandResult<ProfileDto> {
    run(handle, move |c| Ok(ProfileDto::from(&c.load_profile(&name)?)))
}

pub fn list_profiles(handle: &ControllerHandle) -> CommandResult<Vec<String>> {
    run(handle, |c| c.list_profiles())
}

pub fn delete_profile(handle: &ControllerHandle, name: String) -> CommandResult<()> {
    run(handle, move |c| c.delete_profile(&name))
}

// ── Headless view ─────────────────────────────────────────────────────────────

/// [`ViewNotifier`] that logs every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingViewNotifier;

impl ViewNotifier for TracingViewNotifier {
    fn mode_changed(&self, mode: Mode) {
        info!(%mode, "view: mode changed");
    }

    fn assignment_pending(&self, id: TargetId) {
        info!(target_id = %id, "view: press a key for the target");
    }

    fn key_assigned(&self, id: TargetId, key: Key, displaced: Option<TargetId>) {
        match displaced {
            Some(previous) => info!(target_id = %id, key = %key, from = %previous, "view: key moved"),
            None => info!(target_id = %id, key = %key, "view: key bound"),
        }
    }

    fn spawn_capture_cancelled(&self) {
        info!("view: spawn capture cancelled");
    }

    fn click_failed(&self, point: ScreenPoint, error: &ClickError) {
        warn!(x = point.x, y = point.y, "view: click failed: {error}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
