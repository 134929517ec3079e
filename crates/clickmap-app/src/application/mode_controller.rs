//! ModeController: the Edit/Play state machine and key-down dispatcher.
//!
//! The controller is the single owner of the running state: the mode, the
//! [`TargetRegistry`], the spawn point, and the two one-shot capture slots
//! (a target waiting for its key, and spawn-point capture). UI commands and
//! key-down notifications are both serialized through it by the controller
//! host, so no method here needs to be thread-safe.
//!
//! # Key-down dispatch
//!
//! Checked in order, first match wins:
//!
//! | State                               | Effect                                  | Decision          |
//! |-------------------------------------|-----------------------------------------|-------------------|
//! | spawn capture active, key is Escape | spawn capture cancelled                 | `Consume`         |
//! | a target awaits its key             | key bound to that target (displacing)   | `Consume`         |
//! | Play mode, key bound to a target    | none                                    | `ConsumeAndClick` |
//! | anything else                       | none                                    | `PassThrough`     |
//!
//! Deciding and clicking are split ([`ModeController::handle_key_down`] and
//! [`ModeController::perform`]) so the host can release the OS hook before the
//! click sleeps.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clickmap_core::{
    CanvasGeometry, CanvasPoint, ClickTarget, Key, Profile, RegistryError, ScreenPoint, TargetId,
    TargetRegistry, CANCEL_KEY,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use super::manage_profiles::{ProfileError, ProfileRepository};
use super::synthesize_click::{ClickError, ClickSynthesizer};

/// Whether keys edit the layout or fire clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Targets can be created, moved and bound; bound keys do nothing.
    #[default]
    Edit,
    /// Bound keys click their target; the overlay is hidden.
    Play,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Edit => Mode::Play,
            Mode::Play => Mode::Edit,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Edit => "edit",
            Mode::Play => "play",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    /// Parses `edit` or `play`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edit" => Ok(Mode::Edit),
            "play" => Ok(Mode::Play),
            other => Err(format!("unknown mode {other:?}")),
        }
    }
}

/// Outcome of a key-down, returned to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// Let the key reach the focused application.
    PassThrough,
    /// Swallow the key.
    Consume,
    /// Swallow the key and click at the given virtual-desktop point.
    ConsumeAndClick(ScreenPoint),
}

impl KeyDecision {
    pub fn is_consumed(self) -> bool {
        !matches!(self, KeyDecision::PassThrough)
    }
}

/// Outbound signals to whatever renders the layout.
///
/// Every method has an empty default so views implement only what they show.
pub trait ViewNotifier: Send {
    fn mode_changed(&self, _mode: Mode) {}
    fn assignment_pending(&self, _id: TargetId) {}
    fn key_assigned(&self, _id: TargetId, _key: Key, _displaced: Option<TargetId>) {}
    fn spawn_capture_cancelled(&self) {}
    fn click_failed(&self, _point: ScreenPoint, _error: &ClickError) {}
}

/// A [`ViewNotifier`] that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl ViewNotifier for NullNotifier {}

/// Error type for controller commands.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("operation is only available in edit mode")]
    NotInEditMode,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Read-only copy of the controller state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub mode: Mode,
    pub spawn_position: CanvasPoint,
    pub targets: Vec<ClickTarget>,
    pub pending_assignment: Option<TargetId>,
    pub capturing_spawn: bool,
}

/// The single owner of mode, registry and capture state.
pub struct ModeController {
    mode: Mode,
    registry: TargetRegistry,
    pending_assignment: Option<TargetId>,
    capturing_spawn: bool,
    spawn_position: CanvasPoint,
    geometry: CanvasGeometry,
    clicker: ClickSynthesizer,
    profiles: Box<dyn ProfileRepository>,
    notifier: Box<dyn ViewNotifier>,
}

impl ModeController {
    /// Creates a controller in Edit mode with an empty registry.
    pub fn new(
        geometry: CanvasGeometry,
        clicker: ClickSynthesizer,
        profiles: Box<dyn ProfileRepository>,
        notifier: Box<dyn ViewNotifier>,
    ) -> Self {
        Self {
            mode: Mode::Edit,
            registry: TargetRegistry::new(),
            pending_assignment: None,
            capturing_spawn: false,
            spawn_position: CanvasPoint::default(),
            geometry,
            clicker,
            profiles,
            notifier,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn spawn_position(&self) -> CanvasPoint {
        self.spawn_position
    }

    pub fn pending_assignment(&self) -> Option<TargetId> {
        self.pending_assignment
    }

    pub fn is_capturing_spawn(&self) -> bool {
        self.capturing_spawn
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            mode: self.mode,
            spawn_position: self.spawn_position,
            targets: self.registry.snapshot(),
            pending_assignment: self.pending_assignment,
            capturing_spawn: self.capturing_spawn,
        }
    }

    // ── Layout commands ───────────────────────────────────────────────────────

    /// Creates an unkeyed target at `position`.
    pub fn add_target(&mut self, position: CanvasPoint) -> Result<TargetId, ControllerError> {
        let id = self.registry.add(position)?;
        debug!(target_id = %id, x = position.x, y = position.y, "target added");
        Ok(id)
    }

    /// Creates a target on the next free slot of the cascade grid anchored at
    /// the spawn point.
    pub fn add_target_at_spawn(&mut self) -> Result<TargetId, ControllerError> {
        let position = self.spawn_position.cascade(self.registry.len());
        self.add_target(position)
    }

    /// Deletes a target. Returns `false` if it did not exist.
    ///
    /// A pending key assignment for that target is dropped with it.
    pub fn remove_target(&mut self, id: TargetId) -> bool {
        if self.pending_assignment == Some(id) {
            self.pending_assignment = None;
        }
        match self.registry.remove(id) {
            Some(removed) => {
                debug!(target_id = %id, key = ?removed.key, "target removed");
                true
            }
            None => false,
        }
    }

    pub fn move_target(&mut self, id: TargetId, position: CanvasPoint) -> Result<(), ControllerError> {
        self.registry.move_to(id, position)?;
        trace!(target_id = %id, x = position.x, y = position.y, "target moved");
        Ok(())
    }

    /// Arms key capture for `id`: the next key-down is bound to it.
    ///
    /// Replaces any other pending assignment.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NotInEditMode`] in Play mode;
    /// [`ControllerError::Registry`] if `id` does not exist.
    pub fn request_assign_key(&mut self, id: TargetId) -> Result<(), ControllerError> {
        self.require_edit()?;
        if !self.registry.contains(id) {
            return Err(RegistryError::UnknownTarget(id).into());
        }
        self.pending_assignment = Some(id);
        debug!(target_id = %id, "awaiting key");
        self.notifier.assignment_pending(id);
        Ok(())
    }

    /// Disarms key capture. Returns the target that was waiting, if any.
    pub fn cancel_assign_key(&mut self) -> Option<TargetId> {
        self.pending_assignment.take()
    }

    /// Clears the key bound to `id`.
    pub fn unassign_key(&mut self, id: TargetId) -> Result<Option<Key>, ControllerError> {
        let released = self.registry.unassign_key(id)?;
        if let Some(key) = released {
            debug!(target_id = %id, key = %key, "key released");
        }
        Ok(released)
    }

    /// Starts spawn-point capture; Escape cancels it.
    pub fn request_spawn_capture(&mut self) -> Result<(), ControllerError> {
        self.require_edit()?;
        self.capturing_spawn = true;
        Ok(())
    }

    pub fn cancel_spawn_capture(&mut self) {
        self.capturing_spawn = false;
    }

    /// Sets the spawn point and ends spawn-point capture.
    pub fn set_spawn_position(&mut self, position: CanvasPoint) {
        self.spawn_position = position;
        self.capturing_spawn = false;
        debug!(x = position.x, y = position.y, "spawn point set");
    }

    // ── Mode ──────────────────────────────────────────────────────────────────

    /// Switches mode. Entering Play drops both capture slots.
    ///
    /// Setting the current mode is a no-op.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        if mode == Mode::Play {
            self.pending_assignment = None;
            if std::mem::take(&mut self.capturing_spawn) {
                self.notifier.spawn_capture_cancelled();
            }
        }
        self.mode = mode;
        info!(%mode, "mode changed");
        self.notifier.mode_changed(mode);
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    // ── Profiles ──────────────────────────────────────────────────────────────

    /// Persists the current layout under `name`.
    pub fn save_profile(&self, name: &str) -> Result<PathBuf, ControllerError> {
        let profile = Profile {
            spawn_position: self.spawn_position,
            targets: self.registry.snapshot(),
        };
        let path = self.profiles.save(name, &profile)?;
        info!(profile = %name, targets = profile.targets.len(), path = %path.display(), "profile saved");
        Ok(path)
    }

    /// Replaces the whole layout with the profile stored under `name`.
    ///
    /// Returns the layout as now held (duplicate keys in the file resolved).
    /// On error nothing changes.
    pub fn load_profile(&mut self, name: &str) -> Result<Profile, ControllerError> {
        let profile = self.profiles.load(name)?;
        self.registry.replace_all(profile.targets)?;
        self.spawn_position = profile.spawn_position;
        self.pending_assignment = None;
        self.capturing_spawn = false;
        info!(profile = %name, targets = self.registry.len(), "profile loaded");
        Ok(Profile {
            spawn_position: self.spawn_position,
            targets: self.registry.snapshot(),
        })
    }

    pub fn list_profiles(&self) -> Result<Vec<String>, ControllerError> {
        Ok(self.profiles.list()?)
    }

    pub fn delete_profile(&self, name: &str) -> Result<(), ControllerError> {
        self.profiles.delete(name)?;
        info!(profile = %name, "profile deleted");
        Ok(())
    }

    // ── Key-down dispatch ─────────────────────────────────────────────────────

    /// Decides what a key-down does and applies any state change.
    ///
    /// Never clicks; pass a `ConsumeAndClick` result to [`Self::perform`].
    pub fn handle_key_down(&mut self, key: Key) -> KeyDecision {
        if self.capturing_spawn && key == CANCEL_KEY {
            self.capturing_spawn = false;
            debug!("spawn capture cancelled");
            self.notifier.spawn_capture_cancelled();
            return KeyDecision::Consume;
        }

        if let Some(id) = self.pending_assignment.take() {
            match self.registry.assign_key(id, key) {
                Ok(displaced) => {
                    info!(target_id = %id, key = %key, displaced = ?displaced, "key assigned");
                    self.notifier.key_assigned(id, key, displaced);
                }
                Err(e) => warn!(key = %key, "dropping key assignment: {e}"),
            }
            return KeyDecision::Consume;
        }

        if self.mode == Mode::Play {
            if let Some(target) = self.registry.lookup_by_key(key).and_then(|id| self.registry.get(id)) {
                let point = self.geometry.click_point(target.position);
                trace!(key = %key, target_id = %target.id, x = point.x, y = point.y, "dispatching click");
                return KeyDecision::ConsumeAndClick(point);
            }
        }

        KeyDecision::PassThrough
    }

    /// Carries out the side effect of a decision.
    ///
    /// Click failures are logged and reported to the view, never returned.
    pub fn perform(&self, decision: KeyDecision) {
        if let KeyDecision::ConsumeAndClick(point) = decision {
            if let Err(e) = self.clicker.click_at(point) {
                error!(x = point.x, y = point.y, "click failed: {e}");
                self.notifier.click_failed(point, &e);
            }
        }
    }

    /// Decides and performs in one step. Returns whether the key was consumed.
    pub fn on_key_down(&mut self, key: Key) -> bool {
        let decision = self.handle_key_down(key);
        self.perform(decision);
        decision.is_consumed()
    }

    fn require_edit(&self) -> Result<(), ControllerError> {
        match self.mode {
            Mode::Edit => Ok(()),
            Mode::Play => Err(ControllerError::NotInEditMode),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::manage_profiles::MockProfileRepository;
    use crate::application::synthesize_click::{ClickSettings, PointerInjector};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingInjector {
        clicks: Mutex<Vec<ScreenPoint>>,
        cursor: Mutex<ScreenPoint>,
        should_fail: bool,
    }

    impl PointerInjector for RecordingInjector {
        fn cursor_position(&self) -> Result<ScreenPoint, ClickError> {
            Ok(*self.cursor.lock().unwrap())
        }

        fn move_cursor(&self, point: ScreenPoint) -> Result<(), ClickError> {
            *self.cursor.lock().unwrap() = point;
            Ok(())
        }

        fn left_click(&self) -> Result<(), ClickError> {
            if self.should_fail {
                return Err(ClickError::Platform("injected failure".to_string()));
            }
            let at = *self.cursor.lock().unwrap();
            self.clicks.lock().unwrap().push(at);
            Ok(())
        }

        fn desktop_origin(&self) -> Result<ScreenPoint, ClickError> {
            Ok(ScreenPoint::default())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Signal {
        Mode(Mode),
        Pending(TargetId),
        Assigned(TargetId, Key, Option<TargetId>),
        SpawnCancelled,
        ClickFailed(ScreenPoint),
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier(Arc<Mutex<Vec<Signal>>>);

    impl RecordingNotifier {
        fn take(&self) -> Vec<Signal> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl ViewNotifier for RecordingNotifier {
        fn mode_changed(&self, mode: Mode) {
            self.0.lock().unwrap().push(Signal::Mode(mode));
        }
        fn assignment_pending(&self, id: TargetId) {
            self.0.lock().unwrap().push(Signal::Pending(id));
        }
        fn key_assigned(&self, id: TargetId, key: Key, displaced: Option<TargetId>) {
            self.0.lock().unwrap().push(Signal::Assigned(id, key, displaced));
        }
        fn spawn_capture_cancelled(&self) {
            self.0.lock().unwrap().push(Signal::SpawnCancelled);
        }
        fn click_failed(&self, point: ScreenPoint, _error: &ClickError) {
            self.0.lock().unwrap().push(Signal::ClickFailed(point));
        }
    }

    #[derive(Default)]
    struct MemoryRepo(Mutex<HashMap<String, Profile>>);

    impl ProfileRepository for MemoryRepo {
        fn save(&self, name: &str, profile: &Profile) -> Result<PathBuf, ProfileError> {
            self.0.lock().unwrap().insert(name.to_string(), profile.clone());
            Ok(PathBuf::from(format!("{name}.json")))
        }
        fn list(&self) -> Result<Vec<String>, ProfileError> {
            let mut names: Vec<String> = self.0.lock().unwrap().keys().cloned().collect();
            names.sort();
            Ok(names)
        }
        fn load(&self, name: &str) -> Result<Profile, ProfileError> {
            self.0
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| ProfileError::NotFound(name.to_string()))
        }
        fn delete(&self, name: &str) -> Result<(), ProfileError> {
            self.0
                .lock()
                .unwrap()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| ProfileError::NotFound(name.to_string()))
        }
    }

    struct Fixture {
        controller: ModeController,
        injector: Arc<RecordingInjector>,
        notifier: RecordingNotifier,
    }

    fn fixture_with(injector: RecordingInjector, profiles: Box<dyn ProfileRepository>) -> Fixture {
        let injector = Arc::new(injector);
        let settings = ClickSettings {
            settle_delay: Duration::ZERO,
            restore_cursor: false,
            restore_delay: Duration::ZERO,
        };
        let clicker = ClickSynthesizer::new(Arc::clone(&injector) as Arc<dyn PointerInjector>, settings);
        let notifier = RecordingNotifier::default();
        let controller = ModeController::new(
            CanvasGeometry::default(),
            clicker,
            profiles,
            Box::new(notifier.clone()),
        );
        Fixture {
            controller,
            injector,
            notifier,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingInjector::default(), Box::new(MemoryRepo::default()))
    }

    /// Target 1 at (100,100) bound to A, target 2 at (300,150) bound to B.
    fn bind_two(c: &mut ModeController) -> (TargetId, TargetId) {
        let a = c.add_target(CanvasPoint::new(100.0, 100.0)).unwrap();
        let b = c.add_target(CanvasPoint::new(300.0, 150.0)).unwrap();
        c.request_assign_key(a).unwrap();
        c.on_key_down(Key::KeyA);
        c.request_assign_key(b).unwrap();
        c.on_key_down(Key::KeyB);
        (a, b)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn test_play_mode_bound_key_clicks_target_centre_once() {
        // Arrange
        let mut f = fixture();
        bind_two(&mut f.controller);
        f.controller.set_mode(Mode::Play);

        // Act
        let consumed = f.controller.on_key_down(Key::KeyB);

        // Assert
        assert!(consumed);
        assert_eq!(*f.injector.clicks.lock().unwrap(), vec![ScreenPoint::new(320, 170)]);
    }

    #[test]
    fn test_handle_key_down_returns_click_point_without_clicking() {
        let mut f = fixture();
        bind_two(&mut f.controller);
        f.controller.set_mode(Mode::Play);

        let decision = f.controller.handle_key_down(Key::KeyA);

        assert_eq!(decision, KeyDecision::ConsumeAndClick(ScreenPoint::new(120, 120)));
        assert!(f.injector.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_play_mode_unbound_key_passes_through() {
        let mut f = fixture();
        bind_two(&mut f.controller);
        f.controller.set_mode(Mode::Play);

        assert_eq!(f.controller.handle_key_down(Key::KeyC), KeyDecision::PassThrough);
    }

    #[test]
    fn test_edit_mode_bound_key_does_not_click_after_round_trip() {
        // Arrange
        let mut f = fixture();
        bind_two(&mut f.controller);
        f.controller.set_mode(Mode::Play);
        f.controller.set_mode(Mode::Edit);

        // Act
        let consumed = f.controller.on_key_down(Key::KeyA);

        // Assert
        assert!(!consumed);
        assert!(f.injector.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pending_assignment_consumes_next_key_and_binds_it() {
        // Arrange
        let mut f = fixture();
        let id = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.request_assign_key(id).unwrap();
        f.notifier.take();

        // Act
        let decision = f.controller.handle_key_down(Key::F3);

        // Assert
        assert_eq!(decision, KeyDecision::Consume);
        assert_eq!(f.controller.pending_assignment(), None);
        assert_eq!(f.controller.targets().lookup_by_key(Key::F3), Some(id));
        assert_eq!(f.notifier.take(), vec![Signal::Assigned(id, Key::F3, None)]);
    }

    #[test]
    fn test_assigning_taken_key_displaces_previous_owner() {
        // Arrange
        let mut f = fixture();
        let (a, b) = bind_two(&mut f.controller);
        f.notifier.take();

        // Act
        f.controller.request_assign_key(b).unwrap();
        f.controller.on_key_down(Key::KeyA);

        // Assert
        let registry = f.controller.targets();
        assert_eq!(registry.get(a).unwrap().key, None);
        assert_eq!(registry.get(b).unwrap().key, Some(Key::KeyA));
        assert_eq!(registry.lookup_by_key(Key::KeyA), Some(b));
        assert_eq!(
            f.notifier.take(),
            vec![Signal::Pending(b), Signal::Assigned(b, Key::KeyA, Some(a))]
        );
    }

    #[test]
    fn test_escape_while_awaiting_key_is_assigned() {
        let mut f = fixture();
        let id = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.request_assign_key(id).unwrap();

        f.controller.on_key_down(Key::Escape);

        assert_eq!(f.controller.targets().get(id).unwrap().key, Some(Key::Escape));
    }

    #[test]
    fn test_escape_cancels_spawn_capture_and_is_consumed() {
        // Arrange
        let mut f = fixture();
        f.controller.request_spawn_capture().unwrap();

        // Act
        let decision = f.controller.handle_key_down(Key::Escape);

        // Assert
        assert_eq!(decision, KeyDecision::Consume);
        assert!(!f.controller.is_capturing_spawn());
        assert_eq!(f.notifier.take(), vec![Signal::SpawnCancelled]);
    }

    #[test]
    fn test_other_keys_during_spawn_capture_pass_through() {
        let mut f = fixture();
        f.controller.request_spawn_capture().unwrap();

        assert_eq!(f.controller.handle_key_down(Key::KeyX), KeyDecision::PassThrough);
        assert!(f.controller.is_capturing_spawn());
    }

    #[test]
    fn test_click_failure_is_reported_and_key_still_consumed() {
        // Arrange
        let injector = RecordingInjector {
            should_fail: true,
            ..Default::default()
        };
        let mut f = fixture_with(injector, Box::new(MemoryRepo::default()));
        bind_two(&mut f.controller);
        f.controller.set_mode(Mode::Play);
        f.notifier.take();

        // Act
        let consumed = f.controller.on_key_down(Key::KeyA);

        // Assert
        assert!(consumed);
        assert_eq!(f.notifier.take(), vec![Signal::ClickFailed(ScreenPoint::new(120, 120))]);
    }

    // ── Mode transitions ──────────────────────────────────────────────────────

    #[test]
    fn test_initial_mode_is_edit() {
        assert_eq!(fixture().controller.mode(), Mode::Edit);
    }

    #[test]
    fn test_entering_play_clears_capture_slots() {
        // Arrange
        let mut f = fixture();
        let id = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.request_assign_key(id).unwrap();
        f.controller.request_spawn_capture().unwrap();
        f.notifier.take();

        // Act
        f.controller.set_mode(Mode::Play);

        // Assert
        assert_eq!(f.controller.pending_assignment(), None);
        assert!(!f.controller.is_capturing_spawn());
        assert_eq!(f.notifier.take(), vec![Signal::SpawnCancelled, Signal::Mode(Mode::Play)]);
    }

    #[test]
    fn test_setting_current_mode_again_does_not_notify() {
        let mut f = fixture();

        f.controller.set_mode(Mode::Edit);

        assert!(f.notifier.take().is_empty());
    }

    #[test]
    fn test_toggle_mode_alternates() {
        let mut f = fixture();

        assert_eq!(f.controller.toggle_mode(), Mode::Play);
        assert_eq!(f.controller.toggle_mode(), Mode::Edit);
        assert_eq!(
            f.notifier.take(),
            vec![Signal::Mode(Mode::Play), Signal::Mode(Mode::Edit)]
        );
    }

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("Play".parse::<Mode>(), Ok(Mode::Play));
        assert_eq!(" edit ".parse::<Mode>(), Ok(Mode::Edit));
        assert!("pause".parse::<Mode>().is_err());
    }

    #[test]
    fn test_capture_requests_are_rejected_in_play_mode() {
        let mut f = fixture();
        let id = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.set_mode(Mode::Play);

        assert!(matches!(f.controller.request_assign_key(id), Err(ControllerError::NotInEditMode)));
        assert!(matches!(f.controller.request_spawn_capture(), Err(ControllerError::NotInEditMode)));
    }

    #[test]
    fn test_request_assign_key_for_unknown_target_fails() {
        let mut f = fixture();

        let result = f.controller.request_assign_key(TargetId(9));

        assert!(matches!(
            result,
            Err(ControllerError::Registry(RegistryError::UnknownTarget(TargetId(9))))
        ));
        assert_eq!(f.controller.pending_assignment(), None);
    }

    // ── Layout commands ───────────────────────────────────────────────────────

    #[test]
    fn test_remove_target_clears_pending_assignment_for_it() {
        // Arrange
        let mut f = fixture();
        let id = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.request_assign_key(id).unwrap();

        // Act
        let removed = f.controller.remove_target(id);

        // Assert
        assert!(removed);
        assert_eq!(f.controller.pending_assignment(), None);
        assert_eq!(f.controller.handle_key_down(Key::KeyA), KeyDecision::PassThrough);
    }

    #[test]
    fn test_remove_other_target_keeps_pending_assignment() {
        let mut f = fixture();
        let keep = f.controller.add_target(CanvasPoint::default()).unwrap();
        let other = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.request_assign_key(keep).unwrap();

        f.controller.remove_target(other);

        assert_eq!(f.controller.pending_assignment(), Some(keep));
    }

    #[test]
    fn test_add_target_at_spawn_cascades_from_spawn_point() {
        // Arrange
        let mut f = fixture();
        f.controller.set_spawn_position(CanvasPoint::new(100.0, 100.0));

        // Act
        let ids: Vec<TargetId> = (0..6)
            .map(|_| f.controller.add_target_at_spawn().unwrap())
            .collect();

        // Assert
        let registry = f.controller.targets();
        assert_eq!(registry.get(ids[0]).unwrap().position, CanvasPoint::new(100.0, 100.0));
        assert_eq!(registry.get(ids[4]).unwrap().position, CanvasPoint::new(380.0, 100.0));
        assert_eq!(registry.get(ids[5]).unwrap().position, CanvasPoint::new(100.0, 170.0));
    }

    #[test]
    fn test_set_spawn_position_ends_spawn_capture() {
        let mut f = fixture();
        f.controller.request_spawn_capture().unwrap();

        f.controller.set_spawn_position(CanvasPoint::new(5.0, 5.0));

        assert!(!f.controller.is_capturing_spawn());
        assert_eq!(f.controller.spawn_position(), CanvasPoint::new(5.0, 5.0));
    }

    #[test]
    fn test_moved_target_is_clicked_at_new_position() {
        let mut f = fixture();
        let (a, _) = bind_two(&mut f.controller);
        f.controller.move_target(a, CanvasPoint::new(0.0, 0.0)).unwrap();
        f.controller.set_mode(Mode::Play);

        assert_eq!(
            f.controller.handle_key_down(Key::KeyA),
            KeyDecision::ConsumeAndClick(ScreenPoint::new(20, 20))
        );
    }

    #[test]
    fn test_unassign_key_stops_dispatch() {
        let mut f = fixture();
        let (a, _) = bind_two(&mut f.controller);

        assert_eq!(f.controller.unassign_key(a).unwrap(), Some(Key::KeyA));
        f.controller.set_mode(Mode::Play);

        assert_eq!(f.controller.handle_key_down(Key::KeyA), KeyDecision::PassThrough);
    }

    // ── Profiles ──────────────────────────────────────────────────────────────

    #[test]
    fn test_save_then_load_restores_layout() {
        // Arrange
        let mut f = fixture();
        bind_two(&mut f.controller);
        f.controller.set_spawn_position(CanvasPoint::new(12.5, 7.25));
        f.controller.save_profile("layout").unwrap();
        let before = f.controller.snapshot();
        f.controller.remove_target(TargetId(1));
        f.controller.set_spawn_position(CanvasPoint::default());

        // Act
        let loaded = f.controller.load_profile("layout").unwrap();

        // Assert
        assert_eq!(loaded.targets, before.targets);
        assert_eq!(loaded.spawn_position, CanvasPoint::new(12.5, 7.25));
        assert_eq!(f.controller.snapshot().targets, before.targets);
        assert_eq!(f.controller.list_profiles().unwrap(), vec!["layout".to_string()]);
    }

    #[test]
    fn test_load_advances_id_counter_past_loaded_ids() {
        let mut f = fixture();
        f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.save_profile("three").unwrap();
        f.controller.remove_target(TargetId(3));

        f.controller.load_profile("three").unwrap();

        assert_eq!(f.controller.add_target(CanvasPoint::default()).unwrap(), TargetId(4));
    }

    #[test]
    fn test_load_clears_pending_assignment() {
        let mut f = fixture();
        let id = f.controller.add_target(CanvasPoint::default()).unwrap();
        f.controller.save_profile("p").unwrap();
        f.controller.request_assign_key(id).unwrap();

        f.controller.load_profile("p").unwrap();

        assert_eq!(f.controller.pending_assignment(), None);
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        // Arrange
        let mut repo = MockProfileRepository::new();
        repo.expect_load()
            .returning(|name| Err(ProfileError::NotFound(name.to_string())));
        let mut f = fixture_with(RecordingInjector::default(), Box::new(repo));
        bind_two(&mut f.controller);
        f.controller.set_spawn_position(CanvasPoint::new(3.0, 4.0));
        let before = f.controller.snapshot();

        // Act
        let result = f.controller.load_profile("missing");

        // Assert
        assert!(matches!(
            result,
            Err(ControllerError::Profile(ProfileError::NotFound(ref n))) if n == "missing"
        ));
        assert_eq!(f.controller.snapshot(), before);
    }

    #[test]
    fn test_malformed_profile_leaves_state_untouched() {
        let mut repo = MockProfileRepository::new();
        repo.expect_load().returning(|name| {
            Err(ProfileError::Parse {
                name: name.to_string(),
                reason: "expected value".to_string(),
            })
        });
        let mut f = fixture_with(RecordingInjector::default(), Box::new(repo));
        bind_two(&mut f.controller);
        let before = f.controller.snapshot();

        assert!(f.controller.load_profile("bad").is_err());
        assert_eq!(f.controller.snapshot(), before);
    }

    #[test]
    fn test_profile_with_oversized_id_is_rejected_and_state_kept() {
        // Arrange
        let mut repo = MockProfileRepository::new();
        repo.expect_load().returning(|_| {
            Ok(Profile {
                spawn_position: CanvasPoint::new(9.0, 9.0),
                targets: vec![ClickTarget::new(TargetId(u32::MAX), CanvasPoint::default())],
            })
        });
        let mut f = fixture_with(RecordingInjector::default(), Box::new(repo));
        bind_two(&mut f.controller);
        let before = f.controller.snapshot();

        // Act
        let result = f.controller.load_profile("huge");

        // Assert
        assert!(matches!(
            result,
            Err(ControllerError::Registry(RegistryError::IdOutOfRange(u32::MAX)))
        ));
        assert_eq!(f.controller.snapshot(), before);
        assert_eq!(f.controller.add_target(CanvasPoint::default()).unwrap(), TargetId(3));
    }

    #[test]
    fn test_save_failure_is_returned() {
        let mut repo = MockProfileRepository::new();
        repo.expect_save()
            .times(1)
            .returning(|_, _| Err(ProfileError::InvalidName(String::new())));
        let f = fixture_with(RecordingInjector::default(), Box::new(repo));

        assert!(matches!(
            f.controller.save_profile(""),
            Err(ControllerError::Profile(ProfileError::InvalidName(_)))
        ));
    }

    #[test]
    fn test_save_passes_current_layout_to_repository() {
        let mut repo = MockProfileRepository::new();
        repo.expect_save()
            .withf(|name, profile| {
                name.to_string() == "mine"
                    && profile.targets.len() == 2
                    && profile.targets[1].key == Some(Key::KeyB)
            })
            .times(1)
            .returning(|name, _| Ok(PathBuf::from(format!("{name}.json"))));
        let mut f = fixture_with(RecordingInjector::default(), Box::new(repo));
        bind_two(&mut f.controller);

        assert_eq!(f.controller.save_profile("mine").unwrap(), PathBuf::from("mine.json"));
    }
}
