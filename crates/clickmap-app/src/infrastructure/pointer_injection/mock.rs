//! Mock pointer injector for tests and dry runs.
//!
//! Records every call in order instead of touching the real pointer, so
//! assertions can check exactly where clicks landed.

use std::sync::{Mutex, PoisonError};

use clickmap_core::ScreenPoint;

use crate::application::synthesize_click::{ClickError, PointerInjector};

/// One recorded pointer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCall {
    Move(ScreenPoint),
    LeftClick(ScreenPoint),
}

/// A [`PointerInjector`] that records calls and tracks a virtual cursor.
#[derive(Default)]
pub struct MockPointerInjector {
    calls: Mutex<Vec<PointerCall>>,
    cursor: Mutex<ScreenPoint>,
    origin: ScreenPoint,
    /// When `true`, `left_click` fails with [`ClickError::Platform`].
    pub should_fail: bool,
}

impl MockPointerInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock reporting `origin` as the virtual-desktop origin.
    pub fn with_origin(origin: ScreenPoint) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// A mock whose clicks always fail.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every move and click, in order.
    pub fn calls(&self) -> Vec<PointerCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Positions at which the left button was clicked.
    pub fn clicks(&self) -> Vec<ScreenPoint> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PointerCall::LeftClick(at) => Some(at),
                PointerCall::Move(_) => None,
            })
            .collect()
    }

    fn cursor(&self) -> ScreenPoint {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: PointerCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl PointerInjector for MockPointerInjector {
    fn cursor_position(&self) -> Result<ScreenPoint, ClickError> {
        Ok(self.cursor())
    }

    fn move_cursor(&self, point: ScreenPoint) -> Result<(), ClickError> {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner) = point;
        self.record(PointerCall::Move(point));
        Ok(())
    }

    fn left_click(&self) -> Result<(), ClickError> {
        if self.should_fail {
            return Err(ClickError::Platform("injected failure".to_string()));
        }
        self.record(PointerCall::LeftClick(self.cursor()));
        Ok(())
    }

    fn desktop_origin(&self) -> Result<ScreenPoint, ClickError> {
        Ok(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_is_recorded_at_current_cursor() {
        // Arrange
        let mock = MockPointerInjector::new();

        // Act
        mock.move_cursor(ScreenPoint::new(-10, 25)).unwrap();
        mock.left_click().unwrap();

        // Assert
        assert_eq!(
            mock.calls(),
            vec![
                PointerCall::Move(ScreenPoint::new(-10, 25)),
                PointerCall::LeftClick(ScreenPoint::new(-10, 25)),
            ]
        );
        assert_eq!(mock.clicks(), vec![ScreenPoint::new(-10, 25)]);
    }

    #[test]
    fn test_should_fail_rejects_clicks() {
        let mock = MockPointerInjector::failing();

        assert!(mock.left_click().is_err());
        assert!(mock.clicks().is_empty());
    }

    #[test]
    fn test_with_origin_reports_given_origin() {
        let mock = MockPointerInjector::with_origin(ScreenPoint::new(-1280, -200));

        assert_eq!(mock.desktop_origin().unwrap(), ScreenPoint::new(-1280, -200));
    }
}
