use glam::Vec2;

/// A camera action produced from pointer input.
///
/// Pixel deltas are in logical pixels; positive y points down the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit around the target by a pointer delta.
    Rotate(Vec2),
    /// Slide the target in the view plane by a pointer delta.
    Pan(Vec2),
    /// Move toward (negative) or away from (positive) the target.
    Dolly(f32),
    /// Input that maps to nothing.
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns button and cursor events into [`Action`]s.
///
/// Primary drag rotates, secondary drag pans, middle drag dollies.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pressed: Option<PointerButton>,
    last: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: PointerButton) {
        // The first button held wins until it is released.
        if self.pressed.is_none() {
            tracing::trace!("{button:?} pressed");
            self.pressed = Some(button);
        }
    }

    pub fn release(&mut self, button: PointerButton) {
        if self.pressed == Some(button) {
            self.pressed = None;
        }
    }

    pub fn pressed(&self) -> Option<PointerButton> {
        self.pressed
    }

    /// Record a new cursor position and return the drag action, if any.
    pub fn move_to(&mut self, position: Vec2) -> Action {
        let delta = self.last.map(|last| position - last);
        self.last = Some(position);
        match (self.pressed, delta) {
            (Some(PointerButton::Primary), Some(delta)) => Action::Rotate(delta),
            (Some(PointerButton::Secondary), Some(delta)) => Action::Pan(delta),
            (Some(PointerButton::Middle), Some(delta)) => Action::Dolly(delta.y),
            _ => Action::Noop,
        }
    }

    /// Forget the cursor, e.g. when it leaves the window.
    pub fn leave(&mut self) {
        self.last = None;
    }

    /// Wheel movement; positive values scroll toward the user.
    pub fn wheel(&self, delta_y: f32) -> Action {
        if delta_y == 0.0 {
            Action::Noop
        } else {
            Action::Dolly(delta_y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_without_button_is_noop() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.move_to(Vec2::new(10.0, 10.0)), Action::Noop);
        assert_eq!(tracker.move_to(Vec2::new(20.0, 10.0)), Action::Noop);
    }

    #[test]
    fn primary_drag_rotates() {
        let mut tracker = PointerTracker::new();
        tracker.move_to(Vec2::new(10.0, 10.0));
        tracker.press(PointerButton::Primary);
        assert_eq!(
            tracker.move_to(Vec2::new(15.0, 8.0)),
            Action::Rotate(Vec2::new(5.0, -2.0))
        );
        tracker.release(PointerButton::Primary);
        assert_eq!(tracker.move_to(Vec2::new(20.0, 8.0)), Action::Noop);
    }

    #[test]
    fn secondary_drag_pans_and_middle_dollies() {
        let mut tracker = PointerTracker::new();
        tracker.move_to(Vec2::ZERO);
        tracker.press(PointerButton::Secondary);
        assert!(matches!(tracker.move_to(Vec2::ONE), Action::Pan(_)));
        tracker.release(PointerButton::Secondary);

        tracker.press(PointerButton::Middle);
        assert_eq!(tracker.move_to(Vec2::new(1.0, 4.0)), Action::Dolly(3.0));
    }

    #[test]
    fn first_pressed_button_wins() {
        let mut tracker = PointerTracker::new();
        tracker.press(PointerButton::Primary);
        tracker.press(PointerButton::Secondary);
        assert_eq!(tracker.pressed(), Some(PointerButton::Primary));
        tracker.release(PointerButton::Secondary);
        assert_eq!(tracker.pressed(), Some(PointerButton::Primary));
    }

    #[test]
    fn leaving_resets_drag_origin() {
        let mut tracker = PointerTracker::new();
        tracker.press(PointerButton::Primary);
        tracker.move_to(Vec2::ZERO);
        tracker.leave();
        assert_eq!(tracker.move_to(Vec2::new(100.0, 0.0)), Action::Noop);
    }

    #[test]
    fn wheel_maps_to_dolly() {
        let tracker = PointerTracker::new();
        assert_eq!(tracker.wheel(0.0), Action::Noop);
        assert_eq!(tracker.wheel(-1.0), Action::Dolly(-1.0));
    }
}
