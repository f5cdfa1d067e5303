use std::cell::Cell;
use std::rc::Rc;

use crate::input::{InputEvent, MouseButton, MouseButtonState, PointerButtonEvent, PointerMoveEvent};

use super::drag::{DragConfig, DragGesture, DragMove, DragPhase};

/// Rotation (radians-scaled) per pixel of drag motion.
pub const DRAG_ROTATION_SCALE: f32 = 0.01;

/// Accumulated rotation offsets.
///
/// Grows without bound; no clamping or wrapping is applied.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    /// Vertical motion drives `x`; horizontal motion drives `y`, sign inverted.
    pub fn apply_drag(&mut self, mv: DragMove) {
        self.x += mv.dy * DRAG_ROTATION_SCALE;
        self.y += mv.dx * -DRAG_ROTATION_SCALE;
    }
}

/// Rotation shared by the drag adapter (writer) and the frame loop (reader).
///
/// Both live on the event-loop thread, so a `Cell` is enough.
#[derive(Debug, Clone, Default)]
pub struct SharedRotation(Rc<Cell<Rotation>>);

impl SharedRotation {
    pub fn new(rotation: Rotation) -> Self {
        Self(Rc::new(Cell::new(rotation)))
    }

    pub fn get(&self) -> Rotation {
        self.0.get()
    }

    pub fn apply_drag(&self, mv: DragMove) {
        let mut rotation = self.0.get();
        rotation.apply_drag(mv);
        self.0.set(rotation);
    }
}

/// Drag-to-rotate adapter over the window surface.
#[derive(Debug)]
pub struct OrbitControls {
    gesture: DragGesture,
    rotation: SharedRotation,
}

impl OrbitControls {
    pub fn new(config: DragConfig, rotation: SharedRotation) -> Self {
        Self {
            gesture: DragGesture::new(config),
            rotation,
        }
    }

    pub fn rotation(&self) -> &SharedRotation {
        &self.rotation
    }

    pub fn phase(&self) -> DragPhase {
        self.gesture.phase()
    }

    /// Updates the surface size (logical px) the drag point is restricted to.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.gesture.set_bounds(width, height);
    }

    /// Feeds one input event observed at `now` (seconds).
    pub fn handle_input(&mut self, event: &InputEvent, now: f64) {
        match event {
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state,
                x,
                y,
                ..
            }) => match state {
                MouseButtonState::Pressed => self.gesture.press(*x, *y, now),
                MouseButtonState::Released => self.gesture.release(now),
            },

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                if let Some(mv) = self.gesture.move_to(*x, *y, now) {
                    self.rotation.apply_drag(mv);
                }
            }

            InputEvent::Focused(false) => self.gesture.cancel(),

            _ => {}
        }
    }

    /// Advances a post-release glide to `now` (seconds).
    pub fn advance(&mut self, now: f64) {
        if let Some(mv) = self.gesture.step(now) {
            self.rotation.apply_drag(mv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn button(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    #[test]
    fn accumulates_scaled_deltas() {
        let deltas = [(3.0, -4.0), (-10.0, 2.5), (0.5, 7.0), (12.0, -1.0)];
        let rotation = SharedRotation::default();
        for (dx, dy) in deltas {
            rotation.apply_drag(DragMove { dx, dy });
        }

        let sum_dx: f32 = deltas.iter().map(|d| d.0).sum();
        let sum_dy: f32 = deltas.iter().map(|d| d.1).sum();
        let r = rotation.get();
        assert!((r.x - sum_dy * 0.01).abs() < 1e-5);
        assert!((r.y - sum_dx * -0.01).abs() < 1e-5);
    }

    #[test]
    fn accumulation_is_order_independent() {
        let a = SharedRotation::default();
        let b = SharedRotation::default();
        let moves = [DragMove { dx: 1.0, dy: 2.0 }, DragMove { dx: -7.0, dy: 0.5 }];

        moves.iter().for_each(|m| a.apply_drag(*m));
        moves.iter().rev().for_each(|m| b.apply_drag(*m));

        let (ra, rb) = (a.get(), b.get());
        assert!((ra.x - rb.x).abs() < 1e-6 && (ra.y - rb.y).abs() < 1e-6);
    }

    #[test]
    fn clones_share_state() {
        let writer = SharedRotation::default();
        let reader = writer.clone();
        writer.apply_drag(DragMove { dx: 0.0, dy: 100.0 });
        assert!((reader.get().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn drag_events_rotate() {
        let rotation = SharedRotation::default();
        let mut orbit = OrbitControls::new(
            DragConfig {
                inertia: None,
                ..DragConfig::default()
            },
            rotation.clone(),
        );
        orbit.set_bounds(800.0, 600.0);

        orbit.handle_input(&moved(100.0, 100.0), 0.0);
        assert_eq!(rotation.get(), Rotation::default());

        orbit.handle_input(&button(MouseButtonState::Pressed, 100.0, 100.0), 0.0);
        orbit.handle_input(&moved(150.0, 130.0), 0.01);
        orbit.handle_input(&button(MouseButtonState::Released, 150.0, 130.0), 0.02);
        orbit.handle_input(&moved(300.0, 300.0), 0.03);

        let r = rotation.get();
        assert!((r.x - 0.3).abs() < 1e-6);
        assert!((r.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn glide_keeps_rotating_after_release() {
        let rotation = SharedRotation::default();
        let mut orbit = OrbitControls::new(DragConfig::default(), rotation.clone());
        orbit.set_bounds(800.0, 600.0);

        orbit.handle_input(&button(MouseButtonState::Pressed, 100.0, 300.0), 0.0);
        orbit.handle_input(&moved(120.0, 300.0), 0.01);
        orbit.handle_input(&button(MouseButtonState::Released, 120.0, 300.0), 0.01);
        let at_release = rotation.get().y;

        orbit.advance(0.03);
        assert!(rotation.get().y < at_release);
    }

    #[test]
    fn focus_loss_cancels_drag() {
        let rotation = SharedRotation::default();
        let mut orbit = OrbitControls::new(DragConfig::default(), rotation.clone());
        orbit.set_bounds(800.0, 600.0);

        orbit.handle_input(&button(MouseButtonState::Pressed, 10.0, 10.0), 0.0);
        orbit.handle_input(&InputEvent::Focused(false), 0.01);
        orbit.handle_input(&moved(50.0, 50.0), 0.02);

        assert_eq!(orbit.phase(), DragPhase::Idle);
        assert_eq!(rotation.get(), Rotation::default());
    }
}
