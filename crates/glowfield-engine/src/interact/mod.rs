//! Pointer-drag interaction.
//!
//! [`DragGesture`] turns primary-button drags on the surface into incremental
//! moves, with post-release inertia and the drag point restricted to the
//! surface bounds. [`OrbitControls`] feeds those moves into a
//! [`SharedRotation`] that the frame loop reads.

mod drag;
mod rotation;

pub use drag::{DragConfig, DragGesture, DragMove, DragPhase, InertiaConfig};
pub use rotation::{OrbitControls, Rotation, SharedRotation, DRAG_ROTATION_SCALE};
