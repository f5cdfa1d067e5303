use crate::input::{InputEvent, InputState};

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Input event together with the state it was applied to.
pub struct InputCtx<'a> {
    pub event: &'a InputEvent,
    pub state: &'a InputState,
    /// Milliseconds since the runtime clock started.
    pub timestamp_ms: f64,
}

/// Application contract driven by the runtime.
pub trait App {
    /// Called once the window and GPU context exist, before the first frame.
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Called for every translated input event.
    fn on_input(&mut self, ctx: &InputCtx<'_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Called once per display refresh while [`is_animating`](Self::is_animating).
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Whether the runtime should keep requesting refreshes.
    fn is_animating(&self) -> bool {
        true
    }
}
