//! Time subsystem.
//!
//! One `FrameClock` per window; call `tick()` once per presented frame to obtain
//! a `FrameTime` with both a clamped delta and a monotonic millisecond timestamp.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
