//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the players built on top of it, and the per-frame context they receive.

mod app;
mod ctx;

pub use app::{App, AppControl, InputCtx};
pub use ctx::{FrameCtx, StartCtx, WindowCtx};
