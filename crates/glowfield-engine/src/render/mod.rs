//! Fullscreen-effect rendering.
//!
//! The [`FrameLoop`] decides what a frame contains and issues it through the
//! [`FrameTarget`] trait; [`GpuFrameTarget`] records those commands with wgpu
//! using the resources owned by a [`FullscreenPass`].
//!
//! Convention:
//! - viewport and resolution are in physical pixels
//! - the fullscreen triangle is given directly in clip space

mod ctx;
mod frame_loop;
mod fullscreen;
mod target;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame_loop::{
    FrameLocations, FrameLoop, FrameLoopConfig, FrameReport, LoopState, RotationLocations,
    FULLSCREEN_VERTEX_COUNT,
};
pub use fullscreen::{FullscreenPass, GpuFrameTarget, FULLSCREEN_TRIANGLE, POSITION_ATTRIBUTE};
pub use target::{ClearColor, FrameTarget, SurfaceSize, UniformValue, ViewportRect};
