//! Glowfield engine crate.
//!
//! Platform + GPU runtime for fullscreen procedural shader effects: shader
//! bootstrap, the per-refresh frame loop, and pointer-drag interaction.

pub mod core;
pub mod device;
pub mod input;
pub mod interact;
pub mod logging;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;
