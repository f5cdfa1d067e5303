//! Shader bootstrap.
//!
//! This module is responsible for:
//! - reading the vertex + fragment GLSL sources
//! - compiling each stage (naga GLSL frontend + validator)
//! - linking both stages into a [`Program`] and reflecting locations by name
//!
//! Nothing here touches the GPU, so every failure is reported as a
//! [`ShaderError`] before a pipeline is ever created.

mod compile;
mod error;
mod program;
mod source;

#[cfg(test)]
pub(crate) mod fixtures;

pub use compile::{compile, CompiledShader, ShaderStage};
pub use error::ShaderError;
pub use program::{Program, UniformBlock, UniformKind, UniformLocation, UniformMember, VertexAttribute};
pub use source::{ShaderSources, FRAGMENT_FILE, VERTEX_FILE};
