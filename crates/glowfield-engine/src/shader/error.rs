use std::fmt;
use std::io;
use std::path::PathBuf;

use super::compile::ShaderStage;
use super::program::UniformKind;

/// Failure anywhere between reading shader sources and resolving locations.
#[derive(Debug)]
pub enum ShaderError {
    /// A stage source could not be read.
    Load { path: PathBuf, source: io::Error },

    /// A stage failed to parse or validate. `diagnostic` is the compiler output.
    Compile { stage: ShaderStage, diagnostic: String },

    /// Both stages compiled but cannot be combined into one program.
    Link { diagnostic: String },

    /// The program does not declare a vertex attribute the renderer feeds.
    MissingAttribute(String),

    /// The program does not declare a uniform the frame loop writes.
    MissingUniform(String),

    /// A uniform is declared with a type the frame loop does not write.
    UniformType {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}

impl ShaderError {
    /// Compiler or linker output, for errors that carry one.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ShaderError::Compile { diagnostic, .. } | ShaderError::Link { diagnostic } => {
                Some(diagnostic)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Load { path, source } => {
                write!(f, "failed to read shader source {}: {source}", path.display())
            }
            ShaderError::Compile { stage, diagnostic } => {
                write!(f, "{stage} shader failed to compile:\n{diagnostic}")
            }
            ShaderError::Link { diagnostic } => {
                write!(f, "shader program failed to link: {diagnostic}")
            }
            ShaderError::MissingAttribute(name) => {
                write!(f, "vertex attribute `{name}` is not declared by the program")
            }
            ShaderError::MissingUniform(name) => {
                write!(f, "uniform `{name}` is not declared by the program")
            }
            ShaderError::UniformType { name, expected, found } => {
                write!(f, "uniform `{name}` is declared as {found}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Load { source, .. } => Some(source),
            _ => None,
        }
    }
}
