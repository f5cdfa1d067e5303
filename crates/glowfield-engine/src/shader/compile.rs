use std::fmt;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::ShaderError;

/// Pipeline stage a GLSL source is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A parsed and validated single-stage module.
///
/// Holding one guarantees the module has a `main` entry point for `stage`.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    stage: ShaderStage,
    module: naga::Module,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry_point(&self) -> Option<&naga::EntryPoint> {
        let stage = self.stage.to_naga();
        self.module.entry_points.iter().find(|ep| ep.stage == stage)
    }
}

/// Compiles one GLSL stage.
///
/// On failure the compiler diagnostic is logged and returned in
/// [`ShaderError::Compile`]; no partially built module escapes.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, ShaderError> {
    let result = parse_and_validate(stage, source);
    if let Err(err) = &result {
        log::error!("{err}");
    }
    result
}

fn parse_and_validate(stage: ShaderStage, source: &str) -> Result<CompiledShader, ShaderError> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.to_naga()), source)
        .map_err(|errors| compile_error(stage, describe_parse_errors(&errors, source)))?;

    let compiled = CompiledShader { stage, module };
    if compiled.entry_point().is_none() {
        return Err(compile_error(stage, format!("no `main` entry point for the {stage} stage")));
    }

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&compiled.module)
        .map_err(|err| compile_error(stage, err.emit_to_string(source)))?;

    log::debug!("compiled {stage} shader");
    Ok(compiled)
}

fn compile_error(stage: ShaderStage, diagnostic: String) -> ShaderError {
    let diagnostic = if diagnostic.trim().is_empty() {
        "compiler reported an error without a message".to_string()
    } else {
        diagnostic
    };
    ShaderError::Compile { stage, diagnostic }
}

fn describe_parse_errors(errors: &glsl::ParseErrors, source: &str) -> String {
    errors
        .errors
        .iter()
        .map(|e| {
            let at = e.meta.location(source);
            format!("{}:{}: {}", at.line_number, at.line_position, e.kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::fixtures;

    #[test]
    fn compiles_valid_stages() {
        let vs = compile(ShaderStage::Vertex, fixtures::VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, fixtures::FRAGMENT_PLAIN).unwrap();

        assert_eq!(vs.stage(), ShaderStage::Vertex);
        assert_eq!(fs.stage(), ShaderStage::Fragment);
        assert!(vs.entry_point().is_some());
        assert!(fs.entry_point().is_some());
    }

    #[test]
    fn syntax_error_yields_diagnostic() {
        let err = compile(ShaderStage::Fragment, fixtures::FRAGMENT_SYNTAX_ERROR).unwrap_err();

        match &err {
            ShaderError::Compile { stage, diagnostic } => {
                assert_eq!(*stage, ShaderStage::Fragment);
                assert!(!diagnostic.trim().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.diagnostic().is_some());
        assert!(err.to_string().starts_with("fragment shader failed to compile"));
    }

    #[test]
    fn undeclared_identifier_is_a_compile_error() {
        let err = compile(ShaderStage::Fragment, fixtures::FRAGMENT_UNDECLARED).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Fragment, .. }));
    }
}
