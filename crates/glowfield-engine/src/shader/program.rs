use std::collections::BTreeMap;
use std::fmt;

use naga::{AddressSpace, Binding, Interpolation, Sampling, ScalarKind, TypeInner, VectorSize};

use super::compile::{CompiledShader, ShaderStage};
use super::error::ShaderError;
use super::source::ShaderSources;

/// Value type of a uniform, as far as the renderer can write it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    /// Any other type (matrices, integers, arrays, ...).
    Other,
}

impl UniformKind {
    fn of(inner: &TypeInner) -> Self {
        match *inner {
            TypeInner::Scalar(s) if s.kind == ScalarKind::Float && s.width == 4 => UniformKind::Float,
            TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
                match size {
                    VectorSize::Bi => UniformKind::Vec2,
                    VectorSize::Tri => UniformKind::Vec3,
                    VectorSize::Quad => UniformKind::Vec4,
                }
            }
            _ => UniformKind::Other,
        }
    }

    /// Size in bytes of the written value; zero for [`UniformKind::Other`].
    pub fn size(self) -> u32 {
        match self {
            UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Other => 0,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniformKind::Float => "float",
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec3 => "vec3",
            UniformKind::Vec4 => "vec4",
            UniformKind::Other => "an unsupported type",
        };
        f.write_str(name)
    }
}

/// Where a named uniform lives inside the program's uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    /// Byte offset from the start of the block.
    pub offset: u32,
    pub kind: UniformKind,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub location: UniformLocation,
}

/// The single uniform block of a linked program.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformBlock {
    /// Descriptor set (`layout(set = ..)`).
    pub group: u32,
    pub binding: u32,
    /// Block size in bytes, including trailing padding.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

/// A vertex-stage input fed from a vertex buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub name: String,
    pub location: u32,
}

/// Vertex + fragment stages that passed the link checks.
///
/// Attribute and uniform locations are reflected once at link time.
#[derive(Debug, Clone)]
pub struct Program {
    vertex: CompiledShader,
    fragment: CompiledShader,
    attributes: Vec<VertexAttribute>,
    uniforms: Option<UniformBlock>,
}

impl Program {
    /// Compiles both stages of `sources` and links them.
    ///
    /// Both stages are always compiled so that each failure is logged.
    pub fn build(sources: &ShaderSources) -> Result<Self, ShaderError> {
        let vertex = super::compile(ShaderStage::Vertex, &sources.vertex);
        let fragment = super::compile(ShaderStage::Fragment, &sources.fragment);
        Self::link(vertex?, fragment?)
    }

    /// Links two compiled stages.
    ///
    /// Checks that every fragment input is written by the vertex stage and that
    /// the stages agree on a single uniform block. The diagnostic of a failed
    /// link is logged.
    pub fn link(vertex: CompiledShader, fragment: CompiledShader) -> Result<Self, ShaderError> {
        let result = link_stages(vertex, fragment);
        match &result {
            Ok(program) => log::info!(
                "linked shader program ({} attribute(s), {} uniform(s))",
                program.attributes.len(),
                program.uniforms.as_ref().map_or(0, |b| b.members.len()),
            ),
            Err(err) => log::error!("{err}"),
        }
        result
    }

    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn uniform_block(&self) -> Option<&UniformBlock> {
        self.uniforms.as_ref()
    }

    /// Location of the vertex attribute `name`.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.location)
    }

    /// Location of the uniform `name` inside the uniform block.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .as_ref()?
            .members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.location)
    }
}

fn link_error(diagnostic: impl Into<String>) -> ShaderError {
    ShaderError::Link {
        diagnostic: diagnostic.into(),
    }
}

fn link_stages(vertex: CompiledShader, fragment: CompiledShader) -> Result<Program, ShaderError> {
    if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
        return Err(link_error(format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.stage(),
            fragment.stage()
        )));
    }

    check_interface(&vertex, &fragment)?;

    let uniforms = match (uniform_block(&vertex)?, uniform_block(&fragment)?) {
        (None, None) => None,
        (Some(block), None) | (None, Some(block)) => Some(block),
        (Some(vs), Some(fs)) if vs == fs => Some(vs),
        (Some(vs), Some(fs)) => {
            return Err(link_error(format!(
                "uniform blocks differ between stages (vertex: set {} binding {}, fragment: set {} binding {})",
                vs.group, vs.binding, fs.group, fs.binding
            )));
        }
    };

    let attributes = vertex_attributes(&vertex);

    Ok(Program {
        vertex,
        fragment,
        attributes,
        uniforms,
    })
}

/// One user-defined stage input or output.
struct InterfaceSlot<'m> {
    location: u32,
    name: Option<&'m str>,
    ty: &'m TypeInner,
    interpolation: Option<Interpolation>,
    sampling: Option<Sampling>,
}

/// Every user-defined fragment input must be written by the vertex stage with
/// the same type and interpolation.
fn check_interface(vertex: &CompiledShader, fragment: &CompiledShader) -> Result<(), ShaderError> {
    let mut written = BTreeMap::new();
    if let Some(result) = vertex.entry_point().and_then(|ep| ep.function.result.as_ref()) {
        collect_locations(vertex.module(), result.ty, result.binding.as_ref(), &mut |slot| {
            written.insert(slot.location, slot);
        });
    }

    let mut mismatch = None;
    if let Some(ep) = fragment.entry_point() {
        for arg in &ep.function.arguments {
            collect_locations(fragment.module(), arg.ty, arg.binding.as_ref(), &mut |slot| {
                if mismatch.is_some() {
                    return;
                }
                let name = slot.name.or(arg.name.as_deref()).unwrap_or("<unnamed>");
                let loc = slot.location;
                mismatch = match written.get(&loc) {
                    None => Some(format!(
                        "fragment input `{name}` at location {loc} is not written by the vertex stage"
                    )),
                    Some(out) if out.ty != slot.ty => Some(format!(
                        "fragment input `{name}` at location {loc} is {:?} but the vertex stage writes {:?}",
                        slot.ty, out.ty
                    )),
                    Some(out) if out.interpolation != slot.interpolation || out.sampling != slot.sampling => {
                        Some(format!(
                            "fragment input `{name}` at location {loc} is interpolated as {:?}/{:?} \
                             but the vertex stage writes {:?}/{:?}",
                            slot.interpolation, slot.sampling, out.interpolation, out.sampling
                        ))
                    }
                    Some(_) => None,
                };
            });
        }
    }

    match mismatch {
        Some(diagnostic) => Err(link_error(diagnostic)),
        None => Ok(()),
    }
}

/// Visits `location` bindings of a value, descending into struct members.
fn collect_locations<'m>(
    module: &'m naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    visit: &mut dyn FnMut(InterfaceSlot<'m>),
) {
    match binding {
        Some(Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => visit(InterfaceSlot {
            location: *location,
            name: None,
            ty: &module.types[ty].inner,
            interpolation: *interpolation,
            sampling: *sampling,
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(Binding::Location {
                        location,
                        interpolation,
                        sampling,
                        ..
                    }) = &member.binding
                    {
                        visit(InterfaceSlot {
                            location: *location,
                            name: member.name.as_deref(),
                            ty: &module.types[member.ty].inner,
                            interpolation: *interpolation,
                            sampling: *sampling,
                        });
                    }
                }
            }
        }
    }
}

fn uniform_block(shader: &CompiledShader) -> Result<Option<UniformBlock>, ShaderError> {
    let module = shader.module();
    let mut block: Option<UniformBlock> = None;

    for (_, var) in module.global_variables.iter() {
        let name = var.name.as_deref().unwrap_or("<unnamed>");
        match var.space {
            AddressSpace::Uniform => {}
            AddressSpace::Private | AddressSpace::Function | AddressSpace::WorkGroup => continue,
            _ => {
                return Err(link_error(format!(
                    "{} shader declares unsupported resource `{name}`; only one uniform block is supported",
                    shader.stage()
                )));
            }
        }

        let Some(binding) = &var.binding else {
            return Err(link_error(format!("uniform `{name}` has no set/binding layout")));
        };

        if block.is_some() {
            return Err(link_error(format!(
                "{} shader declares more than one uniform block",
                shader.stage()
            )));
        }

        let ty = &module.types[var.ty];
        let (size, members) = match &ty.inner {
            TypeInner::Struct { members, span } => {
                let members = members
                    .iter()
                    .filter_map(|m| {
                        let name = m.name.clone()?;
                        let kind = UniformKind::of(&module.types[m.ty].inner);
                        Some(UniformMember {
                            name,
                            location: UniformLocation {
                                offset: m.offset,
                                kind,
                            },
                        })
                    })
                    .collect();
                (*span, members)
            }
            inner => {
                // A lone (non-block) uniform behaves like a one-member block.
                let kind = UniformKind::of(inner);
                let member = UniformMember {
                    name: name.to_string(),
                    location: UniformLocation { offset: 0, kind },
                };
                (kind.size(), vec![member])
            }
        };

        block = Some(UniformBlock {
            group: binding.group,
            binding: binding.binding,
            size,
            members,
        });
    }

    Ok(block)
}

fn vertex_attributes(vertex: &CompiledShader) -> Vec<VertexAttribute> {
    let Some(ep) = vertex.entry_point() else {
        return Vec::new();
    };

    ep.function
        .arguments
        .iter()
        .filter_map(|arg| match &arg.binding {
            Some(Binding::Location { location, .. }) => Some(VertexAttribute {
                name: arg.name.clone().unwrap_or_default(),
                location: *location,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{compile, fixtures};

    fn build(vertex: &str, fragment: &str) -> Result<Program, ShaderError> {
        Program::build(&ShaderSources::new(vertex, fragment))
    }

    #[test]
    fn plain_program_resolves_locations() {
        let program = build(fixtures::VERTEX, fixtures::FRAGMENT_PLAIN).unwrap();

        assert_eq!(program.attribute_location("aPosition"), Some(0));

        let time = program.uniform_location("uTime").unwrap();
        let resolution = program.uniform_location("uResolution").unwrap();
        assert_eq!(time.kind, UniformKind::Float);
        assert_eq!(resolution.kind, UniformKind::Vec2);
        assert_ne!(time.offset, resolution.offset);

        let block = program.uniform_block().unwrap();
        assert_eq!((block.group, block.binding), (0, 0));
        assert!(block.size >= resolution.offset + 8);
    }

    #[test]
    fn orbit_program_resolves_rotation_uniforms() {
        let program = build(fixtures::VERTEX, fixtures::FRAGMENT_ORBIT).unwrap();

        for name in ["uTime", "uResolution", "uRotationX", "uRotationY"] {
            assert!(program.uniform_location(name).is_some(), "{name} missing");
        }
        assert_eq!(
            program.uniform_location("uRotationY").map(|l| l.kind),
            Some(UniformKind::Float)
        );
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let program = build(fixtures::VERTEX, fixtures::FRAGMENT_PLAIN).unwrap();
        assert_eq!(program.attribute_location("aNormal"), None);
        assert_eq!(program.uniform_location("uRotationX"), None);
    }

    #[test]
    fn fragment_compile_failure_stops_the_build() {
        let err = build(fixtures::VERTEX, fixtures::FRAGMENT_SYNTAX_ERROR).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let vs = compile(ShaderStage::Vertex, fixtures::VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, fixtures::FRAGMENT_UNMATCHED_INPUT).unwrap();

        let err = Program::link(vs, fs).unwrap_err();
        let diagnostic = err.diagnostic().unwrap();
        assert!(diagnostic.contains("location 3"), "{diagnostic}");
    }

    #[test]
    fn fragment_input_type_must_match_vertex_output() {
        let vs = compile(ShaderStage::Vertex, fixtures::VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, fixtures::FRAGMENT_WIDER_INPUT).unwrap();

        let err = Program::link(vs, fs).unwrap_err();
        let diagnostic = err.diagnostic().unwrap();
        assert!(diagnostic.contains("`vUv` at location 0"), "{diagnostic}");
    }

    #[test]
    fn fragment_input_interpolation_must_match_vertex_output() {
        let vs = compile(ShaderStage::Vertex, fixtures::VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, fixtures::FRAGMENT_FLAT_INPUT).unwrap();

        let err = Program::link(vs, fs).unwrap_err();
        assert!(err.diagnostic().unwrap().contains("interpolated"));
    }

    #[test]
    fn stages_must_be_in_order() {
        let vs = compile(ShaderStage::Vertex, fixtures::VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, fixtures::FRAGMENT_PLAIN).unwrap();

        let err = Program::link(fs, vs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }
}
