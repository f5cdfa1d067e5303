use glowfield_engine::render::{FrameLocations, POSITION_ATTRIBUTE};
use glowfield_engine::shader::{Program, ShaderSources, UniformKind};
use glowfield_studio::Variant;

fn build(variant: Variant) -> Program {
    let sources = ShaderSources::load(variant.bundled_shaders())
        .unwrap_or_else(|err| panic!("{}: {err}", variant.name()));
    Program::build(&sources).unwrap_or_else(|err| panic!("{}: {err}", variant.name()))
}

#[test]
fn plasma_assets_link() {
    let program = build(Variant::Plasma);

    assert_eq!(program.attribute_location(POSITION_ATTRIBUTE), Some(0));
    assert_eq!(
        program.uniform_location(FrameLocations::TIME).map(|l| l.kind),
        Some(UniformKind::Float)
    );
    assert_eq!(
        program.uniform_location(FrameLocations::RESOLUTION).map(|l| l.kind),
        Some(UniformKind::Vec2)
    );

    let locations = FrameLocations::resolve(&program, false).unwrap();
    assert!(locations.rotation.is_none());
}

#[test]
fn orbit_assets_link_with_rotation() {
    let program = build(Variant::Orbit);

    assert_eq!(program.attribute_location(POSITION_ATTRIBUTE), Some(0));
    let locations = FrameLocations::resolve(&program, true).unwrap();
    let rotation = locations.rotation.unwrap();

    assert_ne!(rotation.x.offset, rotation.y.offset);
    assert_ne!(locations.time.offset, locations.resolution.offset);

    let block = program.uniform_block().unwrap();
    assert_eq!((block.group, block.binding), (0, 0));
    assert!(block.size >= 24);
}
