use glowfield_studio::Variant;

fn main() -> anyhow::Result<()> {
    glowfield_studio::run(Variant::Orbit)
}
