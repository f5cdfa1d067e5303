//! Glowfield players.
//!
//! Both binaries share one app: `plasma` drives its effect with time and
//! resolution only, `orbit` adds drag-to-rotate uniforms.

mod args;
mod player;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use glowfield_engine::device::GpuInit;
use glowfield_engine::logging::init_logging;
use glowfield_engine::render::FrameLoopConfig;
use glowfield_engine::shader::ShaderSources;
use glowfield_engine::window::Runtime;

pub use args::PlayerArgs;
pub use player::ShaderPlayer;

/// Which effect a binary plays.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Variant {
    Plasma,
    Orbit,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Plasma => "plasma",
            Variant::Orbit => "orbit",
        }
    }

    /// Whether the player writes `uRotationX` / `uRotationY` from pointer drags.
    pub fn uses_rotation(self) -> bool {
        matches!(self, Variant::Orbit)
    }

    /// Shader directory shipped with this crate.
    ///
    /// An `assets/<variant>` directory next to the running executable wins,
    /// so installed binaries find their shaders; otherwise the source checkout
    /// this crate was built from is used.
    pub fn bundled_shaders(self) -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        self.locate_shaders(exe_dir.as_deref())
    }

    fn locate_shaders(self, exe_dir: Option<&Path>) -> PathBuf {
        exe_dir
            .map(|dir| dir.join("assets").join(self.name()))
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(|| {
                Path::new(env!("CARGO_MANIFEST_DIR"))
                    .join("assets")
                    .join(self.name())
            })
    }
}

/// Parses the command line and runs `variant` until its window closes.
pub fn run(variant: Variant) -> Result<()> {
    let args = PlayerArgs::parse();
    init_logging(args.logging_config());

    let dir = args.shader_dir(variant);
    log::info!("loading {} shaders from {}", variant.name(), dir.display());
    let sources = ShaderSources::load(&dir);

    let app = ShaderPlayer::new(
        variant,
        sources,
        FrameLoopConfig::default(),
        args.drag_config(),
    );

    Runtime::run(args.runtime_config(variant), GpuInit::default(), app)
}
