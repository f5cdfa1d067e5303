use std::path::PathBuf;

use clap::Parser;
use glowfield_engine::interact::DragConfig;
use glowfield_engine::logging::LoggingConfig;
use glowfield_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

use crate::Variant;

/// Command line shared by both players.
#[derive(Debug, Parser)]
#[command(version, about = "Fullscreen procedural shader player")]
pub struct PlayerArgs {
    /// Directory holding `vertex.glsl` and `fragment.glsl`.
    /// Defaults to `assets/<player>` next to the executable, then to the
    /// source checkout the binary was built from.
    #[arg(short, long, value_name = "DIR")]
    pub shaders: Option<PathBuf>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720.0)]
    pub height: f64,

    /// Open borderless fullscreen on the current monitor.
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    /// Stop rotating as soon as the drag is released (orbit only).
    #[arg(long)]
    pub no_inertia: bool,
}

impl PlayerArgs {
    pub fn shader_dir(&self, variant: Variant) -> PathBuf {
        self.shaders
            .clone()
            .unwrap_or_else(|| variant.bundled_shaders())
    }

    pub fn runtime_config(&self, variant: Variant) -> RuntimeConfig {
        RuntimeConfig {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| format!("glowfield · {}", variant.name())),
            initial_size: LogicalSize::new(self.width, self.height),
            fullscreen: self.fullscreen,
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }

    pub fn drag_config(&self) -> DragConfig {
        let mut config = DragConfig::default();
        if self.no_inertia {
            config.inertia = None;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_bundled_shaders() {
        let args = PlayerArgs::parse_from(["plasma"]);

        assert_eq!(args.shader_dir(Variant::Plasma), Variant::Plasma.bundled_shaders());
        assert!(args.shader_dir(Variant::Plasma).ends_with("assets/plasma"));
        assert!(!args.fullscreen);
        assert!(args.drag_config().inertia.is_some());

        let runtime = args.runtime_config(Variant::Plasma);
        assert_eq!(runtime.initial_size, LogicalSize::new(1280.0, 720.0));
        assert!(runtime.title.contains("plasma"));
    }

    #[test]
    fn flags_map_onto_engine_configs() {
        let args = PlayerArgs::parse_from([
            "orbit",
            "--shaders",
            "/tmp/effect",
            "--title",
            "demo",
            "--width",
            "800",
            "--height",
            "600",
            "--fullscreen",
            "--log",
            "debug",
            "--no-inertia",
        ]);

        assert_eq!(args.shader_dir(Variant::Orbit), PathBuf::from("/tmp/effect"));
        assert_eq!(args.logging_config().env_filter.as_deref(), Some("debug"));
        assert!(args.drag_config().inertia.is_none());

        let runtime = args.runtime_config(Variant::Orbit);
        assert_eq!(runtime.title, "demo");
        assert_eq!(runtime.initial_size, LogicalSize::new(800.0, 600.0));
        assert!(runtime.fullscreen);
    }
}
