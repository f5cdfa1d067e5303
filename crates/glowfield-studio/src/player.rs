use glowfield_engine::core::{App, AppControl, FrameCtx, InputCtx, StartCtx};
use glowfield_engine::input::{InputEvent, Key, KeyState};
use glowfield_engine::interact::{DragConfig, OrbitControls, SharedRotation};
use glowfield_engine::render::{
    FrameLocations, FrameLoop, FrameLoopConfig, FullscreenPass, GpuFrameTarget,
};
use glowfield_engine::shader::{Program, ShaderError, ShaderSources};

use crate::Variant;

/// Fullscreen shader player.
///
/// Any shader failure is logged once and the player keeps running with blank
/// frames.
pub struct ShaderPlayer {
    variant: Variant,
    program: Option<Program>,
    locations: Option<FrameLocations>,
    pass: Option<FullscreenPass>,
    frame_loop: FrameLoop,
    orbit: Option<OrbitControls>,
}

impl ShaderPlayer {
    /// Builds the program from `sources` and resolves the uniforms `variant`
    /// writes. GPU resources are created later in `on_start`.
    pub fn new(
        variant: Variant,
        sources: Result<ShaderSources, ShaderError>,
        loop_config: FrameLoopConfig,
        drag_config: DragConfig,
    ) -> Self {
        let program = match sources.and_then(|s| Program::build(&s)) {
            Ok(program) => Some(program),
            Err(err) => {
                log::error!("{} shaders unavailable, rendering blank frames: {err}", variant.name());
                None
            }
        };

        let locations = program.as_ref().and_then(|program| {
            FrameLocations::resolve(program, variant.uses_rotation())
                .map_err(|err| log::error!("{err}"))
                .ok()
        });

        let mut frame_loop = FrameLoop::new(loop_config);
        let orbit = if variant.uses_rotation() {
            let rotation = SharedRotation::default();
            frame_loop = frame_loop.with_rotation(rotation.clone());
            Some(OrbitControls::new(drag_config, rotation))
        } else {
            None
        };

        Self {
            variant,
            program,
            locations,
            pass: None,
            frame_loop,
            orbit,
        }
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn orbit(&self) -> Option<&OrbitControls> {
        self.orbit.as_ref()
    }
}

impl App for ShaderPlayer {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> AppControl {
        if let (Some(program), Some(locations)) = (self.program.as_ref(), self.locations) {
            match FullscreenPass::new(&ctx.gpu.render_ctx(), program) {
                Ok(pass) => {
                    self.pass = Some(pass);
                    self.frame_loop.set_locations(Some(locations));
                }
                Err(err) => log::error!("{err}"),
            }
        }

        if let Some(orbit) = self.orbit.as_mut() {
            let (w, h) = ctx.window.logical_size();
            orbit.set_bounds(w, h);
        }

        log::info!(
            "{} player started ({})",
            self.variant.name(),
            if self.frame_loop.has_program() { "shader ready" } else { "blank" }
        );
        self.frame_loop.start();
        AppControl::Continue
    }

    fn on_input(&mut self, ctx: &InputCtx<'_>) -> AppControl {
        if let InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
            ..
        } = ctx.event
        {
            match key {
                Key::Escape => return AppControl::Exit,
                Key::Space => {
                    self.frame_loop.toggle();
                    log::info!("frame loop {:?}", self.frame_loop.state());
                }
                _ => {}
            }
        }

        if let Some(orbit) = self.orbit.as_mut() {
            orbit.handle_input(ctx.event, ctx.timestamp_ms * 0.001);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(orbit) = self.orbit.as_mut() {
            let (w, h) = ctx.window.logical_size();
            orbit.set_bounds(w, h);
            orbit.advance(ctx.time.seconds());
        }

        if !self.frame_loop.is_running() {
            return AppControl::Continue;
        }

        let timestamp_ms = ctx.time.timestamp_ms;
        let surface = ctx.surface_size();
        let frame_loop = &mut self.frame_loop;
        let pass = &mut self.pass;

        ctx.render(|rctx, target| {
            let mut gpu_target = GpuFrameTarget::new(rctx, target, pass.as_mut());
            frame_loop.tick(timestamp_ms, surface, &mut gpu_target);
            gpu_target.finish();
        })
    }

    fn is_animating(&self) -> bool {
        self.frame_loop.is_running()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use glowfield_engine::input::{
        InputState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent, PointerMoveEvent,
    };
    use glowfield_engine::render::LoopState;

    use super::*;

    fn key(key: Key, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat,
        }
    }

    fn button(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    fn send(player: &mut ShaderPlayer, event: InputEvent, timestamp_ms: f64) -> AppControl {
        let state = InputState::default();
        player.on_input(&InputCtx {
            event: &event,
            state: &state,
            timestamp_ms,
        })
    }

    fn bundled(variant: Variant) -> ShaderPlayer {
        ShaderPlayer::new(
            variant,
            ShaderSources::load(variant.bundled_shaders()),
            FrameLoopConfig::default(),
            DragConfig::default(),
        )
    }

    #[test]
    fn bundled_shaders_resolve_their_locations() {
        let plasma = bundled(Variant::Plasma);
        assert!(plasma.program.is_some());
        assert!(plasma.locations.is_some_and(|l| l.rotation.is_none()));
        assert!(plasma.orbit().is_none());

        let orbit = bundled(Variant::Orbit);
        assert!(orbit.locations.is_some_and(|l| l.rotation.is_some()));
        assert!(orbit.orbit().is_some());
    }

    #[test]
    fn missing_shader_dir_degrades_to_blank() {
        let player = ShaderPlayer::new(
            Variant::Plasma,
            ShaderSources::load(PathBuf::from("/nonexistent/glowfield")),
            FrameLoopConfig::default(),
            DragConfig::default(),
        );

        assert!(player.program.is_none());
        assert!(player.locations.is_none());
        assert!(!player.frame_loop().has_program());
    }

    #[test]
    fn plasma_shaders_lack_rotation_for_orbit() {
        let player = ShaderPlayer::new(
            Variant::Orbit,
            ShaderSources::load(Variant::Plasma.bundled_shaders()),
            FrameLoopConfig::default(),
            DragConfig::default(),
        );

        assert!(player.program.is_some());
        assert!(player.locations.is_none());
    }

    #[test]
    fn escape_exits_and_space_toggles() {
        let mut player = bundled(Variant::Plasma);
        assert!(!player.is_animating());

        assert_eq!(send(&mut player, key(Key::Space, false), 0.0), AppControl::Continue);
        assert!(player.is_animating());

        send(&mut player, key(Key::Space, true), 10.0);
        assert!(player.is_animating());

        send(&mut player, key(Key::Space, false), 20.0);
        assert_eq!(player.frame_loop().state(), LoopState::Stopped);
        assert!(!player.is_animating());

        assert_eq!(send(&mut player, key(Key::Escape, false), 30.0), AppControl::Exit);
    }

    #[test]
    fn drags_rotate_orbit_player() {
        let mut player = bundled(Variant::Orbit);

        send(&mut player, button(MouseButtonState::Pressed, 100.0, 100.0), 0.0);
        send(&mut player, InputEvent::PointerMoved(PointerMoveEvent { x: 110.0, y: 120.0 }), 500.0);

        let rotation = player.orbit().map(|o| o.rotation().get()).unwrap_or_default();
        assert!((rotation.x - 0.2).abs() < 1e-6);
        assert!((rotation.y + 0.1).abs() < 1e-6);
    }
}
