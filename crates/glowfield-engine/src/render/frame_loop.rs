use crate::interact::SharedRotation;
use crate::shader::{Program, ShaderError, UniformKind, UniformLocation};

use super::target::{ClearColor, FrameTarget, SurfaceSize, UniformValue, ViewportRect};

/// Vertices drawn per frame (one fullscreen triangle).
pub const FULLSCREEN_VERTEX_COUNT: u32 = 3;

/// Frame loop configuration.
#[derive(Debug, Clone, Default)]
pub struct FrameLoopConfig {
    pub clear_color: ClearColor,
}

/// Lifecycle of a [`FrameLoop`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Created, never started.
    Idle,
    Running,
    Stopped,
}

/// Uniform locations written every tick, resolved once from a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameLocations {
    pub time: UniformLocation,
    pub resolution: UniformLocation,
    pub rotation: Option<RotationLocations>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RotationLocations {
    pub x: UniformLocation,
    pub y: UniformLocation,
}

impl FrameLocations {
    pub const TIME: &'static str = "uTime";
    pub const RESOLUTION: &'static str = "uResolution";
    pub const ROTATION_X: &'static str = "uRotationX";
    pub const ROTATION_Y: &'static str = "uRotationY";

    /// Resolves the time and resolution uniforms, plus the rotation pair when
    /// `with_rotation` is set. Every requested name must exist with the type
    /// the loop writes.
    pub fn resolve(program: &Program, with_rotation: bool) -> Result<Self, ShaderError> {
        let rotation = if with_rotation {
            Some(RotationLocations {
                x: require(program, Self::ROTATION_X, UniformKind::Float)?,
                y: require(program, Self::ROTATION_Y, UniformKind::Float)?,
            })
        } else {
            None
        };

        Ok(Self {
            time: require(program, Self::TIME, UniformKind::Float)?,
            resolution: require(program, Self::RESOLUTION, UniformKind::Vec2)?,
            rotation,
        })
    }
}

fn require(program: &Program, name: &str, expected: UniformKind) -> Result<UniformLocation, ShaderError> {
    let location = program
        .uniform_location(name)
        .ok_or_else(|| ShaderError::MissingUniform(name.to_string()))?;

    if location.kind != expected {
        return Err(ShaderError::UniformType {
            name: name.to_string(),
            expected,
            found: location.kind,
        });
    }
    Ok(location)
}

/// What one tick did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    /// Elapsed seconds written to `uTime`.
    pub elapsed: f32,
    pub viewport: ViewportRect,
    pub draw_calls: u32,
}

/// Per-refresh render loop.
///
/// Each [`tick`](Self::tick) sizes the viewport to the surface, clears, writes
/// the uniforms and draws the fullscreen triangle once. Without program
/// locations the loop still clears but never draws, which leaves a blank frame.
///
/// The runtime only schedules refreshes while the owning app reports the loop
/// as running.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    config: FrameLoopConfig,
    locations: Option<FrameLocations>,
    rotation: Option<SharedRotation>,
    frames: u64,
}

impl FrameLoop {
    pub fn new(config: FrameLoopConfig) -> Self {
        Self {
            state: LoopState::Idle,
            config,
            locations: None,
            rotation: None,
            frames: 0,
        }
    }

    /// Uses `locations` for uniform writes and enables drawing.
    pub fn with_locations(mut self, locations: FrameLocations) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Reads rotation from `rotation` on every tick.
    pub fn with_rotation(mut self, rotation: SharedRotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn set_locations(&mut self, locations: Option<FrameLocations>) {
        self.locations = locations;
    }

    pub fn start(&mut self) {
        if self.state != LoopState::Running {
            log::debug!("frame loop started after {} frame(s)", self.frames);
        }
        self.state = LoopState::Running;
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("frame loop stopped after {} frame(s)", self.frames);
            self.state = LoopState::Stopped;
        }
    }

    /// Starts a loop that is not running, stops one that is.
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn has_program(&self) -> bool {
        self.locations.is_some()
    }

    /// Ticks issued since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Renders one frame.
    ///
    /// `timestamp_ms` is a monotonic timestamp in milliseconds; `surface` is
    /// read fresh every call so a resize applies to the very next frame.
    /// Returns `None` without touching `target` unless the loop is running.
    pub fn tick(
        &mut self,
        timestamp_ms: f64,
        surface: SurfaceSize,
        target: &mut dyn FrameTarget,
    ) -> Option<FrameReport> {
        if !self.is_running() {
            return None;
        }

        let elapsed = (timestamp_ms * 0.001) as f32;
        let viewport = ViewportRect::covering(surface);

        target.set_viewport(viewport);
        target.clear(self.config.clear_color);

        let mut draw_calls = 0;
        if let Some(locations) = &self.locations {
            target.set_uniform(locations.time, UniformValue::Float(elapsed));
            target.set_uniform(
                locations.resolution,
                UniformValue::Vec2([surface.width as f32, surface.height as f32]),
            );

            if let Some(rot) = &locations.rotation {
                let rotation = self
                    .rotation
                    .as_ref()
                    .map(SharedRotation::get)
                    .unwrap_or_default();
                target.set_uniform(rot.x, UniformValue::Float(rotation.x));
                target.set_uniform(rot.y, UniformValue::Float(rotation.y));
            }

            target.draw_arrays(0..FULLSCREEN_VERTEX_COUNT);
            draw_calls = 1;
        }

        self.frames += 1;

        Some(FrameReport {
            elapsed,
            viewport,
            draw_calls,
        })
    }
}
