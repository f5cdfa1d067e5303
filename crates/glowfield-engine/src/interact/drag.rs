use std::collections::VecDeque;

/// Incremental drag motion in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DragMove {
    pub dx: f32,
    pub dy: f32,
}

/// Post-release glide parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct InertiaConfig {
    /// Exponential decay rate of the glide velocity, per second.
    pub resistance: f32,
    /// Release speed (px/s) required to start a glide.
    pub min_speed: f32,
    /// Speed (px/s) below which a glide ends.
    pub end_speed: f32,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            resistance: 10.0,
            min_speed: 100.0,
            end_speed: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragConfig {
    /// `None` disables the glide after release.
    pub inertia: Option<InertiaConfig>,

    /// Clamp the drag point to the surface bounds.
    pub restrict_to_bounds: bool,

    /// How far back (seconds) pointer samples count toward the release velocity.
    pub velocity_window: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            inertia: Some(InertiaConfig::default()),
            restrict_to_bounds: true,
            velocity_window: 0.1,
        }
    }
}

/// Observable phase of a [`DragGesture`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Gliding,
}

#[derive(Debug, Copy, Clone)]
struct Sample {
    t: f64,
    point: [f32; 2],
}

#[derive(Debug)]
enum Phase {
    Idle,
    Dragging {
        point: [f32; 2],
        samples: VecDeque<Sample>,
    },
    Gliding {
        point: [f32; 2],
        velocity: [f32; 2],
        last: f64,
    },
}

/// Drag recognizer for a single surface.
///
/// Times are monotonic seconds supplied by the caller. Positions are in the
/// same logical pixel space as the bounds.
#[derive(Debug)]
pub struct DragGesture {
    config: DragConfig,
    bounds: Option<[f32; 2]>,
    phase: Phase,
}

impl DragGesture {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            bounds: None,
            phase: Phase::Idle,
        }
    }

    /// Sets the surface size the drag point is restricted to.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.bounds = Some([width.max(0.0), height.max(0.0)]);
    }

    pub fn phase(&self) -> DragPhase {
        match self.phase {
            Phase::Idle => DragPhase::Idle,
            Phase::Dragging { .. } => DragPhase::Dragging,
            Phase::Gliding { .. } => DragPhase::Gliding,
        }
    }

    /// Starts a drag at `(x, y)`; any glide in progress is cancelled.
    ///
    /// Presses outside known bounds are ignored.
    pub fn press(&mut self, x: f32, y: f32, now: f64) {
        if let Some([w, h]) = self.bounds {
            if !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
                return;
            }
        }

        let point = [x, y];
        let mut samples = VecDeque::new();
        samples.push_back(Sample { t: now, point });
        self.phase = Phase::Dragging { point, samples };
    }

    /// Moves the drag point, returning the motion actually applied.
    ///
    /// Returns `None` when not dragging or when the (restricted) point did not
    /// move.
    pub fn move_to(&mut self, x: f32, y: f32, now: f64) -> Option<DragMove> {
        let target = self.restrict([x, y]);
        let window = self.config.velocity_window;

        let Phase::Dragging { point, samples } = &mut self.phase else {
            return None;
        };

        let delta = DragMove {
            dx: target[0] - point[0],
            dy: target[1] - point[1],
        };
        *point = target;

        samples.push_back(Sample { t: now, point: target });
        while samples.len() > 2 && samples.front().is_some_and(|s| now - s.t > window) {
            samples.pop_front();
        }

        (delta != DragMove::default()).then_some(delta)
    }

    /// Ends the drag; glides if the release is fast enough and inertia is on.
    pub fn release(&mut self, now: f64) {
        let Phase::Dragging { point, samples } = &self.phase else {
            return;
        };

        let velocity = release_velocity(samples, now, self.config.velocity_window);
        let glide = self
            .config
            .inertia
            .as_ref()
            .is_some_and(|inertia| speed(velocity) > inertia.min_speed);

        self.phase = if glide {
            Phase::Gliding {
                point: *point,
                velocity,
                last: now,
            }
        } else {
            Phase::Idle
        };
    }

    /// Drops the drag or glide without further motion.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Advances a glide to `now`, returning the motion produced.
    pub fn step(&mut self, now: f64) -> Option<DragMove> {
        let Some(inertia) = self.config.inertia.clone() else {
            return None;
        };
        let bounds = self.bounds.filter(|_| self.config.restrict_to_bounds);

        let Phase::Gliding { point, velocity, last } = &mut self.phase else {
            return None;
        };

        let dt = (now - *last) as f32;
        if dt <= 0.0 {
            return None;
        }
        *last = now;

        // Integral of v·e^(−k·t) over the step.
        let k = inertia.resistance.max(f32::EPSILON);
        let decay = (-k * dt).exp();
        let travel = (1.0 - decay) / k;

        let mut target = [
            point[0] + velocity[0] * travel,
            point[1] + velocity[1] * travel,
        ];
        velocity[0] *= decay;
        velocity[1] *= decay;

        if let Some([w, h]) = bounds {
            let limits = [w, h];
            for axis in 0..2 {
                let clamped = target[axis].clamp(0.0, limits[axis]);
                if clamped != target[axis] {
                    target[axis] = clamped;
                    velocity[axis] = 0.0;
                }
            }
        }

        let delta = DragMove {
            dx: target[0] - point[0],
            dy: target[1] - point[1],
        };
        *point = target;

        if speed(*velocity) < inertia.end_speed {
            self.phase = Phase::Idle;
        }

        (delta != DragMove::default()).then_some(delta)
    }

    fn restrict(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        match self.bounds {
            Some([w, h]) if self.config.restrict_to_bounds => [x.clamp(0.0, w), y.clamp(0.0, h)],
            _ => [x, y],
        }
    }
}

fn speed(v: [f32; 2]) -> f32 {
    v[0].hypot(v[1])
}

/// Average velocity over the samples inside `window` before `now`.
fn release_velocity(samples: &VecDeque<Sample>, now: f64, window: f64) -> [f32; 2] {
    let mut recent = samples.iter().filter(|s| now - s.t <= window);
    let (Some(first), Some(last)) = (recent.next(), samples.back()) else {
        return [0.0, 0.0];
    };

    let dt = (last.t - first.t) as f32;
    if dt <= 0.0 || now - last.t > window {
        return [0.0, 0.0];
    }
    [
        (last.point[0] - first.point[0]) / dt,
        (last.point[1] - first.point[1]) / dt,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture() -> DragGesture {
        let mut g = DragGesture::new(DragConfig::default());
        g.set_bounds(800.0, 600.0);
        g
    }

    #[test]
    fn reports_incremental_moves() {
        let mut g = gesture();
        g.press(100.0, 100.0, 0.0);

        assert_eq!(g.move_to(110.0, 95.0, 0.01), Some(DragMove { dx: 10.0, dy: -5.0 }));
        assert_eq!(g.move_to(110.0, 95.0, 0.02), None);
        assert_eq!(g.move_to(100.0, 100.0, 0.03), Some(DragMove { dx: -10.0, dy: 5.0 }));
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut g = gesture();
        assert_eq!(g.move_to(10.0, 10.0, 0.0), None);
        assert_eq!(g.phase(), DragPhase::Idle);
    }

    #[test]
    fn press_outside_bounds_is_ignored() {
        let mut g = gesture();
        g.press(900.0, 10.0, 0.0);
        assert_eq!(g.phase(), DragPhase::Idle);
    }

    #[test]
    fn drag_point_is_restricted_to_bounds() {
        let mut g = gesture();
        g.press(790.0, 300.0, 0.0);

        assert_eq!(g.move_to(850.0, 300.0, 0.01), Some(DragMove { dx: 10.0, dy: 0.0 }));
        // Pinned at the edge: further outward motion produces nothing.
        assert_eq!(g.move_to(900.0, 300.0, 0.02), None);
        assert_eq!(g.move_to(780.0, 300.0, 0.03), Some(DragMove { dx: -20.0, dy: 0.0 }));
    }

    #[test]
    fn unrestricted_drag_passes_through() {
        let mut g = DragGesture::new(DragConfig {
            restrict_to_bounds: false,
            ..DragConfig::default()
        });
        g.set_bounds(100.0, 100.0);
        g.press(90.0, 50.0, 0.0);

        assert_eq!(g.move_to(150.0, 50.0, 0.01), Some(DragMove { dx: 60.0, dy: 0.0 }));
    }

    #[test]
    fn slow_release_stops_immediately() {
        let mut g = gesture();
        g.press(100.0, 100.0, 0.0);
        g.move_to(101.0, 100.0, 0.05);
        g.release(0.06);

        assert_eq!(g.phase(), DragPhase::Idle);
        assert_eq!(g.step(0.1), None);
    }

    #[test]
    fn release_after_holding_still_does_not_glide() {
        let mut g = gesture();
        g.press(100.0, 100.0, 0.0);
        g.move_to(200.0, 100.0, 0.05);
        g.release(0.5);

        assert_eq!(g.phase(), DragPhase::Idle);
    }

    #[test]
    fn fast_release_glides_and_decays() {
        let mut g = gesture();
        g.press(100.0, 300.0, 0.0);
        g.move_to(110.0, 300.0, 0.01);
        g.move_to(120.0, 300.0, 0.02);
        g.release(0.02);
        assert_eq!(g.phase(), DragPhase::Gliding);

        let first = g.step(0.036).unwrap();
        let second = g.step(0.052).unwrap();
        assert!(first.dx > 0.0 && first.dy == 0.0);
        assert!(second.dx < first.dx);

        let mut t = 0.052;
        while g.phase() == DragPhase::Gliding {
            t += 0.016;
            g.step(t);
            assert!(t < 2.0, "glide never ended");
        }
        assert_eq!(g.phase(), DragPhase::Idle);
    }

    #[test]
    fn glide_stops_at_the_edge() {
        let mut g = gesture();
        g.press(780.0, 300.0, 0.0);
        g.move_to(790.0, 300.0, 0.01);
        g.move_to(799.0, 300.0, 0.02);
        g.release(0.02);

        let mut t = 0.02;
        let mut travelled = 0.0;
        while let Some(mv) = g.step(t + 0.016) {
            t += 0.016;
            travelled += mv.dx;
        }
        assert!(travelled <= 1.0 + 1e-4);
        assert_eq!(g.phase(), DragPhase::Idle);
    }

    #[test]
    fn press_cancels_glide() {
        let mut g = gesture();
        g.press(100.0, 300.0, 0.0);
        g.move_to(120.0, 300.0, 0.01);
        g.release(0.01);
        assert_eq!(g.phase(), DragPhase::Gliding);

        g.press(400.0, 300.0, 0.02);
        assert_eq!(g.phase(), DragPhase::Dragging);
        assert_eq!(g.step(0.04), None);
    }

    #[test]
    fn inertia_can_be_disabled() {
        let mut g = DragGesture::new(DragConfig {
            inertia: None,
            ..DragConfig::default()
        });
        g.press(100.0, 300.0, 0.0);
        g.move_to(200.0, 300.0, 0.01);
        g.release(0.01);

        assert_eq!(g.phase(), DragPhase::Idle);
    }
}
