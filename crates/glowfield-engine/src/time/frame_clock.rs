use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,

    /// Milliseconds since the clock was created. This is the frame timestamp
    /// handed to the frame loop.
    pub timestamp_ms: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// [`timestamp_ms`](Self::timestamp_ms) in seconds.
    pub fn seconds(&self) -> f64 {
        self.timestamp_ms * 0.001
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Timestamps are unclamped and measured from a fixed origin; only `dt` is
/// clamped, to avoid pathological values after a debugger pause, a minimized
/// window or a stall.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock with its origin at `Instant::now()` and default clamps.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock with the given origin and default clamps.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            last: origin,
            frame_index: 0,
            dt_min: Duration::from_micros(100), // 0.0001s
            dt_max: Duration::from_millis(250), // 0.25s
        }
    }

    /// Milliseconds since the origin, without ticking.
    pub fn elapsed_ms(&self) -> f64 {
        self.ms_at(Instant::now())
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            timestamp_ms: self.ms_at(now),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    fn ms_at(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
