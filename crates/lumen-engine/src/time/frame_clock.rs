/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped. Zero on the first tick.
    pub dt: f32,

    /// Host timestamp of this tick, in seconds.
    pub now: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock fed by host timestamps.
///
/// The host frame callback (`requestAnimationFrame`, a winit redraw) hands in
/// its own timestamp, so the clock never reads wall time itself. One clock per
/// render loop.
///
/// Delta time is clamped to `[0, dt_max]`: a backgrounded tab or a debugger
/// pause would otherwise produce one huge rotation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    frame_index: u64,
    dt_max: f32,
}

impl FrameClock {
    pub const DEFAULT_DT_MAX: f32 = 0.25;

    pub fn new() -> Self {
        Self::with_max_dt(Self::DEFAULT_DT_MAX)
    }

    pub fn with_max_dt(dt_max: f32) -> Self {
        debug_assert!(dt_max >= 0.0);
        Self {
            last: None,
            frame_index: 0,
            dt_max,
        }
    }

    /// Forgets the previous timestamp so the next tick has `dt = 0`.
    ///
    /// Call when a loop restarts after being stopped.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock to `now_seconds`.
    pub fn tick(&mut self, now_seconds: f64) -> FrameTime {
        let dt = match self.last {
            None => 0.0,
            Some(last) => {
                let elapsed = (now_seconds - last) as f32;
                // NaN (bad host timestamp) collapses to 0 via max/min ordering.
                elapsed.max(0.0).min(self.dt_max)
            }
        };

        self.last = Some(now_seconds);

        let ft = FrameTime {
            dt,
            now: now_seconds,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_delta() {
        let mut clock = FrameClock::new();
        let ft = clock.tick(1234.5);
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn delta_is_elapsed_seconds() {
        let mut clock = FrameClock::new();
        clock.tick(10.0);
        let ft = clock.tick(10.016);
        assert!((ft.dt - 0.016).abs() < 1e-5);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn stalls_are_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        assert_eq!(clock.tick(30.0).dt, FrameClock::DEFAULT_DT_MAX);
    }

    #[test]
    fn backwards_time_yields_zero() {
        let mut clock = FrameClock::new();
        clock.tick(5.0);
        assert_eq!(clock.tick(4.0).dt, 0.0);
        assert_eq!(clock.tick(f64::NAN).dt, 0.0);
    }

    #[test]
    fn reset_restarts_delta_but_not_index() {
        let mut clock = FrameClock::with_max_dt(1.0);
        clock.tick(0.0);
        clock.tick(0.5);
        clock.reset();
        let ft = clock.tick(100.0);
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.frame_index, 2);
        assert_eq!(clock.frame_index(), 3);
    }
}
