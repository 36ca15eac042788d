use std::time::{Duration, Instant};

/// One tick of a [`FrameClock`].
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick; `None` on the first tick after
    /// creation or [`FrameClock::reset`].
    pub dt: Option<f32>,
    pub now: Instant,
    pub frame_index: u64,
}

/// Per-window frame timer.
///
/// Deltas are clamped so a debugger pause or a minimized window does not turn
/// into one enormous step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous tick; the next one reports no delta.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = self.last.map(|last| {
            now.saturating_duration_since(last)
                .clamp(self.dt_min, self.dt_max)
                .as_secs_f32()
        });
        self.last = Some(now);

        let ft = FrameTime {
            dt,
            now,
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
        let t0 = Instant::now();
        let first = clock.tick_at(t0);
        assert_eq!(first.dt, None);
        assert_eq!(first.frame_index, 0);

        let second = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((second.dt.unwrap() - 0.016).abs() < 1e-6);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn deltas_are_clamped() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);

        let stalled = clock.tick_at(t0 + Duration::from_secs(5));
        assert_eq!(stalled.dt, Some(0.25));

        let same = clock.tick_at(t0 + Duration::from_secs(5));
        assert!((same.dt.unwrap() - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn reset_drops_the_delta_but_not_the_index() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        clock.reset();
        let after = clock.tick_at(t0 + Duration::from_millis(10));
        assert_eq!(after.dt, None);
        assert_eq!(after.frame_index, 1);
    }
}
