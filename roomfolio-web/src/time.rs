/// Timing of one animation frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

/// ~60fps, reported for the first frame.
const FIRST_FRAME_DELTA: f32 = 0.016;

/// Longest step any animation takes, so a backgrounded tab doesn't jump.
const MAX_DELTA: f32 = 0.1;

/// Frame clock fed with `requestAnimationFrame` timestamps (ms).
#[derive(Debug, Default)]
pub struct FrameClock {
    start: Option<f64>,
    last: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let delta = match self.start {
            None => {
                self.start = Some(now_ms);
                FIRST_FRAME_DELTA
            }
            Some(_) => (((now_ms - self.last) / 1000.0) as f32).clamp(0.0, MAX_DELTA),
        };
        self.last = now_ms;
        self.frames += 1;

        let elapsed = ((now_ms - self.start.unwrap_or(now_ms)) / 1000.0) as f32;
        FrameTime { elapsed, delta }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_nominal_delta() {
        let mut clock = FrameClock::new();
        let t = clock.tick(5000.0);
        assert_eq!(t.delta, FIRST_FRAME_DELTA);
        assert_eq!(t.elapsed, 0.0);
    }

    #[test]
    fn test_delta_and_elapsed() {
        let mut clock = FrameClock::new();
        clock.tick(1000.0);
        let t = clock.tick(1020.0);
        assert!((t.delta - 0.02).abs() < 1e-6);
        let t = clock.tick(1050.0);
        assert!((t.delta - 0.03).abs() < 1e-6);
        assert!((t.elapsed - 0.05).abs() < 1e-6);
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn test_long_pause_is_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let t = clock.tick(30_000.0);
        assert_eq!(t.delta, MAX_DELTA);
        assert!((t.elapsed - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_backwards_timestamp_is_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        assert_eq!(clock.tick(50.0).delta, 0.0);
    }
}
