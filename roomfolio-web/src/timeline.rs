use roomfolio_gpu_shared::math::lerp;

/// Easing curve applied between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    #[default]
    Linear,
    QuadOut,
    CubicInOut,
    /// Overshoots slightly before settling.
    BackOut,
}

const BACK_OVERSHOOT: f32 = 1.70158;

impl Ease {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        // Endpoints are exact so hidden things stay at exactly zero.
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::BackOut => {
                let c1 = BACK_OVERSHOOT;
                let c3 = c1 + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + c1 * u * u
            }
        }
    }
}

/// A key on a timeline. `ease` shapes the segment that ends at this key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub at: f32,
    pub value: f32,
    pub ease: Ease,
}

/// Scalar keyframe track over a progress variable (seconds or scroll position).
/// Keys are kept sorted; sampling clamps outside the keyed range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    keys: Vec<Keyframe>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant track.
    pub fn constant(value: f32) -> Self {
        Self::new().key(0.0, value)
    }

    pub fn key(self, at: f32, value: f32) -> Self {
        self.key_eased(at, value, Ease::Linear)
    }

    pub fn key_eased(mut self, at: f32, value: f32, ease: Ease) -> Self {
        let idx = self.keys.partition_point(|k| k.at <= at);
        self.keys.insert(idx, Keyframe { at, value, ease });
        self
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn start(&self) -> f32 {
        self.keys.first().map_or(0.0, |k| k.at)
    }

    pub fn end(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.at)
    }

    pub fn sample(&self, at: f32) -> f32 {
        let Some((i0, i1, t)) = find_keyframe_index(&self.keys, at) else {
            return 0.0;
        };
        let (k0, k1) = (&self.keys[i0], &self.keys[i1]);
        lerp(k0.value, k1.value, k1.ease.apply(t))
    }
}

/// Binary search for the key interval containing `at`.
/// Returns (index0, index1, interpolation_factor) or None.
fn find_keyframe_index(keys: &[Keyframe], at: f32) -> Option<(usize, usize, f32)> {
    if keys.is_empty() {
        return None;
    }
    let last = keys.len() - 1;
    if at <= keys[0].at {
        return Some((0, 0, 0.0));
    }
    if at >= keys[last].at {
        return Some((last, last, 0.0));
    }

    let mut lo = 0;
    let mut hi = last;
    while lo < hi - 1 {
        let mid = (lo + hi) / 2;
        if keys[mid].at <= at {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let t0 = keys[lo].at;
    let t1 = keys[hi].at;
    let factor = if (t1 - t0).abs() < 1e-8 {
        0.0
    } else {
        (at - t0) / (t1 - t0)
    };
    Some((lo, hi, factor))
}

/// A set of named tracks played together over time.
#[derive(Debug, Clone)]
pub struct Sequence<C> {
    tracks: Vec<(C, Timeline)>,
    time: f32,
    duration: f32,
}

impl<C: Copy + PartialEq> Sequence<C> {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            time: 0.0,
            duration: 0.0,
        }
    }

    pub fn track(mut self, channel: C, timeline: Timeline) -> Self {
        self.duration = self.duration.max(timeline.end());
        self.tracks.push((channel, timeline));
        self
    }

    /// Move the playhead forward. Returns true once the end is reached.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.time = (self.time + dt.max(0.0)).min(self.duration);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.time >= self.duration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Value of one channel at the current playhead.
    pub fn value(&self, channel: C) -> Option<f32> {
        self.sample_at(channel, self.time)
    }

    pub fn sample_at(&self, channel: C, at: f32) -> Option<f32> {
        self.tracks
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, tl)| tl.sample(at))
    }

    /// Every channel sampled at the current playhead.
    pub fn samples(&self) -> impl Iterator<Item = (C, f32)> + '_ {
        self.tracks.iter().map(|(c, tl)| (*c, tl.sample(self.time)))
    }
}

impl<C: Copy + PartialEq> Default for Sequence<C> {
    fn default() -> Self {
        Self::new()
    }
}
