use glam::Vec3;

use crate::camera::CameraRig;
use crate::sizes::DeviceClass;
use crate::timeline::Timeline;
use crate::world::{World, CIRCLE_COUNT};

/// Values of the scene bound to scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollChannel {
    RoomX,
    RoomZ,
    RoomScale,
    CameraX,
    Circle(usize),
}

/// `data-scroll-section` values, in page order.
pub const SECTION_NAMES: [&str; 3] = ["first-move", "second-move", "third-move"];

/// Per-section progress, each in `[0, 1]`. Their sum is the scroll position in `[0, 3]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollProgress {
    pub sections: [f32; 3],
}

impl ScrollProgress {
    pub fn new(sections: [f32; 3]) -> Self {
        Self {
            sections: sections.map(|s| if s.is_finite() { s.clamp(0.0, 1.0) } else { 0.0 }),
        }
    }

    /// Split a whole-page fraction over three equal sections.
    pub fn from_page(fraction: f32) -> Self {
        let pos = fraction.clamp(0.0, 1.0) * 3.0;
        Self::new([0, 1, 2].map(|i| pos - i as f32))
    }

    pub fn position(&self) -> f32 {
        self.sections.iter().sum()
    }
}

/// How far a section has been scrolled through: 0 while its top is at or
/// below the bottom of the viewport, 1 once its bottom reaches the bottom.
pub fn section_progress(top: f32, height: f32, viewport_height: f32) -> f32 {
    if height <= 0.0 {
        return if top < viewport_height { 1.0 } else { 0.0 };
    }
    ((viewport_height - top) / height).clamp(0.0, 1.0)
}

/// Track set for one device class. Keys sit on section boundaries.
fn tracks(device: DeviceClass) -> Vec<(ScrollChannel, Timeline)> {
    let mut tracks = match device {
        DeviceClass::Desktop => vec![
            (
                ScrollChannel::RoomX,
                Timeline::new().key(0.0, 0.0).key(1.0, 3.0).key(2.0, 1.0).key(3.0, 1.0),
            ),
            (
                ScrollChannel::RoomZ,
                Timeline::new().key(0.0, 0.0).key(1.0, 0.0).key(2.0, 2.5).key(3.0, 2.5),
            ),
            (
                ScrollChannel::RoomScale,
                Timeline::new().key(0.0, 0.11).key(1.0, 0.11).key(2.0, 0.44).key(3.0, 0.44),
            ),
            (
                ScrollChannel::CameraX,
                Timeline::new().key(0.0, 0.0).key(2.0, 0.0).key(3.0, -4.1),
            ),
        ],
        DeviceClass::Mobile => vec![
            (
                ScrollChannel::RoomX,
                Timeline::new().key(0.0, 0.0).key(1.0, 0.0).key(2.0, 1.5).key(3.0, 1.5),
            ),
            (
                ScrollChannel::RoomZ,
                Timeline::new().key(0.0, 0.0).key(2.0, 0.0).key(3.0, -4.5),
            ),
            (
                ScrollChannel::RoomScale,
                Timeline::new().key(0.0, 0.07).key(1.0, 0.1).key(2.0, 0.25).key(3.0, 0.25),
            ),
            (ScrollChannel::CameraX, Timeline::constant(0.0)),
        ],
    };
    for i in 0..CIRCLE_COUNT {
        let start = i as f32;
        tracks.push((
            ScrollChannel::Circle(i),
            Timeline::new().key(start, 0.0).key(start + 1.0, 3.0),
        ));
    }
    tracks
}

/// Scroll-animation controller. Inert until the loading sequence enables it.
pub struct ScrollControls {
    enabled: bool,
    device: DeviceClass,
    tracks: Vec<(ScrollChannel, Timeline)>,
}

impl ScrollControls {
    pub fn new(device: DeviceClass) -> Self {
        Self {
            enabled: false,
            device,
            tracks: tracks(device),
        }
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            log::info!("Scroll controls enabled");
        }
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn set_device(&mut self, device: DeviceClass) {
        if device != self.device {
            self.device = device;
            self.tracks = tracks(device);
        }
    }

    pub fn sample(&self, channel: ScrollChannel, position: f32) -> Option<f32> {
        self.tracks
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, tl)| tl.sample(position))
    }

    /// Write every track's value at the current scroll position.
    pub fn update(&self, scroll: &ScrollProgress, world: &mut World, camera: &mut CameraRig) {
        if !self.enabled {
            return;
        }
        let pos = scroll.position();
        for (channel, timeline) in &self.tracks {
            let value = timeline.sample(pos);
            match *channel {
                ScrollChannel::RoomX => world.room.position.x = value,
                ScrollChannel::RoomZ => world.room.position.z = value,
                ScrollChannel::RoomScale => world.room.scale = value,
                ScrollChannel::CameraX => {
                    camera.set_orthographic_offset(Vec3::new(value, 0.0, 0.0))
                }
                ScrollChannel::Circle(i) => world.floor.set_circle_scale(i, value),
            }
        }
    }
}
