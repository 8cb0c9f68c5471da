use std::f32::consts::TAU;

use crate::events::ExperienceEvent;
use crate::sizes::DeviceClass;
use crate::timeline::{Ease, Sequence, Timeline};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloaderState {
    WaitingForAssets,
    WaitingForGesture,
    PlayingFinal,
    Complete,
}

/// Values the loading sequence animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroChannel {
    RoomX,
    RoomZ,
    CubeScale,
    CubeRotationY,
    /// Pop-in progress of the room parts, 0 to 1.
    Reveal,
}

const CUBE_SCALE: f32 = 1.4;

/// Cube grows in, room slides aside to make room for it.
fn intro_sequence(device: DeviceClass) -> Sequence<IntroChannel> {
    let slide = Timeline::new().key(0.0, 0.0).key_eased(0.7, -1.0, Ease::QuadOut);
    let seq = Sequence::new().track(
        IntroChannel::CubeScale,
        Timeline::new().key(0.0, 0.0).key_eased(0.7, CUBE_SCALE, Ease::BackOut),
    );
    match device {
        DeviceClass::Desktop => seq.track(IntroChannel::RoomX, slide),
        DeviceClass::Mobile => seq.track(IntroChannel::RoomZ, slide),
    }
}

/// Room returns, cube spins and hides, room parts pop in.
fn final_sequence(device: DeviceClass) -> Sequence<IntroChannel> {
    let back = Timeline::new().key(0.0, -1.0).key_eased(0.6, 0.0, Ease::QuadOut);
    let seq = Sequence::new()
        .track(
            IntroChannel::CubeRotationY,
            Timeline::new().key(0.0, 0.0).key_eased(0.8, TAU, Ease::CubicInOut),
        )
        .track(
            IntroChannel::CubeScale,
            Timeline::new()
                .key(0.0, CUBE_SCALE)
                .key(0.8, CUBE_SCALE)
                .key_eased(1.1, 0.0, Ease::QuadOut),
        )
        .track(
            IntroChannel::Reveal,
            Timeline::new().key(0.0, 0.0).key(1.1, 0.0).key(2.3, 1.0),
        );
    match device {
        DeviceClass::Desktop => seq.track(IntroChannel::RoomX, back),
        DeviceClass::Mobile => seq.track(IntroChannel::RoomZ, back),
    }
}

/// Loading-sequence controller. Plays the intro once the world exists, waits
/// for the first scroll or touch, plays the final sequence, then enables the
/// scroll controls exactly once.
pub struct Preloader {
    state: PreloaderState,
    intro: Option<Sequence<IntroChannel>>,
    finale: Option<Sequence<IntroChannel>>,
    device: DeviceClass,
    ignored_gestures: u32,
}

impl Preloader {
    pub fn new() -> Self {
        Self {
            state: PreloaderState::WaitingForAssets,
            intro: None,
            finale: None,
            device: DeviceClass::Desktop,
            ignored_gestures: 0,
        }
    }

    pub fn state(&self) -> PreloaderState {
        self.state
    }

    /// The world has been built from the loaded assets: start the intro.
    pub fn world_ready(&mut self, device: DeviceClass) {
        if self.state != PreloaderState::WaitingForAssets {
            log::warn!("World reported ready twice, ignored");
            return;
        }
        self.device = device;
        self.intro = Some(intro_sequence(device));
        self.state = PreloaderState::WaitingForGesture;
        log::debug!("Intro started ({})", device.label());
    }

    /// A scroll or touch gesture. Only the first one after the intro has
    /// finished starts the final sequence.
    pub fn gesture(&mut self) -> bool {
        let intro_done = self.intro.as_ref().is_some_and(|s| s.is_finished());
        if self.state == PreloaderState::WaitingForGesture && intro_done {
            self.finale = Some(final_sequence(self.device));
            self.state = PreloaderState::PlayingFinal;
            log::debug!("Gesture received, playing final sequence");
            true
        } else {
            self.ignored_gestures += 1;
            false
        }
    }

    /// Gestures that arrived while the gate was closed.
    pub fn ignored_gestures(&self) -> u32 {
        self.ignored_gestures
    }

    /// Advance whichever sequence is playing and write its values into the world.
    /// Yields `ControlsEnabled` on the frame the final sequence ends.
    pub fn update(&mut self, dt: f32, world: Option<&mut World>) -> Option<ExperienceEvent> {
        let seq = match self.state {
            PreloaderState::WaitingForGesture => self.intro.as_mut()?,
            PreloaderState::PlayingFinal => self.finale.as_mut()?,
            PreloaderState::WaitingForAssets | PreloaderState::Complete => return None,
        };
        let finished = seq.advance(dt);
        if let Some(world) = world {
            apply(seq, world);
        }

        if finished && self.state == PreloaderState::PlayingFinal {
            self.state = PreloaderState::Complete;
            log::info!("Loading sequence complete, controls enabled");
            return Some(ExperienceEvent::ControlsEnabled);
        }
        None
    }
}

impl Default for Preloader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(seq: &Sequence<IntroChannel>, world: &mut World) {
    let room = &mut world.room;
    for (channel, value) in seq.samples() {
        match channel {
            IntroChannel::RoomX => room.position.x = value,
            IntroChannel::RoomZ => room.position.z = value,
            IntroChannel::CubeScale => room.set_cube_scale(value),
            IntroChannel::CubeRotationY => room.set_cube_rotation(value),
            IntroChannel::Reveal => room.set_reveal(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn run(p: &mut Preloader, seconds: f32) -> Vec<ExperienceEvent> {
        let mut events = Vec::new();
        let steps = (seconds / DT).ceil() as usize;
        for _ in 0..steps {
            events.extend(p.update(DT, None));
        }
        events
    }

    #[test]
    fn test_gestures_before_assets_are_ignored() {
        let mut p = Preloader::new();
        for _ in 0..50 {
            assert!(!p.gesture());
        }
        assert_eq!(p.state(), PreloaderState::WaitingForAssets);
        assert_eq!(p.ignored_gestures(), 50);
        assert!(run(&mut p, 5.0).is_empty());
    }

    #[test]
    fn test_gesture_during_intro_is_ignored() {
        let mut p = Preloader::new();
        p.world_ready(DeviceClass::Desktop);
        p.update(0.2, None);
        assert!(!p.gesture());
        assert_eq!(p.state(), PreloaderState::WaitingForGesture);
    }

    #[test]
    fn test_full_sequence_enables_controls_once() {
        let mut p = Preloader::new();
        p.world_ready(DeviceClass::Desktop);
        assert!(run(&mut p, 1.0).is_empty());
        assert!(p.gesture());
        assert_eq!(p.state(), PreloaderState::PlayingFinal);
        assert!(!p.gesture());

        let events = run(&mut p, 3.0);
        assert_eq!(events, vec![ExperienceEvent::ControlsEnabled]);
        assert_eq!(p.state(), PreloaderState::Complete);
        assert!(run(&mut p, 1.0).is_empty());
        assert!(!p.gesture());
    }

    #[test]
    fn test_world_ready_twice_keeps_state() {
        let mut p = Preloader::new();
        p.world_ready(DeviceClass::Mobile);
        run(&mut p, 1.0);
        p.world_ready(DeviceClass::Desktop);
        assert_eq!(p.state(), PreloaderState::WaitingForGesture);
        assert!(p.gesture());
    }

    #[test]
    fn test_intro_tracks_by_device() {
        let desktop = intro_sequence(DeviceClass::Desktop);
        assert_eq!(desktop.sample_at(IntroChannel::RoomX, 0.7), Some(-1.0));
        assert_eq!(desktop.sample_at(IntroChannel::RoomZ, 0.7), None);
        let mobile = intro_sequence(DeviceClass::Mobile);
        assert_eq!(mobile.sample_at(IntroChannel::RoomZ, 0.7), Some(-1.0));
        assert_eq!(mobile.sample_at(IntroChannel::CubeScale, 0.7), Some(CUBE_SCALE));
    }

    #[test]
    fn test_final_sequence_shape() {
        let seq = final_sequence(DeviceClass::Desktop);
        assert!((seq.duration() - 2.3).abs() < 1e-6);
        assert_eq!(seq.sample_at(IntroChannel::CubeScale, 0.5), Some(CUBE_SCALE));
        assert_eq!(seq.sample_at(IntroChannel::CubeScale, 1.1), Some(0.0));
        assert_eq!(seq.sample_at(IntroChannel::Reveal, 1.0), Some(0.0));
        assert_eq!(seq.sample_at(IntroChannel::Reveal, 2.3), Some(1.0));
        assert_eq!(seq.sample_at(IntroChannel::RoomX, 0.6), Some(0.0));
    }
}
