//! Scripted runs of the whole experience against a recording surface.

use glam::{Mat4, Vec3};
use roomfolio_gpu_shared::frame::{MeshData, MeshHandle, RenderFrame, TextureData, TextureHandle};
use roomfolio_web::controls::ScrollProgress;
use roomfolio_web::model::{ModelNode, ModelPart};
use roomfolio_web::preloader::PreloaderState;
use roomfolio_web::resources::{Asset, VideoInfo};
use roomfolio_web::sizes::{DeviceClass, Viewport};
use roomfolio_web::theme::Theme;
use roomfolio_web::transform::Transform;
use roomfolio_web::{
    Experience, ExperienceError, ExperienceStatus, RenderSurface, RoomModel, SiteConfig,
};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Default)]
struct FakeSurface {
    next: u64,
    frames: usize,
    last: Option<RenderFrame>,
    fail_draws: bool,
}

impl FakeSurface {
    fn handle(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl RenderSurface for FakeSurface {
    fn resize(&mut self, _viewport: &Viewport) {}

    fn upload_mesh(&mut self, _mesh: &MeshData) -> MeshHandle {
        MeshHandle(self.handle())
    }

    fn upload_texture(&mut self, _texture: &TextureData) -> Result<TextureHandle, ExperienceError> {
        Ok(TextureHandle(self.handle()))
    }

    fn video_texture(&mut self, _asset: &str, _info: &VideoInfo) -> Option<TextureHandle> {
        Some(TextureHandle(self.handle()))
    }

    fn draw(&mut self, frame: &RenderFrame) -> Result<(), ExperienceError> {
        if self.fail_draws {
            return Err(ExperienceError::Render("out of memory".into()));
        }
        self.frames += 1;
        self.last = Some(frame.clone());
        Ok(())
    }
}

fn triangle() -> MeshData {
    MeshData {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
    }
}

fn room() -> RoomModel {
    let names = [
        "Room", "Screen", "Cube", "Desks", "Shelves", "Computer", "Chair", "Aquarium", "Clock",
        "Lamp", "Flowers",
    ];
    let nodes = names
        .iter()
        .enumerate()
        .map(|(i, name)| ModelNode {
            name: name.to_string(),
            parent: if i == 0 { None } else { Some(0) },
            transform: Transform::IDENTITY,
            world: Mat4::IDENTITY,
            parts: if i == 0 {
                Vec::new()
            } else {
                vec![ModelPart {
                    mesh: 0,
                    base_color: [1.0; 4],
                    texture: None,
                }]
            },
        })
        .collect();
    RoomModel::from_parts(nodes, vec![triangle()], Vec::new()).unwrap()
}

struct Script {
    exp: Experience<FakeSurface>,
    now: f64,
}

impl Script {
    fn new(width: u32) -> Self {
        let exp = Experience::new(SiteConfig::default(), width, 800, 2.0, FakeSurface::default())
            .unwrap();
        Self { exp, now: 0.0 }
    }

    fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.exp.frame(self.now).unwrap();
            self.now += 1000.0 / 60.0;
        }
    }

    fn load(&mut self) {
        self.exp.asset_loaded("room", Asset::Model(room()));
        self.exp.asset_loaded(
            "screen",
            Asset::Video(VideoInfo {
                width: 1920,
                height: 1080,
            }),
        );
    }

    /// Assets in, intro watched, first scroll, final sequence watched.
    fn through_loading(&mut self) {
        self.load();
        self.frames(60);
        self.exp.wheel(120.0);
        self.frames(60 * 3);
        assert_eq!(self.exp.preloader().state(), PreloaderState::Complete);
        assert!(self.exp.controls().is_enabled());
    }
}

#[test]
fn test_scripted_desktop_half_scroll_and_theme() {
    let mut s = Script::new(1440);
    s.through_loading();

    s.exp.set_scroll(ScrollProgress::from_page(0.5));
    s.frames(1);
    s.exp.toggle_theme();
    s.frames(1);

    let world = s.exp.world().unwrap();
    assert!(approx_eq(world.room.position.x, 2.0));
    assert!(approx_eq(world.room.position.z, 1.25));
    assert!(approx_eq(world.room.scale, 0.275));
    assert!(approx_eq(world.floor.circle_scale(0).unwrap(), 3.0));
    assert!(approx_eq(world.floor.circle_scale(1).unwrap(), 1.5));
    assert!(approx_eq(world.floor.circle_scale(2).unwrap(), 0.0));
    assert_eq!(s.exp.camera().orthographic.offset, Vec3::ZERO);
    assert_eq!(s.exp.theme(), Theme::Dark);
    assert_eq!(s.exp.status(), &ExperienceStatus::Ready);
}

#[test]
fn test_scripted_mobile_half_scroll() {
    let mut s = Script::new(600);
    assert_eq!(s.exp.viewport().device, DeviceClass::Mobile);
    s.through_loading();

    s.exp.set_scroll(ScrollProgress::from_page(0.5));
    s.frames(1);

    let world = s.exp.world().unwrap();
    assert!(approx_eq(world.room.position.x, 0.75));
    assert!(approx_eq(world.room.position.z, 0.0));
    assert!(approx_eq(world.room.scale, 0.175));
}

#[test]
fn test_full_scroll_reaches_terminal_values() {
    let mut s = Script::new(1440);
    s.through_loading();
    s.exp.set_scroll(ScrollProgress::from_page(1.0));
    s.frames(1);

    let world = s.exp.world().unwrap();
    assert!(approx_eq(world.room.position.x, 1.0));
    assert!(approx_eq(world.room.position.z, 2.5));
    assert!(approx_eq(world.room.scale, 0.44));
    assert!(approx_eq(s.exp.camera().orthographic.offset.x, -4.1));
}

#[test]
fn test_scroll_ignored_before_controls_enabled() {
    let mut s = Script::new(1440);
    s.load();
    s.exp.set_scroll(ScrollProgress::from_page(1.0));
    s.frames(10);
    let world = s.exp.world().unwrap();
    assert!(approx_eq(world.room.scale, 0.11));
    assert!(approx_eq(world.floor.circle_scale(2).unwrap(), 0.0));
}

#[test]
fn test_gesture_flood_before_assets() {
    let mut s = Script::new(1440);
    for _ in 0..500 {
        s.exp.wheel(80.0);
        s.exp.touch_start(600.0);
        s.exp.touch_move(400.0);
        s.frames(1);
        assert_ne!(s.exp.preloader().state(), PreloaderState::PlayingFinal);
    }
    s.load();
    s.frames(120);
    assert_eq!(s.exp.preloader().state(), PreloaderState::WaitingForGesture);
    assert!(!s.exp.controls().is_enabled());
}

#[test]
fn test_breakpoint_crossing_switches_tracks() {
    let mut s = Script::new(1440);
    s.through_loading();
    s.exp.set_scroll(ScrollProgress::from_page(0.5));
    s.exp.resize(700, 800, 1.0);
    s.frames(1);
    assert_eq!(s.exp.controls().device(), DeviceClass::Mobile);
    assert!(approx_eq(s.exp.world().unwrap().room.scale, 0.175));
}

#[test]
fn test_render_failure_surfaces_as_error_state() {
    let mut s = Script::new(1440);
    s.load();
    s.exp.surface_mut().fail_draws = true;
    assert!(matches!(s.exp.frame(0.0), Err(ExperienceError::Render(_))));
    assert!(matches!(s.exp.status(), ExperienceStatus::Failed(_)));
}

#[test]
fn test_frames_carry_theme_clear_color() {
    let mut s = Script::new(1440);
    s.load();
    s.frames(1);
    let light = s.exp.surface().last.as_ref().unwrap().clear_color;
    s.exp.toggle_theme();
    s.frames(60);
    let dark = s.exp.surface().last.as_ref().unwrap().clear_color;
    assert!(dark[0] < light[0]);
    assert!(s.exp.surface().frames >= 61);
}
