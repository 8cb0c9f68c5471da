//! Scene coordinator: lighting, floor and the loaded room.

mod environment;
mod floor;
mod room;

pub use environment::{Environment, THEME_TRANSITION};
pub use floor::{Floor, CIRCLE_COUNT};
pub use room::{base_scale, Room};

use roomfolio_gpu_shared::frame::RenderFrame;

use crate::camera::CameraRig;
use crate::config::SceneConfig;
use crate::error::ExperienceError;
use crate::resources::AssetRegistry;
use crate::sizes::DeviceClass;
use crate::surface::RenderSurface;
use crate::theme::Theme;
use crate::time::FrameTime;

pub struct World {
    pub environment: Environment,
    pub floor: Floor,
    pub room: Room,
    device: DeviceClass,
}

impl World {
    /// Upload everything the scene needs. Called once assets are ready.
    pub fn build<S: RenderSurface + ?Sized>(
        scene: &SceneConfig,
        registry: &AssetRegistry,
        theme: Theme,
        device: DeviceClass,
        surface: &mut S,
    ) -> Result<Self, ExperienceError> {
        let model = registry.model(&scene.room_asset).ok_or_else(|| {
            ExperienceError::asset(&scene.room_asset, "model missing from the registry")
        })?;

        let video = match registry.video(&scene.video_asset) {
            Some(info) => surface.video_texture(&scene.video_asset, &info),
            None => None,
        };
        if video.is_none() {
            log::warn!("No video texture for `{}`, screen stays untextured", scene.video_asset);
        }

        let floor = Floor::build(surface);
        let room = Room::build(model, scene, video, device, surface)?;
        log::info!("World built: {} room nodes", room.model().nodes.len());

        Ok(Self {
            environment: Environment::new(theme),
            floor,
            room,
            device,
        })
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.environment.set_theme(theme);
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Reset the room to the new device's layout.
    pub fn set_device(&mut self, device: DeviceClass) {
        self.device = device;
        self.room.scale = base_scale(device);
    }

    pub fn update(&mut self, time: FrameTime, pointer_x: f32) {
        self.environment.update(time.delta);
        self.room.follow_pointer(pointer_x);
        self.room.update_transforms();
    }

    pub fn render_frame(&self, camera: &CameraRig) -> RenderFrame {
        let mut draws = Vec::new();
        self.floor.draws(&mut draws);
        self.room.draws(&mut draws);
        RenderFrame {
            uniforms: self.environment.uniforms(camera.active_view_projection()),
            clear_color: self.environment.palette().clear_color,
            draws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Asset, AssetKind, AssetSource, Resources, VideoInfo};
    use crate::model::RoomModel;
    use crate::testing::{node, sample_room, triangle, RecordingSurface};
    use roomfolio_gpu_shared::frame::TextureData;
    use glam::Vec3;

    fn registry(with_video: bool) -> Resources {
        let mut manifest = vec![AssetSource {
            name: "room".into(),
            kind: AssetKind::Model,
            path: "room.glb".into(),
        }];
        if with_video {
            manifest.push(AssetSource {
                name: "screen".into(),
                kind: AssetKind::VideoTexture,
                path: "screen.mp4".into(),
            });
        }
        let mut res = Resources::new(manifest);
        res.start();
        res.asset_loaded("room", Asset::Model(sample_room()));
        if with_video {
            res.asset_loaded(
                "screen",
                Asset::Video(VideoInfo {
                    width: 640,
                    height: 360,
                }),
            );
        }
        res
    }

    fn build(with_video: bool, device: DeviceClass) -> (World, RecordingSurface) {
        let mut surface = RecordingSurface::default();
        let res = registry(with_video);
        let world = World::build(
            &SceneConfig::default(),
            res.registry(),
            Theme::Light,
            device,
            &mut surface,
        )
        .unwrap();
        (world, surface)
    }

    fn camera() -> CameraRig {
        let vp = crate::sizes::Sizes::new(1200, 800, 1.0, 968, 2.0).viewport();
        CameraRig::new(&crate::config::CameraConfig::default(), &vp)
    }

    // ── build ──

    #[test]
    fn test_build_uploads_geometry() {
        let (_, surface) = build(true, DeviceClass::Desktop);
        // room meshes + floor plane + disc
        assert_eq!(surface.meshes, sample_room().meshes.len() + 2);
        assert_eq!(surface.videos, vec!["screen".to_string()]);
    }

    #[test]
    fn test_intro_nodes_and_cube_start_hidden() {
        let (world, _) = build(true, DeviceClass::Desktop);
        assert_eq!(world.room.node_scale("Desks"), Some(Vec3::ZERO));
        assert_eq!(world.room.node_scale("Cube"), Some(Vec3::ZERO));
        assert_eq!(world.room.node_scale("Screen"), Some(Vec3::ONE));
    }

    #[test]
    fn test_base_scale_per_device() {
        assert_eq!(build(true, DeviceClass::Desktop).0.room.scale, 0.11);
        let (mut world, _) = build(true, DeviceClass::Mobile);
        assert_eq!(world.room.scale, 0.07);
        world.set_device(DeviceClass::Desktop);
        assert_eq!(world.room.scale, 0.11);
    }

    #[test]
    fn test_missing_model_is_error() {
        let mut surface = RecordingSurface::default();
        let res = Resources::new(Vec::new());
        let result = World::build(
            &SceneConfig::default(),
            res.registry(),
            Theme::Light,
            DeviceClass::Desktop,
            &mut surface,
        );
        assert!(matches!(result, Err(ExperienceError::Asset { .. })));
    }

    // ── frame ──

    #[test]
    fn test_screen_drawn_unlit_with_video() {
        let (world, _) = build(true, DeviceClass::Desktop);
        let frame = world.render_frame(&camera());
        let unlit: Vec<_> = frame.draws.iter().filter(|d| d.unlit).collect();
        assert_eq!(unlit.len(), 1);
        assert!(unlit[0].texture.is_some());
    }

    #[test]
    fn test_screen_lit_without_video() {
        let (world, _) = build(false, DeviceClass::Desktop);
        let frame = world.render_frame(&camera());
        assert!(frame.draws.iter().all(|d| !d.unlit));
    }

    #[test]
    fn test_hidden_nodes_are_not_drawn() {
        let (mut world, _) = build(true, DeviceClass::Desktop);
        let hidden = world.render_frame(&camera()).draws.len();
        world.room.set_reveal(1.0);
        world.room.set_cube_scale(1.0);
        world.room.update_transforms();
        let shown = world.render_frame(&camera()).draws.len();
        assert!(shown > hidden);
    }

    #[test]
    fn test_small_nodes_drawn_on_mobile() {
        let mut trinket = node("Trinket", Some(0), Some(0), None);
        trinket.transform.scale = Vec3::splat(0.001);
        let model = RoomModel::from_parts(
            vec![node("Room", None, None, None), trinket],
            vec![triangle()],
            Vec::new(),
        )
        .unwrap();
        let mut res = Resources::new(vec![AssetSource {
            name: "room".into(),
            kind: AssetKind::Model,
            path: "room.glb".into(),
        }]);
        res.start();
        res.asset_loaded("room", Asset::Model(model));

        let mut surface = RecordingSurface::default();
        let scene = SceneConfig {
            intro_nodes: Vec::new(),
            ..SceneConfig::default()
        };
        let world = World::build(
            &scene,
            res.registry(),
            Theme::Light,
            DeviceClass::Mobile,
            &mut surface,
        )
        .unwrap();
        let mut draws = Vec::new();
        world.room.draws(&mut draws);
        assert_eq!(draws.len(), 1);
    }

    #[test]
    fn test_children_of_hidden_nodes_not_drawn() {
        let mut nodes = sample_room().nodes;
        let cube = nodes.iter().position(|n| n.name == "Cube").unwrap();
        nodes.push(node("CubeLid", Some(cube), Some(0), None));
        let model = RoomModel::from_parts(nodes, vec![triangle(); 3], vec![TextureData {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }])
        .unwrap();
        let mut res = Resources::new(vec![AssetSource {
            name: "room".into(),
            kind: AssetKind::Model,
            path: "room.glb".into(),
        }]);
        res.start();
        res.asset_loaded("room", Asset::Model(model));

        let mut surface = RecordingSurface::default();
        let mut world = World::build(
            &SceneConfig::default(),
            res.registry(),
            Theme::Light,
            DeviceClass::Desktop,
            &mut surface,
        )
        .unwrap();
        let mut hidden = Vec::new();
        world.room.draws(&mut hidden);
        world.room.set_cube_scale(1.0);
        world.room.update_transforms();
        let mut shown = Vec::new();
        world.room.draws(&mut shown);
        // cube and its lid
        assert_eq!(shown.len(), hidden.len() + 2);
    }

    #[test]
    fn test_reveal_staggers_nodes() {
        let (mut world, _) = build(true, DeviceClass::Desktop);
        world.room.set_reveal(0.2);
        let first = world.room.node_scale("Desks").unwrap().x;
        let last = world.room.node_scale("Flowers").unwrap().x;
        assert!(first > 0.0);
        assert_eq!(last, 0.0);
        world.room.set_reveal(1.0);
        assert!((world.room.node_scale("Flowers").unwrap().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pointer_follow_is_damped() {
        let (mut world, _) = build(true, DeviceClass::Desktop);
        let t = FrameTime {
            elapsed: 0.0,
            delta: 0.016,
        };
        world.update(t, 1.0);
        assert!((world.room.yaw() - 0.005).abs() < 1e-6);
        for _ in 0..200 {
            world.update(t, 1.0);
        }
        assert!((world.room.yaw() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_theme_changes_clear_color_after_transition() {
        let (mut world, _) = build(true, DeviceClass::Desktop);
        let before = world.render_frame(&camera()).clear_color;
        world.set_theme(Theme::Dark);
        world.update(
            FrameTime {
                elapsed: 1.0,
                delta: THEME_TRANSITION,
            },
            0.0,
        );
        let after = world.render_frame(&camera()).clear_color;
        assert_ne!(before, after);
    }
}
