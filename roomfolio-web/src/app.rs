use crate::camera::CameraRig;
use crate::config::SiteConfig;
use crate::controls::{ScrollControls, ScrollProgress};
use crate::error::ExperienceError;
use crate::events::{EventQueue, ExperienceEvent, Signal};
use crate::input::InputState;
use crate::preloader::Preloader;
use crate::resources::{Asset, Resources};
use crate::sizes::{Sizes, Viewport};
use crate::surface::RenderSurface;
use crate::theme::{Theme, ThemeSwitcher};
use crate::time::{FrameClock, FrameTime};
use crate::world::World;

/// Per-frame update stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    Preloader,
    Camera,
    World,
    Renderer,
    Controls,
}

/// Order the stages run in every frame.
pub const UPDATE_ORDER: [UpdateStage; 5] = [
    UpdateStage::Preloader,
    UpdateStage::Camera,
    UpdateStage::World,
    UpdateStage::Renderer,
    UpdateStage::Controls,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceStatus {
    Loading,
    Ready,
    Failed(String),
}

impl ExperienceStatus {
    /// Value mirrored into `<body data-experience-state>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed(_) => "error",
        }
    }
}

/// The orchestrator: one explicitly constructed instance owning the render
/// surface and every component.
pub struct Experience<S: RenderSurface> {
    config: SiteConfig,
    surface: S,
    sizes: Sizes,
    clock: FrameClock,
    resources: Resources,
    camera: CameraRig,
    theme: ThemeSwitcher,
    preloader: Preloader,
    world: Option<World>,
    controls: ScrollControls,
    input: InputState,
    scroll: ScrollProgress,
    events: EventQueue,
    status: ExperienceStatus,
    last_frame: FrameTime,
    stage_log: Vec<UpdateStage>,
    pub on_theme_switch: Signal<Theme>,
    pub on_controls_enabled: Signal<()>,
    pub on_error: Signal<ExperienceError>,
}

impl<S: RenderSurface> Experience<S> {
    pub fn new(
        config: SiteConfig,
        width: u32,
        height: u32,
        pixel_ratio: f32,
        mut surface: S,
    ) -> Result<Self, ExperienceError> {
        config.validate()?;

        let sizes = Sizes::new(
            width,
            height,
            pixel_ratio,
            config.breakpoint,
            config.max_pixel_ratio,
        );
        let clock = FrameClock::new();
        let mut resources = Resources::new(config.assets.clone());

        let viewport = sizes.viewport();
        let camera = CameraRig::new(&config.camera, &viewport);
        surface.resize(&viewport);
        let theme = ThemeSwitcher::default();
        let preloader = Preloader::new();
        let controls = ScrollControls::new(viewport.device);

        let mut events = EventQueue::new();
        events.publish_all(resources.start());

        log::info!(
            "Experience created: {}x{} @{} ({})",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio,
            viewport.device.label()
        );

        Ok(Self {
            config,
            surface,
            sizes,
            clock,
            resources,
            camera,
            theme,
            preloader,
            world: None,
            controls,
            input: InputState::new(),
            scroll: ScrollProgress::default(),
            events,
            status: ExperienceStatus::Loading,
            last_frame: FrameTime::default(),
            stage_log: Vec::new(),
            on_theme_switch: Signal::new(),
            on_controls_enabled: Signal::new(),
            on_error: Signal::new(),
        })
    }

    // ── inputs ──

    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        let events = self.sizes.resize(width, height, pixel_ratio);
        self.events.publish_all(events);
        self.dispatch();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.input.pointer_move(x, y);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if self.input.wheel(delta_y) {
            self.preloader.gesture();
        }
    }

    pub fn touch_start(&mut self, y: f32) {
        self.input.touch_start(y);
    }

    /// Touch moved to client `y`; an upward swipe counts as a gesture.
    pub fn touch_move(&mut self, y: f32) {
        if self.input.touch_move(y) {
            self.preloader.gesture();
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggle();
        self.events.publish(ExperienceEvent::ThemeSwitched(theme));
        self.dispatch();
        theme
    }

    pub fn asset_loaded(&mut self, name: &str, asset: Asset) {
        let event = self.resources.asset_loaded(name, asset);
        self.events.publish_all(event);
        self.dispatch();
    }

    pub fn asset_failed(&mut self, name: &str, reason: &str) {
        let event = self.resources.asset_failed(name, reason);
        self.events.publish_all(event);
        self.dispatch();
    }

    pub fn set_scroll(&mut self, scroll: ScrollProgress) {
        self.scroll = scroll;
    }

    // ── frame ──

    /// Run one frame: tick the clock, dispatch pending notifications, then
    /// update every stage in `UPDATE_ORDER`.
    pub fn frame(&mut self, now_ms: f64) -> Result<(), ExperienceError> {
        let time = self.clock.tick(now_ms);
        self.last_frame = time;
        self.dispatch();

        self.stage_log.clear();
        for stage in UPDATE_ORDER {
            self.stage_log.push(stage);
            self.run_stage(stage, time)?;
        }
        self.dispatch();
        Ok(())
    }

    fn run_stage(&mut self, stage: UpdateStage, time: FrameTime) -> Result<(), ExperienceError> {
        match stage {
            UpdateStage::Preloader => {
                let event = self.preloader.update(time.delta, self.world.as_mut());
                self.events.publish_all(event);
            }
            UpdateStage::Camera => self.camera.update(),
            UpdateStage::World => {
                let pointer_x = self.input.normalized_pointer_x(self.sizes.viewport().width);
                if let Some(world) = self.world.as_mut() {
                    world.update(time, pointer_x);
                }
            }
            UpdateStage::Renderer => {
                if let Some(world) = self.world.as_ref() {
                    let frame = world.render_frame(&self.camera);
                    if let Err(e) = self.surface.draw(&frame) {
                        self.fail(e.clone());
                        return Err(e);
                    }
                }
            }
            UpdateStage::Controls => {
                if let Some(world) = self.world.as_mut() {
                    self.controls.update(&self.scroll, world, &mut self.camera);
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self) {
        while let Some(event) = self.events.pop() {
            log::trace!("dispatch {event:?}");
            match event {
                ExperienceEvent::Resized(viewport) => self.on_resized(&viewport),
                ExperienceEvent::DeviceChanged(device) => {
                    self.controls.set_device(device);
                    if let Some(world) = self.world.as_mut() {
                        world.set_device(device);
                    }
                }
                ExperienceEvent::AssetsReady => self.build_world(),
                ExperienceEvent::AssetsFailed(error) => self.fail(error),
                ExperienceEvent::WorldReady => {
                    self.preloader.world_ready(self.sizes.device());
                    self.status = ExperienceStatus::Ready;
                }
                ExperienceEvent::ControlsEnabled => {
                    self.controls.enable();
                    self.on_controls_enabled.emit(&());
                }
                ExperienceEvent::ThemeSwitched(theme) => {
                    if let Some(world) = self.world.as_mut() {
                        world.set_theme(theme);
                    }
                    self.on_theme_switch.emit(&theme);
                }
            }
        }
    }

    fn on_resized(&mut self, viewport: &Viewport) {
        self.camera.resize(viewport);
        self.surface.resize(viewport);
    }

    fn build_world(&mut self) {
        let built = World::build(
            &self.config.scene,
            self.resources.registry(),
            self.theme.theme(),
            self.sizes.device(),
            &mut self.surface,
        );
        match built {
            Ok(world) => {
                self.world = Some(world);
                self.events.publish(ExperienceEvent::WorldReady);
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: ExperienceError) {
        if matches!(self.status, ExperienceStatus::Failed(_)) {
            return;
        }
        log::error!("Experience failed: {error}");
        self.status = ExperienceStatus::Failed(error.to_string());
        self.on_error.emit(&error);
    }

    // ── accessors ──

    pub fn status(&self) -> &ExperienceStatus {
        &self.status
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.sizes.viewport()
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn preloader(&self) -> &Preloader {
        &self.preloader
    }

    pub fn controls(&self) -> &ScrollControls {
        &self.controls
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn scroll(&self) -> ScrollProgress {
        self.scroll
    }

    pub fn last_frame(&self) -> FrameTime {
        self.last_frame
    }

    /// Stages run during the last frame, in order.
    pub fn stage_log(&self) -> &[UpdateStage] {
        &self.stage_log
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::VideoInfo;
    use crate::testing::{sample_room, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn experience(width: u32) -> Experience<RecordingSurface> {
        Experience::new(SiteConfig::default(), width, 800, 1.0, RecordingSurface::default()).unwrap()
    }

    fn load(exp: &mut Experience<RecordingSurface>) {
        exp.asset_loaded("room", Asset::Model(sample_room()));
        exp.asset_loaded(
            "screen",
            Asset::Video(VideoInfo {
                width: 1280,
                height: 720,
            }),
        );
    }

    #[test]
    fn test_stage_order_is_declared_order() {
        let mut exp = experience(1200);
        exp.frame(0.0).unwrap();
        assert_eq!(exp.stage_log(), &UPDATE_ORDER);
    }

    #[test]
    fn test_loading_until_assets_arrive() {
        let mut exp = experience(1200);
        exp.frame(0.0).unwrap();
        assert_eq!(exp.status(), &ExperienceStatus::Loading);
        assert!(exp.world().is_none());
        assert!(exp.surface().frames.is_empty());
        load(&mut exp);
        assert_eq!(exp.status(), &ExperienceStatus::Ready);
        exp.frame(16.0).unwrap();
        assert_eq!(exp.surface().frames.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SiteConfig::default();
        config.breakpoint = 0;
        assert!(Experience::new(config, 800, 600, 1.0, RecordingSurface::default()).is_err());
    }

    #[test]
    fn test_failure_reaches_observers() {
        let mut exp = experience(1200);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        exp.on_error.subscribe(move |e: &ExperienceError| sink.borrow_mut().push(e.clone()));
        exp.asset_failed("room", "HTTP 404");
        load(&mut exp);
        assert!(matches!(exp.status(), ExperienceStatus::Failed(m) if m.contains("room")));
        assert_eq!(seen.borrow().len(), 1);
        assert!(exp.world().is_none());
    }

    #[test]
    fn test_early_gestures_never_start_final() {
        let mut exp = experience(1200);
        for i in 0..20 {
            exp.wheel(100.0);
            exp.touch_start(500.0);
            exp.touch_move(480.0 - i as f32);
            exp.touch_move(520.0);
        }
        assert_eq!(exp.preloader().ignored_gestures(), 40);
        load(&mut exp);
        exp.frame(0.0).unwrap();
        assert_eq!(exp.preloader().state(), crate::preloader::PreloaderState::WaitingForGesture);
    }

    #[test]
    fn test_theme_signal_and_round_trip() {
        let mut exp = experience(1200);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        exp.on_theme_switch.subscribe(move |t: &Theme| sink.borrow_mut().push(*t));
        assert_eq!(exp.toggle_theme(), Theme::Dark);
        assert_eq!(exp.toggle_theme(), Theme::Light);
        assert_eq!(*seen.borrow(), vec![Theme::Dark, Theme::Light]);
    }

    #[test]
    fn test_resize_reaches_camera_and_surface() {
        let mut exp = experience(1200);
        exp.resize(600, 800, 1.0);
        assert_eq!(exp.viewport().width, 600);
        assert_eq!(exp.controls().device(), crate::sizes::DeviceClass::Mobile);
        assert!((exp.camera().orthographic.aspect - 0.75).abs() < 1e-6);
        assert_eq!(exp.surface().resizes.last().map(|v| v.width), Some(600));
    }

    #[test]
    fn test_controls_enabled_once() {
        let mut exp = experience(1200);
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        exp.on_controls_enabled.subscribe(move |_| *sink.borrow_mut() += 1);
        load(&mut exp);
        let mut now = 0.0;
        for _ in 0..20 {
            exp.frame(now).unwrap();
            now += 50.0;
        }
        exp.wheel(50.0);
        for _ in 0..100 {
            exp.frame(now).unwrap();
            now += 50.0;
        }
        assert!(exp.controls().is_enabled());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_only_upward_swipe_opens_gate() {
        use crate::preloader::PreloaderState;

        let mut exp = experience(600);
        load(&mut exp);
        let mut now = 0.0;
        for _ in 0..40 {
            exp.frame(now).unwrap();
            now += 50.0;
        }
        assert_eq!(exp.preloader().state(), PreloaderState::WaitingForGesture);

        exp.touch_start(300.0);
        exp.touch_move(360.0);
        exp.frame(now).unwrap();
        assert_eq!(exp.preloader().state(), PreloaderState::WaitingForGesture);

        exp.touch_move(250.0);
        exp.frame(now + 50.0).unwrap();
        assert_eq!(exp.preloader().state(), PreloaderState::PlayingFinal);
    }
}
