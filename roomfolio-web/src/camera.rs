use glam::{Mat4, Quat, Vec3};
use roomfolio_gpu_shared::math::orthographic_bounds;

use crate::config::CameraConfig;
use crate::sizes::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    fn new(fov_degrees: f32, aspect: f32, position: Vec3) -> Self {
        let mut cam = Self {
            fov_y: fov_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
            position,
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection();
        cam
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    /// Frustum height in world units.
    pub frustum: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Extra translation written by the scroll controls.
    pub offset: Vec3,
    pub pitch: f32,
    projection: Mat4,
}

impl OrthographicCamera {
    fn new(frustum: f32, aspect: f32, position: Vec3, pitch_degrees: f32) -> Self {
        let mut cam = Self {
            frustum,
            aspect,
            near: -50.0,
            far: 50.0,
            position,
            offset: Vec3::ZERO,
            pitch: pitch_degrees.to_radians(),
            projection: Mat4::IDENTITY,
        };
        cam.update_projection();
        cam
    }

    fn update_projection(&mut self) {
        let [l, r, b, t] = orthographic_bounds(self.aspect, self.frustum);
        self.projection = Mat4::orthographic_rh(l, r, b, t, self.near, self.far);
    }

    /// `[left, right, bottom, top]` of the current frustum.
    pub fn bounds(&self) -> [f32; 4] {
        orthographic_bounds(self.aspect, self.frustum)
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        let world = Mat4::from_rotation_translation(
            Quat::from_rotation_x(self.pitch),
            self.position + self.offset,
        );
        world.inverse()
    }
}

/// Camera holder: a perspective and an orthographic camera kept in step with
/// the viewport. The room is drawn through the orthographic one.
pub struct CameraRig {
    pub perspective: PerspectiveCamera,
    pub orthographic: OrthographicCamera,
    active: CameraKind,
    view_proj: [Mat4; 2],
}

impl CameraRig {
    pub fn new(config: &CameraConfig, viewport: &Viewport) -> Self {
        let mut rig = Self {
            perspective: PerspectiveCamera::new(
                config.fov_degrees,
                viewport.aspect,
                Vec3::from(config.perspective_position),
            ),
            orthographic: OrthographicCamera::new(
                config.frustum,
                viewport.aspect,
                Vec3::from(config.orthographic_position),
                config.orthographic_pitch_degrees,
            ),
            active: CameraKind::Orthographic,
            view_proj: [Mat4::IDENTITY; 2],
        };
        rig.update();
        rig
    }

    /// Recompute both projections for a new aspect ratio.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.perspective.aspect = viewport.aspect;
        self.perspective.update_projection();
        self.orthographic.aspect = viewport.aspect;
        self.orthographic.update_projection();
        self.update();
    }

    /// Refresh cached view-projection matrices.
    pub fn update(&mut self) {
        self.view_proj = [
            self.perspective.projection() * self.perspective.view(),
            self.orthographic.projection() * self.orthographic.view(),
        ];
    }

    pub fn view_projection(&self, kind: CameraKind) -> Mat4 {
        match kind {
            CameraKind::Perspective => self.view_proj[0],
            CameraKind::Orthographic => self.view_proj[1],
        }
    }

    pub fn set_orthographic_offset(&mut self, offset: Vec3) {
        self.orthographic.offset = offset;
    }

    pub fn active(&self) -> CameraKind {
        self.active
    }

    pub fn active_view_projection(&self) -> Mat4 {
        self.view_projection(self.active)
    }
}
