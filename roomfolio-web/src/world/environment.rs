use glam::{Mat4, Vec3};
use roomfolio_gpu_shared::uniforms::FrameUniforms;

use crate::theme::{Theme, ThemePalette};
use crate::timeline::Ease;

/// Seconds a theme change takes to settle.
pub const THEME_TRANSITION: f32 = 0.5;

/// Sun + ambient lighting, easing toward the palette of the current theme.
pub struct Environment {
    pub sun_position: Vec3,
    pub exposure: f32,
    from: ThemePalette,
    target: ThemePalette,
    current: ThemePalette,
    elapsed: f32,
}

impl Environment {
    pub fn new(theme: Theme) -> Self {
        let palette = ThemePalette::for_theme(theme);
        Self {
            sun_position: Vec3::new(-1.5, 7.0, 3.0),
            exposure: 1.75,
            from: palette,
            target: palette,
            current: palette,
            elapsed: THEME_TRANSITION,
        }
    }

    /// Start easing from wherever the lights are now.
    pub fn set_theme(&mut self, theme: Theme) {
        self.from = self.current;
        self.target = ThemePalette::for_theme(theme);
        self.elapsed = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.is_transitioning() {
            return;
        }
        self.elapsed = (self.elapsed + dt).min(THEME_TRANSITION);
        let t = Ease::QuadOut.apply(self.elapsed / THEME_TRANSITION);
        self.current = self.from.lerp(&self.target, t);
    }

    pub fn is_transitioning(&self) -> bool {
        self.elapsed < THEME_TRANSITION
    }

    pub fn palette(&self) -> &ThemePalette {
        &self.current
    }

    pub fn uniforms(&self, view_proj: Mat4) -> FrameUniforms {
        let p = &self.current;
        FrameUniforms::new(
            view_proj,
            self.sun_position,
            p.sun_color,
            p.sun_intensity,
            p.ambient_color,
            p.ambient_intensity,
            self.exposure,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_settled() {
        let env = Environment::new(Theme::Dark);
        assert!(!env.is_transitioning());
        assert_eq!(env.palette(), &ThemePalette::for_theme(Theme::Dark));
    }

    #[test]
    fn test_eases_to_target_in_half_a_second() {
        let mut env = Environment::new(Theme::Light);
        env.set_theme(Theme::Dark);
        env.update(0.25);
        let mid = env.palette().sun_intensity;
        assert!(mid < 3.0 && mid > 0.78);
        env.update(0.25);
        assert!(!env.is_transitioning());
        assert_eq!(env.palette().sun_intensity, 0.78);
    }

    #[test]
    fn test_reversal_starts_from_current() {
        let mut env = Environment::new(Theme::Light);
        env.set_theme(Theme::Dark);
        env.update(0.1);
        let partway = env.palette().sun_intensity;
        env.set_theme(Theme::Light);
        env.update(0.0);
        assert_eq!(env.palette().sun_intensity, partway);
    }

    #[test]
    fn test_uniforms_carry_intensity() {
        let env = Environment::new(Theme::Light);
        let u = env.uniforms(Mat4::IDENTITY);
        assert_eq!(u.sun_color[3], 3.0);
        assert_eq!(u.ambient_color[3], 1.0);
        assert_eq!(u.params[0], 1.75);
    }
}
