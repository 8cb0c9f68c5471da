use roomfolio_gpu_shared::math::{lerp, linear_from_hex};

/// Visual mode of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Value mirrored into `<body data-theme>`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Holds the current mode; only changed by explicit user action.
#[derive(Debug, Default)]
pub struct ThemeSwitcher {
    theme: Theme,
}

impl ThemeSwitcher {
    pub fn new(initial: Theme) -> Self {
        Self { theme: initial }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        log::info!("Theme switched to {}", self.theme.as_str());
        self.theme
    }
}

/// Light colors and intensities for one mode. Colors are linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub clear_color: [f32; 3],
}

const NIGHT_BLUE: [f32; 3] = [0.173, 0.231, 0.686];

impl ThemePalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                sun_color: [1.0, 1.0, 1.0],
                sun_intensity: 3.0,
                ambient_color: [1.0, 1.0, 1.0],
                ambient_intensity: 1.0,
                clear_color: linear_from_hex(0xfaf4e5),
            },
            Theme::Dark => Self {
                sun_color: NIGHT_BLUE,
                sun_intensity: 0.78,
                ambient_color: NIGHT_BLUE,
                ambient_intensity: 0.78,
                clear_color: linear_from_hex(0x0e1536),
            },
        }
    }

    /// Channel-wise interpolation toward `other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let mix = |a: [f32; 3], b: [f32; 3]| {
            [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
        };
        Self {
            sun_color: mix(self.sun_color, other.sun_color),
            sun_intensity: lerp(self.sun_intensity, other.sun_intensity, t),
            ambient_color: mix(self.ambient_color, other.ambient_color),
            ambient_intensity: lerp(self.ambient_intensity, other.ambient_intensity, t),
            clear_color: mix(self.clear_color, other.clear_color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_round_trips() {
        for start in [Theme::Light, Theme::Dark] {
            let mut switcher = ThemeSwitcher::new(start);
            assert_ne!(switcher.toggle(), start);
            assert_eq!(switcher.toggle(), start);
            assert_eq!(switcher.theme(), start);
        }
    }

    #[test]
    fn test_default_is_light() {
        assert_eq!(ThemeSwitcher::default().theme(), Theme::Light);
        assert_eq!(Theme::Light.as_str(), "light");
        assert_eq!(Theme::Dark.as_str(), "dark");
    }

    #[test]
    fn test_palette_values() {
        let light = ThemePalette::for_theme(Theme::Light);
        assert_eq!(light.sun_intensity, 3.0);
        assert_eq!(light.ambient_intensity, 1.0);
        let dark = ThemePalette::for_theme(Theme::Dark);
        assert_eq!(dark.sun_color, NIGHT_BLUE);
        assert_eq!(dark.ambient_intensity, 0.78);
    }

    #[test]
    fn test_palette_lerp_endpoints() {
        let light = ThemePalette::for_theme(Theme::Light);
        let dark = ThemePalette::for_theme(Theme::Dark);
        assert_eq!(light.lerp(&dark, 0.0), light);
        let end = light.lerp(&dark, 1.0);
        assert!((end.sun_intensity - dark.sun_intensity).abs() < 1e-6);
        assert!((end.clear_color[2] - dark.clear_color[2]).abs() < 1e-6);
    }
}
