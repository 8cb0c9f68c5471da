use crate::events::ExperienceEvent;

/// Layout/animation variant selected by viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// `Mobile` strictly below the breakpoint, `Desktop` at or above it.
    pub fn for_width(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

/// Viewport state in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
    pub pixel_ratio: f32,
    pub device: DeviceClass,
}

impl Viewport {
    /// Size of the drawing buffer in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            ((self.width as f32 * self.pixel_ratio).round() as u32).max(1),
            ((self.height as f32 * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

/// Sizing tracker: owns the viewport and republishes it when it changes.
pub struct Sizes {
    viewport: Viewport,
    breakpoint: u32,
    max_pixel_ratio: f32,
}

impl Sizes {
    pub fn new(
        width: u32,
        height: u32,
        pixel_ratio: f32,
        breakpoint: u32,
        max_pixel_ratio: f32,
    ) -> Self {
        let viewport = make_viewport(width, height, pixel_ratio, breakpoint, max_pixel_ratio);
        Self {
            viewport,
            breakpoint,
            max_pixel_ratio,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device(&self) -> DeviceClass {
        self.viewport.device
    }

    pub fn breakpoint(&self) -> u32 {
        self.breakpoint
    }

    /// Apply new window dimensions. Yields `Resized` when anything changed,
    /// followed by `DeviceChanged` when the breakpoint was crossed.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Vec<ExperienceEvent> {
        let next = make_viewport(width, height, pixel_ratio, self.breakpoint, self.max_pixel_ratio);
        if next == self.viewport {
            return Vec::new();
        }

        let mut events = vec![ExperienceEvent::Resized(next)];
        if next.device != self.viewport.device {
            log::info!("Device class changed to {}", next.device.label());
            events.push(ExperienceEvent::DeviceChanged(next.device));
        }
        self.viewport = next;
        events
    }
}

fn make_viewport(
    width: u32,
    height: u32,
    pixel_ratio: f32,
    breakpoint: u32,
    max_pixel_ratio: f32,
) -> Viewport {
    // Zero sizes show up while the page is hidden; keep the aspect finite.
    let width = width.max(1);
    let height = height.max(1);
    let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio.min(max_pixel_ratio)
    } else {
        1.0
    };
    Viewport {
        width,
        height,
        aspect: width as f32 / height as f32,
        pixel_ratio,
        device: DeviceClass::for_width(width, breakpoint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BREAKPOINT: u32 = 968;

    #[test]
    fn test_device_class_boundary() {
        for width in [1, 320, 767, 967] {
            assert_eq!(DeviceClass::for_width(width, BREAKPOINT), DeviceClass::Mobile);
        }
        for width in [968, 969, 1440, 3840] {
            assert_eq!(DeviceClass::for_width(width, BREAKPOINT), DeviceClass::Desktop);
        }
    }

    #[test]
    fn test_aspect_and_pixel_ratio_clamp() {
        let sizes = Sizes::new(1600, 900, 3.0, BREAKPOINT, 2.0);
        let v = sizes.viewport();
        assert!((v.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(v.pixel_ratio, 2.0);
        assert_eq!(v.physical_size(), (3200, 1800));
    }

    #[test]
    fn test_zero_height_keeps_aspect_finite() {
        let sizes = Sizes::new(800, 0, 1.0, BREAKPOINT, 2.0);
        assert!(sizes.viewport().aspect.is_finite());
    }

    #[test]
    fn test_bad_pixel_ratio_falls_back_to_one() {
        let sizes = Sizes::new(800, 600, f32::NAN, BREAKPOINT, 2.0);
        assert_eq!(sizes.viewport().pixel_ratio, 1.0);
    }

    #[test]
    fn test_resize_without_change_is_silent() {
        let mut sizes = Sizes::new(1200, 800, 1.0, BREAKPOINT, 2.0);
        assert!(sizes.resize(1200, 800, 1.0).is_empty());
    }

    #[test]
    fn test_resize_within_class() {
        let mut sizes = Sizes::new(1200, 800, 1.0, BREAKPOINT, 2.0);
        let events = sizes.resize(1300, 800, 1.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ExperienceEvent::Resized(v) if v.width == 1300));
    }

    #[test]
    fn test_resize_across_breakpoint() {
        let mut sizes = Sizes::new(1200, 800, 1.0, BREAKPOINT, 2.0);
        let events = sizes.resize(600, 800, 1.0);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ExperienceEvent::DeviceChanged(DeviceClass::Mobile));
        assert_eq!(sizes.device(), DeviceClass::Mobile);
    }
}
