use glam::Mat4;

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move `current` a fixed fraction of the way toward `target`.
/// Applied once per frame this gives the classic exponential follow.
pub fn damp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

/// Bounds of an orthographic frustum of height `frustum` for the given aspect.
/// Returns `[left, right, bottom, top]`.
pub fn orthographic_bounds(aspect: f32, frustum: f32) -> [f32; 4] {
    let half_w = aspect * frustum / 2.0;
    let half_h = frustum / 2.0;
    [-half_w, half_w, -half_h, half_h]
}

/// Inverse-transpose of the model matrix, for transforming normals.
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    if model.determinant().abs() < 1e-12 {
        // Zero-scaled objects are invisible anyway.
        return Mat4::IDENTITY;
    }
    model.inverse().transpose()
}

/// Convert an sRGB-encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `0xRRGGBB` to sRGB channels in `[0, 1]`.
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// `0xRRGGBB` to linear channels in `[0, 1]`.
pub fn linear_from_hex(hex: u32) -> [f32; 3] {
    rgb_from_hex(hex).map(srgb_to_linear)
}
