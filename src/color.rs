//! Color helpers shared by fields and effect parameter bundles
//!
//! Colors are `Vec3` RGB triples. HDR colors may exceed 1.0; `hsvm` splits
//! them into a normalized hue/saturation/value plus a magnitude.

use glam::{Vec3, Vec4};

/// Smallest magnitude used when normalizing an HDR color
const MIN_MAGNITUDE: f32 = 1e-5;

/// HSV (all components in [0, 1]) to RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = (h - h.floor()) * 6.0;
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

/// RGB to HSV, hue in [0, 1)
pub fn rgb_to_hsv(rgb: Vec3) -> Vec3 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };

    let sector = if delta <= 0.0 {
        0.0
    } else if max == rgb.x {
        (rgb.y - rgb.z) / delta
    } else if max == rgb.y {
        (rgb.z - rgb.x) / delta + 2.0
    } else {
        (rgb.x - rgb.y) / delta + 4.0
    };
    let mut h = sector / 6.0;
    if h < 0.0 {
        h += 1.0;
    }

    Vec3::new(h, s, max)
}

/// Gamma-encoded sRGB channel to linear
#[inline]
pub fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Gamma-encoded sRGB color to linear
pub fn srgb_to_linear(rgb: Vec3) -> Vec3 {
    Vec3::new(
        srgb_channel_to_linear(rgb.x),
        srgb_channel_to_linear(rgb.y),
        srgb_channel_to_linear(rgb.z),
    )
}

/// Split an HDR color into (hue, saturation, value, magnitude)
///
/// The color is divided by its largest component before conversion, so
/// `value` is 1 for any non-black color and the intensity lives in `w`.
pub fn hsvm(rgb: Vec3) -> Vec4 {
    let max = rgb.max_element().max(MIN_MAGNITUDE);
    rgb_to_hsv(rgb / max).extend(max)
}
