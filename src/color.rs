//! Stroke colors: blending, hex formatting and name resolution.
//!
//! Blending is a straight per-channel affine combination in sRGB. No
//! perceptual color space is involved.

use crate::Float;

#[allow(unused_imports)]
use vek::num_traits::real::Real;

use rgb::RGB8;

use alloc::{format, string::String};

// keeps mathematically whole channel values from truncating one step down
const CHANNEL_EPSILON: Float = 1e-3;

/// Blends two colors channel by channel; results are truncated toward zero,
/// so black to white at `t = 0.5` gives `#7F7F7F`.
///
/// `blend_color(a, b, t)` and `blend_color(b, a, 1 - t)` agree for every `t`.
pub fn blend_color(a: RGB8, b: RGB8, t: Float) -> RGB8 {
    RGB8::new(
        blend_channel(a.r, b.r, t),
        blend_channel(a.g, b.g, t),
        blend_channel(a.b, b.b, t),
    )
}

fn blend_channel(a: u8, b: u8, t: Float) -> u8 {
    // weight the heavier side by a value >= 0.5, so that swapping the
    // arguments and using 1 - t evaluates the very same expression
    let (heavy, light, w) = match t <= 0.5 {
        true => (a, b, 1.0 - t),
        false => (b, a, t),
    };
    let value = w * heavy as Float + (1.0 - w) * light as Float;
    (value + CHANNEL_EPSILON).floor().clamp(0.0, 255.0) as u8
}

/// Uppercase `#RRGGBB`.
pub fn to_hex(color: RGB8) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parses `#RGB` or `#RRGGBB` (the `#` is optional).
pub fn parse_hex(text: &str) -> Option<RGB8> {
    let text = text.trim();
    let hex = text.strip_prefix('#').unwrap_or(text);
    if !hex.is_ascii() {
        return None;
    }

    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| byte(&hex[i..i + 1]).map(|n| n << 4 | n);
            Some(RGB8::new(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(RGB8::new(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
        _ => None,
    }
}

/// Resolves a hex triplet or a CSS color keyword.
pub fn parse_color(text: &str) -> Option<RGB8> {
    let text = text.trim();
    if text.starts_with('#') {
        return parse_hex(text);
    }

    let resolved = named_color(text);
    if resolved.is_none() {
        log::warn!("unknown color name {:?}", text);
    }
    resolved
}

/// Looks one of the 148 CSS3 color keywords up, ignoring ASCII case.
pub fn named_color(name: &str) -> Option<RGB8> {
    let color = palette::named::from_str(&name.to_ascii_lowercase())?;
    Some(RGB8::new(color.red, color.green, color.blue))
}
