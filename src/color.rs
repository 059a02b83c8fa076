use glam::Vec3;
use thiserror::Error;

/// Error returned when a color string cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("unknown color name `{0}`")]
    UnknownName(String),
    #[error("invalid hex color `{0}`, expected #rrggbb")]
    InvalidHex(String),
}

/// Converts hue/saturation/lightness (all in `0..=1`) to an RGB triple.
///
/// The hue wraps around, so `1.25` and `0.25` produce the same color.
/// Saturation and lightness are clamped.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Vec3::splat(l);
    }

    let upper = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let lower = 2.0 * l - upper;
    Vec3::new(
        hue_to_channel(lower, upper, h + 1.0 / 3.0),
        hue_to_channel(lower, upper, h),
        hue_to_channel(lower, upper, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(lower: f32, upper: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        lower + (upper - lower) * 6.0 * t
    } else if t < 0.5 {
        upper
    } else if t < 2.0 / 3.0 {
        lower + (upper - lower) * 6.0 * (2.0 / 3.0 - t)
    } else {
        lower
    }
}

/// Converts a packed `0xRRGGBB` value into normalized RGB.
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    let r = (hex >> 16) & 0xff;
    let g = (hex >> 8) & 0xff;
    let b = hex & 0xff;
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

/// Parses a CSS color name (small subset) or a `#rrggbb` string.
pub fn parse_color(value: &str) -> Result<Vec3, ColorError> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return Err(ColorError::InvalidHex(value.to_string()));
        }
        return u32::from_str_radix(hex, 16)
            .map(hex_to_rgb)
            .map_err(|_| ColorError::InvalidHex(value.to_string()));
    }

    let hex = match value.to_ascii_lowercase().as_str() {
        "white" => 0xffffff,
        "black" => 0x000000,
        "gray" | "grey" => 0x808080,
        "red" => 0xff0000,
        "green" => 0x008000,
        "blue" => 0x0000ff,
        _ => return Err(ColorError::UnknownName(value.to_string())),
    };
    Ok(hex_to_rgb(hex))
}
