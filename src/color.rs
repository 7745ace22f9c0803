//! Color and value interpolation for theme morphing.
//!
//! Everything here is total: input that does not parse becomes opaque black
//! rather than an error, so a bad profile entry can never stop a frame.

use std::fmt;

/// An RGB color with straight alpha. Channels are 0..=255, alpha is 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).unwrap_or(Self::BLACK);
        }
        if text.starts_with("rgb") {
            return parse_functional(text).unwrap_or(Self::BLACK);
        }
        Self::BLACK
    }

    /// Channel-wise linear blend. RGB is rounded to the nearest integer,
    /// alpha is kept to two decimals.
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let ch = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        let a = self.a as f64 + (other.a as f64 - self.a as f64) * t;
        Rgba {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
            a: ((a * 100.0).round() / 100.0).clamp(0.0, 1.0) as f32,
        }
    }
}

impl fmt::Display for Rgba {
    /// Hex when fully opaque, `rgba(...)` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

fn parse_functional(text: &str) -> Option<Rgba> {
    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let r = parts.next()?.parse::<u8>().ok()?;
    let g = parts.next()?.parse::<u8>().ok()?;
    let b = parts.next()?.parse::<u8>().ok()?;
    let a = match parts.next() {
        Some(a) => a.parse::<f32>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Rgba { r, g, b, a })
}

/// Blends two textual colors and re-serializes the result.
pub fn interpolate_color(from: &str, to: &str, t: f64) -> String {
    Rgba::parse(from).lerp(Rgba::parse(to), t).to_string()
}

/// Blends the leading integers of two pixel magnitudes, e.g. `12px` -> `20px`.
pub fn interpolate_px(from: &str, to: &str, t: f64) -> String {
    format!("{}px", lerp_px(leading_int(from), leading_int(to), t))
}

/// Endpoint-exact: `t == 0` yields `from` and `t == 1` yields `to` bit for bit.
/// Equal endpoints are returned unchanged for every `t`.
pub fn interpolate_scalar(from: f64, to: f64, t: f64) -> f64 {
    if from == to {
        return from;
    }
    from * (1.0 - t) + to * t
}

/// Pixel blend on already-parsed magnitudes.
pub fn lerp_px(from: i64, to: i64, t: f64) -> i64 {
    (from as f64 + (to - from) as f64 * t).round() as i64
}

fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_with_equal_endpoints_is_unchanged() {
        for g in [0.0, 0.08, 0.3, 0.5, 1.0] {
            for step in 0..=100 {
                assert_eq!(interpolate_scalar(g, g, step as f64 / 100.0), g);
            }
        }
        assert_eq!(interpolate_scalar(0.2, 0.8, 0.0), 0.2);
        assert_eq!(interpolate_scalar(0.2, 0.8, 1.0), 0.8);
    }

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Rgba::parse("#fff"), Rgba::opaque(255, 255, 255));
        assert_eq!(Rgba::parse("#0d1117"), Rgba::opaque(0x0d, 0x11, 0x17));
    }

    #[test]
    fn parses_rgba_with_and_without_alpha() {
        let c = Rgba::parse("rgba(0, 255, 255, 0.3)");
        assert_eq!((c.r, c.g, c.b), (0, 255, 255));
        assert!((c.a - 0.3).abs() < 1e-6);
        assert_eq!(Rgba::parse("rgb(1,2,3)"), Rgba::opaque(1, 2, 3));
    }

    #[test]
    fn garbage_becomes_black() {
        for bad in ["", "red", "#12", "#gggggg", "rgba(1,2)", "rgba(300, 0, 0)", "hsl(1,2,3)"] {
            assert_eq!(Rgba::parse(bad), Rgba::BLACK, "{bad}");
        }
    }

    #[test]
    fn serializes_hex_when_opaque() {
        assert_eq!(Rgba::opaque(0, 112, 243).to_string(), "#0070f3");
        let c = Rgba { r: 1, g: 2, b: 3, a: 0.5 };
        assert_eq!(c.to_string(), "rgba(1, 2, 3, 0.50)");
    }

    #[test]
    fn color_blend_midpoint() {
        assert_eq!(interpolate_color("#000000", "#ffffff", 0.5), "#808080");
        assert_eq!(
            interpolate_color("#ffffff", "rgba(0, 0, 0, 0.2)", 0.5),
            "rgba(128, 128, 128, 0.60)"
        );
    }

    #[test]
    fn px_blend_uses_leading_integer() {
        assert_eq!(interpolate_px("12px", "20px", 0.5), "16px");
        assert_eq!(interpolate_px("6px", "6px", 0.3), "6px");
        assert_eq!(interpolate_px("bogus", "10px", 1.0), "10px");
    }

    #[test]
    fn scalar_blend() {
        assert_eq!(interpolate_scalar(0.0, 1.0, 0.25), 0.25);
        assert_eq!(interpolate_scalar(0.3, 0.8, 1.0), 0.8);
    }
}
