//! Shade ramps sampled along the OKLCH lightness axis.
//!
//! A ramp keeps the chroma and hue of the base color and swaps in fixed
//! lightness stops, then clamps back into the sRGB gamut.

use super::Color;

/// Lightness stops, published as `-10` through `-50`
pub const SHADE_STOPS: [f64; 5] = [0.9, 0.8, 0.7, 0.6, 0.5];

/// OKLCh color (cylindrical OKLab), hue in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

fn srgb_component_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_component_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl Oklch {
    /// Convert from sRGB via linear light and OKLab
    pub fn from_color(color: &Color) -> Self {
        let [r, g, b] = color.rgb().map(|c| srgb_component_to_linear(c as f64 / 255.0));

        let l_ = (0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b).cbrt();
        let m_ = (0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b).cbrt();
        let s_ = (0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b).cbrt();

        let l = 0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_;
        let a = 1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_;
        let bb = 0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_;

        let c = (a * a + bb * bb).sqrt();
        // atan2(0, 0) is meaningless for grays
        let h = if c < 1e-10 {
            0.0
        } else {
            bb.atan2(a).to_degrees().rem_euclid(360.0)
        };

        Self { l, c, h }
    }

    /// Same chroma and hue at a different lightness
    pub fn with_lightness(self, l: f64) -> Self {
        Self { l, ..self }
    }

    /// Convert back to sRGB, clamping each channel into gamut
    pub fn to_color(self) -> Color {
        let h = self.h.to_radians();
        let a = self.c * h.cos();
        let b = self.c * h.sin();

        let l_ = self.l + 0.3963377774 * a + 0.2158037573 * b;
        let m_ = self.l - 0.1055613458 * a - 0.0638541728 * b;
        let s_ = self.l - 0.0894841775 * a - 1.2914855480 * b;

        let (l, m, s) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

        let linear = [
            4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
            -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
            -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
        ];

        let [r, g, b] = linear.map(|c| {
            let srgb = linear_component_to_srgb(c).clamp(0.0, 1.0);
            (srgb * 255.0).round() as u8
        });
        Color::from_rgb(r, g, b)
    }
}

/// Five shades of `color`, one per entry of [`SHADE_STOPS`]
pub fn shade_ramp(color: &Color) -> [Color; 5] {
    let base = Oklch::from_color(color);
    SHADE_STOPS.map(|l| base.with_lightness(l).to_color())
}
