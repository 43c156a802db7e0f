use clap::ValueEnum;
use plotters::style::RGBColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorScheme {
    /// Single mint-green gradient.
    Emerald,
    /// The five contribution-calendar greens.
    Github,
    /// Slate to white.
    Mono,
}

const GITHUB_LEVELS: [RGBColor; 5] = [
    RGBColor(0x16, 0x1b, 0x22),
    RGBColor(0x0e, 0x44, 0x29),
    RGBColor(0x00, 0x6d, 0x32),
    RGBColor(0x26, 0xa6, 0x41),
    RGBColor(0x39, 0xd3, 0x53),
];

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    scheme: ColorScheme,
    pub background: RGBColor,
    pub pane: RGBColor,
    pub grid: RGBColor,
    pub text: RGBColor,
    pub zero: RGBColor,
    pub full: RGBColor,
}

impl Palette {
    pub fn new(scheme: ColorScheme) -> Self {
        let (zero, full) = match scheme {
            ColorScheme::Emerald => (RGBColor(0x1f, 0x29, 0x37), RGBColor(0x6e, 0xe7, 0xb7)),
            ColorScheme::Github => (GITHUB_LEVELS[0], GITHUB_LEVELS[4]),
            ColorScheme::Mono => (RGBColor(0x2d, 0x33, 0x3b), RGBColor(0xf0, 0xf6, 0xfc)),
        };
        Self {
            scheme,
            background: RGBColor(0x0d, 0x11, 0x17),
            pane: RGBColor(0x15, 0x1b, 0x23),
            grid: RGBColor(0x30, 0x36, 0x3d),
            text: RGBColor(0xc9, 0xd1, 0xd9),
            zero,
            full,
        }
    }

    /// Colour for a bar at the given intensity in `[0, 1]`.
    pub fn color_for(&self, intensity: f32) -> RGBColor {
        if intensity.is_nan() || intensity <= 0.0 {
            return self.zero;
        }
        let t = intensity.min(1.0);
        match self.scheme {
            ColorScheme::Github => {
                let level = ((t * 4.0).ceil() as usize).clamp(1, 4);
                GITHUB_LEVELS[level]
            }
            _ => lerp(self.zero, self.full, t),
        }
    }
}

/// Bar height relative to the tallest bar; a zero `max` is treated as 1.
pub fn intensity(height: u64, max: u64) -> f32 {
    (height as f64 / max.max(1) as f64).clamp(0.0, 1.0) as f32
}

/// Scales each channel by `factor`, clamped to `[0, 1]`.
pub fn shade(color: RGBColor, factor: f32) -> RGBColor {
    let f = factor.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * f).round() as u8;
    RGBColor(scale(color.0), scale(color.1), scale(color.2))
}

fn lerp(from: RGBColor, to: RGBColor, t: f32) -> RGBColor {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}
