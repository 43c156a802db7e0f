//! Draws an [`ActivityGrid`] as a 3D bar chart and encodes it as PNG or GIF.

mod chart;
pub mod fonts;
pub mod palette;

pub use palette::{intensity, ColorScheme, Palette};

use crate::error::{Gh3dError, Result};
use crate::model::ActivityGrid;
use clap::ValueEnum;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, ImageOutputFormat, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Quantiser speed for GIF frames, 1 (best) to 30 (fastest).
const GIF_SPEED: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Looping animation that orbits the chart.
    Gif,
    /// Single still frame.
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => Some(OutputFormat::Gif),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub scheme: ColorScheme,
    pub width: u32,
    pub height: u32,
    pub elevation: f32,
    /// Azimuth of the still frame.
    pub azimuth: f32,
    /// Degrees between animation frames.
    pub azimuth_step: u32,
    pub fps: u32,
    pub title: Option<String>,
    /// Draw the title, tick labels and axis names.
    pub labels: bool,
    /// TrueType font for text; system fonts are searched when unset.
    pub font: Option<PathBuf>,
    pub progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Gif,
            scheme: ColorScheme::Emerald,
            width: 960,
            height: 420,
            elevation: 30.0,
            azimuth: -60.0,
            azimuth_step: 4,
            fps: 20,
            title: None,
            labels: true,
            font: None,
            progress: true,
        }
    }
}

impl RenderConfig {
    /// Azimuths of the animation frames, ascending from 0 up to but excluding 360.
    pub fn azimuths(&self) -> Vec<f32> {
        (0..360)
            .step_by(self.azimuth_step.clamp(1, 360) as usize)
            .map(|deg| deg as f32)
            .collect()
    }

    pub fn frame_delay(&self) -> Delay {
        Delay::from_numer_denom_ms(1000, self.fps.max(1))
    }

    fn draws_text(&self) -> bool {
        self.labels && fonts::ensure_font(self.font.as_deref())
    }
}

/// The chart seen from one azimuth.
pub struct RenderFrame {
    pub azimuth: f32,
    pub image: RgbImage,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// The grid is only read; each frame is drawn fresh from it.
pub fn render(grid: &ActivityGrid, config: &RenderConfig) -> Result<Artifact> {
    if config.width == 0 || config.height == 0 {
        return Err(Gh3dError::Config("canvas must be at least 1x1".into()));
    }

    let text = config.draws_text();
    let bytes = match config.format {
        OutputFormat::Png => encode_png(grid, config, text)?,
        OutputFormat::Gif => encode_gif(grid, config, text)?,
    };

    info!(
        format = ?config.format,
        width = config.width,
        height = config.height,
        labels = text,
        bytes = bytes.len(),
        "rendered chart"
    );
    Ok(Artifact { format: config.format, bytes })
}

pub fn render_frame(grid: &ActivityGrid, config: &RenderConfig, azimuth: f32) -> Result<RenderFrame> {
    draw_frame(grid, config, &Palette::new(config.scheme), azimuth, config.draws_text())
}

fn draw_frame(
    grid: &ActivityGrid,
    config: &RenderConfig,
    palette: &Palette,
    azimuth: f32,
    text: bool,
) -> Result<RenderFrame> {
    let mut buffer = vec![0u8; config.width as usize * config.height as usize * 3];
    chart::draw_chart(&mut buffer, grid, config, palette, azimuth, text)?;
    let image = RgbImage::from_raw(config.width, config.height, buffer)
        .ok_or_else(|| Gh3dError::Render("frame buffer does not match the canvas".into()))?;
    Ok(RenderFrame { azimuth, image })
}

fn encode_png(grid: &ActivityGrid, config: &RenderConfig, text: bool) -> Result<Vec<u8>> {
    let frame = draw_frame(grid, config, &Palette::new(config.scheme), config.azimuth, text)?;
    let mut cursor = Cursor::new(Vec::new());
    frame.image.write_to(&mut cursor, ImageOutputFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Frames are drawn and handed to the encoder one at a time.
fn encode_gif(grid: &ActivityGrid, config: &RenderConfig, text: bool) -> Result<Vec<u8>> {
    let azimuths = config.azimuths();
    let palette = Palette::new(config.scheme);
    let delay = config.frame_delay();

    let progress = if config.progress && azimuths.len() > 1 {
        ProgressBar::new(azimuths.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template("{spinner} rendering [{bar:30}] {pos}/{len} frames")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        for azimuth in azimuths {
            let frame = draw_frame(grid, config, &palette, azimuth, text)?;
            debug!(azimuth = frame.azimuth, "encoding frame");
            let rgba = DynamicImage::ImageRgb8(frame.image).into_rgba8();
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
            progress.inc(1);
        }
    }

    progress.finish_and_clear();
    Ok(bytes)
}

pub fn write_artifact(path: &Path, artifact: &Artifact) -> Result<()> {
    std::fs::write(path, &artifact.bytes)?;
    info!(path = %path.display(), bytes = artifact.bytes.len(), "wrote artifact");
    Ok(())
}
