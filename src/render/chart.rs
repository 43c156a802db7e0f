//! Draws one view of the bar chart with plotters' 3D cartesian chart.
//!
//! Axes: x runs over weeks, z over weekdays (Monday nearest the origin) and
//! y is the commit count. Cells are centred on integer coordinates.

use super::fonts::FONT_FAMILY;
use super::palette::{intensity, shade, Palette};
use super::RenderConfig;
use crate::error::{Gh3dError, Result};
use crate::model::{ActivityGrid, DAYS_PER_WEEK, DAY_LABELS};
use plotters::prelude::*;
use std::cmp::Reverse;

/// Half the footprint of a bar, leaving a gap between neighbours.
const HALF_FOOTPRINT: f64 = 0.4;

const PROJECTION_SCALE: f64 = 0.8;

/// Draws into an RGB buffer of `config.width * config.height * 3` bytes.
pub(crate) fn draw_chart(
    buffer: &mut [u8],
    grid: &ActivityGrid,
    config: &RenderConfig,
    palette: &Palette,
    azimuth: f32,
    text: bool,
) -> Result<()> {
    let root = BitMapBackend::with_buffer(buffer, (config.width, config.height)).into_drawing_area();
    root.fill(&palette.background).map_err(plot_err)?;

    let weeks = grid.weeks() as f64;
    let days = DAYS_PER_WEEK as f64;
    let top = grid.max().max(1) as f64;
    let caption_size = (f64::from(config.height) / 24.0).clamp(10.0, 28.0);
    let label_size = (f64::from(config.height) / 40.0).clamp(8.0, 16.0);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(8);
    if let (true, Some(title)) = (text, config.title.as_deref()) {
        builder.caption(title, (FONT_FAMILY, caption_size).into_font().color(&palette.text));
    }
    let mut chart = builder
        .build_cartesian_3d(-0.5..weeks - 0.5, 0.0..top, -0.5..days - 0.5)
        .map_err(plot_err)?;

    chart.with_projection(|mut pb| {
        pb.yaw = f64::from(azimuth).to_radians();
        pb.pitch = f64::from(config.elevation).to_radians();
        pb.scale = PROJECTION_SCALE;
        pb.into_matrix()
    });

    if text {
        let label = (FONT_FAMILY, label_size).into_font().color(&palette.text);
        chart
            .configure_axes()
            .label_style(label.clone())
            .axis_panel_style(palette.pane.filled())
            .bold_grid_style(palette.grid.stroke_width(1))
            .max_light_lines(0)
            .x_labels(grid.weeks().min(10))
            .y_labels(5)
            .z_labels(DAYS_PER_WEEK)
            .x_formatter(&week_label)
            .y_formatter(&count_label)
            .z_formatter(&day_label)
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series([
                Text::new("Weeks", (weeks / 2.0 - 0.5, 0.0, -1.8), label.clone()),
                Text::new("Days", (weeks + 0.6, 0.0, days / 2.0), label.clone()),
                Text::new("Commits", (-1.2, top * 1.1, -0.5), label),
            ])
            .map_err(plot_err)?;
    } else {
        chart
            .draw_series(std::iter::once(Polygon::new(
                vec![
                    (-0.5, 0.0, -0.5),
                    (weeks - 0.5, 0.0, -0.5),
                    (weeks - 0.5, 0.0, days - 0.5),
                    (-0.5, 0.0, days - 0.5),
                ],
                palette.pane.filled(),
            )))
            .map_err(plot_err)?;
    }

    // Zero cells first as floor tiles, then bars far to near; plotters draws
    // series in submission order.
    let coord = chart.as_coord_spec();
    let mut cells: Vec<(bool, Reverse<i32>, usize, usize, u64)> = grid
        .cells()
        .map(|(day, week, value)| {
            let depth = coord.projected_depth(&(week as f64), &0.0, &(day as f64));
            (value > 0, Reverse(depth), day, week, value)
        })
        .collect();
    cells.sort_unstable();

    let max = grid.max();
    let bars = cells.into_iter().map(|(_, _, day, week, value)| {
        let (x, z) = (week as f64, day as f64);
        let color = palette.color_for(intensity(value, max));
        Cubiod::new(
            [
                (x - HALF_FOOTPRINT, 0.0, z - HALF_FOOTPRINT),
                (x + HALF_FOOTPRINT, value as f64, z + HALF_FOOTPRINT),
            ],
            color.filled(),
            shade(color, 0.6).stroke_width(1),
        )
    });
    chart.draw_series(bars).map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn plot_err<E: std::fmt::Display>(err: E) -> Gh3dError {
    Gh3dError::Render(err.to_string())
}

/// Index of an integer tick, or `None` between cells.
fn tick_index(value: f64) -> Option<usize> {
    let rounded = value.round();
    ((value - rounded).abs() < 1e-6 && rounded >= 0.0).then_some(rounded as usize)
}

fn week_label(value: &f64) -> String {
    tick_index(*value).map(|w| w.to_string()).unwrap_or_default()
}

fn count_label(value: &f64) -> String {
    tick_index(*value).map(|n| n.to_string()).unwrap_or_default()
}

fn day_label(value: &f64) -> String {
    tick_index(*value)
        .and_then(|d| DAY_LABELS.get(d))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_label_whole_cells() {
        assert_eq!(day_label(&0.0), "Mon");
        assert_eq!(day_label(&6.0), "Sun");
        assert_eq!(day_label(&2.5), "");
        assert_eq!(day_label(&7.0), "");
        assert_eq!(week_label(&-0.5), "");
        assert_eq!(week_label(&12.0000001), "12");
        assert_eq!(count_label(&1.5), "");
    }

    #[test]
    fn draws_into_caller_buffer() {
        let mut grid = ActivityGrid::new(3);
        grid.set(0, 0, 4);
        let config = RenderConfig { width: 80, height: 40, ..RenderConfig::default() };
        let palette = Palette::new(config.scheme);
        let mut buffer = vec![0u8; 80 * 40 * 3];

        draw_chart(&mut buffer, &grid, &config, &palette, 30.0, false).unwrap();

        let background = [palette.background.0, palette.background.1, palette.background.2];
        assert!(buffer.chunks(3).any(|p| p == background.as_slice()));
        assert!(buffer.chunks(3).any(|p| p != background.as_slice()));
    }
}
