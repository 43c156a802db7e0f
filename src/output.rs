use crate::config::Config;
use crate::model::{CellRecord, GridOutput, GridSource, ResolvedGrid, DAY_LABELS, SCHEMA_VERSION};
use crate::render::intensity;
use crate::util::window_end;
use anyhow::Result;
use chrono::Utc;
use console::style;

pub fn grid_output(resolved: &ResolvedGrid, config: &Config) -> GridOutput {
    GridOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        username: config.github.username.clone(),
        window_start: config.window.start,
        weeks: config.window.weeks,
        source: resolved.source,
        total: resolved.grid.sum(),
        max: resolved.grid.max(),
        artifact: config.output.to_string_lossy().to_string(),
        cells: resolved.grid.rows().to_vec(),
    }
}

pub fn output_json(resolved: &ResolvedGrid, config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&grid_output(resolved, config))?);
    Ok(())
}

pub fn output_ndjson(resolved: &ResolvedGrid) -> Result<()> {
    for (day, week, value) in resolved.grid.cells() {
        let record = CellRecord { day, week, value, source: resolved.source };
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

pub fn output_heatmap(resolved: &ResolvedGrid, config: &Config) -> Result<()> {
    let grid = &resolved.grid;
    let start = config.window.start;
    let end = window_end(&start, config.window.weeks);

    println!(
        "{} {}",
        style("GitHub Activity").bold(),
        style(format!("@{}", config.github.username)).cyan()
    );
    println!(
        "Window {} to {} ({} weeks)",
        style(start.format("%Y-%m-%d")).dim(),
        style(end.format("%Y-%m-%d")).dim(),
        config.window.weeks
    );
    if resolved.source == GridSource::Placeholder {
        println!(
            "{}",
            style("PLACEHOLDER DATA: no activity found, chart shows random values").yellow().bold()
        );
    }
    println!("{}", "─".repeat(4 + grid.weeks()));

    let max = grid.max();
    for (day, row) in grid.rows().iter().enumerate() {
        let cells: String = row
            .iter()
            .map(|&value| {
                let glyph = match (intensity(value, max) * 4.0).ceil() as u32 {
                    0 => "·",
                    1 => "░",
                    2 => "▒",
                    3 => "▓",
                    _ => "█",
                };
                if resolved.source.is_real() {
                    style(glyph).green().to_string()
                } else {
                    style(glyph).yellow().to_string()
                }
            })
            .collect();
        println!("{} {}", DAY_LABELS[day], cells);
    }

    println!(
        "\nTotal: {}  Busiest cell: {}  Source: {}",
        style(grid.sum()).cyan(),
        style(max).cyan(),
        match resolved.source {
            GridSource::Events => style("events").green(),
            GridSource::Placeholder => style("placeholder").yellow(),
        }
    );
    println!("Chart written to {}", style(config.output.display()).bold());
    Ok(())
}
