use crate::aggregate::{aggregate, resolve};
use crate::config::{Config, SummaryFormat};
use crate::github::{ActivitySource, EventsFile, GitHubClient};
use crate::model::{GridSource, ResolvedGrid};
use crate::output::{output_heatmap, output_json, output_ndjson};
use crate::render::{render, write_artifact, Artifact, RenderConfig};
use anyhow::{anyhow, Context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

pub fn exec(config: &Config) -> anyhow::Result<()> {
    let source = activity_source(config)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (resolved, artifact) = build_chart(source.as_ref(), config, &mut rng)?;

    write_artifact(&config.output, &artifact)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    match config.summary {
        SummaryFormat::Json => output_json(&resolved, config)?,
        SummaryFormat::Ndjson => output_ndjson(&resolved)?,
        SummaryFormat::Heatmap => output_heatmap(&resolved, config)?,
    }

    Ok(())
}

pub fn activity_source(config: &Config) -> anyhow::Result<Box<dyn ActivitySource>> {
    if let Some(path) = &config.events_file {
        return Ok(Box::new(EventsFile::new(path)));
    }

    let token = config
        .github
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("GITHUB_TOKEN is not set"))?;
    let client = GitHubClient::new(
        &config.github.api_url,
        token,
        config.github.mode,
        config.github.max_pages,
    )
    .context("Failed to create GitHub client")?;
    Ok(Box::new(client))
}

/// Fetch, aggregate and render; nothing is written to disk.
pub fn build_chart<R: Rng + ?Sized>(
    source: &dyn ActivitySource,
    config: &Config,
    rng: &mut R,
) -> anyhow::Result<(ResolvedGrid, Artifact)> {
    let window = config.window;
    let events = source
        .fetch(&config.github.username, window.start)
        .context("Failed to fetch activity")?;

    let grid = aggregate(&events, window.start, window.weeks);
    info!(
        events = events.len(),
        total = grid.sum(),
        window_start = %window.start,
        weeks = window.weeks,
        "built activity grid"
    );

    let resolved = resolve(grid, rng);
    let artifact = render(&resolved.grid, &chart_config(config, resolved.source))
        .context("Failed to render chart")?;
    Ok((resolved, artifact))
}

/// Synthetic charts say so in their title.
fn chart_config(config: &Config, source: GridSource) -> RenderConfig {
    let mut render = config.render.clone();
    if !source.is_real() {
        render.title = render.title.map(|t| format!("{t} (placeholder data)"));
    }
    render
}
