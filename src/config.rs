use crate::cli::Cli;
use crate::error::{Gh3dError, Result};
use crate::github::FetchMode;
use crate::render::{OutputFormat, RenderConfig};
use crate::util::{default_window_start, parse_date};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Ten years of weekly columns.
pub const MAX_WEEKS: usize = 520;

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub username: String,
    pub api_url: String,
    pub mode: FetchMode,
    pub max_pages: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub weeks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Heatmap,
    Json,
    Ndjson,
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GitHubConfig,
    pub window: Window,
    pub render: RenderConfig,
    pub output: PathBuf,
    pub events_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub summary: SummaryFormat,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::from_cli_at(cli, Utc::now())
    }

    pub fn from_cli_at(cli: &Cli, now: DateTime<Utc>) -> Result<Self> {
        if !(1..=MAX_WEEKS).contains(&cli.weeks) {
            return Err(Gh3dError::Config(format!("--weeks must be between 1 and {MAX_WEEKS}")));
        }
        if !(1..=360).contains(&cli.azimuth_step) {
            return Err(Gh3dError::Config("--azimuth-step must be between 1 and 360".into()));
        }
        if cli.fps == 0 {
            return Err(Gh3dError::Config("--fps must be at least 1".into()));
        }
        if cli.width < 16 || cli.height < 16 {
            return Err(Gh3dError::Config("--width and --height must be at least 16".into()));
        }
        if cli.username.trim().is_empty() {
            return Err(Gh3dError::Config("username is empty; set GITHUB_ACTOR or --user".into()));
        }

        let token = cli.token.clone().filter(|t| !t.trim().is_empty());
        if token.is_none() && cli.events_file.is_none() {
            return Err(Gh3dError::Config(
                "no API token; set GITHUB_TOKEN or pass --events-file".into(),
            ));
        }

        let start = match cli.since.as_deref() {
            Some(since) => parse_date(since)?,
            None => default_window_start(&now, cli.weeks)?,
        };

        let format = cli
            .format
            .or_else(|| OutputFormat::from_path(&cli.output))
            .unwrap_or(OutputFormat::Gif);

        let summary = if cli.json {
            SummaryFormat::Json
        } else if cli.ndjson {
            SummaryFormat::Ndjson
        } else {
            SummaryFormat::Heatmap
        };

        Ok(Self {
            github: GitHubConfig {
                token,
                username: cli.username.trim().to_string(),
                api_url: cli.api_url.clone(),
                mode: cli.source,
                max_pages: cli.max_pages.max(1),
            },
            window: Window { start, weeks: cli.weeks },
            render: RenderConfig {
                format,
                scheme: cli.palette,
                width: cli.width,
                height: cli.height,
                elevation: cli.elevation,
                azimuth: cli.azimuth,
                azimuth_step: cli.azimuth_step,
                fps: cli.fps,
                title: Some(format!("{} GitHub Commits (3D)", cli.username.trim())),
                labels: !cli.no_labels,
                font: cli.font.clone(),
                progress: true,
            },
            output: cli.output.clone(),
            events_file: cli.events_file.clone(),
            seed: cli.seed,
            summary,
        })
    }
}
