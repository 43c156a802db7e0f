use crate::github::FetchMode;
use crate::render::{ColorScheme, OutputFormat};
use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "gh3d")]
#[command(about = "Render a GitHub user's push activity as a rotating 3D bar chart")]
#[command(version)]
pub struct Cli {
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
    pub token: Option<String>,

    #[arg(long = "user", env = "GITHUB_ACTOR", help = "GitHub username whose activity is charted")]
    pub username: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com", help = "GitHub API base URL")]
    pub api_url: String,

    #[arg(long, value_enum, env = "GH3D_SOURCE", default_value_t = FetchMode::Events, help = "Where activity comes from")]
    pub source: FetchMode,

    #[arg(long, env = "GH3D_MAX_PAGES", default_value_t = 3, help = "Maximum pages fetched per listing (100 items each)")]
    pub max_pages: usize,

    #[arg(long, env = "GH3D_WEEKS", default_value_t = 26, help = "Number of weeks in the chart")]
    pub weeks: usize,

    #[arg(long, env = "GH3D_SINCE", help = "Window start (RFC3339, YYYY-MM-DD, or 'N weeks ago'); defaults to whole weeks ending now")]
    pub since: Option<String>,

    #[arg(long, env = "GH3D_OUTPUT", default_value = "3d_commits.gif", help = "Output image path")]
    pub output: PathBuf,

    #[arg(long, value_enum, env = "GH3D_FORMAT", help = "Output format; inferred from the output extension when omitted")]
    pub format: Option<OutputFormat>,

    #[arg(long, value_enum, env = "GH3D_PALETTE", default_value_t = ColorScheme::Emerald, help = "Bar colour scheme")]
    pub palette: ColorScheme,

    #[arg(long, env = "GH3D_WIDTH", default_value_t = 960, help = "Image width in pixels")]
    pub width: u32,

    #[arg(long, env = "GH3D_HEIGHT", default_value_t = 420, help = "Image height in pixels")]
    pub height: u32,

    #[arg(long, env = "GH3D_ELEVATION", default_value_t = 30.0, allow_negative_numbers = true, help = "Camera elevation in degrees")]
    pub elevation: f32,

    #[arg(long, env = "GH3D_AZIMUTH", default_value_t = -60.0, allow_negative_numbers = true, help = "Camera azimuth for still images, in degrees")]
    pub azimuth: f32,

    #[arg(long, env = "GH3D_AZIMUTH_STEP", default_value_t = 4, help = "Degrees of rotation between animation frames")]
    pub azimuth_step: u32,

    #[arg(long, env = "GH3D_FPS", default_value_t = 20, help = "Animation frame rate")]
    pub fps: u32,

    #[arg(long, env = "GH3D_FONT", help = "TrueType font for the title and axis labels; system fonts are tried when omitted")]
    pub font: Option<PathBuf>,

    #[arg(long, env = "GH3D_NO_LABELS", help = "Draw the chart without title and axis labels")]
    pub no_labels: bool,

    #[arg(long, env = "GH3D_EVENTS_FILE", help = "Read GitHub events from a JSON file instead of the API")]
    pub events_file: Option<PathBuf>,

    #[arg(long, env = "GH3D_SEED", help = "Seed for the placeholder grid used when there is no activity")]
    pub seed: Option<u64>,

    #[arg(long, help = "Print the grid as JSON", conflicts_with = "ndjson")]
    pub json: bool,

    #[arg(long, help = "Print the grid as NDJSON, one cell per line")]
    pub ndjson: bool,

    #[arg(long, env = "GH3D_LOG_JSON", help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Every environment variable an option can be read from.
    pub fn env_vars() -> Vec<String> {
        Self::command()
            .get_arguments()
            .filter_map(|arg| arg.get_env())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    pub fn execute(self) -> Result<()> {
        crate::telemetry::init_tracing(self.log_json, tracing::Level::INFO);
        let config = crate::config::Config::from_cli(&self)?;
        crate::pipeline::exec(&config)
    }
}

/// Clears every option's environment variable once per test binary, so
/// `try_parse_from` only sees the arguments a test passes.
#[cfg(test)]
pub(crate) fn clear_env() {
    static CLEARED: std::sync::Once = std::sync::Once::new();
    CLEARED.call_once(|| {
        for name in Cli::env_vars() {
            std::env::remove_var(name);
        }
    });
}
