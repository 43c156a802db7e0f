pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod telemetry;
pub mod util;
