use thiserror::Error;

pub type Result<T> = std::result::Result<T, Gh3dError>;

#[derive(Error, Debug)]
pub enum Gh3dError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication failed ({status}): check GITHUB_TOKEN")]
    Auth { status: u16 },
    #[error("GitHub API rate limit exceeded{}", reset_hint(.reset))]
    RateLimited { reset: Option<i64> },
    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

fn reset_hint(reset: &Option<i64>) -> String {
    match reset {
        Some(epoch) => match chrono::DateTime::from_timestamp(*epoch, 0) {
            Some(at) => format!(", resets at {}", at.to_rfc3339()),
            None => format!(", resets at epoch {epoch}"),
        },
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_includes_reset_time() {
        let err = Gh3dError::RateLimited { reset: Some(1_704_067_200) };
        assert_eq!(
            err.to_string(),
            "GitHub API rate limit exceeded, resets at 2024-01-01T00:00:00+00:00"
        );
        let err = Gh3dError::RateLimited { reset: None };
        assert_eq!(err.to_string(), "GitHub API rate limit exceeded");
    }
}
