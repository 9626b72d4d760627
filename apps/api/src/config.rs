use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Holds `user.md`, `profile_preview.pdf` and the `output/` CV directory.
    pub data_dir: PathBuf,
    /// Holds `cv_style.css` for CSS-driven PDF engines.
    pub assets_dir: PathBuf,
    pub agent_url: String,
    pub agent_assistant_id: String,
    /// No timeout unless set, matching the agent's long-running runs.
    pub agent_timeout: Option<Duration>,
    pub pandoc_path: String,
    pub pdf_engine: Option<String>,
    pub pdf_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let agent_timeout = optional("AGENT_TIMEOUT_SECS")
            .map(|v| parse_secs("AGENT_TIMEOUT_SECS", &v))
            .transpose()?;

        Ok(Config {
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            data_dir: PathBuf::from(var("DATA_DIR", "data")),
            assets_dir: PathBuf::from(var("ASSETS_DIR", "assets")),
            agent_url: var("AGENT_URL", "http://localhost:2024")
                .trim_end_matches('/')
                .to_string(),
            agent_assistant_id: var("AGENT_ASSISTANT_ID", "cv_agent"),
            agent_timeout,
            pandoc_path: var("PANDOC_PATH", "pandoc"),
            pdf_engine: optional("PDF_ENGINE"),
            pdf_timeout: parse_secs("PDF_TIMEOUT_SECS", &var("PDF_TIMEOUT_SECS", "30"))?,
        })
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    Ok(Duration::from_secs(secs))
}
