// PDF generation: shells out to pandoc with a PDF engine and a fixed timeout.
// Markdown stays the source of truth; the PDF is a disposable artifact rebuilt on demand.
// Failures are reported, never retried.

pub mod engine;
pub mod handlers;
pub mod profile;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::Config;
use engine::{PdfEngine, CV_LATEX_HEADER};

pub use profile::ProfilePdf;

const STYLESHEET: &str = "cv_style.css";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no PDF engine available (tried weasyprint, wkhtmltopdf, xelatex, pdflatex)")]
    NoEngine,

    #[error("unsupported PDF engine '{0}'")]
    UnknownEngine(String),

    #[error("source document {0} not found")]
    MissingInput(PathBuf),

    #[error("stylesheet {0} not found")]
    MissingStylesheet(PathBuf),

    #[error("could not start converter: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("converter timed out after {0}s")]
    Timeout(u64),

    #[error("converter exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("converter produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which template variables to pass for LaTeX engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cv,
    Profile,
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    pandoc: String,
    engine: Option<String>,
    assets_dir: PathBuf,
    timeout: Duration,
}

impl PdfRenderer {
    pub fn new(
        pandoc: impl Into<String>,
        engine: Option<String>,
        assets_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            pandoc: pandoc.into(),
            engine,
            assets_dir: assets_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pandoc_path.clone(),
            config.pdf_engine.clone(),
            config.assets_dir.clone(),
            config.pdf_timeout,
        )
    }

    fn engine(&self) -> Result<PdfEngine, RenderError> {
        match &self.engine {
            Some(name) => {
                PdfEngine::parse(name).ok_or_else(|| RenderError::UnknownEngine(name.clone()))
            }
            None => PdfEngine::detect().ok_or(RenderError::NoEngine),
        }
    }

    /// Converts `input` markdown into a PDF at `output`, blocking until the converter
    /// exits or the timeout kills it.
    pub async fn render(
        &self,
        input: &Path,
        output: &Path,
        kind: DocumentKind,
    ) -> Result<(), RenderError> {
        if !tokio::fs::try_exists(input).await? {
            return Err(RenderError::MissingInput(input.to_path_buf()));
        }
        let engine = self.engine()?;

        // The converter writes beside the target and the result replaces it only on
        // success, so a stale PDF from an earlier run can't pass for fresh output.
        let staging = staging_path(output);
        remove_if_present(&staging).await?;

        let mut args: Vec<String> = vec![
            input.display().to_string(),
            "-o".to_string(),
            staging.display().to_string(),
            "--standalone".to_string(),
            format!("--pdf-engine={}", engine.name()),
        ];

        // Must outlive the converter run; the file is removed on drop.
        let latex_header = match (engine.uses_css(), kind) {
            (false, DocumentKind::Cv) => Some(write_latex_header()?),
            _ => None,
        };

        if engine.uses_css() {
            let css = self.assets_dir.join(STYLESHEET);
            if !tokio::fs::try_exists(&css).await? {
                return Err(RenderError::MissingStylesheet(css));
            }
            args.extend(["--css".to_string(), css.display().to_string()]);
        } else {
            let linestretch = match kind {
                DocumentKind::Cv => "linestretch=1.05",
                DocumentKind::Profile => "linestretch=0.95",
            };
            for var in ["geometry:margin=0.6in", "fontsize=10pt", linestretch] {
                args.extend(["-V".to_string(), var.to_string()]);
            }
            if kind == DocumentKind::Profile {
                args.extend(["-V".to_string(), "fontfamily=mathptmx".to_string()]);
            }
            if let Some(header) = &latex_header {
                args.extend(["-H".to_string(), header.path().display().to_string()]);
            }
        }

        info!(
            "Rendering {} with {} ({:?})",
            input.display(),
            engine.name(),
            kind
        );

        let mut command = Command::new(&self.pandoc);
        command.args(&args).kill_on_drop(true);

        let outcome = self.run(command, input, &staging).await;
        if outcome.is_err() {
            let _ = remove_if_present(&staging).await;
        }
        outcome?;

        tokio::fs::rename(&staging, output).await?;

        info!("Rendered {}", output.display());
        Ok(())
    }

    async fn run(
        &self,
        mut command: Command,
        input: &Path,
        staging: &Path,
    ) -> Result<(), RenderError> {
        let result = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(RenderError::Spawn)?,
            Err(_) => {
                warn!("Converter timed out for {}", input.display());
                return Err(RenderError::Timeout(self.timeout.as_secs()));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(RenderError::Failed {
                code: result.status.code(),
                stderr,
            });
        }

        if !tokio::fs::try_exists(staging).await? {
            return Err(RenderError::MissingOutput(staging.to_path_buf()));
        }
        Ok(())
    }
}

/// `output/cv_x.pdf` → `output/.cv_x.rendering.pdf`. Keeps the `.pdf` extension
/// the converter uses to pick its output format.
fn staging_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{stem}.rendering.pdf"))
}

async fn remove_if_present(path: &Path) -> Result<(), std::io::Error> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn write_latex_header() -> Result<tempfile::NamedTempFile, RenderError> {
    let mut header = tempfile::Builder::new()
        .prefix("cv_header")
        .suffix(".tex")
        .tempfile()?;
    header.write_all(CV_LATEX_HEADER.as_bytes())?;
    header.flush()?;
    Ok(header)
}
