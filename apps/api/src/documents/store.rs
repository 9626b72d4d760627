use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::line_breaks::repair_line_breaks;

const OUTPUT_DIR: &str = "output";
const PROFILE_FILE: &str = "user.md";
const PROFILE_PDF_FILE: &str = "profile_preview.pdf";
const CV_PREFIX: &str = "cv_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid document name '{0}'")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One generated CV as listed in the document picker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentSummary {
    pub filename: String,
    pub title: String,
    /// Markdown source filename, when it exists next to the PDF.
    pub markdown: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Flat-file document storage. The files are the source of truth; nothing is cached.
/// Writes replace the whole file, last writer wins.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join(OUTPUT_DIR)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_FILE)
    }

    pub fn profile_pdf_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_PDF_FILE)
    }

    /// Resolves a file in the output directory, rejecting anything that could escape it.
    pub fn cv_path(&self, filename: &str) -> Result<PathBuf, StoreError> {
        validate_name(filename)?;
        Ok(self.output_dir().join(filename))
    }

    /// Lists `cv_*.pdf` files, sorted by name. A missing output directory is an empty list.
    pub async fn list_cvs(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        let mut entries = match tokio::fs::read_dir(self.output_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !(filename.starts_with(CV_PREFIX) && filename.ends_with(".pdf")) {
                continue;
            }

            let modified_at = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            let md_name = markdown_name(&filename);
            let markdown = tokio::fs::try_exists(self.output_dir().join(&md_name))
                .await
                .unwrap_or(false)
                .then_some(md_name);

            summaries.push(DocumentSummary {
                title: display_title(&filename),
                filename,
                markdown,
                modified_at,
            });
        }

        summaries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(summaries)
    }

    pub async fn read_bytes(&self, filename: &str) -> Result<Bytes, StoreError> {
        let path = self.cv_path(filename)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| missing_as_not_found(e, filename))?;
        Ok(Bytes::from(data))
    }

    /// Reads the markdown source of a CV. Accepts the PDF name, the markdown name or the bare stem.
    pub async fn read_markdown(&self, filename: &str) -> Result<String, StoreError> {
        let md_name = markdown_name(filename);
        let path = self.cv_path(&md_name)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| missing_as_not_found(e, &md_name))
    }

    /// Replaces a CV's markdown after applying the layout repair pass.
    pub async fn write_markdown(&self, filename: &str, content: &str) -> Result<(), StoreError> {
        let md_name = markdown_name(filename);
        let path = self.cv_path(&md_name)?;
        tokio::fs::create_dir_all(self.output_dir()).await?;
        tokio::fs::write(&path, repair_line_breaks(content)).await?;
        info!("Saved {md_name} ({} bytes)", content.len());
        Ok(())
    }

    /// The profile document; empty when it has not been written yet.
    pub async fn read_profile(&self) -> Result<String, StoreError> {
        match tokio::fs::read_to_string(self.profile_path()).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write_profile(&self, content: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        tokio::fs::write(self.profile_path(), content).await?;
        info!("Saved profile ({} bytes)", content.len());
        Ok(())
    }
}

fn missing_as_not_found(err: io::Error, name: &str) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(name.to_string())
    } else {
        StoreError::Io(err)
    }
}

fn validate_name(filename: &str) -> Result<(), StoreError> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\', '\0', '"'])
        || filename.chars().any(char::is_control)
        || filename.contains("..");
    if invalid {
        return Err(StoreError::InvalidName(filename.to_string()));
    }
    Ok(())
}

/// `cv_x.pdf` → `cv_x.md`; `cv_x.md` stays; a bare stem gains `.md`.
pub fn markdown_name(filename: &str) -> String {
    if filename.ends_with(".md") {
        filename.to_string()
    } else {
        format!("{}.md", filename.strip_suffix(".pdf").unwrap_or(filename))
    }
}

/// `cv_x.md` → `cv_x.pdf`; `cv_x.pdf` stays; a bare stem gains `.pdf`.
pub fn pdf_name(filename: &str) -> String {
    if filename.ends_with(".pdf") {
        filename.to_string()
    } else {
        format!("{}.pdf", filename.strip_suffix(".md").unwrap_or(filename))
    }
}

/// `cv_google_staff_engineer.pdf` → `Google Staff Engineer`.
pub fn display_title(filename: &str) -> String {
    let stem = filename.strip_prefix(CV_PREFIX).unwrap_or(filename);
    let stem = stem.strip_suffix(".pdf").unwrap_or(stem);
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
