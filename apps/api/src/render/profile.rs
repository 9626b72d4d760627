//! Profile preview PDF with a last-generated check.
//!
//! The preview is rebuilt only when it is missing, when `user.md` changed after the last
//! build, or when the caller forces it. Builds are serialized by one lock.

use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::Mutex;
use tracing::debug;

use crate::documents::DocumentStore;
use crate::render::{DocumentKind, PdfRenderer, RenderError};

#[derive(Default)]
pub struct ProfilePdf {
    last_generated: Mutex<Option<SystemTime>>,
}

impl ProfilePdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path of an up-to-date profile PDF, regenerating it if needed.
    pub async fn ensure(
        &self,
        store: &DocumentStore,
        renderer: &PdfRenderer,
        force: bool,
    ) -> Result<PathBuf, RenderError> {
        let mut last_generated = self.last_generated.lock().await;
        if force {
            *last_generated = None;
        }

        let source = store.profile_path();
        let pdf = store.profile_pdf_path();

        let source_modified = match tokio::fs::metadata(&source).await {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::MissingInput(source));
            }
            Err(e) => return Err(e.into()),
        };

        let up_to_date = last_generated.is_some_and(|at| at >= source_modified);
        if up_to_date && tokio::fs::try_exists(&pdf).await? {
            debug!("Profile PDF is up to date");
            return Ok(pdf);
        }

        renderer.render(&source, &pdf, DocumentKind::Profile).await?;
        *last_generated = Some(SystemTime::now());
        Ok(pdf)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::render::tests::{call_log, fake_pandoc, WRITES_PDF};
    use std::time::Duration;

    fn setup(body: &str) -> (tempfile::TempDir, DocumentStore, PdfRenderer) {
        let dir = tempfile::tempdir().unwrap();
        let pandoc = fake_pandoc(dir.path(), body);
        let store = DocumentStore::new(dir.path().join("data"));
        let renderer = PdfRenderer::new(
            pandoc.display().to_string(),
            Some("pdflatex".to_string()),
            dir.path().join("assets"),
            Duration::from_secs(10),
        );
        (dir, store, renderer)
    }

    #[tokio::test]
    async fn test_missing_profile_is_missing_input() {
        let (_dir, store, renderer) = setup(WRITES_PDF);
        let err = ProfilePdf::new()
            .ensure(&store, &renderer, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_regenerates_only_when_needed() {
        let (dir, store, renderer) = setup(WRITES_PDF);
        store.write_profile("# Me").await.unwrap();
        let profile_pdf = ProfilePdf::new();

        let path = profile_pdf.ensure(&store, &renderer, false).await.unwrap();
        assert!(path.exists());
        assert_eq!(call_log(dir.path()).len(), 1);

        profile_pdf.ensure(&store, &renderer, false).await.unwrap();
        assert_eq!(call_log(dir.path()).len(), 1, "unchanged profile must not rebuild");

        profile_pdf.ensure(&store, &renderer, true).await.unwrap();
        assert_eq!(call_log(dir.path()).len(), 2, "forced rebuild");

        // Filesystem mtime granularity can be coarse; make the edit clearly newer.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        store.write_profile("# Me, edited").await.unwrap();
        profile_pdf.ensure(&store, &renderer, false).await.unwrap();
        assert_eq!(call_log(dir.path()).len(), 3, "edited profile rebuilds");
    }

    #[tokio::test]
    async fn test_profile_uses_profile_latex_vars() {
        let (dir, store, renderer) = setup(WRITES_PDF);
        store.write_profile("# Me").await.unwrap();

        ProfilePdf::new().ensure(&store, &renderer, false).await.unwrap();

        let calls = call_log(dir.path());
        assert!(calls[0].contains("fontfamily=mathptmx"));
        assert!(calls[0].contains("linestretch=0.95"));
        assert!(!calls[0].contains("-H"));
    }

    #[tokio::test]
    async fn test_deleted_pdf_is_rebuilt() {
        let (dir, store, renderer) = setup(WRITES_PDF);
        store.write_profile("# Me").await.unwrap();
        let profile_pdf = ProfilePdf::new();

        let path = profile_pdf.ensure(&store, &renderer, false).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        profile_pdf.ensure(&store, &renderer, false).await.unwrap();

        assert_eq!(call_log(dir.path()).len(), 2);
    }
}
