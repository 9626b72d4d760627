use std::sync::Arc;

use crate::agent::AgentService;
use crate::chat::SessionRegistry;
use crate::config::Config;
use crate::documents::DocumentStore;
use crate::render::{PdfRenderer, ProfilePdf};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
    /// Session → agent thread map. Process lifetime, no expiry.
    pub sessions: Arc<SessionRegistry>,
    /// Pluggable agent transport. Default: AgentClient over HTTP.
    pub agent: Arc<dyn AgentService>,
    pub renderer: PdfRenderer,
    /// Tracks when the profile preview was last generated.
    pub profile_pdf: Arc<ProfilePdf>,
}
