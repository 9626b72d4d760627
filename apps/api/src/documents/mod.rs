// Document storage: generated CVs under `output/` and the single profile document.
// Markdown is the source of truth; PDFs are derived and can be rebuilt at any time.

pub mod handlers;
pub mod line_breaks;
pub mod store;

pub use store::{DocumentStore, StoreError};
