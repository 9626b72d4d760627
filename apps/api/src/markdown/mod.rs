// Markdown <-> rich-text conversion for the document editor.
// A small explicit grammar: line-level blocks plus an inline span tokenizer, with
// tagged-variant nodes in between. Flat: no nested lists, tables, links,
// code blocks or quotes.

pub mod handlers;
mod html;
mod inline;
pub mod model;
mod parse;
mod write;

pub use model::{Dialect, RichDocument};
pub use parse::to_rich_text;
pub use write::to_markdown;
