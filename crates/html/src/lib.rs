//! HTML to [`Page`] extraction.
//!
//! A small tokenizer and forgiving tree builder feed an extractor that keeps
//! only what the level view renders: a title, text blocks with inline links,
//! and the element ids that in-page anchors scroll to.

mod dom_builder;
mod entities;
mod extract;
mod page;
mod tokenizer;
mod types;

pub use crate::dom_builder::{MAX_DEPTH, build_dom};
pub use crate::extract::{ExtractOptions, extract_page};
pub use crate::page::{Block, BlockKind, Inline, Page};
pub use crate::tokenizer::tokenize;
pub use crate::types::{Element, Node, Token};

/// Whether a `Content-Type` header value names an HTML document.
/// A missing header is treated as HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return true;
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("text/html")
        || essence.eq_ignore_ascii_case("application/xhtml+xml")
}
