//! Empower HTML loader
//!
//! Parses page markup with html5ever and converts it into the arena
//! document the controllers work on.

mod parser;

pub use parser::HtmlParser;

use eal_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str, url: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse_with_url(html, url)
}

/// Markup loading error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("tree construction failed: {0}")]
    Dom(#[from] eal_dom::DomError),
}
