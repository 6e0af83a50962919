//! Page title and description extraction

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extraction::selectors::{element_text, PageSelectors};
use crate::extraction::value::clean_text;

/// Title and description of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// First `<h1>`, else `<title>`, else empty
    pub title: String,
    /// Meta description, else the first paragraph after `<h1>`, else the first paragraph
    pub description: String,
}

/// Metadata extraction functionality
pub struct MetadataExtractor<'s> {
    selectors: &'s PageSelectors,
}

impl<'s> MetadataExtractor<'s> {
    /// Create an extractor
    pub fn new(selectors: &'s PageSelectors) -> Self {
        Self { selectors }
    }

    /// Extract title and description
    pub fn extract(&self, document: &Html) -> PageMetadata {
        let metadata = PageMetadata {
            title: self.title(document),
            description: self.description(document),
        };
        debug!(
            "Extracted metadata: title={:?}, description={:?}",
            metadata.title, metadata.description
        );
        metadata
    }

    /// Best title from `<h1>` then `<title>`
    pub fn title(&self, document: &Html) -> String {
        let sel = self.selectors;
        [&sel.h1, &sel.title]
            .into_iter()
            .filter_map(|s| document.select(s).next())
            .map(element_text)
            .find(|t| !t.is_empty())
            .unwrap_or_default()
    }

    /// Best description
    pub fn description(&self, document: &Html) -> String {
        let sel = self.selectors;

        let meta = document
            .select(&sel.meta_description)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(clean_text)
            .filter(|d| !d.is_empty());
        if let Some(description) = meta {
            return description;
        }

        if let Some(h1) = document.select(&sel.h1).next() {
            let after = first_paragraph_after(document, h1)
                .map(element_text)
                .filter(|t| !t.is_empty());
            if let Some(text) = after {
                return text;
            }
        }

        document
            .select(&sel.paragraphs)
            .next()
            .map(element_text)
            .unwrap_or_default()
    }
}

// Next `<p>` in document order once `anchor` has been opened.
fn first_paragraph_after<'a>(document: &'a Html, anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")
}
