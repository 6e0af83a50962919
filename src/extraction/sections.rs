//! Heading-scoped section extraction
//!
//! A section runs from a heading up to the next sibling heading of any
//! configured level. Tables, lists and paragraphs inside that span are
//! gathered under the heading's title.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::extraction::selectors::{element_text, select_inclusive, PageSelectors};
use crate::extraction::table::{ParsedTable, TableParser};

/// Content found under one heading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text
    pub title: String,
    /// Whether the title mentions gems, build time or speed-ups
    pub is_time_related: bool,
    /// Tables in the section
    pub tables: Vec<ParsedTable>,
    /// Non-empty item texts of each list
    pub lists: Vec<Vec<String>>,
    /// Non-empty paragraph texts
    pub paragraphs: Vec<String>,
}

impl Section {
    /// Whether the section carries no content
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.lists.is_empty() && self.paragraphs.is_empty()
    }
}

/// Section extractor
pub struct SectionExtractor<'a> {
    selectors: &'a PageSelectors,
    headings: &'a Selector,
    config: &'a ExtractorConfig,
}

impl<'a> SectionExtractor<'a> {
    /// Create an extractor; `headings` must select the configured section tags
    pub fn new(
        selectors: &'a PageSelectors,
        headings: &'a Selector,
        config: &'a ExtractorConfig,
    ) -> Self {
        Self {
            selectors,
            headings,
            config,
        }
    }

    /// Extract every non-empty section in document order
    pub fn extract(&self, document: &Html) -> Vec<Section> {
        let mut sections = Vec::new();

        for heading in document.select(self.headings) {
            let title = element_text(heading);
            if title.is_empty() {
                continue;
            }

            let section = self.collect(title, self.span(heading));
            if section.is_empty() {
                debug!(title = %section.title, "Dropping empty section");
                continue;
            }
            sections.push(section);
        }

        sections
    }

    /// Sibling elements after `heading` up to the next section heading
    fn span<'d>(&self, heading: ElementRef<'d>) -> Vec<ElementRef<'d>> {
        heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !self.config.is_section_tag(el.value().name()))
            .collect()
    }

    fn collect(&self, title: String, nodes: Vec<ElementRef<'_>>) -> Section {
        let sel = self.selectors;
        let parser = TableParser::new(sel);
        let mut section = Section {
            is_time_related: self.config.is_time_related(&title),
            title,
            ..Default::default()
        };

        for node in nodes {
            for table in select_inclusive(node, &sel.tables) {
                section.tables.push(parser.parse(table));
            }

            for list in select_inclusive(node, &sel.lists) {
                let items: Vec<String> = list
                    .select(&sel.list_items)
                    .map(element_text)
                    .filter(|item| !item.is_empty())
                    .collect();
                if !items.is_empty() {
                    section.lists.push(items);
                }
            }

            for p in select_inclusive(node, &sel.paragraphs) {
                let text = element_text(p);
                if !text.is_empty() {
                    section.paragraphs.push(text);
                }
            }
        }

        section
    }
}
