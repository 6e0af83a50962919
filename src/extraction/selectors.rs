//! Precompiled CSS selectors shared by the extractors

use scraper::{ElementRef, Selector};

use crate::error::{ExtractionError, Result};

/// Selectors used while walking a page
#[derive(Debug, Clone)]
pub struct PageSelectors {
    /// `table`
    pub tables: Selector,
    /// `thead`
    pub thead: Selector,
    /// `tbody`
    pub tbody: Selector,
    /// `tr`
    pub rows: Selector,
    /// `th`
    pub header_cells: Selector,
    /// `td`
    pub data_cells: Selector,
    /// `td, th`
    pub cells: Selector,
    /// `ul, ol`
    pub lists: Selector,
    /// `li`
    pub list_items: Selector,
    /// `p`
    pub paragraphs: Selector,
    /// `h1`
    pub h1: Selector,
    /// `title`
    pub title: Selector,
    /// `meta[name="description"]`
    pub meta_description: Selector,
}

impl PageSelectors {
    /// Compile all selectors
    pub fn new() -> Result<Self> {
        Ok(Self {
            tables: parse("table")?,
            thead: parse("thead")?,
            tbody: parse("tbody")?,
            rows: parse("tr")?,
            header_cells: parse("th")?,
            data_cells: parse("td")?,
            cells: parse("td, th")?,
            lists: parse("ul, ol")?,
            list_items: parse("li")?,
            paragraphs: parse("p")?,
            h1: parse("h1")?,
            title: parse("title")?,
            meta_description: parse(r#"meta[name="description"]"#)?,
        })
    }
}

/// Compile a selector, mapping failures into the crate error
pub fn parse(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ExtractionError::InvalidSelector(format!("{}: {}", css, e)).into())
}

/// Joined, whitespace-normalized text of an element
pub fn element_text(el: ElementRef<'_>) -> String {
    crate::extraction::value::clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Elements matching `selector` at or below `el`, in document order
///
/// Unlike `ElementRef::select`, the element itself is included when it
/// matches.
pub fn select_inclusive<'a>(el: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let own = selector.matches(&el).then_some(el);
    own.into_iter().chain(el.select(selector)).collect()
}
