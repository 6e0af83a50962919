//! Whole-page extraction
//!
//! [`DocumentExtractor`] runs every extractor over one HTML page and
//! assembles the [`PageDocument`] the data site consumes.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::extraction::metadata::MetadataExtractor;
use crate::extraction::scoring::{score_table, select_main_table, sort_main_table};
use crate::extraction::sections::{Section, SectionExtractor};
use crate::extraction::selectors::{self, PageSelectors};
use crate::extraction::table::{ParsedTable, TableParser};

/// Structured data extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Page title
    pub title: String,
    /// Page description
    pub description: String,
    /// Number of `<table>` elements on the page
    pub tables_total: usize,
    /// Index of the main table among all tables
    pub main_table_index: Option<usize>,
    /// The main table, sorted by level when it has a level column
    pub main_table: Option<ParsedTable>,
    /// Heading-scoped sections in document order
    pub sections: Vec<Section>,
}

/// Extractor for whole pages
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    config: ExtractorConfig,
    selectors: PageSelectors,
    headings: Selector,
}

impl DocumentExtractor {
    /// Create an extractor with the default vocabularies
    pub fn new() -> Result<Self> {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create an extractor with custom vocabularies
    pub fn with_config(mut config: ExtractorConfig) -> Result<Self> {
        config.normalize();
        config.validate()?;
        let headings = selectors::parse(&config.section_selector())?;
        Ok(Self {
            config,
            selectors: PageSelectors::new()?,
            headings,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the page document from raw HTML
    #[instrument(skip(self, html), fields(len = html.len()))]
    pub fn extract(&self, html: &str) -> PageDocument {
        let document = Html::parse_document(html);
        let metadata = MetadataExtractor::new(&self.selectors).extract(&document);

        let tables = self.parse_tables(&document);
        let tables_total = tables.len();

        let main_table_index = select_main_table(&tables, &self.config);
        let main_table = main_table_index.map(|idx| {
            let mut table = tables[idx].clone();
            debug!(
                index = idx,
                score = score_table(&table, &self.config),
                "Selected main table"
            );
            sort_main_table(&mut table, &self.config);
            table
        });

        let sections =
            SectionExtractor::new(&self.selectors, &self.headings, &self.config).extract(&document);

        info!(
            tables = tables_total,
            main = ?main_table_index,
            sections = sections.len(),
            "Extracted page"
        );

        PageDocument {
            title: metadata.title,
            description: metadata.description,
            tables_total,
            main_table_index,
            main_table,
            sections,
        }
    }

    /// Parse every table on the page in document order
    pub fn parse_tables(&self, document: &Html) -> Vec<ParsedTable> {
        let parser = TableParser::new(&self.selectors);
        document
            .select(&self.selectors.tables)
            .map(|t| parser.parse(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::value::CellValue;

    const PAGE: &str = r#"
        <html><head><title>Wiki</title></head><body>
        <h1>Furnace</h1>
        <p>The heart of the city.</p>
        <table><tr><th>Item</th></tr><tr><td>Coal</td></tr></table>
        <h2>Upgrade Costs</h2>
        <div><table>
          <thead><tr><th>Level</th><th>Wood</th><th>Time</th></tr></thead>
          <tbody>
            <tr><td>2</td><td>1,200</td><td>1h</td></tr>
            <tr><td>1</td><td>500</td><td>30m</td></tr>
            <tr><td></td><td></td><td></td></tr>
          </tbody>
        </table></div>
        <h3>Notes</h3>
        <h3>Gem Cost</h3>
        <ul><li>Speed up with gems</li></ul>
        </body></html>
    "#;

    #[test]
    fn test_extract_page() {
        let doc = DocumentExtractor::new().unwrap().extract(PAGE);

        assert_eq!(doc.title, "Furnace");
        assert_eq!(doc.description, "The heart of the city.");
        assert_eq!(doc.tables_total, 2);
        assert_eq!(doc.main_table_index, Some(1));

        let main = doc.main_table.unwrap();
        assert_eq!(main.columns, vec!["Level", "Wood", "Time"]);
        assert_eq!(
            main.rows,
            vec![
                vec![CellValue::Int(1), CellValue::Int(500), CellValue::from("30m")],
                vec![CellValue::Int(2), CellValue::Int(1200), CellValue::from("1h")],
            ]
        );

        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Upgrade Costs", "Gem Cost"]);
        assert!(doc.sections[1].is_time_related);
    }

    #[test]
    fn test_page_without_tables() {
        let doc = DocumentExtractor::new().unwrap().extract("<p>hello</p>");
        assert_eq!(doc.tables_total, 0);
        assert!(doc.main_table_index.is_none());
        assert!(doc.main_table.is_none());
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_null_main_table_serializes() {
        let json = serde_json::to_value(PageDocument::default()).unwrap();
        assert!(json["main_table"].is_null());
        assert!(json["main_table_index"].is_null());
    }

    #[test]
    fn test_custom_section_tags() {
        let config = ExtractorConfig {
            section_tags: vec!["h5".to_string()],
            ..Default::default()
        };
        let extractor = DocumentExtractor::with_config(config).unwrap();
        let doc = extractor.extract("<h2>Skip</h2><p>a</p><h5>Keep</h5><p>b</p>");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Keep");
    }
}
