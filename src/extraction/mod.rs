//! Structured data extraction
//!
//! This module turns a wiki page's HTML into typed tables, a level-sorted
//! main table and heading-scoped sections.

pub mod document;
pub mod firecrystal;
pub mod level;
pub mod metadata;
pub mod scoring;
pub mod sections;
pub mod selectors;
pub mod table;
pub mod value;

pub use document::{DocumentExtractor, PageDocument};
pub use firecrystal::{extract_firecrystal_levels, FireCrystalLevel};
pub use level::{LevelGroup, LevelKey};
pub use metadata::{MetadataExtractor, PageMetadata};
pub use sections::Section;
pub use table::{ParsedTable, RowObject, TableParser};
pub use value::{clean_text, smart_value, CellValue};
