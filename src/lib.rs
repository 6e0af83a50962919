//! wiki-extract - Game-Wiki Page to JSON Extraction
//!
//! This crate converts saved game-wiki pages into structured JSON for a
//! static data site: every table with typed cells, the page's main
//! per-level table sorted by level, and heading-scoped sections.
//!
//! # Features
//!
//! - **Table Extraction**: headers, typed rows and header-keyed row objects
//! - **Main Table Selection**: heuristic scoring with level-aware sorting
//! - **Sections**: tables, lists and paragraphs grouped under `h2`-`h4`
//! - **Batch Output**: per-variant JSON files plus an `index.json` summary
//! - **Image Localization**: download remote images and rewrite `<img src>`
//!
//! # Architecture
//!
//! ```text
//! saved .html ──▶ DocumentExtractor ──▶ PageDocument ──▶ <variant>/<slug>.json
//!                    │                                          │
//!                    ▼                                          ▼
//!     tables · main table · sections                      index.json
//!
//! saved .html ──▶ Localizer ──▶ *_local.html + image folder
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use wiki_extract::extraction::DocumentExtractor;
//!
//! let html = "<h1>Furnace</h1><table><tr><th>Level</th></tr>\
//!             <tr><td>2</td></tr><tr><td>1</td></tr></table>";
//! let extractor = DocumentExtractor::new().unwrap();
//! let page = extractor.extract(html);
//!
//! assert_eq!(page.title, "Furnace");
//! assert_eq!(page.main_table.unwrap().rows[0][0].to_string(), "1");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod localize;

// Re-exports for convenience
pub use batch::{run_batch, BatchOptions, BatchReport, Variant};
pub use config::ExtractorConfig;
pub use error::{Error, Result};
pub use extraction::{DocumentExtractor, PageDocument};
pub use localize::{localize_file, HttpFetcher, ImageFetcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
