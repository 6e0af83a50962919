//! Batch conversion of a folder of saved pages
//!
//! Every `*.html` file in the input folder is parsed into a JSON document
//! under `<output>/<variant>/<slug>.json`, and `<output>/index.json` lists
//! what was written, in processing order.
//!
//! File names follow the scraper's convention: `building_<slug>.html` for
//! the base page, `firecrystal_<slug>.html` for the fire-crystal variant,
//! and a `_local` suffix for copies whose images were localized.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::extraction::{DocumentExtractor, PageDocument};

/// Name of the summary file written at the output root
pub const INDEX_FILE: &str = "index.json";

/// Source page classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// `building_*` pages
    Base,
    /// `firecrystal_*` pages
    Firecrystal,
    /// Anything else
    Other,
}

impl Variant {
    /// All variants, in output-folder order
    pub const ALL: [Variant; 3] = [Variant::Base, Variant::Firecrystal, Variant::Other];

    /// Folder and JSON name of the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Base => "base",
            Variant::Firecrystal => "firecrystal",
            Variant::Other => "other",
        }
    }

    /// Classify a file name by its prefix
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.starts_with("firecrystal_") {
            Variant::Firecrystal
        } else if lower.starts_with("building_") {
            Variant::Base
        } else {
            Variant::Other
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.html?$").expect("hardcoded extension regex is valid"))
}

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(building_|firecrystal_)").expect("hardcoded prefix regex is valid")
    })
}

fn local_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)_local$").expect("hardcoded suffix regex is valid"))
}

/// Slug of a source file: base name without extension, variant prefix or `_local`
pub fn filename_to_slug(path: &Path) -> String {
    let base = file_name(path);
    let s = extension_re().replace(&base, "");
    let s = prefix_re().replace(&s, "");
    local_suffix_re().replace(&s, "").into_owned()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Folder holding the saved `.html` pages
    pub input_dir: PathBuf,
    /// Folder receiving the JSON output
    pub output_dir: PathBuf,
    /// Also parse `*_local.html` copies
    pub include_local: bool,
    /// Log and skip a failing file instead of aborting the run
    pub continue_on_error: bool,
}

impl BatchOptions {
    /// Options with local copies included and fail-fast behavior
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            include_local: true,
            continue_on_error: false,
        }
    }
}

/// One written page, as listed in `index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Page slug
    pub slug: String,
    /// Page variant
    pub variant: Variant,
    /// JSON path relative to the output folder
    pub json: String,
    /// Source file name
    pub source_html: String,
    /// Extracted page title
    pub title: String,
}

/// Contents of `index.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchIndex {
    /// Entries in processing order
    pub items: Vec<IndexEntry>,
}

/// A page document tagged with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page slug
    pub slug: String,
    /// Page variant
    pub variant: Variant,
    /// Source file name
    pub source_html: String,
    /// Extracted data
    #[serde(flatten)]
    pub page: PageDocument,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Pages written, in processing order
    pub index: BatchIndex,
    /// Files skipped because of an error (only with `continue_on_error`)
    pub failed: Vec<(PathBuf, String)>,
    /// Where `index.json` was written
    pub index_path: PathBuf,
}

/// List the `.html` files of a folder, sorted by path
pub fn collect_inputs(dir: &Path, include_local: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let lower = file_name(&path).to_lowercase();
        if !lower.ends_with(".html") {
            continue;
        }
        if !include_local && lower.ends_with("_local.html") {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Read a page as text, replacing invalid UTF-8
pub fn read_html(path: &Path) -> Result<String> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::InputMissing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write a value as indented UTF-8 JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Parse one page and write its JSON under `output_dir`
#[instrument(skip(extractor))]
pub fn process_file(
    extractor: &DocumentExtractor,
    html_path: &Path,
    output_dir: &Path,
) -> Result<IndexEntry> {
    let source_html = file_name(html_path);
    let slug = filename_to_slug(html_path);
    let variant = Variant::from_filename(&source_html);

    let html = read_html(html_path)?;
    let page = extractor.extract(&html);

    let json = format!("{}/{}.json", variant, slug);
    let out_path = output_dir.join(variant.as_str()).join(format!("{}.json", slug));

    let entry = IndexEntry {
        slug: slug.clone(),
        variant,
        json,
        source_html: source_html.clone(),
        title: page.title.clone(),
    };

    let record = PageRecord {
        slug,
        variant,
        source_html,
        page,
    };
    write_json(&out_path, &record)?;

    info!("[OK] {} -> {}", entry.source_html, out_path.display());
    Ok(entry)
}

/// Convert every page of a folder and write `index.json`
#[instrument(skip(extractor))]
pub fn run_batch(extractor: &DocumentExtractor, options: &BatchOptions) -> Result<BatchReport> {
    let files = collect_inputs(&options.input_dir, options.include_local)?;
    info!("Found {} HTML files in {}", files.len(), options.input_dir.display());

    for variant in Variant::ALL {
        fs::create_dir_all(options.output_dir.join(variant.as_str()))?;
    }

    let mut report = BatchReport::default();
    for path in &files {
        match process_file(extractor, path, &options.output_dir) {
            Ok(entry) => report.index.items.push(entry),
            Err(e) if options.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
                report.failed.push((path.clone(), e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    report.index_path = options.output_dir.join(INDEX_FILE);
    write_json(&report.index_path, &report.index)?;
    info!(
        "Wrote {} ({} processed, {} failed)",
        report.index_path.display(),
        report.index.items.len(),
        report.failed.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_strips_prefix_suffix_extension() {
        assert_eq!(filename_to_slug(Path::new("a/building_furnace.html")), "furnace");
        assert_eq!(
            filename_to_slug(Path::new("FireCrystal_crystallaboratory_local.HTML")),
            "crystallaboratory"
        );
        assert_eq!(filename_to_slug(Path::new("heroes.htm")), "heroes");
        assert_eq!(filename_to_slug(Path::new("building_local_x.html")), "local_x");
    }

    #[test]
    fn test_variant_from_filename() {
        assert_eq!(Variant::from_filename("building_a.html"), Variant::Base);
        assert_eq!(Variant::from_filename("FIRECRYSTAL_a.html"), Variant::Firecrystal);
        assert_eq!(Variant::from_filename("a_building.html"), Variant::Other);
    }

    #[test]
    fn test_variant_serialization() {
        let json = serde_json::to_string(&Variant::Firecrystal).unwrap();
        assert_eq!(json, "\"firecrystal\"");
    }

    #[test]
    fn test_read_html_missing() {
        let err = read_html(Path::new("/nonexistent/page.html")).unwrap_err();
        assert!(matches!(err, Error::InputMissing(_)));
    }

    #[test]
    fn test_read_html_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.html");
        fs::write(&path, b"<p>caf\xe9</p>").unwrap();
        assert_eq!(read_html(&path).unwrap(), "<p>caf\u{fffd}</p>");
    }
}
