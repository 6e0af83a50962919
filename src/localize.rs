//! Image localization
//!
//! Saved wiki pages point their `<img>` tags at the wiki's CDN. This module
//! downloads each remote image once per run into a local folder and rewrites
//! the `src` attributes to relative paths, so the page renders offline and
//! the static site can ship its own copies.
//!
//! Only the `src` attribute values change; every other byte of the page is
//! preserved.
//!
//! # Example
//!
//! ```rust,no_run
//! use wiki_extract::localize::{localize_file, FetchOptions, HttpFetcher};
//!
//! # async fn run() -> wiki_extract::Result<()> {
//! let fetcher = HttpFetcher::new(FetchOptions::default())?;
//! let report = localize_file(
//!     "isolate/buildings/building_furnace.html".as_ref(),
//!     "isolate/buildings/building_furnace_local.html".as_ref(),
//!     "assets/buildings/furnace/img".as_ref(),
//!     &fetcher,
//! )
//! .await?;
//! println!("downloaded {} images", report.downloaded);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::batch::read_html;
use crate::error::{Error, LocalizeError, Result};
use crate::extraction::selectors;

/// Options for image downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Per-request timeout in milliseconds (default: 15000)
    pub timeout_ms: u64,
    /// Number of retry attempts after the first (default: 2)
    pub retries: u32,
    /// Delay between retries in ms (default: 500)
    pub retry_delay_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 15000,
            retries: 2,
            retry_delay_ms: 500,
        }
    }
}

/// Source of image bytes
pub trait ImageFetcher {
    /// Download the body at `url`
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, LocalizeError>> + Send;
}

/// HTTP image fetcher with timeout and retries
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    options: FetchOptions,
}

impl HttpFetcher {
    /// Create a fetcher
    pub fn new(options: FetchOptions) -> std::result::Result<Self, LocalizeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()?;
        Ok(Self { client, options })
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, LocalizeError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocalizeError::Timeout(self.options.timeout_ms)
            } else {
                e.into()
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocalizeError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, LocalizeError> {
        let mut last_error = None;
        for attempt in 0..=self.options.retries {
            if attempt > 0 {
                warn!("Download retry attempt {} of {}", attempt, self.options.retries);
                tokio::time::sleep(Duration::from_millis(self.options.retry_delay_ms)).await;
            }

            match self.fetch_once(url).await {
                Ok(bytes) => return Ok(bytes),
                // Client errors will not change on retry
                Err(e @ LocalizeError::Http { status, .. }) if (400..500).contains(&status) => {
                    return Err(e);
                }
                Err(e) => {
                    warn!("Download attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LocalizeError::Network("download failed after all retries".to_string())
        }))
    }
}

/// File names already downloaded during one run
#[derive(Debug, Clone, Default)]
pub struct SeenNames {
    names: HashSet<String>,
}

impl SeenNames {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name; `false` if it was already present
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    /// Whether a name was recorded
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of recorded names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Counters for one localization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizeReport {
    /// Images downloaded and written
    pub downloaded: usize,
    /// `src` rewritten to an image already downloaded this run
    pub reused: usize,
    /// Downloads that failed; their `src` is left as is
    pub failed: usize,
    /// Remote `src` values without a usable file name
    pub skipped: usize,
}

impl LocalizeReport {
    /// Number of `src` attributes rewritten
    pub fn rewritten(&self) -> usize {
        self.downloaded + self.reused
    }
}

// `>` inside a quoted attribute value does not end the tag.
fn img_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
            .expect("hardcoded img regex is valid")
    })
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("hardcoded attribute regex is valid")
    })
}

// Markup whose `<img>` text is not a rendered image.
fn opaque_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?is)<!--.*?-->",
            r"|<script\b.*?</script\s*>",
            r"|<style\b.*?</style\s*>",
            r"|<template\b.*?</template\s*>",
            r"|<textarea\b.*?</textarea\s*>",
            r"|<noscript\b.*?</noscript\s*>",
        ))
        .expect("hardcoded opaque-block regex is valid")
    })
}

// Byte range of the `src` value within an `<img ...>` tag.
fn src_value_span(tag: &str) -> Option<(usize, usize)> {
    let attrs_start = "<img".len();
    for caps in attr_re().captures_iter(&tag[attrs_start..]) {
        if !caps[1].eq_ignore_ascii_case("src") {
            continue;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
        return Some((attrs_start + value.start(), attrs_start + value.end()));
    }
    None
}

// `src` values of the images a browser would actually render.
fn rendered_srcs(html: &str, images: &Selector) -> HashSet<String> {
    Html::parse_document(html)
        .select(images)
        .filter_map(|img| img.value().attr("src"))
        .map(|src| src.trim().to_string())
        .collect()
}

/// Rewrites remote image references to local copies
#[derive(Debug, Clone)]
pub struct Localizer {
    image_dir: PathBuf,
    html_dir: PathBuf,
}

impl Localizer {
    /// Save images into `image_dir`, linking them from a page written at `output_html`
    pub fn new(image_dir: impl Into<PathBuf>, output_html: &Path) -> Self {
        let html_dir = output_html
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            image_dir: image_dir.into(),
            html_dir,
        }
    }

    /// Path of a saved image relative to the page, with `/` separators
    pub fn relative_src(&self, filename: &str) -> String {
        let target = self.image_dir.join(filename);
        to_slash(&relative_path(&self.html_dir, &target))
    }

    /// Download remote images and rewrite their `src` attributes
    #[instrument(skip(self, html, fetcher, seen), fields(image_dir = %self.image_dir.display()))]
    pub async fn localize<F: ImageFetcher>(
        &self,
        html: &str,
        fetcher: &F,
        seen: &mut SeenNames,
    ) -> Result<(String, LocalizeReport)> {
        let images = selectors::parse("img[src]")?;
        let rendered = rendered_srcs(html, &images);
        let opaque: Vec<(usize, usize)> = opaque_re()
            .find_iter(html)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut report = LocalizeReport::default();
        let mut out = String::with_capacity(html.len());
        let mut cursor = 0;

        for tag in img_tag_re().find_iter(html) {
            if opaque.iter().any(|&(start, end)| tag.start() >= start && tag.start() < end) {
                continue;
            }
            let Some((value_start, value_end)) = src_value_span(tag.as_str()) else {
                continue;
            };

            let raw = tag.as_str()[value_start..value_end].trim();
            if !raw.starts_with("http") {
                continue;
            }
            let url = raw.replace("&amp;", "&");
            if !rendered.contains(&url) {
                debug!("Not a rendered image: {}", url);
                continue;
            }

            let filename = match url_filename(&url) {
                Ok(name) => name,
                Err(e) => {
                    debug!("Skipping image: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };

            if seen.contains(&filename) {
                report.reused += 1;
            } else {
                info!("Downloading image: {}", filename);
                match fetcher.fetch(&url).await {
                    Ok(bytes) => {
                        tokio::fs::write(self.image_dir.join(&filename), bytes).await?;
                        seen.insert(&filename);
                        report.downloaded += 1;
                    }
                    Err(e) => {
                        warn!("Image failed: {} ({})", url, e);
                        report.failed += 1;
                        continue;
                    }
                }
            }

            let start = tag.start() + value_start;
            let end = tag.start() + value_end;
            out.push_str(&html[cursor..start]);
            out.push_str(&self.relative_src(&filename));
            cursor = end;
        }

        out.push_str(&html[cursor..]);
        Ok((out, report))
    }
}

/// Last path segment of a URL
///
/// # Errors
///
/// Returns `LocalizeError::InvalidUrl` when the URL does not parse or its
/// path ends in `/`.
pub fn url_filename(url: &str) -> std::result::Result<String, LocalizeError> {
    let parsed =
        Url::parse(url).map_err(|e| LocalizeError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.path().rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(LocalizeError::InvalidUrl(format!("{}: no file name", url))),
    }
}

/// Localize the images of one saved page and write the rewritten copy
#[instrument(skip(fetcher))]
pub async fn localize_file<F: ImageFetcher>(
    input: &Path,
    output_html: &Path,
    image_dir: &Path,
    fetcher: &F,
) -> Result<LocalizeReport> {
    if !input.is_file() {
        return Err(Error::InputMissing(input.to_path_buf()));
    }
    tokio::fs::create_dir_all(image_dir).await?;

    let html = read_html(input)?;
    let localizer = Localizer::new(image_dir, output_html);
    let mut seen = SeenNames::new();
    let (rewritten, report) = localizer.localize(&html, fetcher, &mut seen).await?;

    if let Some(parent) = output_html.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output_html, rewritten).await?;

    info!(
        "Localized {} -> {} ({} downloaded, {} reused, {} failed)",
        input.display(),
        output_html.display(),
        report.downloaded,
        report.reused,
        report.failed
    );
    Ok(report)
}

/// Default output path for a localized copy: `<stem>_local.html` beside the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_local.html", stem))
}

/// Relative path from directory `from` to `to`
///
/// Relative inputs are taken from the current directory, and `.`/`..`
/// are resolved before comparing.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_default();
    let from = absolute(&cwd, from);
    let to = absolute(&cwd, to);

    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for part in &to[common..] {
        rel.push(part.as_os_str());
    }
    rel
}

// Lexical: symlinks are not followed.
fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in cwd.join(path).components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
