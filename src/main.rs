//! wiki-extract CLI
//!
//! Converts saved wiki pages to JSON and localizes their images.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use wiki_extract::batch::{run_batch, BatchOptions, Variant};
use wiki_extract::config::ExtractorConfig;
use wiki_extract::extraction::selectors::PageSelectors;
use wiki_extract::extraction::{extract_firecrystal_levels, DocumentExtractor};
use wiki_extract::localize::{default_output_path, localize_file, FetchOptions, HttpFetcher};

/// Game-wiki page extractor
#[derive(Parser, Debug)]
#[command(name = "wiki-extract")]
#[command(version)]
#[command(about = "Turn saved game-wiki pages into structured JSON")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with level hints, time keywords and section tags
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a folder of saved pages into per-variant JSON and index.json
    Parse {
        /// Folder holding the saved .html pages
        #[arg(short, long, default_value = "isolate/buildings")]
        input: PathBuf,

        /// Folder receiving the JSON output
        #[arg(short, long, default_value = "page/data/buildings")]
        output: PathBuf,

        /// Skip *_local.html copies
        #[arg(long)]
        no_local: bool,

        /// Log and skip pages that fail instead of aborting
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Download a page's remote images and write a copy pointing at them
    Localize {
        /// Saved page to localize
        #[arg(short, long)]
        input: PathBuf,

        /// Output page (default: <input stem>_local.html beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Folder receiving the images
        #[arg(long)]
        images: PathBuf,

        /// Per-request timeout in milliseconds
        #[arg(long, default_value = "15000")]
        timeout_ms: u64,

        /// Retry attempts per image
        #[arg(long, default_value = "2")]
        retries: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)?,
        None => ExtractorConfig::from_env()?,
    };

    match args.command {
        Command::Parse {
            input,
            output,
            no_local,
            continue_on_error,
        } => {
            let extractor = DocumentExtractor::with_config(config)?;
            let options = BatchOptions {
                input_dir: input,
                output_dir: output,
                include_local: !no_local,
                continue_on_error,
            };
            let report = run_batch(&extractor, &options)
                .with_context(|| format!("batch over {} failed", options.input_dir.display()))?;

            tracing::info!("{} pages processed", report.index.items.len());
            if !report.failed.is_empty() {
                tracing::warn!("{} pages failed", report.failed.len());
            }
        }

        Command::Localize {
            input,
            output,
            images,
            timeout_ms,
            retries,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let fetcher = HttpFetcher::new(FetchOptions {
                timeout_ms,
                retries,
                ..Default::default()
            })?;

            let report = localize_file(&input, &output, &images, &fetcher)
                .await
                .with_context(|| format!("localizing {} failed", input.display()))?;
            tracing::info!("{} image references rewritten", report.rewritten());

            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if Variant::from_filename(&name) == Variant::Firecrystal {
                let html = wiki_extract::batch::read_html(&output)?;
                let levels = extract_firecrystal_levels(&html, &PageSelectors::new()?);
                tracing::info!("{} fire-crystal levels found", levels.len());
            }
        }
    }

    Ok(())
}
