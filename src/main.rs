//! # Awful HN Digest
//!
//! Fetches the Hacker News front page, pulls the main text out of the
//! articles its headlines link to, and summarizes them with an LLM.
//!
//! ## Usage
//!
//! ```sh
//! awful_hn_digest -n 10 -s 1 -s 4
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Headlines**: Scrape the listing page into (title, link) records
//! 2. **Extraction**: Download a selected article and run Readability over it
//! 3. **Summarization**: Send the article text to the model, bounded in and out
//! 4. **Output**: Print Markdown cards and optionally write a JSON digest
//!
//! Every stage is cached in-process (see `awful_hn_digest::pipeline`) so asking for the
//! same headline twice does not repeat network or model work.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use awful_hn_digest::cli::Cli;
use awful_hn_digest::config::PipelineConfig;
use awful_hn_digest::http::ReqwestFetcher;
use awful_hn_digest::model::{JadeModel, RetryModel};
use awful_hn_digest::models::{Digest, DigestEntry};
use awful_hn_digest::outputs::{json, markdown};
use awful_hn_digest::pipeline::Pipeline;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hn_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Config ----
    let mut config = PipelineConfig::load(args.config.as_deref()).await?;
    if let Some(url) = &args.listing_url {
        config = config.with_listing_url(url.as_str())?;
    }

    // ---- Shared resources, built once ----
    let fetcher = Arc::new(ReqwestFetcher::new(&config.user_agent)?);
    let jade = JadeModel::load(args.model_config.as_deref(), &args.template).await?;
    let model = Arc::new(RetryModel::new(
        jade,
        config.model_retries,
        config.model_retry_base(),
    ));
    info!(?model, "Summarization model ready");

    let pipeline = Pipeline::new(&config, fetcher, model);

    // ---- Headlines ----
    let top = pipeline.top_headlines(usize::from(args.count)).await;
    if let Some(problem) = &top.problem {
        warn!(error = %problem, "Continuing with an empty headline list");
    }

    // ---- Summaries, one at a time ----
    let indices = args.summary_indices(top.records.len());
    for &index in &indices {
        let record = &top.records[index];
        info!(rank = index + 1, title = %record.title(), "Summarizing headline");
        match pipeline.summarize_headline(index).await {
            Ok(result) => info!(rank = index + 1, summarized = result.is_summary(), "Headline done"),
            Err(e) => error!(rank = index + 1, error = %e, "Could not summarize headline"),
        }
    }

    // ---- Output ----
    let digest = Digest {
        source: pipeline.listing_url().to_string(),
        generated_at: Local::now().to_rfc3339(),
        headlines: top
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| DigestEntry {
                rank: i + 1,
                title: record.title().to_string(),
                link: record.link().to_string(),
                domain: record.domain(),
                summary: pipeline.session_summary(record),
            })
            .collect(),
        problem: top.problem.as_ref().map(|p| p.to_string()),
    };

    println!("{}", markdown::digest_to_markdown(&digest));

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_digest(&digest, path).await {
            error!(%path, error = %e, "Failed to write digest JSON");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        headlines = digest.headlines.len(),
        summarized = pipeline.session().len(),
        evicted = pipeline.purge_expired(),
        "Execution complete"
    );

    Ok(())
}
