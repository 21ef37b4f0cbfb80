//! # Awful HN Digest
//!
//! Headline → article → summary pipeline for the Hacker News front page.
//!
//! - [`headlines`]: scrape the listing page into [`models::HeadlineRecord`]s
//! - [`extractor`]: download an article and pull out its main text
//! - [`summarizer`] and [`model`]: bound the input and output of the model call
//! - [`cache`]: single-flight TTL memoization used by every stage
//! - [`pipeline`]: the "top N headlines" / "summarize headline i" surface
//!
//! The binary in `main.rs` wires these to a `reqwest` client and an
//! `awful_aj` chat model and prints the result as Markdown.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod headlines;
pub mod http;
pub mod model;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod summarizer;
pub mod utils;
