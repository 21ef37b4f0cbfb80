//! Output generation for a rendered [`Digest`](crate::models::Digest).
//!
//! # Submodules
//!
//! - [`markdown`]: Renders the digest as headline cards for the terminal
//! - [`json`]: Writes the digest to a JSON file for other tools
//!
//! # Card Layout
//!
//! ```text
//! #### 1. Rust 2.0 announced (example.com)
//! **Link:** [Read Full Article](https://example.com/rust)
//!
//! **AI Summary:** The Rust project announced ...
//! ```

pub mod json;
pub mod markdown;
