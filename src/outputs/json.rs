//! JSON output of a [`Digest`].
//!
//! The file holds the listing URL, the generation timestamp and one entry
//! per displayed headline with its summary outcome:
//!
//! ```json
//! {"source":"https://news.ycombinator.com/","generated_at":"...","headlines":[
//!   {"rank":1,"title":"...","link":"...","summary":{"outcome":"summary","detail":"..."}}
//! ],"problem":null}
//! ```

use crate::models::Digest;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `digest` as pretty-printed JSON to `path`, creating parent
/// directories as needed.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_digest(digest: &Digest, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(digest)?;

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(headlines = digest.headlines.len(), "Wrote digest JSON");
    Ok(())
}
