//! Markdown rendering of headline cards.

use crate::models::Digest;
use crate::pipeline::{NO_HEADLINES_MESSAGE, SUMMARY_PLACEHOLDER};
use itertools::Itertools;
use std::fmt::Write;

/// Render a [`Digest`] as a Markdown document of headline cards.
///
/// Headlines that were not summarized show the summarize placeholder. An
/// empty digest renders the "no headlines" message, followed by the
/// reported problem when there is one.
pub fn digest_to_markdown(digest: &Digest) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Latest Headlines from {}\n", digest.source);
    let _ = writeln!(md, "_Generated {}_\n", digest.generated_at);

    if digest.headlines.is_empty() {
        let _ = writeln!(md, "> {NO_HEADLINES_MESSAGE}");
        if let Some(problem) = &digest.problem {
            let _ = writeln!(md, ">\n> {problem}");
        }
        return md;
    }

    let cards = digest
        .headlines
        .iter()
        .map(|entry| {
            let summary = entry
                .summary
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string());
            let domain = entry
                .domain
                .as_deref()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default();
            format!(
                "#### {}. {}{}\n**Link:** [Read Full Article]({})\n\n{}\n",
                entry.rank, entry.title, domain, entry.link, summary
            )
        })
        .join("\n---\n\n");
    md.push_str(&cards);
    md
}
