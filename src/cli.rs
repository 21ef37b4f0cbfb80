//! Command-line interface definitions for Awful HN Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables.

use clap::Parser;

/// Command-line arguments for the Awful HN Digest application.
///
/// # Examples
///
/// ```sh
/// # Show the top 5 headlines
/// awful_hn_digest
///
/// # Show 10 headlines and summarize the 1st and 3rd
/// awful_hn_digest -n 10 -s 1 -s 3
///
/// # Summarize everything shown and keep a JSON copy
/// awful_hn_digest -n 8 --summarize-all -j ./out/digest.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Number of headlines to display (1-20)
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub count: u8,

    /// Rank (1-based) of a displayed headline to summarize; repeatable
    #[arg(short, long = "summarize", value_name = "RANK")]
    pub summarize: Vec<usize>,

    /// Summarize every displayed headline
    #[arg(long, conflicts_with = "summarize")]
    pub summarize_all: bool,

    /// Optional path to a pipeline config YAML file
    #[arg(short, long, env = "HN_DIGEST_CONFIG")]
    pub config: Option<String>,

    /// Override the listing page to scrape
    #[arg(long, env = "HN_DIGEST_LISTING_URL")]
    pub listing_url: Option<String>,

    /// Path to the awful_aj config.yaml (defaults to the awful_aj config dir)
    #[arg(long, env = "AWFUL_AJ_CONFIG")]
    pub model_config: Option<String>,

    /// Name of the awful_aj chat template used for summaries
    #[arg(long, env = "HN_DIGEST_TEMPLATE", default_value = "news_summarizer")]
    pub template: String,

    /// Also write the digest as JSON to this path
    #[arg(short, long)]
    pub json_output: Option<String>,
}

impl Cli {
    /// 0-based indices of the headlines to summarize, given how many are shown.
    ///
    /// Ranks outside `1..=shown` are dropped; duplicates keep their first position.
    pub fn summary_indices(&self, shown: usize) -> Vec<usize> {
        let ranks: Vec<usize> = if self.summarize_all {
            (1..=shown).collect()
        } else {
            self.summarize.clone()
        };
        let mut indices = Vec::new();
        for rank in ranks {
            if (1..=shown).contains(&rank) && !indices.contains(&(rank - 1)) {
                indices.push(rank - 1);
            }
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["awful_hn_digest"]);
        assert_eq!(cli.count, 5);
        assert!(cli.summarize.is_empty());
        assert!(!cli.summarize_all);
        assert_eq!(cli.template, "news_summarizer");
        assert!(cli.json_output.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "awful_hn_digest",
            "-n",
            "10",
            "-s",
            "1",
            "-s",
            "3",
            "-j",
            "/tmp/digest.json",
        ]);
        assert_eq!(cli.count, 10);
        assert_eq!(cli.summarize, vec![1, 3]);
        assert_eq!(cli.json_output.as_deref(), Some("/tmp/digest.json"));
    }

    #[test]
    fn test_cli_rejects_count_out_of_range() {
        assert!(Cli::try_parse_from(["awful_hn_digest", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["awful_hn_digest", "-n", "21"]).is_err());
    }

    #[test]
    fn test_summarize_all_conflicts_with_ranks() {
        assert!(Cli::try_parse_from(["awful_hn_digest", "-s", "1", "--summarize-all"]).is_err());
    }

    #[test]
    fn test_summary_indices() {
        let cli = Cli::parse_from(["awful_hn_digest", "-s", "2", "-s", "9", "-s", "2", "-s", "0"]);
        assert_eq!(cli.summary_indices(5), vec![1]);

        let all = Cli::parse_from(["awful_hn_digest", "--summarize-all"]);
        assert_eq!(all.summary_indices(3), vec![0, 1, 2]);
    }
}
