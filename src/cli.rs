//! Command-line interface definitions for Awful News Feed.
//!
//! The filter flags stand in for the page form; `--submit` chooses between
//! the page-load flow (restore persisted category, then load) and the submit
//! flow (persist the form, then load). Provider settings can also come from
//! environment variables or a YAML config file.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Awful News Feed application.
///
/// # Examples
///
/// ```sh
/// # Top headlines for the US
/// awful_news_feed --country us --category general -o ./news.html
///
/// # Search and remember the filters for the next run
/// awful_news_feed --country gb --category science --search "mars rover" --submit
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Two-letter country code
    #[arg(long, default_value = "us")]
    pub country: String,

    /// Provider category (business, entertainment, general, health, science, sports, technology)
    #[arg(long, default_value = "general")]
    pub category: String,

    /// Free-text search term; empty means top headlines
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Persist the filters above before loading, like submitting the form
    #[arg(long)]
    pub submit: bool,

    /// Path of the HTML document to write
    #[arg(short, long, default_value = "news.html")]
    pub output: PathBuf,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// News provider API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// News provider base URL
    #[arg(long, env = "NEWS_API_URL")]
    pub base_url: Option<String>,

    /// File holding the persisted filters
    #[arg(long, env = "NEWS_SETTINGS_FILE")]
    pub settings_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["awful_news_feed"]);

        assert_eq!(cli.country, "us");
        assert_eq!(cli.category, "general");
        assert_eq!(cli.search, "");
        assert!(!cli.submit);
        assert_eq!(cli.output, PathBuf::from("news.html"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "awful_news_feed",
            "-s",
            "bitcoin",
            "-o",
            "/tmp/out.html",
            "-c",
            "/tmp/config.yaml",
            "--submit",
        ]);

        assert_eq!(cli.search, "bitcoin");
        assert_eq!(cli.output, PathBuf::from("/tmp/out.html"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
        assert!(cli.submit);
    }
}
