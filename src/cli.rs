//! Command-line interface definitions.
//!
//! The defaults reproduce the tool's fixed behavior; the flags exist so the
//! dedup window and destination don't have to live as magic numbers in code.

use clap::Parser;

use crate::dedup::DEFAULT_PROXIMITY_DAYS;

/// Command-line arguments for the weekly PDF fetcher.
///
/// # Examples
///
/// ```sh
/// # Fixed default behavior
/// weekly_affairs_fetch
///
/// # Custom destination and a wider dedup window
/// weekly_affairs_fetch -o ./bulletins --proximity-days 6
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Destination directory for downloaded PDFs
    #[arg(short, long, default_value = "Weekly Current Affairs")]
    pub output_dir: String,

    /// Maximum gap in days between two edition dates for them to be treated
    /// as the same edition
    #[arg(long, default_value_t = DEFAULT_PROXIMITY_DAYS)]
    pub proximity_days: i64,

    /// Chrome/Chromium executable used for page rendering
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["weekly_affairs_fetch"]);
        assert_eq!(cli.output_dir, "Weekly Current Affairs");
        assert_eq!(cli.proximity_days, 4);
        assert!(cli.chrome_path.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "weekly_affairs_fetch",
            "-o",
            "./bulletins",
            "--proximity-days",
            "6",
            "--chrome-path",
            "/usr/bin/chromium",
        ]);
        assert_eq!(cli.output_dir, "./bulletins");
        assert_eq!(cli.proximity_days, 6);
        assert_eq!(cli.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    }
}
