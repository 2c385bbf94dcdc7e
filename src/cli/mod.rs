//! CLI module for tubeblog.

mod output;
pub mod preflight;
mod serve;

pub use output::Output;
pub use serve::run_serve;

use clap::Parser;

/// Tubeblog - YouTube to Blog Converter
///
/// Serves a single-page form that researches a YouTube channel and writes a
/// technical blog post about a topic.
#[derive(Parser, Debug)]
#[command(name = "tubeblog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, env = "TUBEBLOG_CONFIG")]
    pub config: Option<String>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["tubeblog"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from(["tubeblog", "-vv", "--host", "0.0.0.0", "-p", "9000"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9000));
    }
}
