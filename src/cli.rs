//! Command-line interface.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "workmux", version, about = "Per-project tmux session picker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Block until a session closes
    Wait {
        /// Session name to wait on
        session: String,
        /// Give up after this long (e.g. "30s", "5m")
        #[arg(long)]
        timeout: Option<String>,
    },
    /// Print discovered projects, one per line
    List,
}

/// Parse "30s" / "5m" / "1h" / bare seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty duration");
    }
    let (number, unit) = match input.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => input.split_at(idx),
        None => (input, "s"),
    };
    let value: u64 = number
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid duration: {input}"))?;
    let seconds = match unit {
        "s" => value,
        "m" => value * 60,
        "h" => value * 3600,
        _ => bail!("invalid duration unit: {unit} (use s, m, or h)"),
    };
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_parse_with_and_without_units() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn bad_durations_are_rejected() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10d").is_err());
        assert!(parse_duration("m5").is_err());
    }

    #[test]
    fn wait_subcommand_parses() {
        let cli = Cli::parse_from(["workmux", "wait", "w_app", "--timeout", "30s"]);
        match cli.command {
            Some(Command::Wait { session, timeout }) => {
                assert_eq!(session, "w_app");
                assert_eq!(timeout.as_deref(), Some("30s"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_runs_the_picker() {
        let cli = Cli::parse_from(["workmux"]);
        assert!(cli.command.is_none());
    }
}
