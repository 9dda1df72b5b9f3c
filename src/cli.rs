use crate::input::DEFAULT_MAX_LINE;
use crate::latency::LatencyModel;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "filesim")]
#[command(about = "Concurrent file-request simulator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Probability that a request is served from cache
    #[arg(long, default_value = "0.8")]
    pub hit_probability: f64,

    /// Latency of a cache hit, in units
    #[arg(long, default_value = "1")]
    pub hit_units: u32,

    /// Shortest cold read, in units
    #[arg(long, default_value = "7")]
    pub cold_min: u32,

    /// Longest cold read, in units
    #[arg(long, default_value = "10")]
    pub cold_max: u32,

    /// Wall-clock length of one latency unit
    #[arg(long, short = 'u', default_value = "1s", value_parser = parse_duration)]
    pub unit: Duration,

    /// Maximum request line length in bytes, terminator included
    #[arg(long, default_value_t = DEFAULT_MAX_LINE)]
    pub max_line: usize,

    /// What to do with a line longer than --max-line
    #[arg(long, value_enum, default_value = "reject")]
    pub oversized: OversizedPolicy,

    /// Turn on verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OversizedPolicy {
    /// Warn, drop the line and prompt again
    Reject,
    /// Warn and service the first --max-line - 1 bytes
    Truncate,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    // Try humantime first
    if let Ok(d) = humantime::parse_duration(s) {
        return Ok(d);
    }

    // Try bare number as seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    Err(format!(
        "Invalid duration '{}'. Examples: 1s, 250ms, 2",
        s
    ))
}

impl Cli {
    pub fn latency_model(&self) -> LatencyModel {
        LatencyModel {
            hit_probability: self.hit_probability,
            hit_units: self.hit_units,
            cold_min: self.cold_min,
            cold_max: self.cold_max,
            unit: self.unit,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.latency_model().validate().map_err(|e| e.to_string())?;

        if self.max_line < 2 {
            return Err(format!(
                "--max-line must leave room for at least one byte, got {}",
                self.max_line
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference() {
        let cli = Cli::try_parse_from(["filesim"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.latency_model(), LatencyModel::default());
        assert_eq!(cli.max_line, 256);
        assert_eq!(cli.oversized, OversizedPolicy::Reject);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "filesim",
            "--unit",
            "10ms",
            "--hit-probability",
            "0.5",
            "--cold-min",
            "2",
            "--cold-max",
            "4",
            "--oversized",
            "truncate",
        ])
        .unwrap();
        assert_eq!(cli.unit, Duration::from_millis(10));
        assert_eq!(cli.hit_probability, 0.5);
        assert_eq!((cli.cold_min, cli.cold_max), (2, 4));
        assert_eq!(cli.oversized, OversizedPolicy::Truncate);
    }

    #[test]
    fn test_bare_number_unit_is_seconds() {
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let cli = Cli::try_parse_from(["filesim", "--cold-min", "9", "--cold-max", "3"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["filesim", "--max-line", "1"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
