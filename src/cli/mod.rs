//! CLI interface and argument parsing
//!
//! The command line takes a single optional positional argument: the maximum
//! number of candidate patients to discover. Everything else comes from the
//! configuration file (`SCREENER_CONFIG`, default `screener.toml`) and
//! `SCREENER_*` environment overrides.

pub mod screen;

use clap::Parser;
use std::path::PathBuf;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "SCREENER_CONFIG";

/// Trial Screener - FHIR Clinical Trial Eligibility Screener
#[derive(Parser, Debug)]
#[command(name = "trial-screener")]
#[command(version, about, long_about = None)]
#[command(author = "Trial Screener Contributors")]
pub struct Cli {
    /// Maximum number of candidate patients to screen
    #[arg(value_name = "MAX_PATIENTS", allow_hyphen_values = true)]
    pub max_patients: Option<String>,
}

impl Cli {
    /// Candidate limit from the command line
    ///
    /// Missing, non-numeric and non-positive values fall back to `default`;
    /// the last two with a warning.
    pub fn resolve_max_patients(&self, default: usize) -> usize {
        let Some(raw) = self.max_patients.as_deref() else {
            return default;
        };

        match raw.trim().parse::<i64>() {
            Ok(value) if value > 0 => usize::try_from(value).unwrap_or(default),
            Ok(value) => {
                tracing::warn!(value, default, "Max patients must be positive, using default");
                eprintln!("Warning: max patients must be positive, using default {default}");
                default
            }
            Err(_) => {
                tracing::warn!(value = %raw, default, "Invalid max patients, using default");
                eprintln!("Warning: invalid max patients '{raw}', using default {default}");
                default
            }
        }
    }
}

/// Configuration file named by `SCREENER_CONFIG`, if set
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_cli_parse_without_arguments() {
        let cli = Cli::parse_from(["trial-screener"]);
        assert!(cli.max_patients.is_none());
        assert_eq!(cli.resolve_max_patients(100), 100);
    }

    #[test_case("25", 25 ; "positive")]
    #[test_case(" 7 ", 7 ; "padded")]
    #[test_case("0", 100 ; "zero")]
    #[test_case("-5", 100 ; "negative")]
    #[test_case("abc", 100 ; "not a number")]
    #[test_case("2.5", 100 ; "fraction")]
    fn test_resolve_max_patients(arg: &str, expected: usize) {
        let cli = Cli::parse_from(["trial-screener", arg]);
        assert_eq!(cli.resolve_max_patients(100), expected);
    }

    #[test]
    fn test_cli_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["trial-screener", "10", "20"]).is_err());
    }
}
