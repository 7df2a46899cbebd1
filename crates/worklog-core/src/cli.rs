use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use regex::Regex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::WorklogError;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "worklog",
    version,
    about = "Generates a worklog template for the current quarter"
)]
pub struct GlobalCli {
    /// Customer name used in every daily header
    #[arg(short = 'c', long = "customername")]
    pub customer: Option<String>,

    /// Generate for the quarter after the reference date's
    #[arg(short = 'n', long = "next-quarter")]
    pub next_quarter: bool,

    /// Author name
    #[arg(short = 'p', long = "name")]
    pub name: Option<String>,

    /// Author email
    #[arg(short = 'e', long = "email")]
    pub email: Option<String>,

    /// Report format
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Reference date (today, YYYY-MM-DD, YYYY-Qn, ...)
    #[arg(short = 'd', long = "date", default_value = "today")]
    pub date: String,

    /// Directory the worklog file is written to
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Print the document instead of writing a file
    #[arg(long = "stdout")]
    pub stdout: bool,

    /// Append PTO and check-in sections
    #[arg(long = "extras")]
    pub extras: bool,

    /// List the registered formats and exit
    #[arg(long = "list-formats")]
    pub list_formats: bool,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

/// Command-line values layered over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub customer: String,
    pub name: String,
    pub email: String,
    pub format: String,
    pub output_dir: PathBuf,
    pub extras: bool,
}

impl GlobalCli {
    pub fn settings(&self, cfg: &Config) -> Settings {
        Settings {
            customer: self.customer.clone().unwrap_or_else(|| cfg.customer.clone()),
            name: self.name.clone().unwrap_or_else(|| cfg.name.clone()),
            email: self.email.clone().unwrap_or_else(|| cfg.email.clone()),
            format: self.format.clone().unwrap_or_else(|| cfg.format.clone()),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| cfg.output_dir.clone()),
            extras: self.extras || cfg.extras,
        }
    }
}

fn default_log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) => "warn",
        (0, 3..) => "trace",
        (0, 2) => "debug",
        (0, 1) => "info",
        _ => "warn",
    }
}

/// Logs go to stderr so `--stdout` output stays a clean document.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let level = default_log_level(verbose, quiet);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .compact()
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, level, "tracing subscriber already set, continuing");
    }

    Ok(())
}

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            Regex::new(
                r"^(?:[^<>]*<(?P<wrapped>[^<>\s@]+@[^<>\s@]+)>|(?P<bare>[^<>\s@]+@[^<>\s@]+))$",
            )
            .ok()
        })
        .as_ref()
}

/// Address part of `local@domain` or `Display Name <local@domain>`.
pub fn parse_email(raw: &str) -> Result<String, WorklogError> {
    let email_re = email_pattern()
        .ok_or_else(|| WorklogError::InvalidInput("email pattern failed to compile".to_string()))?;

    email_re
        .captures(raw.trim())
        .and_then(|caps| caps.name("wrapped").or_else(|| caps.name("bare")))
        .map(|addr| addr.as_str().to_string())
        .ok_or_else(|| WorklogError::InvalidInput(format!("invalid email address: {raw:?}")))
}

pub fn validate_customer(raw: &str) -> Result<(), WorklogError> {
    if raw.trim().is_empty() {
        return Err(WorklogError::InvalidInput("customer name is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{GlobalCli, default_log_level, parse_email, validate_customer};
    use crate::config::Config;

    #[test]
    fn flags_override_config() {
        let cli = GlobalCli::parse_from(["worklog", "-c", "Acme", "-n", "-e", "me@acme.io"]);
        let cfg = Config {
            name: "From Config".to_string(),
            output_dir: PathBuf::from("/tmp/logs"),
            ..Config::default()
        };
        let settings = cli.settings(&cfg);
        assert!(cli.next_quarter);
        assert_eq!(settings.customer, "Acme");
        assert_eq!(settings.email, "me@acme.io");
        assert_eq!(settings.name, "From Config");
        assert_eq!(settings.format, "adoc");
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/logs"));
        assert!(!settings.extras);
    }

    #[test]
    fn defaults_without_flags() {
        let cli = GlobalCli::parse_from(["worklog"]);
        assert_eq!(cli.date, "today");
        assert!(!cli.next_quarter);
        let settings = cli.settings(&Config::default());
        assert_eq!(settings.customer, "Company");
        assert_eq!(settings.name, "MyName");
        assert_eq!(settings.email, "myemail@company.io");
    }

    #[test]
    fn email_accepts_plain_and_display_forms() {
        assert_eq!(parse_email("jane@acme.io").expect("plain"), "jane@acme.io");
        assert_eq!(parse_email("jane@localhost").expect("dotless domain"), "jane@localhost");
        assert_eq!(parse_email(" jane@acme ").expect("trimmed"), "jane@acme");
        assert_eq!(
            parse_email("Jane Doe <jane@acme.io>").expect("display name"),
            "jane@acme.io"
        );
    }

    #[test]
    fn email_rejects_malformed() {
        for raw in ["jane", "jane doe@acme.io", "", "@acme.io", "jane@", "Jane <jane>"] {
            assert!(parse_email(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn log_level_from_counts() {
        assert_eq!(default_log_level(0, 0), "warn");
        assert_eq!(default_log_level(1, 0), "info");
        assert_eq!(default_log_level(2, 0), "debug");
        assert_eq!(default_log_level(5, 0), "trace");
        assert_eq!(default_log_level(3, 1), "warn");
        assert_eq!(default_log_level(0, 2), "error");
    }

    #[test]
    fn customer_validation() {
        assert!(validate_customer("Acme").is_ok());
        assert!(validate_customer("   ").is_err());
    }
}
