//! Log output for build runs.
//!
//! Everything goes to stderr, so command output on stdout stays clean.
//!
//! | Variable | Effect |
//! |:---------|:-------|
//! | `C25519_LOG_FORMAT` | `json`, `pretty` or `compact` |
//! | `C25519_LOG_LEVEL` | filter directives, takes precedence over `RUST_LOG` |
//! | `C25519_LOG_LOCATION` | `1`/`true` adds file and line to each event |

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Event formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line, for terminals.
    Pretty,
    /// One line per event.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// How and what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Event formatting.
    pub format: LogFormat,
    /// `EnvFilter` directives.
    pub filter: String,
    /// Add file and line to each event.
    pub with_location: bool,
}

impl LogSettings {
    /// Settings for `-v` repeated `verbosity` times, overridden by the
    /// environment.
    ///
    /// Without overrides the format is pretty on a terminal and compact
    /// otherwise.
    pub fn for_verbosity(verbosity: u8) -> Self {
        let format = if std::io::stderr().is_terminal() {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        };

        Self {
            format,
            filter: level_for(verbosity).to_string(),
            with_location: false,
        }
        .with_env_overrides(|key| std::env::var(key).ok())
    }

    fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(format) = var("C25519_LOG_FORMAT").and_then(|s| s.parse::<LogFormat>().ok()) {
            self.format = format;
        }
        if let Some(filter) = var("C25519_LOG_LEVEL").or_else(|| var("RUST_LOG")) {
            self.filter = filter;
        }
        if let Some(flag) = var("C25519_LOG_LOCATION") {
            self.with_location = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// Fails if one is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.filter)
        .with_context(|| format!("Invalid log filter '{}'", settings.filter))?;
    let location = settings.with_location;

    let layer = match settings.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .with_file(location)
            .with_line_number(location)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_file(location)
            .with_line_number(location)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_file(location)
            .with_line_number(location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize logging")
}

/// Span covering one profile of a build run.
#[macro_export]
macro_rules! instrument_profile {
    ($profile:expr) => {
        tracing::info_span!("profile", profile = %$profile)
    };
}

/// Span covering one variant rendering.
#[macro_export]
macro_rules! instrument_variant {
    ($variant:expr, $rendering:expr) => {
        tracing::info_span!("variant", variant = %$variant, rendering = %$rendering)
    };
}
