/*!
Layered configuration for the decoder limits, and logger setup.

Values are read, lowest priority first, from built-in defaults, an optional
configuration file, `CBOR_DECODER_*` environment variables, and finally the
command line.
*/

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const ENV_PREFIX: &str = "CBOR_DECODER";
const CONFIG_FILE_VAR: &str = "CBOR_DECODER_CONFIG_FILE";

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct Settings {
    // Logging level, or an EnvFilter directive; RUST_LOG applies when unset
    pub log_level: Option<String>,

    // Flattened decoder limits
    #[serde(flatten)]
    pub decoder: cbor_decoder::Config,
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct Options {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level or filter directive, written to stderr
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Maximum nesting depth of arrays, maps and tags
    #[arg(long, global = true, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Maximum length of a byte or text string
    #[arg(long, global = true, value_name = "BYTES")]
    max_string_length: Option<usize>,

    /// Maximum number of array items or map pairs
    #[arg(long, global = true, value_name = "COUNT")]
    max_container_length: Option<usize>,

    /// Reject indefinite-length strings and containers
    #[arg(long, global = true)]
    no_indefinite: bool,

    /// Reject negative integers below -2^63
    #[arg(long, global = true)]
    no_wide_negative: bool,

    /// Reject maps with repeated keys
    #[arg(long, global = true)]
    reject_duplicate_keys: bool,
}

impl Options {
    pub fn load(&self) -> anyhow::Result<(Settings, String)> {
        let mut b = ::config::Config::builder();

        let config_source = if let Some(source) = &self.config {
            b = b.add_source(::config::File::from(source.as_path()));
            format!(
                "Using configuration file '{}' specified on command line",
                source.display()
            )
        } else if let Ok(source) = std::env::var(CONFIG_FILE_VAR) {
            b = b.add_source(::config::File::with_name(&source));
            format!(
                "Using configuration file '{source}' specified by {CONFIG_FILE_VAR} environment variable"
            )
        } else {
            "Using built-in configuration".into()
        };

        b = b.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true),
        );

        let mut settings: Settings = b
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        self.apply(&mut settings);
        Ok((settings, config_source))
    }

    fn apply(&self, settings: &mut Settings) {
        if self.log_level.is_some() {
            settings.log_level.clone_from(&self.log_level);
        }

        let decoder = &mut settings.decoder;
        if let Some(depth) = self.max_depth {
            decoder.max_nesting_depth = depth;
        }
        if self.max_string_length.is_some() {
            decoder.max_string_length = self.max_string_length;
        }
        if self.max_container_length.is_some() {
            decoder.max_container_length = self.max_container_length;
        }
        if self.no_indefinite {
            decoder.allow_indefinite_length = false;
        }
        if self.no_wide_negative {
            decoder.allow_wide_negative = false;
        }
        if self.reject_duplicate_keys {
            decoder.reject_duplicate_keys = true;
        }
    }
}

/// An explicitly configured level wins, otherwise `env_var` is read, falling
/// back to `warn`.
fn env_filter(log_level: Option<&str>, env_var: &str) -> anyhow::Result<EnvFilter> {
    match log_level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{level}'"))
        }
        None => Ok(EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .with_env_var(env_var)
            .from_env_lossy()),
    }
}

pub fn init_logger(settings: &Settings, config_source: &str) -> anyhow::Result<()> {
    let filter = env_filter(settings.log_level.as_deref(), EnvFilter::DEFAULT_ENV)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("{config_source}");
    info!("Decoder limits: {:?}", settings.decoder);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        options: Options,
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "cbor",
            "--max-depth",
            "8",
            "--max-string-length",
            "100",
            "--no-indefinite",
            "--log-level",
            "debug",
        ]);
        let mut settings = Settings::default();
        cli.options.apply(&mut settings);

        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert_eq!(settings.decoder.max_nesting_depth, 8);
        assert_eq!(settings.decoder.max_string_length, Some(100));
        assert_eq!(settings.decoder.max_container_length, None);
        assert!(!settings.decoder.allow_indefinite_length);
        assert!(settings.decoder.allow_wide_negative);
        assert!(!settings.decoder.reject_duplicate_keys);
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.decoder, cbor_decoder::Config::default());
    }

    #[test]
    fn log_level_sources() {
        const VAR: &str = "CBOR_TOOLS_TEST_LOG";
        // Only this test reads or writes VAR
        unsafe { std::env::set_var(VAR, "trace") };

        let explicit = env_filter(Some("error"), VAR).unwrap();
        assert_eq!(explicit.max_level_hint(), Some(LevelFilter::ERROR));

        let from_env = env_filter(None, VAR).unwrap();
        assert_eq!(from_env.max_level_hint(), Some(LevelFilter::TRACE));

        let fallback = env_filter(None, "CBOR_TOOLS_TEST_UNSET_LOG").unwrap();
        assert_eq!(fallback.max_level_hint(), Some(LevelFilter::WARN));

        assert!(env_filter(Some("cbor=nonsense"), VAR).is_err());
    }
}
