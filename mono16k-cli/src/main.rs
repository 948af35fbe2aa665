//! mono16k
//!
//! Decodes the first audio stream of any media file to 16 kHz mono and
//! encodes such audio back into a container, using the mono16k library.

mod commands;
mod config;
mod config_file;
mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{CliConfig, LogFormat};
use crate::error::{CliError, Result};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "mono16k";

/// Decode audio to 16 kHz mono and encode it back.
#[derive(Parser, Debug)]
#[command(name = "mono16k")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, default_value = "mono16k.toml")]
    config: PathBuf,

    /// Log output format, overriding the configuration file
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode the first audio stream of a file
    Decode {
        input: PathBuf,

        /// Also write the decoded samples here (container from extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a file and re-encode it
    Transcode {
        input: PathBuf,
        output: PathBuf,

        /// Samples per write
        #[arg(short, long)]
        batch: Option<usize>,
    },

    /// Describe a file's container and streams as JSON
    Probe { input: PathBuf },

    /// Print a configuration file with every default filled in
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, warning) = config_file::load_or_default(&cli.config);
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    init_logging(&config);
    if let Some(warning) = warning {
        tracing::warn!("{}", warning);
    }

    tracing::debug!("{} v{} starting", APP_NAME, VERSION);
    tracing::debug!("FFmpeg version: {}", mono16k::ffmpeg_version_info());
    tracing::debug!("Configuration loaded: {:?}", config);

    mono16k::init().map_err(|e| CliError::Library(e.into()))?;
    mono16k::install_log_filter();

    let result = match &cli.command {
        Command::Decode { input, output } => commands::decode(&config, input, output.as_deref()),
        Command::Transcode {
            input,
            output,
            batch,
        } => commands::transcode(&config, input, output, *batch),
        Command::Probe { input } => commands::probe(input),
        Command::DefaultConfig => config_file::ConfigFile::default_config()
            .to_toml()
            .map(|toml| print!("{}", toml)),
    };

    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result
}

/// Initialize logging with tracing
fn init_logging(config: &CliConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.filter_directive().into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transcode() {
        let cli = Cli::parse_from([
            "mono16k",
            "--log-format",
            "json",
            "transcode",
            "in.mkv",
            "out.wav",
            "--batch",
            "1234",
        ]);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.config, PathBuf::from("mono16k.toml"));
        match cli.command {
            Command::Transcode { batch, output, .. } => {
                assert_eq!(batch, Some(1234));
                assert_eq!(output, PathBuf::from("out.wav"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_decode_with_output() {
        let cli = Cli::parse_from(["mono16k", "decode", "in.mp3", "-o", "out.flac"]);
        match cli.command {
            Command::Decode { output, .. } => assert_eq!(output, Some(PathBuf::from("out.flac"))),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
