//! Command-line interface for the voice-loop shell.
//!
//! Handles argument parsing, configuration loading and logging setup.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use voice_loop_core::LoopConfiguration;

/// voice-loop - record from the preferred input, then play it straight back
#[derive(Parser, Debug)]
#[command(name = "voice-loop")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to keep the capture file (overrides the configuration)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the available input routes and exit
    #[arg(long)]
    pub list_inputs: bool,

    /// Increase logging verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    /// Build the loop configuration from the config file, the documents
    /// directory default and the `--output` override, in that order.
    pub fn configuration(&self) -> Result<LoopConfiguration, String> {
        let mut config = match &self.config {
            Some(path) => LoopConfiguration::from_json_file(path)?,
            None => LoopConfiguration {
                recording_path: default_recording_path(),
                ..Default::default()
            },
        };
        if let Some(output) = &self.output {
            config.recording_path = output.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn default_recording_path() -> PathBuf {
    dirs_next::document_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("voice-loop")
        .join("recording.wav")
}

/// Initialize the logging system based on CLI arguments.
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Keep audio host crates quiet unless asked.
    builder.filter_level(LevelFilter::Warn);
    builder.filter_module("voice_loop", args.log_level());
    builder.filter_module("voice_loop_core", args.log_level());
    builder.filter_module("voice_loop_cpal", args.log_level());

    builder.format_timestamp_millis().init();
}
