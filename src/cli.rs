// CLI definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use jarvis_satellite::{Config, SubprocessErrors};
use wyoming_transport::Uri;

#[derive(Parser, Debug)]
#[command(name = "jarvis_satellite")]
#[command(author, version, about = "LED event controller for the ReSpeaker XVF3800")]
pub struct Cli {
    /// Address to serve events on (unix:// or tcp://)
    #[arg(long)]
    pub uri: Uri,

    /// Log DEBUG messages
    #[arg(long)]
    pub debug: bool,

    /// Path to the XVF host executable
    #[arg(long, value_name = "PATH")]
    pub xvf_path: PathBuf,

    /// What to do when the XVF executable fails
    #[arg(long, value_enum, default_value_t = SubprocessErrorsArg::Log)]
    pub subprocess_errors: SubprocessErrorsArg,
}

/// Handling of failed XVF executable runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubprocessErrorsArg {
    /// Ignore silently
    Suppress,
    /// Log at debug level
    Log,
}

impl From<SubprocessErrorsArg> for SubprocessErrors {
    fn from(arg: SubprocessErrorsArg) -> Self {
        match arg {
            SubprocessErrorsArg::Suppress => SubprocessErrors::Suppress,
            SubprocessErrorsArg::Log => SubprocessErrors::Log,
        }
    }
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            uri: cli.uri.clone(),
            xvf_path: cli.xvf_path.clone(),
            subprocess_errors: cli.subprocess_errors.into(),
        }
    }
}
