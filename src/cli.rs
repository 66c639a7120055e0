//! Command-line interface for tilefont.
//!
//! Flags mirror the classic tile server launcher so existing deployment
//! scripts keep working (`-c`, `-b`, `-p`, `-C`, `-V`, `-s`, `-l`).

use clap::{ArgAction, Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use tilefont_config::defaults::CONFIG_FILE_NAME;

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 8080;

/// tilefont - glyph server for vector map styles
#[derive(Parser, Debug)]
#[command(name = "tilefont")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (.json, .yaml or .yml)
    #[arg(short, long, value_name = "FILE", default_value = CONFIG_FILE_NAME, global = true)]
    pub config: PathBuf,

    /// Bind address
    #[arg(short, long, env = "BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Disable Cross-origin resource sharing headers
    #[arg(short = 'C', long)]
    pub no_cors: bool,

    /// More verbose output
    #[arg(short = 'V', long, conflicts_with = "silent")]
    pub verbose: bool,

    /// Less verbose output (successful requests are not logged)
    #[arg(short, long)]
    pub silent: bool,

    /// Append log output to this file instead of stderr
    #[arg(short, long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Reload the configuration when the file changes on disk
    #[arg(short, long)]
    pub watch: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration and list the fonts it would serve
    Check,
}

/// Runtime options passed from CLI to the server
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    pub config_path: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    pub cors: bool,
    pub verbose: bool,
    pub silent: bool,
    pub log_file: Option<PathBuf>,
    pub watch: bool,
}

/// Result of CLI processing
pub enum CliResult {
    /// Start the glyph server
    Serve(RuntimeOptions),
    /// Validate the configuration and exit
    Check(RuntimeOptions),
}

impl From<Cli> for RuntimeOptions {
    fn from(cli: Cli) -> Self {
        Self {
            config_path: cli.config,
            bind: cli.bind,
            port: cli.port,
            cors: !cli.no_cors,
            verbose: cli.verbose,
            silent: cli.silent,
            log_file: cli.log_file,
            watch: cli.watch,
        }
    }
}

/// Process CLI arguments
pub fn process_cli() -> CliResult {
    from_cli(Cli::parse())
}

fn from_cli(mut cli: Cli) -> CliResult {
    match cli.command.take() {
        Some(Commands::Check) => CliResult::Check(cli.into()),
        None => CliResult::Serve(cli.into()),
    }
}
