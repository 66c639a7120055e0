//! Logger setup.
//!
//! `RUST_LOG` wins when set. Otherwise `--verbose` enables debug output for
//! the tilefont crates and everything else logs at info. Access lines use the
//! [`ACCESS_TARGET`] target so they can be filtered on their own
//! (`RUST_LOG=info,access=off`).

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

/// Log target for per-request access lines.
pub const ACCESS_TARGET: &str = "access";

/// Default filter for the given verbosity.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,tilefont=debug,tilefont_glyphs=debug,tilefont_config=debug"
    } else {
        "info"
    }
}

/// Install the global logger.
///
/// # Errors
/// Fails if `log_file` cannot be opened for appending.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter(verbose)));
    builder.format_timestamp_millis();

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }

    // A logger may already be installed (tests, embedding); keep it.
    let _ = builder.try_init();
    Ok(())
}
