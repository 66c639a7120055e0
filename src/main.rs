use anyhow::Result;
use std::time::Duration;
use tilefont::cli;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let (options, check_only) = match cli::process_cli() {
        cli::CliResult::Serve(options) => (options, false),
        cli::CliResult::Check(options) => (options, true),
    };

    tilefont::logging::init_logging(options.verbose, options.log_file.as_deref())?;
    log::info!("Starting tilefont {}", tilefont::VERSION);

    let runtime = Runtime::new()?;
    let result = runtime.block_on(async move {
        if check_only {
            tilefont::check(options).await
        } else {
            tilefont::run(options).await
        }
    });

    // Don't let a hung background task keep the process alive.
    runtime.shutdown_timeout(Duration::from_secs(2));

    if let Err(ref e) = result {
        eprintln!("tilefont: error: {e:#}");
    }
    result
}
