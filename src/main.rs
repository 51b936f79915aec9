use clap::Parser;
use vectorsearch::cli::Cli;
use vectorsearch::logging::{self, LoggingConfig};

fn main() -> anyhow::Result<()> {
    // Held until exit so buffered file logs are flushed.
    let _guard = logging::init_logging(LoggingConfig::from_env())?;

    let cli = Cli::parse();
    cli.run()
}
