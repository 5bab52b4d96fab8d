use std::io;

use tracing_subscriber::EnvFilter;
use winedb::config::ShellConfig;
use winedb::shell::Shell;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create logger
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = ShellConfig::default();
    tracing::debug!(data = %config.data_path.display(), "starting shell");

    let stdin = io::stdin();
    let mut shell = Shell::start(config, stdin.lock(), io::stdout());
    shell.run()?;
    Ok(())
}
