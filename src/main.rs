use airborne_schema::cli::Cli;
use airborne_schema::commands;
use airborne_schema::config::Settings;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    // Logs go to stderr so command output on stdout stays pipeable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (file, env vars, CLI flags)
    let settings = Settings::new_with_cli(&cli)?;
    init_tracing(&settings.logging.level);
    debug!("Using configuration file {}", cli.config.display());

    if cli.command.is_remote() {
        settings.validate_remote()?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(&cli.command, &settings, &mut out).await
}
