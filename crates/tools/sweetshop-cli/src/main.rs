use anyhow::Result;
use clap::Parser;
use console::style;
use sweetshop_cli::{App, Cli, CliConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &CliConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.logging.format.to_lowercase().as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CliConfig::load()?;
    if let Some(server) = cli.server {
        config.server.url = server;
        config.validate()?;
    }

    init_tracing(&config);

    let app = App::from_config(&config)?;
    app.execute(cli.command).await
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", style("✗").red(), e);
        std::process::exit(1);
    }
}
