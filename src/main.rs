use clap::Parser;
use tracing_subscriber::EnvFilter;

use geopin::interfaces::cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geopin=info")),
        )
        .init();

    let cli = cli::Cli::parse();
    if let Err(err) = cli::run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
