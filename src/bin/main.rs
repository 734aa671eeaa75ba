use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use user_directory::{Config, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    fmt().with_env_filter(filter).init();

    let config = Config::parse();
    server::run(config).await?;

    Ok(())
}
