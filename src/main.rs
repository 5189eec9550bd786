use anyhow::Result;
use clap::Parser;
use fwdbot_store::cli::{Cli, CommandRunner};
use fwdbot_store::{Config, Database};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::resolve(cli.redis_uri);
    let database = Database::connect(&config).await?;

    let runner = CommandRunner::new(database);
    let result = runner.run(&cli.command, &mut std::io::stdout()).await;
    runner.into_database().close();
    result
}
