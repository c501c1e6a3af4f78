//! sagw - find South Australian groundwater wells and chart their data.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sagw",
    version,
    about = "SA Groundwater Data toolkit"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the Groundwater Data services
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: sagw_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = sagw_cmd::Config::load(cli.config.as_deref())?.with_endpoint(cli.endpoint);
    log::debug!("Using endpoint {}", config.endpoint);
    sagw_cmd::run(cli.command, config).await
}
