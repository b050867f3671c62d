use anyhow::Result;
use cdek_proxy::carrier::build_carrier;
use cdek_proxy::server;
use cdek_proxy::utils::config_loader::{self, ConfigOrigin};
use cdek_proxy::utils::logging;
use cdek_proxy::utils::logging::LogLevel;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "cdek-proxy.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read arguments
    // -------------------------------

    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, start logging
    // -------------------------------

    let (service_config, origin) = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);
    match origin {
        ConfigOrigin::File(path) => info!("config loaded from {}", path),
        ConfigOrigin::BuiltIn => info!("config file {} not found, using environment defaults", args.config),
    }

    // -------------------------------
    // 3. Select carrier: live API with token cache, or demo data
    // -------------------------------

    let carrier = build_carrier(&service_config)?;

    // -------------------------------
    // 4. Start http server
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, carrier).await
}
