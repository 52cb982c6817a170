use clap::Parser;
use mathboardd::RelayConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mathboardd")]
#[command(about = "Relay normalized math steps over stdin/stdout", long_about = None)]
struct Args {
    /// Relay and engine configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };
    config.apply_env()?;
    log::info!(
        "mathboardd starting (step delay {} ms, fallback {:?})",
        config.step_delay_ms,
        config.engine.fallback
    );

    mathboardd::serve(config, tokio::io::stdin(), tokio::io::stdout()).await
}
