//! Replays a recorded cook onto the broker, one row every interval

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pitwatch_connectors::{CsvReplay, MonitorConfig, MqttProducer};

#[derive(Parser)]
#[command(name = "pitwatch-producer")]
#[command(about = "Publish smoker and food probe readings from a CSV log", long_about = None)]
struct Cli {
    /// JSON config file; stock settings when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV file to replay (overrides producer.csv_path)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Seconds between rows (overrides producer.interval_secs)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Broker host
    #[arg(long)]
    host: Option<String>,

    /// Broker port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };
    if let Some(host) = cli.host {
        config.broker.host = host;
    }
    if let Some(port) = cli.port {
        config.broker.port = port;
    }
    if let Some(interval) = cli.interval {
        config.producer.interval_secs = interval;
    }
    if let Some(csv) = cli.csv {
        config.producer.csv_path = csv.display().to_string();
    }
    config.validate()?;

    let replay = CsvReplay::open(&config.producer.csv_path)
        .with_context(|| format!("reading {}", config.producer.csv_path))?;
    log::info!("Replaying {} rows from {}", replay.len(), config.producer.csv_path);

    let producer = MqttProducer::connect(&config);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Cannot listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let sent = producer.replay(replay, shutdown).await?;
    log::info!("Published {} rows", sent);
    producer.disconnect().await?;

    Ok(())
}
