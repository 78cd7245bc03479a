//! Consumes probe readings from the broker and raises trend alerts

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pitwatch_connectors::{
    AlertDispatcher, ConnectorError, Ingestor, LogAlertSink, MonitorConfig, MqttAlertSink,
    MqttConsumer,
};

#[derive(Parser)]
#[command(name = "pitwatch-monitor")]
#[command(about = "Watch smoker and food probe temperatures for trend alerts", long_about = None)]
struct Cli {
    /// JSON config file; stock settings when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker host
    #[arg(long)]
    host: Option<String>,

    /// Broker port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, info otherwise
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
    config.validate()?;

    let ingestor = Ingestor::new(&config).map_err(ConnectorError::from)?;
    let consumer = MqttConsumer::new(&config, ingestor);

    // Alerts published to the broker ride on the consumer's own connection
    let (dispatcher, sink_task) = match &config.alerts.publish_topic {
        Some(topic) => AlertDispatcher::spawn(
            MqttAlertSink::new(consumer.client(), topic.clone()),
            config.alerts.queue_capacity,
        ),
        None => AlertDispatcher::spawn(LogAlertSink, config.alerts.queue_capacity),
    };
    let consumer = consumer.with_dispatcher(dispatcher);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Cannot listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let ingestor = consumer.run(shutdown).await?;
    ingestor.log_stats();
    drop(ingestor);

    let stats = sink_task.await.context("alert sink task")?;
    log::info!(
        "Alert sink closed: {} delivered, {} failed, {} dropped",
        stats.delivered,
        stats.failed,
        stats.dropped
    );

    Ok(())
}
