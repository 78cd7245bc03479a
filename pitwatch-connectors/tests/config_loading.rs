//! Loading monitor configuration from disk

use std::io::Write;

use pitwatch_connectors::{ConnectorError, MonitorConfig};
use pitwatch_core::{ChannelId, PredicateKind};
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn load_full_file() {
    let file = write_config(
        r#"{
            "broker": { "host": "pit.local", "port": 8883, "client_id": "backyard" },
            "queues": { "smoker": "bbq/smoker" },
            "channels": {
                "smoker": { "window_size": 10, "predicate": "max_drop", "threshold": 20.0 },
                "food_b": null
            },
            "alerts": { "queue_capacity": 16, "publish_topic": "bbq/alerts" },
            "producer": { "csv_path": "cook.csv", "interval_secs": 1 }
        }"#,
    );

    let config = MonitorConfig::load(file.path()).unwrap();
    assert_eq!(config.broker.host, "pit.local");
    assert_eq!(config.broker.port, 8883);
    assert_eq!(config.broker.keep_alive_secs, 60);
    assert_eq!(config.queues.topic(ChannelId::Smoker), "bbq/smoker");
    assert_eq!(config.queues.topic(ChannelId::FoodA), "02-food-A");

    let smoker = config.channels.get(ChannelId::Smoker).unwrap();
    assert_eq!(smoker.window_size, 10);
    assert_eq!(smoker.predicate, PredicateKind::MaxDrop);
    assert!(config.channels.get(ChannelId::FoodB).is_none());

    assert_eq!(config.alerts.publish_topic.as_deref(), Some("bbq/alerts"));
    assert_eq!(config.producer.csv_path, "cook.csv");
}

#[test]
fn empty_object_is_stock() {
    let file = write_config("{}");
    assert_eq!(MonitorConfig::load(file.path()).unwrap(), MonitorConfig::default());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = MonitorConfig::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConnectorError::Io(_))));
}

#[test]
fn invalid_channel_rejected_on_load() {
    let file = write_config(
        r#"{ "channels": { "food_b": { "window_size": 1, "predicate": "stall", "threshold": 1.0 } } }"#,
    );
    assert!(matches!(
        MonitorConfig::load(file.path()),
        Err(ConnectorError::Monitor(_))
    ));
}

#[test]
fn round_trips_through_json() {
    let mut config = MonitorConfig::default();
    config.alerts.publish_topic = Some("bbq/alerts".into());

    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(MonitorConfig::from_json(&json).unwrap(), config);
}
