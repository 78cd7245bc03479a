//! Ingestor and dispatcher working together without a broker

use pitwatch_connectors::{AlertDispatcher, CollectingSink, Ingestor, MonitorConfig};
use pitwatch_core::{ChannelId, MonitorError};

fn deliver(ingestor: &Ingestor, topic: &str, temps: &[&str]) {
    for (i, temp) in temps.iter().enumerate() {
        let payload = format!("03/23/23 14:{:02}:00,{}", i, temp);
        let _ = ingestor.ingest(topic, payload.as_bytes());
    }
}

#[tokio::test]
async fn alerts_reach_the_sink() {
    let sink = CollectingSink::new();
    let (dispatcher, handle) = AlertDispatcher::spawn(sink.clone(), 8);
    let ingestor = Ingestor::new(&MonitorConfig::default())
        .unwrap()
        .with_dispatcher(dispatcher);

    deliver(&ingestor, "01-smoker", &["100", "98", "90", "84", "83"]);
    deliver(&ingestor, "03-food-B", &["165"; 20]);
    drop(ingestor);

    let stats = handle.await.unwrap();
    assert_eq!(stats.delivered, 2);

    let channels: Vec<ChannelId> = sink.alerts().iter().map(|a| a.channel).collect();
    assert_eq!(channels, vec![ChannelId::Smoker, ChannelId::FoodB]);
}

#[tokio::test]
async fn bad_deliveries_do_not_disturb_windows() {
    let sink = CollectingSink::new();
    let (dispatcher, handle) = AlertDispatcher::spawn(sink.clone(), 8);
    let ingestor = Ingestor::new(&MonitorConfig::default())
        .unwrap()
        .with_dispatcher(dispatcher);

    deliver(&ingestor, "01-smoker", &["100", "98"]);

    assert!(matches!(
        ingestor.ingest("01-smoker", b"no separator"),
        Err(MonitorError::MalformedPayload { .. })
    ));
    assert!(matches!(
        ingestor.ingest("01-smoker", b"t,warm"),
        Err(MonitorError::MalformedPayload { .. })
    ));
    assert!(matches!(
        ingestor.ingest("99-unknown", b"t,100"),
        Err(MonitorError::UnknownChannel { .. })
    ));
    assert!(ingestor.ingest("01-smoker", b"t,temp not recorded").unwrap().is_none());

    let snapshot = ingestor.manager().snapshot(ChannelId::Smoker).unwrap();
    assert_eq!(snapshot.as_slice(), &[100.0, 98.0]);

    deliver(&ingestor, "01-smoker", &["90", "84", "83"]);
    drop(ingestor);

    handle.await.unwrap();
    assert_eq!(sink.len(), 1);
}

#[test]
fn custom_topics_route_to_channels() {
    let config = MonitorConfig::from_json(
        r#"{ "queues": { "smoker": "pit/smoker", "food_a": "pit/brisket", "food_b": "pit/butt" } }"#,
    )
    .unwrap();
    let ingestor = Ingestor::new(&config).unwrap();

    assert_eq!(ingestor.channel_for("pit/brisket").unwrap(), ChannelId::FoodA);
    assert!(ingestor.channel_for("02-food-A").is_err());

    let mut alerts = 0;
    for temp in ["150", "151", "152", "153", "154", "155", "156", "157", "158", "159"]
        .iter()
        .chain(["160"; 9].iter())
        .chain(["158.5"].iter())
    {
        let payload = format!("t,{}", temp);
        if ingestor.ingest("pit/brisket", payload.as_bytes()).unwrap().is_some() {
            alerts += 1;
        }
    }
    assert_eq!(alerts, 1);
}

#[test]
fn disabled_channel_topic_is_rejected() {
    let config = MonitorConfig::from_json(r#"{ "channels": { "food_a": null } }"#).unwrap();
    let ingestor = Ingestor::new(&config).unwrap();

    assert!(matches!(
        ingestor.ingest("02-food-A", b"t,150"),
        Err(MonitorError::UnknownChannel { .. })
    ));
    assert_eq!(ingestor.topics().count(), 2);
}
