//! Each rejected delivery is reported once
//!
//! Runs as its own binary because it installs the global logger.

use std::sync::Mutex;

use log::{Level, Log, Metadata, Record};
use pitwatch_connectors::{Ingestor, MonitorConfig};
use pitwatch_core::{ChannelId, MonitorError};

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

fn take_errors() -> Vec<String> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .drain(..)
        .filter(|(level, _)| *level == Level::Error)
        .map(|(_, message)| message)
        .collect()
}

#[test]
fn rejections_logged_once() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(log::LevelFilter::Trace);

    let mut config = MonitorConfig::default();
    config.channels = config.channels.without(ChannelId::FoodA);
    let ingestor = Ingestor::new(&config).unwrap();

    // Topic is known but its channel is not monitored
    assert!(matches!(
        ingestor.ingest("02-food-A", b"03/23/23 14:06:00,150"),
        Err(MonitorError::UnknownChannel { .. })
    ));
    let errors = take_errors();
    assert_eq!(errors.len(), 1, "{:?}", errors);

    // Topic no channel reads
    assert!(matches!(
        ingestor.ingest("04-food-C", b"03/23/23 14:06:00,150"),
        Err(MonitorError::UnknownChannel { .. })
    ));
    let errors = take_errors();
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("04-food-C"));

    // Malformed payload on a monitored channel
    assert!(matches!(
        ingestor.ingest("01-smoker", b"no separator"),
        Err(MonitorError::MalformedPayload { .. })
    ));
    assert_eq!(take_errors().len(), 1);

    // Good readings log nothing at error level
    let _ = ingestor.ingest("01-smoker", b"03/23/23 14:06:00,225").unwrap();
    assert!(take_errors().is_empty());
}
