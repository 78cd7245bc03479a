//! Recorded cook replay
//!
//! Reads the probe log the producer replays:
//!
//! ```text
//! Time (UTC),Channel1 Smoker Temp,Channel2 Food A Temp,Channel3 Food B Temp
//! 03/23/23 14:06:00,35,,
//! 03/23/23 14:06:30,35.9,temp not recorded,
//! ```
//!
//! Cells are passed through untouched. Empty cells and the not-recorded
//! sentinel become missing readings on the consumer side.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use pitwatch_core::ChannelId;

use crate::{ConnectorError, ConnectorResult};

const COLUMNS: usize = 4;

/// One row of the probe log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRow {
    /// Time column, as written
    pub timestamp: String,
    /// Smoker cell
    pub smoker: String,
    /// Food A cell
    pub food_a: String,
    /// Food B cell
    pub food_b: String,
}

impl ProducerRow {
    /// Raw cell for `channel`
    pub fn cell(&self, channel: ChannelId) -> &str {
        match channel {
            ChannelId::Smoker => &self.smoker,
            ChannelId::FoodA => &self.food_a,
            ChannelId::FoodB => &self.food_b,
        }
    }

    /// Message published on `channel`'s topic: `"<timestamp>,<cell>"`
    pub fn payload(&self, channel: ChannelId) -> String {
        format!("{},{}", self.timestamp, self.cell(channel))
    }
}

/// Every data row of a probe log, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvReplay {
    rows: Vec<ProducerRow>,
}

impl CsvReplay {
    /// Read a probe log from disk
    pub fn open(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a probe log already in memory
    pub fn parse(text: &str) -> ConnectorResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse from any buffered reader; the first non-blank line is the header
    pub fn from_reader<R: BufRead>(reader: R) -> ConnectorResult<Self> {
        let mut rows = Vec::new();
        let mut header_seen = false;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                continue;
            }

            if !header_seen {
                header_seen = true;
                log::info!("Skipping header row");
                continue;
            }

            rows.push(parse_row(index + 1, line)?);
        }

        Ok(Self { rows })
    }

    /// Data rows
    pub fn rows(&self) -> &[ProducerRow] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the log has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for CsvReplay {
    type Item = ProducerRow;
    type IntoIter = std::vec::IntoIter<ProducerRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

fn parse_row(line: usize, text: &str) -> ConnectorResult<ProducerRow> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();

    if fields.len() != COLUMNS {
        return Err(ConnectorError::Csv {
            line,
            reason: format!("expected {} columns, found {}", COLUMNS, fields.len()),
        });
    }

    Ok(ProducerRow {
        timestamp: fields[0].to_string(),
        smoker: fields[1].to_string(),
        food_a: fields[2].to_string(),
        food_b: fields[3].to_string(),
    })
}
