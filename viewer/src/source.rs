//! Access to the replay decoder.
//!
//! The decoder itself lives outside of this crate, everything in here only
//! talks to it through [`ReplaySource`].

use std::collections::{HashMap, HashSet};

/// One flat record as produced by the decoder.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Keys every per player record carries next to the requested fields.
const PLAYER_KEYS: &[&str] = &["tick", "steamid", "name"];

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Header {
    pub map_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("tick {tick} is past the end of the replay ({last:?})")]
    TickOutOfRange { tick: u32, last: Option<u32> },
    #[error("decoding {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("reading replay dump: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing replay dump: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait ReplaySource: Send + Sync {
    async fn header(&self) -> Result<Header, SourceError>;

    /// All events of the given kind, ordered by tick.
    async fn events(&self, name: &str) -> Result<Vec<Record>, SourceError>;

    /// The requested fields for every player at each of the given ticks.
    ///
    /// Every record also carries `tick`, `steamid` and `name`.
    async fn fields_at_ticks(&self, fields: &[&str], ticks: &[u32]) -> Result<Vec<Record>, SourceError>;

    async fn grenades(&self) -> Result<Vec<Record>, SourceError>;
}

/// Everything the decoder produced for one replay, dumped as JSON.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReplayDump {
    pub header: Header,
    #[serde(default)]
    pub events: HashMap<String, Vec<Record>>,
    /// Per player and tick records holding every field the decoder knows.
    #[serde(default)]
    pub ticks: Vec<Record>,
    #[serde(default)]
    pub grenades: Vec<Record>,
}

/// A [`ReplaySource`] answering from a [`ReplayDump`].
#[derive(Debug)]
pub struct DumpSource {
    dump: ReplayDump,
    last_tick: Option<u32>,
}

pub fn record_tick(record: &Record) -> Option<u32> {
    record
        .get("tick")
        .and_then(serde_json::Value::as_u64)
        .and_then(|t| u32::try_from(t).ok())
}

impl DumpSource {
    /// The last tick of the replay is the latest tick seen in any record, a
    /// dump without per tick samples still covers its events and grenades.
    pub fn new(dump: ReplayDump) -> Self {
        let last_tick = dump
            .ticks
            .iter()
            .chain(dump.grenades.iter())
            .chain(dump.events.values().flatten())
            .filter_map(record_tick)
            .max();

        Self { dump, last_tick }
    }

    #[tracing::instrument]
    pub async fn open(path: &std::path::Path) -> Result<Self, SourceError> {
        let raw = tokio::fs::read(path).await?;
        let dump: ReplayDump = serde_json::from_slice(&raw)?;

        tracing::info!(
            map = %dump.header.map_name,
            records = dump.ticks.len(),
            grenades = dump.grenades.len(),
            "Loaded replay dump"
        );

        Ok(Self::new(dump))
    }
}

#[async_trait::async_trait]
impl ReplaySource for DumpSource {
    async fn header(&self) -> Result<Header, SourceError> {
        Ok(self.dump.header.clone())
    }

    async fn events(&self, name: &str) -> Result<Vec<Record>, SourceError> {
        Ok(self.dump.events.get(name).cloned().unwrap_or_default())
    }

    async fn fields_at_ticks(&self, fields: &[&str], ticks: &[u32]) -> Result<Vec<Record>, SourceError> {
        if let Some(tick) = ticks.iter().copied().max() {
            if self.last_tick.map(|last| tick > last).unwrap_or(true) {
                return Err(SourceError::TickOutOfRange {
                    tick,
                    last: self.last_tick,
                });
            }
        }

        let wanted: HashSet<u32> = ticks.iter().copied().collect();

        Ok(self
            .dump
            .ticks
            .iter()
            .filter(|record| record_tick(record).map(|t| wanted.contains(&t)).unwrap_or(false))
            .map(|record| {
                record
                    .iter()
                    .filter(|(key, _)| {
                        PLAYER_KEYS.contains(&key.as_str()) || fields.contains(&key.as_str())
                    })
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .collect())
    }

    async fn grenades(&self) -> Result<Vec<Record>, SourceError> {
        Ok(self.dump.grenades.clone())
    }
}
