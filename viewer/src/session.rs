use std::collections::HashMap;
use std::sync::Arc;

use analysis::{Round, TickState};

use crate::source::{Header, ReplaySource, SourceError};

/// One loaded replay.
///
/// Rounds are segmented once on load, timelines are built on first request and
/// shared from then on.
pub struct Session {
    source: Arc<dyn ReplaySource>,
    header: Header,
    rounds: Arc<[Round]>,
    timelines: tokio::sync::Mutex<HashMap<u32, Arc<[TickState]>>>,
}

impl Session {
    #[tracing::instrument(name = "Session", skip(source))]
    pub async fn load(source: Arc<dyn ReplaySource>) -> Result<Self, SourceError> {
        let header = source.header().await?;
        tracing::info!(map = %header.map_name, "Loading session");

        let rounds = crate::loader::load_rounds(source.as_ref()).await?;

        Ok(Self {
            source,
            header,
            rounds: rounds.into(),
            timelines: tokio::sync::Mutex::new(HashMap::new()),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rounds(&self) -> Arc<[Round]> {
        self.rounds.clone()
    }

    pub fn info(&self) -> common::DemoInfo {
        common::DemoInfo {
            map: self.header.map_name.clone(),
            rounds: self.rounds.len(),
        }
    }

    /// The timeline of the given round, `None` if there is no such round.
    pub async fn timeline(&self, round_number: u32) -> Result<Option<Arc<[TickState]>>, SourceError> {
        let round = match self.rounds.iter().find(|r| r.round_number == round_number) {
            Some(r) => r,
            None => return Ok(None),
        };

        let mut timelines = self.timelines.lock().await;
        if let Some(timeline) = timelines.get(&round_number) {
            return Ok(Some(timeline.clone()));
        }

        let timeline: Arc<[TickState]> = crate::loader::load_timeline(self.source.as_ref(), round)
            .await?
            .into();
        timelines.insert(round_number, timeline.clone());

        Ok(Some(timeline))
    }
}
