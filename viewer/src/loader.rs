use analysis::records::{GrenadeRecord, InventorySnapshot, PlayerTickRecord, RoundEndEvent, RoundStartEvent};
use analysis::rounds::{self, ProbedInventories};
use analysis::timeline;
use analysis::{Round, TickState};

use crate::source::{Record, ReplaySource, SourceError};

pub const ROUND_START: &str = "round_start";
pub const ROUND_END: &str = "round_end";

fn decode<T>(what: &'static str, records: Vec<Record>) -> Result<Vec<T>, SourceError>
where
    T: serde::de::DeserializeOwned,
{
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(serde_json::Value::Object(record))
                .map_err(|source| SourceError::Decode { what, source })
        })
        .collect()
}

/// Fetches the round events from the replay and turns them into numbered rounds.
#[tracing::instrument(skip(source))]
pub async fn load_rounds(source: &dyn ReplaySource) -> Result<Vec<Round>, SourceError> {
    let starts: Vec<RoundStartEvent> = decode("round start", source.events(ROUND_START).await?)?;
    let ends: Vec<RoundEndEvent> = decode("round end", source.events(ROUND_END).await?)?;

    let probe = match rounds::knife_probe_tick(&starts) {
        Some(tick) => ProbedInventories {
            tick,
            sample: probe_inventories(source, tick).await?,
        },
        None => ProbedInventories::default(),
    };

    let rounds = rounds::segment_rounds(&starts, &ends, &probe).unwrap_or_else(|never| match never {});

    tracing::info!(rounds = rounds.len(), "Loaded rounds");

    Ok(rounds)
}

/// A sample that can not be decoded counts as missing, which keeps the round.
async fn probe_inventories(
    source: &dyn ReplaySource,
    tick: u32,
) -> Result<Option<Vec<InventorySnapshot>>, SourceError> {
    let records = source.fields_at_ticks(rounds::INVENTORY_FIELDS, &[tick]).await?;

    match decode::<InventorySnapshot>("inventory", records) {
        Ok(sample) if sample.is_empty() => Ok(None),
        Ok(sample) => Ok(Some(sample)),
        Err(e) => {
            tracing::warn!(tick, "Unusable inventory sample: {}", e);
            Ok(None)
        }
    }
}

/// Fetches the player and grenade data of a single round and builds its timeline.
#[tracing::instrument(skip(source, round), fields(round = round.round_number))]
pub async fn load_timeline(source: &dyn ReplaySource, round: &Round) -> Result<Vec<TickState>, SourceError> {
    let ticks = timeline::round_ticks(round);

    let players: Vec<PlayerTickRecord> = decode(
        "player ticks",
        source.fields_at_ticks(timeline::PLAYER_FIELDS, &ticks).await?,
    )?;
    let grenades: Vec<GrenadeRecord> = decode("grenades", source.grenades().await?)?;

    Ok(timeline::build_timeline(round, &players, &grenades))
}
