use common::demo_analysis::Round;

use crate::records::{InventorySnapshot, RoundEndEvent, RoundStartEvent};

/// Decoder fields needed to classify a knife round.
pub const INVENTORY_FIELDS: &[&str] = &["inventory"];

/// Access to player inventories at a given tick.
///
/// `Ok(None)` means the decoder has no sample for that tick, which is not an
/// error. Errors are reserved for the decoder failing to answer at all.
pub trait InventoryLookup {
    type Error;

    fn inventories_at(&self, tick: u32) -> Result<Option<Vec<InventorySnapshot>>, Self::Error>;
}

impl<T> InventoryLookup for &T
where
    T: InventoryLookup + ?Sized,
{
    type Error = T::Error;

    fn inventories_at(&self, tick: u32) -> Result<Option<Vec<InventorySnapshot>>, Self::Error> {
        (**self).inventories_at(tick)
    }
}

impl InventoryLookup for std::collections::HashMap<u32, Vec<InventorySnapshot>> {
    type Error = core::convert::Infallible;

    fn inventories_at(&self, tick: u32) -> Result<Option<Vec<InventorySnapshot>>, Self::Error> {
        Ok(self.get(&tick).cloned())
    }
}

/// A single inventory sample fetched ahead of time, see [`knife_probe_tick`].
#[derive(Debug, Clone, Default)]
pub struct ProbedInventories {
    pub tick: u32,
    pub sample: Option<Vec<InventorySnapshot>>,
}

impl InventoryLookup for ProbedInventories {
    type Error = core::convert::Infallible;

    fn inventories_at(&self, tick: u32) -> Result<Option<Vec<InventorySnapshot>>, Self::Error> {
        if tick != self.tick {
            return Ok(None);
        }

        Ok(self.sample.clone())
    }
}

/// The tick at which inventories have to be sampled to decide whether the
/// first round was a knife round.
///
/// Only the two earliest starts reporting round 1 are considered. Returns `None`
/// when there is nothing to classify.
pub fn knife_probe_tick(starts: &[RoundStartEvent]) -> Option<u32> {
    if starts.len() < 2 {
        return None;
    }

    let mut round_one_starts = starts.iter().filter(|start| start.round == 1);
    let first = round_one_starts.next()?;
    let second = round_one_starts.next()?;

    Some(((u64::from(first.tick) + u64::from(second.tick)) / 2) as u32)
}

/// Every player carries nothing but knives (or nothing at all).
///
/// An empty sample says nothing about the round, so it is not treated as one.
pub fn is_knife_round(inventories: &[InventorySnapshot]) -> bool {
    if inventories.is_empty() {
        return false;
    }

    inventories.iter().all(|player| {
        player
            .inventory
            .iter()
            .all(|item| item.to_lowercase().contains("knife"))
    })
}

/// Turns the raw round start/end events into the numbered list of played rounds.
///
/// The ordinal reported by the game is not trusted, rounds are numbered by
/// their position after a potential knife round has been skipped. A start that
/// lies before the previous round's end and an end that lies before its start
/// are skipped, pairing continues with the next event. Missing or inconsistent
/// data only ever shortens the result, the only error is the inventory lookup
/// failing.
#[tracing::instrument(skip_all, fields(starts = starts.len(), ends = ends.len()))]
pub fn segment_rounds<L>(
    starts: &[RoundStartEvent],
    ends: &[RoundEndEvent],
    inventories: &L,
) -> Result<Vec<Round>, L::Error>
where
    L: InventoryLookup + ?Sized,
{
    if starts.len() < 2 {
        tracing::debug!("Not enough round starts");
        return Ok(Vec::new());
    }

    let first_start_index = match knife_probe_tick(starts) {
        Some(probe_tick) => {
            let sample = inventories.inventories_at(probe_tick)?;
            let knife_round = sample.as_deref().map(is_knife_round).unwrap_or(false);
            tracing::debug!(probe_tick, knife_round, "Checked for knife round");

            if knife_round {
                starts
                    .iter()
                    .rposition(|start| start.round == 1)
                    .unwrap_or(0)
            } else {
                0
            }
        }
        None => 0,
    };

    let actual_starts = &starts[first_start_index..];
    let first_start = match actual_starts.first() {
        Some(s) => s,
        None => return Ok(Vec::new()),
    };

    let first_end_index = match ends.iter().position(|end| end.tick > first_start.tick) {
        Some(idx) => idx,
        None => {
            tracing::debug!(tick = first_start.tick, "No round end after first round start");
            return Ok(Vec::new());
        }
    };
    let actual_ends = &ends[first_end_index..];

    let mut rounds: Vec<Round> = Vec::with_capacity(actual_starts.len().min(actual_ends.len()));
    let mut ends_iter = actual_ends.iter();
    for start in actual_starts {
        if let Some(previous) = rounds.last() {
            if start.tick < previous.end_tick {
                tracing::warn!(
                    start = start.tick,
                    previous_end = previous.end_tick,
                    "Skipping overlapping round start"
                );
                continue;
            }
        }

        let end = loop {
            match ends_iter.next() {
                Some(end) if end.tick < start.tick => {
                    tracing::warn!(
                        start = start.tick,
                        end = end.tick,
                        "Skipping round end before round start"
                    );
                }
                other => break other,
            }
        };
        let end = match end {
            Some(e) => e,
            None => break,
        };

        rounds.push(Round {
            round_number: rounds.len() as u32 + 1,
            start_tick: start.tick,
            end_tick: end.tick,
            winner: end.winner.clone(),
            reason: end.reason.clone(),
        });
    }

    tracing::debug!(
        skipped_starts = first_start_index,
        skipped_ends = first_end_index,
        rounds = rounds.len(),
        "Segmented rounds"
    );

    Ok(rounds)
}
