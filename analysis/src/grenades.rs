use std::collections::HashMap;

use common::demo_analysis::GrenadeType;

use crate::records::GrenadeRecord;

/// Samples at the same position an HE grenade may keep before the rest of the
/// run is dropped.
pub const STUCK_RUN_LIMIT: usize = 3;

pub static GRENADE_TYPES: phf::Map<&'static str, GrenadeType> = phf::phf_map! {
    "smoke" => GrenadeType::Smoke,
    "smokegrenade" => GrenadeType::Smoke,
    "flashbang" => GrenadeType::Flashbang,
    "he" => GrenadeType::He,
    "he_grenade" => GrenadeType::He,
    "hegrenade" => GrenadeType::He,
    "incendiary" => GrenadeType::Incendiary,
    "incgrenade" => GrenadeType::Incendiary,
    "molotov" => GrenadeType::Molotov,
    "decoy" => GrenadeType::Decoy,
    "decoygrenade" => GrenadeType::Decoy,
};

pub fn grenade_type(name: &str) -> Option<GrenadeType> {
    GRENADE_TYPES.get(name).copied()
}

/// Drops the samples of HE grenades that sit still.
///
/// Each grenade is tracked by its id, and once it reported the same position
/// more than [`STUCK_RUN_LIMIT`] times in a row, further samples are dropped
/// until it moves again. Other grenade types are kept as they are. The
/// surviving samples keep their original order.
pub fn filter_stuck(events: &[GrenadeRecord]) -> Vec<GrenadeRecord> {
    let mut per_grenade: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        per_grenade.entry(event.grenade_id).or_default().push(idx);
    }

    let mut keep = vec![true; events.len()];
    for (grenade_id, mut indices) in per_grenade {
        let is_he = indices
            .first()
            .and_then(|idx| grenade_type(&events[*idx].grenade_type))
            .map(|kind| kind == GrenadeType::He)
            .unwrap_or(false);
        if !is_he {
            continue;
        }

        indices.sort_by_key(|idx| events[*idx].tick);

        let mut run = 0;
        let mut last_position: Option<(f32, f32)> = None;
        let mut dropped = 0;
        for idx in indices {
            let position = (events[idx].x, events[idx].y);
            if last_position == Some(position) {
                run += 1;
            } else {
                run = 1;
            }
            last_position = Some(position);

            if run > STUCK_RUN_LIMIT {
                keep[idx] = false;
                dropped += 1;
            }
        }

        if dropped > 0 {
            tracing::trace!(grenade_id, dropped, "Dropped stuck grenade samples");
        }
    }

    events
        .iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .map(|(event, _)| event.clone())
        .collect()
}
