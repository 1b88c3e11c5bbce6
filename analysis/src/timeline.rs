use std::collections::BTreeMap;

use common::demo_analysis::{NadeState, PlayerState, Position, Round, TickState};

use crate::grenades;
use crate::records::{GrenadeRecord, PlayerTickRecord};

/// Decoder fields needed per player and tick to build a timeline.
pub const PLAYER_FIELDS: &[&str] = &[
    "X",
    "Y",
    "yaw",
    "health",
    "is_alive",
    "FIRE",
    "flash_duration",
    "active_weapon_name",
    "team_num",
    "game_time",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    /// Counter-Terrorists
    A,
    /// Terrorists
    B,
}

impl TeamSide {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            3 => Some(Self::A),
            2 => Some(Self::B),
            _ => None,
        }
    }
}

/// Every tick of the round, in the form the decoder has to be queried with.
pub fn round_ticks(round: &Round) -> Vec<u32> {
    (round.start_tick..=round.end_tick).collect()
}

/// Groups the flat per player records of a round into one [`TickState`] per tick.
///
/// Ticks without any player record are skipped, nothing is interpolated.
/// Players whose team code is neither side (spectators, unassigned) are left
/// out entirely.
#[tracing::instrument(skip_all, fields(round = round.round_number))]
pub fn build_timeline(
    round: &Round,
    ticks: &[PlayerTickRecord],
    grenades: &[GrenadeRecord],
) -> Vec<TickState> {
    let in_round = |tick: u32| tick >= round.start_tick && tick <= round.end_tick;

    let mut players_by_tick: BTreeMap<u32, Vec<&PlayerTickRecord>> = BTreeMap::new();
    for record in ticks.iter().filter(|r| in_round(r.tick)) {
        players_by_tick.entry(record.tick).or_default().push(record);
    }

    let round_grenades: Vec<GrenadeRecord> = grenades
        .iter()
        .filter(|g| in_round(g.tick))
        .cloned()
        .collect();
    let mut nades_by_tick: BTreeMap<u32, Vec<NadeState>> = BTreeMap::new();
    for grenade in grenades::filter_stuck(&round_grenades) {
        let grenade_type = match grenades::grenade_type(&grenade.grenade_type) {
            Some(t) => t,
            None => {
                tracing::trace!(name = %grenade.grenade_type, "Unknown grenade type");
                continue;
            }
        };

        nades_by_tick.entry(grenade.tick).or_default().push(NadeState {
            grenade_type,
            owner_name: grenade.owner_name,
            position: Position {
                x: grenade.x,
                y: grenade.y,
            },
        });
    }

    let timeline: Vec<TickState> = players_by_tick
        .into_iter()
        .map(|(tick, players)| {
            let game_time = players.first().map(|p| p.game_time).unwrap_or_default();

            let mut team_a = Vec::new();
            let mut team_b = Vec::new();
            for player in players {
                match TeamSide::from_code(player.team_num) {
                    Some(TeamSide::A) => team_a.push(player_state(player)),
                    Some(TeamSide::B) => team_b.push(player_state(player)),
                    None => {
                        tracing::trace!(tick, name = %player.name, code = player.team_num, "Player without side");
                    }
                };
            }

            TickState {
                tick,
                game_time,
                team_a,
                team_b,
                nade_events: nades_by_tick.remove(&tick),
            }
        })
        .collect();

    tracing::debug!(ticks = timeline.len(), "Built timeline");

    timeline
}

fn player_state(record: &PlayerTickRecord) -> PlayerState {
    PlayerState {
        name: record.name.clone(),
        position: Position {
            x: record.x,
            y: record.y,
        },
        yaw: record.yaw,
        health: record.health.clamp(0, 100) as u8,
        is_alive: record.is_alive,
        is_firing: record.is_firing,
        flash_duration: record.flash_duration.filter(|d| *d > 0.0),
        active_weapon: record.active_weapon.clone(),
    }
}
