#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub start_tick: u32,
    pub end_tick: u32,
    pub winner: String,
    pub reason: String,
}

/// Position in world units, or in canvas units once mapped for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub position: Position,
    /// Facing direction in degrees
    pub yaw: f32,
    pub health: u8,
    pub is_alive: bool,
    pub is_firing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_weapon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrenadeType {
    Smoke,
    Flashbang,
    He,
    Incendiary,
    Molotov,
    Decoy,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NadeState {
    pub grenade_type: GrenadeType,
    pub owner_name: String,
    pub position: Position,
}

/// Everything visible at a single tick of a round.
///
/// `team_a` holds the counter-terrorists, `team_b` the terrorists.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TickState {
    pub tick: u32,
    pub game_time: f32,
    pub team_a: Vec<PlayerState>,
    pub team_b: Vec<PlayerState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nade_events: Option<Vec<NadeState>>,
}
