//! Flat records as the replay decoder reports them.
//!
//! Field names follow the decoder's own naming, which is why a few of them are
//! renamed on the way in.

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundStartEvent {
    /// Round ordinal as reported by the game. Restarts at 1 after a knife round,
    /// so it is never used for numbering.
    #[serde(default)]
    pub round: i32,
    pub tick: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundEndEvent {
    pub tick: u32,
    #[serde(default)]
    pub winner: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InventorySnapshot {
    #[serde(rename = "steamid")]
    pub player_id: String,
    #[serde(default)]
    pub name: String,
    pub inventory: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerTickRecord {
    pub tick: u32,
    #[serde(rename = "steamid")]
    pub player_id: String,
    pub name: String,
    #[serde(rename = "X")]
    pub x: f32,
    #[serde(rename = "Y")]
    pub y: f32,
    pub yaw: f32,
    pub health: i32,
    pub is_alive: bool,
    #[serde(rename = "FIRE", default)]
    pub is_firing: bool,
    #[serde(default)]
    pub flash_duration: Option<f32>,
    #[serde(rename = "active_weapon_name", default)]
    pub active_weapon: Option<String>,
    pub team_num: i32,
    pub game_time: f32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GrenadeRecord {
    pub tick: u32,
    /// Entity id of the projectile, stable for the lifetime of one grenade.
    #[serde(rename = "entity_id")]
    pub grenade_id: i64,
    pub grenade_type: String,
    #[serde(rename = "name", default)]
    pub owner_name: String,
    pub x: f32,
    pub y: f32,
}
