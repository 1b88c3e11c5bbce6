pub mod demo_analysis;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DemoInfo {
    pub map: String,
    pub rounds: usize,
}

/// What a playback consumer gets to see, published on every change.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackStatus {
    pub current_index: usize,
    pub is_playing: bool,
    pub speed: f64,
}
