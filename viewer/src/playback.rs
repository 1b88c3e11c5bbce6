use std::time::Duration;

use common::PlaybackStatus;

pub mod driver;

/// Playback steps per second at normal speed.
pub const BASE_RATE: f64 = 60.0;

// Absorbs the rounding of float durations so that splitting the same elapsed
// time into more calls never loses a step.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub initial_index: usize,
    pub speed: f64,
    pub base_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_index: 0,
            speed: 1.0,
            base_rate: BASE_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("playback speed has to be a positive number, got {0}")]
    InvalidSpeed(f64),
    #[error("playback rate has to be a positive number, got {0}")]
    InvalidRate(f64),
    #[error("playback has already been stopped")]
    Closed,
}

pub fn validate_speed(speed: f64) -> Result<f64, PlaybackError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(PlaybackError::InvalidSpeed(speed));
    }

    Ok(speed)
}

/// Moves an index through a timeline as wall-clock time passes.
///
/// One step is one entry of the timeline, no matter how many game ticks lie
/// between two entries. The speed only changes how fast the steps happen.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    initial_index: usize,
    max_index: usize,
    current_index: usize,
    is_playing: bool,
    speed: f64,
    base_rate: f64,
    /// Fractional steps carried over to the next advance
    pending: f64,
}

impl PlaybackClock {
    pub fn new(config: PlaybackConfig, timeline_len: usize) -> Result<Self, PlaybackError> {
        let speed = validate_speed(config.speed)?;
        if !config.base_rate.is_finite() || config.base_rate <= 0.0 {
            return Err(PlaybackError::InvalidRate(config.base_rate));
        }

        let max_index = timeline_len.saturating_sub(1);
        let initial_index = config.initial_index.min(max_index);

        Ok(Self {
            initial_index,
            max_index,
            current_index: initial_index,
            is_playing: false,
            speed,
            base_rate: config.base_rate,
            pending: 0.0,
        })
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            current_index: self.current_index,
            is_playing: self.is_playing,
            speed: self.speed,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
        self.pending = 0.0;
    }

    pub fn toggle(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jumps to the given index, clamped into the timeline. Returns the new index.
    pub fn seek(&mut self, index: i64) -> usize {
        let max = i64::try_from(self.max_index).unwrap_or(i64::MAX);
        self.current_index = index.clamp(0, max) as usize;
        self.current_index
    }

    pub fn next(&mut self) -> usize {
        self.seek(self.current_index as i64 + 1)
    }

    pub fn prev(&mut self) -> usize {
        self.seek(self.current_index as i64 - 1)
    }

    pub fn reset(&mut self) -> usize {
        self.seek(self.initial_index as i64)
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        self.speed = validate_speed(speed)?;
        Ok(())
    }

    /// Moves the index forward by the steps that fit into `elapsed`.
    ///
    /// Playback stops on its own at the last index. Returns the number of steps taken.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if !self.is_playing {
            return 0;
        }
        if self.current_index >= self.max_index {
            self.pause();
            return 0;
        }

        self.pending += elapsed.as_secs_f64() * self.base_rate * self.speed;

        let mut steps = 0;
        while self.pending >= 1.0 - STEP_EPSILON {
            self.pending -= 1.0;
            self.current_index += 1;
            steps += 1;

            if self.current_index >= self.max_index {
                self.pause();
                break;
            }
        }

        steps
    }
}
