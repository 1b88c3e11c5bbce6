//! Runs a [`PlaybackClock`] on its own task.
//!
//! The task is the only owner of the clock. Controls arrive as commands over a
//! channel and are handled one at a time between frames, so a pause or seek
//! can never interleave with an advance. Every change is published to the
//! subscribers of the status channel.

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior};

use common::PlaybackStatus;

use super::{validate_speed, PlaybackClock, PlaybackError};

/// Display refresh interval used by [`spawn`].
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Shortest frame interval the driver runs at, shorter ones are raised to it.
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
enum Command {
    Play,
    Pause,
    Toggle,
    Seek(i64),
    Next,
    Prev,
    Reset,
    SetSpeed(f64),
    Shutdown,
}

/// Controls for a running playback, cheap to clone.
///
/// Playback ends once every handle is dropped or [`PlaybackHandle::shutdown`] is called.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<PlaybackStatus>,
}

impl PlaybackHandle {
    fn send(&self, command: Command) -> Result<(), PlaybackError> {
        self.commands.send(command).map_err(|_| PlaybackError::Closed)
    }

    pub fn play(&self) -> Result<(), PlaybackError> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.send(Command::Pause)
    }

    pub fn toggle(&self) -> Result<(), PlaybackError> {
        self.send(Command::Toggle)
    }

    pub fn seek(&self, index: i64) -> Result<(), PlaybackError> {
        self.send(Command::Seek(index))
    }

    pub fn next(&self) -> Result<(), PlaybackError> {
        self.send(Command::Next)
    }

    pub fn prev(&self) -> Result<(), PlaybackError> {
        self.send(Command::Prev)
    }

    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.send(Command::Reset)
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), PlaybackError> {
        let speed = validate_speed(speed)?;
        self.send(Command::SetSpeed(speed))
    }

    pub fn shutdown(&self) -> Result<(), PlaybackError> {
        self.send(Command::Shutdown)
    }

    /// The latest published status.
    pub fn status(&self) -> PlaybackStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.clone()
    }
}

/// Starts driving the clock at [`FRAME_INTERVAL`].
///
/// The returned task resolves to the final state of the clock once playback ended.
pub fn spawn(clock: PlaybackClock) -> (PlaybackHandle, tokio::task::JoinHandle<PlaybackClock>) {
    spawn_with_interval(clock, FRAME_INTERVAL)
}

/// Like [`spawn`], with a custom frame interval of at least [`MIN_FRAME_INTERVAL`].
pub fn spawn_with_interval(
    clock: PlaybackClock,
    frame_interval: Duration,
) -> (PlaybackHandle, tokio::task::JoinHandle<PlaybackClock>) {
    let frame_interval = frame_interval.max(MIN_FRAME_INTERVAL);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(clock.status());

    let task = tokio::spawn(run(clock, command_rx, status_tx, frame_interval));

    (
        PlaybackHandle {
            commands: command_tx,
            status: status_rx,
        },
        task,
    )
}

async fn run(
    mut clock: PlaybackClock,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<PlaybackStatus>,
    frame_interval: Duration,
) -> PlaybackClock {
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let command = match command {
                    Some(Command::Shutdown) | None => break,
                    Some(c) => c,
                };

                let was_playing = clock.is_playing();
                apply(&mut clock, command);

                if clock.is_playing() && !was_playing {
                    // Time spent paused must not count towards the next frame
                    frames.reset();
                    last_frame = Instant::now();
                }
            }
            _ = frames.tick(), if clock.is_playing() => {
                let now = Instant::now();
                let steps = clock.advance(now - last_frame);
                last_frame = now;

                tracing::trace!(steps, index = clock.current_index(), "Frame");
            }
        }

        status.send_if_modified(|current| {
            let next = clock.status();
            if *current == next {
                return false;
            }

            *current = next;
            true
        });
    }

    tracing::debug!(index = clock.current_index(), "Playback stopped");

    clock
}

fn apply(clock: &mut PlaybackClock, command: Command) {
    match command {
        Command::Play => clock.play(),
        Command::Pause => clock.pause(),
        Command::Toggle => clock.toggle(),
        Command::Seek(index) => {
            clock.seek(index);
        }
        Command::Next => {
            clock.next();
        }
        Command::Prev => {
            clock.prev();
        }
        Command::Reset => {
            clock.reset();
        }
        Command::SetSpeed(speed) => {
            if let Err(e) = clock.set_speed(speed) {
                tracing::warn!("Ignoring speed change: {}", e);
            }
        }
        Command::Shutdown => {}
    }
}
