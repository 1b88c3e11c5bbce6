use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

use analysis::coordinates::MapTransform;
use viewer::playback::{driver, PlaybackClock, PlaybackConfig};
use viewer::source::DumpSource;
use viewer::Session;

#[derive(Debug, Parser)]
#[command(version, about = "Round timelines for recorded match replays")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// List the rounds of a replay
    Rounds { dump: PathBuf },
    /// Print the timeline of a round as JSON
    Timeline {
        dump: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        round: u32,
    },
    /// Play a round back, logging every step
    Play {
        dump: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        round: u32,
        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,
        /// Edge length of the square canvas positions are mapped onto
        #[arg(long, default_value_t = 1024.0)]
        canvas: f32,
    },
    /// Serve rounds and timelines over HTTP
    Serve {
        dump: PathBuf,
        #[arg(long, env = "VIEWER_BIND", default_value = "0.0.0.0:3000")]
        bind: String,
        /// Folder with a frontend to serve next to the API
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

async fn load_session(dump: &std::path::Path) -> Result<Session, Box<dyn std::error::Error>> {
    let source = DumpSource::open(dump).await?;
    Ok(Session::load(Arc::new(source)).await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("viewer") || meta.target().contains("analysis")
        }));
    tracing::subscriber::set_global_default(registry)?;

    let cli = Cli::parse();

    match cli.command {
        Command::Rounds { dump } => {
            let session = load_session(&dump).await?;
            println!("{}", serde_json::to_string_pretty(&*session.rounds())?);
        }
        Command::Timeline { dump, round } => {
            let session = load_session(&dump).await?;
            let timeline = session
                .timeline(round)
                .await?
                .ok_or_else(|| format!("Replay has no round {}", round))?;
            println!("{}", serde_json::to_string(&*timeline)?);
        }
        Command::Play {
            dump,
            round,
            speed,
            canvas,
        } => {
            let session = load_session(&dump).await?;
            let timeline = session
                .timeline(round)
                .await?
                .ok_or_else(|| format!("Replay has no round {}", round))?;

            play(&timeline, speed, canvas).await?;
        }
        Command::Serve {
            dump,
            bind,
            static_dir,
        } => {
            let session = Arc::new(load_session(&dump).await?);

            let mut router = axum::Router::new().nest("/api", viewer::api::router(session));
            if let Some(dir) = static_dir {
                router = router.fallback_service(tower_http::services::ServeDir::new(dir));
            }

            tracing::info!("Listening on {}", bind);
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            axum::serve(listener, router).await?;
        }
    };

    Ok(())
}

async fn play(
    timeline: &[analysis::TickState],
    speed: f64,
    canvas: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let transform = MapTransform::default();
    let config = PlaybackConfig {
        speed,
        ..Default::default()
    };
    let clock = PlaybackClock::new(config, timeline.len())?;

    let (handle, task) = driver::spawn(clock);
    let mut status = handle.subscribe();
    handle.play()?;

    loop {
        let current = *status.borrow_and_update();

        if let Some(state) = timeline.get(current.current_index) {
            tracing::info!(
                index = current.current_index,
                tick = state.tick,
                game_time = state.game_time,
                alive_a = state.team_a.iter().filter(|p| p.is_alive).count(),
                alive_b = state.team_b.iter().filter(|p| p.is_alive).count(),
                "Step"
            );
            for player in state.team_a.iter().chain(state.team_b.iter()) {
                let position = transform.to_canvas(player.position, canvas, canvas);
                tracing::debug!(name = %player.name, x = position.x, y = position.y, health = player.health);
            }
        }

        if !current.is_playing && current.current_index >= timeline.len().saturating_sub(1) {
            break;
        }
        if status.changed().await.is_err() {
            break;
        }
    }

    handle.shutdown()?;
    let clock = task.await?;
    tracing::info!(index = clock.current_index(), "Playback finished");

    Ok(())
}
