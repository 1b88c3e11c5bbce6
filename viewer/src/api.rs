use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use analysis::{Round, TickState};

use crate::session::Session;

pub fn router(session: Arc<Session>) -> axum::Router {
    axum::Router::new()
        .route("/info", axum::routing::get(info))
        .route("/rounds", axum::routing::get(rounds))
        .route("/rounds/:number/timeline", axum::routing::get(timeline))
        .with_state(session)
}

#[tracing::instrument(skip(session))]
async fn info(State(session): State<Arc<Session>>) -> Json<common::DemoInfo> {
    Json(session.info())
}

#[tracing::instrument(skip(session))]
async fn rounds(State(session): State<Arc<Session>>) -> Json<Arc<[Round]>> {
    Json(session.rounds())
}

#[tracing::instrument(skip(session))]
async fn timeline(
    State(session): State<Arc<Session>>,
    Path(number): Path<u32>,
) -> Result<Json<Arc<[TickState]>>, StatusCode> {
    tracing::info!("Get timeline for round {}", number);

    match session.timeline(number).await {
        Ok(Some(timeline)) => Ok(Json(timeline)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Loading timeline: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
