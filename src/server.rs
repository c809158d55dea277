use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{error, info, warn};

use crate::config::ServerConfig;
use crate::data::{SchedulingInput, SchedulingOutput};
use crate::error::ScheduleError;
use crate::solver::{self, EngineOptions};

type ApiError = (StatusCode, String);

fn status_for(err: &ScheduleError) -> StatusCode {
    match err {
        ScheduleError::InvalidModel(_) | ScheduleError::InvalidPreAssignment { .. } => {
            StatusCode::BAD_REQUEST
        }
        ScheduleError::UnsatisfiableDemand { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

// the engine is CPU-bound, keep it off the async workers
async fn run(options: EngineOptions, input: SchedulingInput) -> Result<SchedulingOutput, ApiError> {
    let result = tokio::task::spawn_blocking(move || solver::solve(&input, options))
        .await
        .map_err(|e| {
            error!("Scheduling task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    result.map_err(|e| {
        warn!("Scheduling failed: {e}");
        (status_for(&e), e.to_string())
    })
}

async fn solve_handler(
    State(options): State<EngineOptions>,
    Json(input): Json<SchedulingInput>,
) -> Result<Json<SchedulingOutput>, ApiError> {
    run(options, input).await.map(Json)
}

async fn render_handler(
    State(options): State<EngineOptions>,
    Json(input): Json<SchedulingInput>,
) -> Result<String, ApiError> {
    run(options, input)
        .await
        .map(|output| output.schedule.to_string())
}

pub fn router(options: EngineOptions) -> Router {
    Router::new()
        .route("/v1/timetable/solve", post(solve_handler))
        .route("/v1/timetable/render", post(render_handler))
        .with_state(options)
}

pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let app = router(config.engine);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
