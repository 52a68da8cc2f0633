use crate::data::ScheduleEntry;
use crate::error::ScheduleError;
use crate::snapshot::CatalogInput;
use crate::solver;
use axum::{Json, Router, http::StatusCode, routing::post};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    assignments: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    kind: &'static str,
    detail: String,
}

async fn generate_handler(
    Json(catalog): Json<CatalogInput>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorBody>)> {
    match solver::generate(&catalog) {
        Ok(assignments) => Ok(Json(GenerateResponse {
            assignments: assignments.iter().map(ScheduleEntry::from_assignment).collect(),
        })),
        Err(error) => {
            let status = match error {
                ScheduleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Err((
                status,
                Json(ErrorBody {
                    kind: error.kind(),
                    detail: error.to_string(),
                }),
            ))
        }
    }
}

pub fn router() -> Router {
    Router::new().route("/v1/schedule/generate", post(generate_handler))
}

pub async fn run_server() {
    let addr =
        std::env::var("TIMETABLE_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("listening on http://{}", listener.local_addr().unwrap());

    axum::serve(listener, router()).await.unwrap();
}
