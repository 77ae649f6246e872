use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::api::{types::PredictRequest, AppState};
use crate::responder::{self, ResponseEnvelope};

pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<ResponseEnvelope>, StatusCode> {
    // Empty input never touches the model.
    if req.text.trim().is_empty() {
        return Ok(Json(responder::greeting_response()));
    }

    let label = state.infer.label(&req.text).await.map_err(|err| {
        error!("inference failed: {err:#}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(responder::build_response(&label)))
}
