use axum::{routing::post, Router};
use std::sync::Arc;

use crate::inference::InferenceService;

pub mod handlers;
pub mod types;

#[derive(Clone)]
pub struct AppState {
    pub infer: Arc<InferenceService>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(handlers::predict))
}
