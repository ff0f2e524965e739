use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::api::SharedSession;

pub async fn health(Extension(shared_state): Extension<SharedSession>) -> Json<Value> {
    let pending = shared_state
        .lock()
        .await
        .as_ref()
        .is_some_and(|s| s.outcome.is_none());

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "authorization_pending": pending,
    }))
}
