use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{
    types::{CallbackOutcome, PkceSession},
    warning,
};

pub type SharedSession = Arc<Mutex<Option<PkceSession>>>;

/// Records the authorization code (or the refusal) for the pending session.
///
/// Requests whose `state` does not match the pending session are ignored.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<SharedSession>,
) -> Html<&'static str> {
    let mut session = shared_state.lock().await;
    let Some(pending) = session.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if params.get("state") != Some(&pending.state) {
        warning!("Ignoring callback with mismatched state");
        return Html("<h4>Invalid authorization state.</h4>");
    }

    if let Some(code) = params.get("code") {
        pending.outcome = Some(CallbackOutcome::Code(code.clone()));
        Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
    } else {
        let reason = params
            .get("error")
            .cloned()
            .unwrap_or_else(|| "missing authorization code".to_string());
        pending.outcome = Some(CallbackOutcome::Denied(reason));
        Html("<h4>Login failed.</h4>")
    }
}
