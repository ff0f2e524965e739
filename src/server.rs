use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{api, api::SharedSession, error::TransportError, warning};

/// Local HTTP server receiving the OAuth redirect.
pub struct CallbackServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting requests and waits for the server task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.handle.await {
            warning!("Callback server task failed: {}", e);
        }
    }
}

/// Binds `addr` and serves `/callback` and `/health` in a background task.
pub async fn start_api_server(
    state: SharedSession,
    addr: &str,
) -> Result<CallbackServer, TransportError> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::Callback(format!("cannot bind {}: {}", addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| TransportError::Callback(e.to_string()))?;

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = rx.await;
        });
        if let Err(e) = server.await {
            warning!("Callback server stopped: {}", e);
        }
    });

    Ok(CallbackServer {
        local_addr,
        shutdown: Some(tx),
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PkceSession;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn health_reports_pending_authorization() -> TestResult {
        let state: SharedSession = Arc::new(Mutex::new(Some(PkceSession {
            state: "st4te".to_string(),
            outcome: None,
        })));
        let server = start_api_server(Arc::clone(&state), "127.0.0.1:0").await?;

        let url = format!("http://{}/health", server.local_addr());
        let body: serde_json::Value = reqwest::get(&url).await?.json().await?;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["authorization_pending"], true);

        let url = format!("http://{}/callback?code=c0de&state=st4te", server.local_addr());
        reqwest::get(&url).await?.error_for_status()?;
        let body: serde_json::Value = reqwest::get(format!("http://{}/health", server.local_addr()))
            .await?
            .json()
            .await?;
        assert_eq!(body["authorization_pending"], false);

        server.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let err = start_api_server(Arc::new(Mutex::new(None)), "not an address")
            .await
            .err()
            .expect("address is invalid");
        assert!(matches!(err, TransportError::Callback(_)), "{err:?}");
    }
}
