//! In-process stand-in for a model backend, shared by the driver tests.

#![allow(dead_code)]

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct Behaviour {
    status: StatusCode,
    reply: Value,
    delay: Duration,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

/// Handle to a running fake backend.
pub struct FakeBackend {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBackend {
    pub async fn start(status: StatusCode, reply: Value) -> anyhow::Result<Self> {
        Self::start_delayed(status, reply, Duration::ZERO).await
    }

    pub async fn start_delayed(
        status: StatusCode,
        reply: Value,
        delay: Duration,
    ) -> anyhow::Result<Self> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let behaviour = Behaviour {
            status,
            reply,
            delay,
            seen: seen.clone(),
        };
        let app = Router::new().fallback(respond).with_state(behaviour);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            seen,
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }
}

async fn respond(
    State(behaviour): State<Behaviour>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let body = serde_json::from_str(&body).unwrap_or(Value::Null);
    behaviour.seen.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        headers,
        body,
    });
    if !behaviour.delay.is_zero() {
        tokio::time::sleep(behaviour.delay).await;
    }
    (behaviour.status, Json(behaviour.reply))
}

/// An address nothing listens on.
pub async fn closed_port_url() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}
