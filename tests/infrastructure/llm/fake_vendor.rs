use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::Value;
use tokio::net::TcpListener;

use research_relay::presentation::config::ProviderSettings;

pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

/// Local stand-in for a vendor API that answers every POST on `path` with a canned reply.
pub struct FakeVendor {
    pub base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeVendor {
    pub async fn start(path: &str, status: StatusCode, reply: Value) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));

        let handler = {
            let captured = Arc::clone(&captured);
            move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = Arc::clone(&captured);
                let reply = reply.clone();
                async move {
                    captured
                        .lock()
                        .unwrap()
                        .push(CapturedRequest { headers, body });
                    (status, Json(reply))
                }
            }
        };
        let app = Router::new().route(path, post(handler));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            captured,
        }
    }

    pub fn settings(&self, name: &str) -> ProviderSettings {
        ProviderSettings {
            name: name.to_string(),
            api_key: "test-key".to_string(),
            base_url: Some(format!("{}/", self.base_url)),
            model: "default-model".to_string(),
            request_timeout_secs: 5,
            ..ProviderSettings::default()
        }
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.captured.lock().unwrap().pop().unwrap()
    }
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
