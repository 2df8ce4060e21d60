use reqwest::StatusCode;
use serde_json::Value;

use crate::application::ports::ProviderError;

/// Maps a non-success HTTP response onto the provider error contract.
pub(super) async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let data = serde_json::from_str::<Value>(&body).ok();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited { data };
    }

    let message = data
        .as_ref()
        .and_then(vendor_error_message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

    ProviderError::Api {
        status: Some(status.as_u16()),
        message,
        data,
    }
}

pub(super) fn transport_error(error: reqwest::Error) -> ProviderError {
    ProviderError::Api {
        status: error.status().map(|s| s.as_u16()),
        message: error.to_string(),
        data: None,
    }
}

// Both vendors nest the message as {"error": {"message": ...}}.
fn vendor_error_message(data: &Value) -> Option<String> {
    data.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
