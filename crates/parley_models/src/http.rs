//! Request plumbing shared by the drivers.

use parley_error::{ProviderError, ProviderErrorKind, ProviderResult};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::error;

/// Send a prepared request and decode a successful JSON body.
///
/// Non-success statuses, transport failures and undecodable bodies all become
/// [`ProviderError`]s tagged with `provider`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> ProviderResult<T> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(provider, e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(provider, status = %status, body = %body, "Backend returned error");
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::Api {
                status: status.as_u16(),
                message: body,
            },
        ));
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            return transport_error(provider, e, timeout);
        }
        error!(provider, error = ?e, "Failed to parse backend response");
        ProviderError::new(provider, ProviderErrorKind::Parse(e.to_string()))
    })
}

/// Reject replies that parsed but carry no text.
pub(crate) fn non_empty(provider: &'static str, text: Option<String>) -> ProviderResult<String> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::new(provider, ProviderErrorKind::EmptyReply)),
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn transport_error(provider: &'static str, e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::new(
            provider,
            ProviderErrorKind::Timeout(timeout.as_millis() as u64),
        )
    } else {
        error!(provider, error = ?e, "Failed to send request");
        ProviderError::new(provider, ProviderErrorKind::Http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(
            join_url("http://localhost:11434/", "/api/chat"),
            "http://localhost:11434/api/chat"
        );
        assert_eq!(join_url("https://x/v1", "chat/completions"), "https://x/v1/chat/completions");
    }

    #[test]
    fn blank_reply_is_rejected() {
        let err = non_empty("ollama", Some("  \n".to_string())).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyReply);
        assert!(non_empty("ollama", None).is_err());
        assert_eq!(non_empty("ollama", Some("Hi".into())).unwrap(), "Hi");
    }
}
