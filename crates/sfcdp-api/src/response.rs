// Shared response handling for every endpoint.
//
// Each client decides which status it accepts; this module turns the
// rejected response or the accepted body into the crate's error types.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Failure, UpstreamBody};

/// Drain a rejected response into a `Failure`.
pub(crate) async fn rejected(resp: reqwest::Response) -> Failure {
    let status = resp.status().as_u16();
    Failure::Status {
        status,
        body: rejected_body(resp.text().await),
    }
}

/// A body that could not be read is reported as text, not dropped.
fn rejected_body<E: Display>(read: Result<String, E>) -> Option<UpstreamBody> {
    match read {
        Ok(raw) => UpstreamBody::from_raw(raw),
        Err(e) => {
            debug!(error = %e, "failed to read rejected response body");
            Some(UpstreamBody::Text(format!("<response body unreadable: {e}>")))
        }
    }
}

/// Decode an accepted body, keeping a preview on schema mismatch.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::MalformedResponse {
            endpoint: endpoint.to_owned(),
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Like [`decode`], but keeps neither a preview nor the body: token
/// responses carry credentials.
pub(crate) fn decode_sensitive<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        endpoint: endpoint.to_owned(),
        message: e.to_string(),
        body: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_rejection_body_is_kept_as_text() {
        let body = rejected_body::<&str>(Err("connection reset"));
        assert_eq!(
            body,
            Some(UpstreamBody::Text(
                "<response body unreadable: connection reset>".into()
            ))
        );
    }

    #[test]
    fn blank_rejection_body_is_none() {
        assert_eq!(rejected_body::<&str>(Ok(String::new())), None);
    }
}
