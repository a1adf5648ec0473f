use reqwest::StatusCode;
use seedsync_core::SessionToken;

use crate::client::TransmissionClient;
use crate::error::{TransmissionError, TransmissionResult};
use crate::models::RpcRequest;

/// Header carrying the session id on the handshake response and every later request.
pub const SESSION_HEADER: &str = "X-Transmission-Session-Id";

const HANDSHAKE_METHOD: &str = "session-get";

impl TransmissionClient {
    /// Obtain a session id.
    ///
    /// Sends an unauthenticated `session-get`; the daemon answers (normally with 409) carrying
    /// the session id header. No retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`TransmissionError::SessionMissing`] when the header is absent,
    /// [`TransmissionError::Unauthorized`] on 401, and [`TransmissionError::Http`] on transport
    /// failure.
    pub async fn authenticate(&self) -> TransmissionResult<SessionToken> {
        let response = self
            .post()
            .json(&RpcRequest::<()> {
                method: HANDSHAKE_METHOD,
                arguments: None,
            })
            .send()
            .await
            .map_err(|source| TransmissionError::Http {
                method: HANDSHAKE_METHOD,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransmissionError::Unauthorized);
        }

        let Some(value) = response.headers().get(SESSION_HEADER) else {
            return Err(TransmissionError::SessionMissing {
                status: status.as_u16(),
            });
        };
        let token = value
            .to_str()
            .map_err(|_| TransmissionError::SessionInvalid)?
            .trim();
        if token.is_empty() {
            return Err(TransmissionError::SessionMissing {
                status: status.as_u16(),
            });
        }

        tracing::debug!(status = status.as_u16(), "transmission session id obtained");
        Ok(SessionToken::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;

    fn client_for(server: &MockServer) -> TransmissionClient {
        let url = server.url("/transmission/rpc").parse().expect("valid URL");
        TransmissionClient::new(Client::new(), url)
    }

    #[tokio::test]
    async fn authenticate_reads_session_header_from_conflict() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/transmission/rpc")
                .json_body(json!({"method": "session-get"}));
            then.status(409)
                .header(SESSION_HEADER, "abc123")
                .body("<h1>409: Conflict</h1>");
        });

        let token = client_for(&server)
            .authenticate()
            .await
            .expect("session id present");
        assert_eq!(token.as_str(), "abc123");
        mock.assert();
    }

    #[tokio::test]
    async fn authenticate_accepts_header_on_success_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/transmission/rpc");
            then.status(200)
                .header(SESSION_HEADER, "open-session")
                .json_body(json!({"result": "success", "arguments": {}}));
        });

        let token = client_for(&server)
            .authenticate()
            .await
            .expect("session id present");
        assert_eq!(token.as_str(), "open-session");
    }

    #[tokio::test]
    async fn authenticate_fails_without_header() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/transmission/rpc");
            then.status(409);
        });

        let err = client_for(&server)
            .authenticate()
            .await
            .expect_err("missing header is fatal");
        assert!(matches!(err, TransmissionError::SessionMissing { status: 409 }));
    }

    #[tokio::test]
    async fn authenticate_maps_unauthorized() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/transmission/rpc");
            then.status(401).header(SESSION_HEADER, "ignored");
        });

        let err = client_for(&server)
            .authenticate()
            .await
            .expect_err("401 is fatal");
        assert!(matches!(err, TransmissionError::Unauthorized));
    }

    #[tokio::test]
    async fn authenticate_reports_unreachable_daemon() {
        let url = "http://127.0.0.1:9/transmission/rpc"
            .parse()
            .expect("valid URL");
        let err = TransmissionClient::new(Client::new(), url)
            .authenticate()
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, TransmissionError::Http { .. }));
    }
}
