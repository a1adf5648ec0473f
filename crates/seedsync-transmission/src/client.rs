//! HTTP plumbing shared by every RPC call.

use std::fmt;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use seedsync_core::SessionToken;

use crate::auth::SESSION_HEADER;
use crate::error::{TransmissionError, TransmissionResult};
use crate::models::{RpcRequest, RpcResponse};

/// Default RPC endpoint of a local `transmission-daemon`.
pub const DEFAULT_RPC_URL: &str = "http://localhost:9091/transmission/rpc";

const RESULT_SUCCESS: &str = "success";

/// HTTP basic credentials for daemons with `rpc-authentication-required` enabled.
#[derive(Clone)]
pub struct BasicCredentials {
    /// RPC username.
    pub username: String,
    /// RPC password.
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client for one Transmission RPC endpoint.
///
/// The underlying `reqwest::Client` carries the per-request timeout.
#[derive(Debug, Clone)]
pub struct TransmissionClient {
    client: Client,
    rpc_url: Url,
    credentials: Option<BasicCredentials>,
}

impl TransmissionClient {
    /// Build a client posting to `rpc_url`.
    #[must_use]
    pub const fn new(client: Client, rpc_url: Url) -> Self {
        Self {
            client,
            rpc_url,
            credentials: None,
        }
    }

    /// Attach basic credentials to every request.
    #[must_use]
    pub fn with_credentials(mut self, credentials: BasicCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub const fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub(crate) fn post(&self) -> RequestBuilder {
        let request = self.client.post(self.rpc_url.clone());
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => request,
        }
    }

    /// Issue one authenticated RPC call and unwrap the response envelope.
    ///
    /// Returns the `arguments` object, which the daemon may omit.
    pub(crate) async fn call<A, R>(
        &self,
        session: &SessionToken,
        method: &'static str,
        arguments: A,
    ) -> TransmissionResult<Option<R>>
    where
        A: Serialize + Send,
        R: DeserializeOwned,
    {
        let response = self
            .post()
            .header(SESSION_HEADER, session.as_str())
            .json(&RpcRequest {
                method,
                arguments: Some(arguments),
            })
            .send()
            .await
            .map_err(|source| TransmissionError::Http { method, source })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransmissionError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransmissionError::Status {
                method,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransmissionError::Http { method, source })?;
        let envelope: RpcResponse<R> = serde_json::from_slice(&bytes)
            .map_err(|source| TransmissionError::Decode { method, source })?;

        if envelope.result != RESULT_SUCCESS {
            return Err(TransmissionError::Rpc {
                method,
                result: envelope.result,
            });
        }
        Ok(envelope.arguments)
    }
}
