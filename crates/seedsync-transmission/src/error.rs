//! Error types for Transmission RPC calls.

use thiserror::Error;

/// Result alias for Transmission operations.
pub type TransmissionResult<T> = Result<T, TransmissionError>;

/// Failures talking to the Transmission daemon.
#[derive(Debug, Error)]
pub enum TransmissionError {
    /// Transport-level failure, including timeouts.
    #[error("transmission {method} request failed")]
    Http {
        /// RPC method being called.
        method: &'static str,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The daemon answered with a non-success HTTP status.
    #[error("transmission {method} returned status {status}")]
    Status {
        /// RPC method being called.
        method: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The daemon refused the configured credentials.
    #[error("transmission rejected credentials")]
    Unauthorized,
    /// The session handshake response carried no session id.
    #[error("session id missing from handshake response (status {status})")]
    SessionMissing {
        /// HTTP status of the handshake response.
        status: u16,
    },
    /// The session id header was not valid visible ASCII.
    #[error("session id header is not valid text")]
    SessionInvalid,
    /// The RPC envelope reported a non-success result.
    #[error("transmission {method} failed: {result}")]
    Rpc {
        /// RPC method being called.
        method: &'static str,
        /// `result` string reported by the daemon.
        result: String,
    },
    /// The response body was not the expected JSON.
    #[error("transmission {method} response could not be decoded")]
    Decode {
        /// RPC method being called.
        method: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The response envelope had no `arguments` object.
    #[error("transmission {method} response has no arguments")]
    MissingArguments {
        /// RPC method being called.
        method: &'static str,
    },
    /// The inventory contained a torrent without a hash string.
    #[error("transmission reported a torrent with a blank hash")]
    BlankHash,
}
