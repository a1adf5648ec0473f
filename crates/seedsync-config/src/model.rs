//! Raw configuration document and the validated configuration derived from it.
//!
//! # Design
//! - `ConfigDocument` mirrors the YAML file; every field is optional so environment
//!   overrides can fill gaps before validation.
//! - `SyncConfig` holds parsed, checked values and is what the rest of the workspace consumes.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::defaults::ID_PLACEHOLDER;

/// YAML document as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    /// Newline-delimited list of identifiers that should be loaded.
    pub desired_list_url: Option<String>,
    /// Per-item metainfo URL containing an `{id}` placeholder.
    pub item_url_template: Option<String>,
    /// PEM bundle trusted for source requests.
    pub ca_cert_path: Option<PathBuf>,
    /// PEM file holding the client certificate and key for source requests.
    pub client_cert_path: Option<PathBuf>,
    /// Smallest acceptable desired set.
    pub minimum_expected_count: Option<usize>,
    /// Largest acceptable share of loaded torrents to remove.
    pub max_removal_fraction: Option<f64>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Concurrent additions.
    pub add_concurrency: Option<usize>,
    /// Daemon connection block.
    #[serde(default)]
    pub daemon: DaemonDocument,
}

/// `daemon:` block of the document.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonDocument {
    /// Transmission RPC endpoint.
    pub rpc_url: Option<String>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
}

impl fmt::Debug for DaemonDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonDocument")
            .field("rpc_url", &self.rpc_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Desired-list endpoint.
    pub desired_list_url: Url,
    /// Per-item metainfo locator.
    pub item_url_template: ItemUrlTemplate,
    /// PEM bundle trusted for source requests.
    pub ca_cert_path: Option<PathBuf>,
    /// PEM client identity for source requests.
    pub client_cert_path: Option<PathBuf>,
    /// Smallest acceptable desired set.
    pub minimum_expected_count: usize,
    /// Largest acceptable share of loaded torrents to remove, within `[0, 1]`.
    pub max_removal_fraction: f64,
    /// Timeout applied to every outbound request.
    pub request_timeout: Duration,
    /// Concurrent additions, at least one.
    pub add_concurrency: usize,
    /// Daemon connection settings.
    pub daemon: DaemonConfig,
}

/// Validated daemon connection settings.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Transmission RPC endpoint.
    pub rpc_url: Url,
    /// Optional basic credentials.
    pub credentials: Option<DaemonCredentials>,
}

/// Basic auth credentials for the daemon.
#[derive(Clone, PartialEq, Eq)]
pub struct DaemonCredentials {
    /// Username.
    pub username: String,
    /// Password, possibly empty.
    pub password: String,
}

impl fmt::Debug for DaemonCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// URL template with an `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUrlTemplate(String);

impl ItemUrlTemplate {
    /// Wrap a template. Returns `None` when the placeholder is missing.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        template.contains(ID_PLACEHOLDER).then_some(Self(template))
    }

    /// Substitute `id` into every placeholder and parse the result.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the substituted string is not a URL.
    pub fn url_for(&self, id: &str) -> Result<Url, url::ParseError> {
        Url::parse(&self.0.replace(ID_PLACEHOLDER, id))
    }

    /// Raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
