//! HTTP client construction and the CLI error type.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use reqwest::{Certificate, Client, Identity};
use seedsync_config::{ConfigError, SyncConfig};
use seedsync_core::{DesiredStateSource, GuardViolation, SyncError, TorrentDaemon};
use seedsync_transmission::{BasicCredentials, TransmissionClient};

use crate::source::HttpDesiredSource;

/// CLI-level error type; each variant maps to one exit code.
#[derive(Debug)]
pub(crate) enum CliError {
    Aborted(GuardViolation),
    Config(ConfigError),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Aborted(_) => 1,
            Self::Config(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Aborted(violation) => format!("reconciliation aborted: {violation}"),
            Self::Config(error) => {
                let mut message = error.to_string();
                let mut source = std::error::Error::source(error);
                while let Some(cause) = source {
                    message.push_str(": ");
                    message.push_str(&cause.to_string());
                    source = cause.source();
                }
                message
            }
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<SyncError> for CliError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::Aborted(violation) => Self::Aborted(violation),
            fatal @ SyncError::Fatal { .. } => Self::Failure(anyhow::Error::new(fatal)),
        }
    }
}

/// Collaborators built from a validated configuration.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) source: Arc<dyn DesiredStateSource>,
    pub(crate) daemon: Arc<dyn TorrentDaemon>,
}

impl CliDependencies {
    /// Build the desired-state source and daemon client for one run.
    pub(crate) fn from_config(config: &SyncConfig) -> CliResult<Self> {
        let source_client = build_source_client(config).map_err(CliError::failure)?;
        let daemon_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                CliError::failure(anyhow!("failed to build daemon HTTP client: {err}"))
            })?;

        let mut daemon = TransmissionClient::new(daemon_client, config.daemon.rpc_url.clone());
        if let Some(credentials) = &config.daemon.credentials {
            daemon = daemon.with_credentials(BasicCredentials {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            });
        }

        let source = HttpDesiredSource::new(
            source_client,
            config.desired_list_url.clone(),
            config.item_url_template.clone(),
        );

        Ok(Self {
            source: Arc::new(source),
            daemon: Arc::new(daemon),
        })
    }
}

/// Client for the desired list and payload endpoints, carrying the optional CA bundle and
/// client identity.
fn build_source_client(config: &SyncConfig) -> anyhow::Result<Client> {
    let mut builder = Client::builder().timeout(config.request_timeout);

    if let Some(path) = &config.ca_cert_path {
        let pem = read_pem(path)?;
        let certificates = Certificate::from_pem_bundle(&pem)
            .with_context(|| format!("invalid CA bundle {}", path.display()))?;
        if certificates.is_empty() {
            bail!("CA bundle {} contains no certificates", path.display());
        }
        for certificate in certificates {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if let Some(path) = &config.client_cert_path {
        let pem = read_pem(path)?;
        let identity = Identity::from_pem(&pem)
            .with_context(|| format!("invalid client identity {}", path.display()))?;
        builder = builder.identity(identity);
    }

    builder
        .build()
        .map_err(|err| anyhow!("failed to build source HTTP client: {err}"))
}

fn read_pem(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
