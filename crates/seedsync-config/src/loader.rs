//! YAML loading with an environment overlay.
//!
//! # Design
//! - The file is optional; environment variables prefixed with `SEEDSYNC_` override it.
//! - Environment access goes through a lookup closure so callers and tests never mutate
//!   process state.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigDocument, SyncConfig};
use crate::validate::validate;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SEEDSYNC_";

/// Parse a YAML document. `path` is only used for error context.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the text is not a valid document.
pub fn parse_document(text: &str, path: &Path) -> ConfigResult<ConfigDocument> {
    if text.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }
    serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from `path` (when given) and the process environment.
///
/// # Errors
///
/// Returns read, parse, override, or validation failures.
pub fn load(path: Option<&Path>) -> ConfigResult<SyncConfig> {
    load_with_env(path, |name| std::env::var(name).ok())
}

/// Load configuration from `path` (when given) and a caller-supplied environment.
///
/// # Errors
///
/// Returns read, parse, override, or validation failures.
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> ConfigResult<SyncConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut doc = match path {
        Some(path) => read_document(path)?,
        None => ConfigDocument::default(),
    };
    apply_env(&mut doc, &lookup)?;
    let config = validate(doc)?;
    debug!(
        desired_list_url = %config.desired_list_url,
        rpc_url = %config.daemon.rpc_url,
        minimum_expected_count = config.minimum_expected_count,
        max_removal_fraction = config.max_removal_fraction,
        "configuration loaded"
    );
    Ok(config)
}

fn read_document(path: &Path) -> ConfigResult<ConfigDocument> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "read configuration file");
    parse_document(&text, path)
}

fn apply_env<F>(doc: &mut ConfigDocument, lookup: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let name = format!("{ENV_PREFIX}{suffix}");
        lookup(&name).map(|value| (name, value))
    };

    if let Some((_, value)) = var("DESIRED_LIST_URL") {
        doc.desired_list_url = Some(value);
    }
    if let Some((_, value)) = var("ITEM_URL_TEMPLATE") {
        doc.item_url_template = Some(value);
    }
    if let Some((_, value)) = var("CA_CERT_PATH") {
        doc.ca_cert_path = Some(PathBuf::from(value));
    }
    if let Some((_, value)) = var("CLIENT_CERT_PATH") {
        doc.client_cert_path = Some(PathBuf::from(value));
    }
    if let Some((name, value)) = var("MIN_EXPECTED_COUNT") {
        doc.minimum_expected_count = Some(parse_env(name, value, "expected a whole number")?);
    }
    if let Some((name, value)) = var("MAX_REMOVAL_FRACTION") {
        doc.max_removal_fraction = Some(parse_env(name, value, "expected a decimal number")?);
    }
    if let Some((name, value)) = var("REQUEST_TIMEOUT_SECS") {
        doc.request_timeout_secs = Some(parse_env(name, value, "expected a whole number")?);
    }
    if let Some((name, value)) = var("ADD_CONCURRENCY") {
        doc.add_concurrency = Some(parse_env(name, value, "expected a whole number")?);
    }
    if let Some((_, value)) = var("DAEMON_RPC_URL") {
        doc.daemon.rpc_url = Some(value);
    }
    if let Some((_, value)) = var("DAEMON_USERNAME") {
        doc.daemon.username = Some(value);
    }
    if let Some((_, value)) = var("DAEMON_PASSWORD") {
        doc.daemon.password = Some(value);
    }
    Ok(())
}

fn parse_env<T: FromStr>(name: String, value: String, reason: &'static str) -> ConfigResult<T> {
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|_| ConfigError::InvalidEnv {
        name,
        value,
        reason,
    })
}
