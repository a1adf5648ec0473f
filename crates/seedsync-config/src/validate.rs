//! Conversion of a raw document into a checked `SyncConfig`.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::defaults::{
    ADD_CONCURRENCY, DAEMON_RPC_URL, MAX_REMOVAL_FRACTION, MINIMUM_EXPECTED_COUNT,
    REQUEST_TIMEOUT_SECS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigDocument, DaemonConfig, DaemonCredentials, ItemUrlTemplate, SyncConfig};

/// Apply defaults and validate every field.
///
/// # Errors
///
/// Returns the first missing or invalid field.
pub fn validate(doc: ConfigDocument) -> ConfigResult<SyncConfig> {
    let ConfigDocument {
        desired_list_url,
        item_url_template,
        ca_cert_path,
        client_cert_path,
        minimum_expected_count,
        max_removal_fraction,
        request_timeout_secs,
        add_concurrency,
        daemon,
    } = doc;

    let raw_list_url = desired_list_url.ok_or(ConfigError::MissingField {
        field: "desired_list_url",
    })?;
    let desired_list_url = parse_http_url("desired_list_url", &raw_list_url)?;

    let raw_template = item_url_template.ok_or(ConfigError::MissingField {
        field: "item_url_template",
    })?;
    let item_url_template = parse_template(raw_template.trim())?;

    let ca_cert_path = existing_file("ca_cert_path", ca_cert_path)?;
    let client_cert_path = existing_file("client_cert_path", client_cert_path)?;

    let minimum_expected_count = minimum_expected_count.unwrap_or(MINIMUM_EXPECTED_COUNT);

    let max_removal_fraction = max_removal_fraction.unwrap_or(MAX_REMOVAL_FRACTION);
    if !max_removal_fraction.is_finite() || !(0.0..=1.0).contains(&max_removal_fraction) {
        return Err(ConfigError::invalid(
            "max_removal_fraction",
            max_removal_fraction.to_string(),
            "must be between 0 and 1",
        ));
    }

    let timeout_secs = request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        let reason = "must be greater than zero";
        return Err(ConfigError::invalid("request_timeout_secs", "0", reason));
    }

    let add_concurrency = add_concurrency.unwrap_or(ADD_CONCURRENCY);
    if add_concurrency == 0 {
        return Err(ConfigError::invalid("add_concurrency", "0", "must be at least one"));
    }

    let raw_rpc_url = daemon.rpc_url.as_deref().unwrap_or(DAEMON_RPC_URL);
    let rpc_url = parse_http_url("daemon.rpc_url", raw_rpc_url)?;
    let credentials = credentials(daemon.username, daemon.password)?;

    Ok(SyncConfig {
        desired_list_url,
        item_url_template,
        ca_cert_path,
        client_cert_path,
        minimum_expected_count,
        max_removal_fraction,
        request_timeout: Duration::from_secs(timeout_secs),
        add_concurrency,
        daemon: DaemonConfig {
            rpc_url,
            credentials,
        },
    })
}

fn parse_http_url(field: &'static str, raw: &str) -> ConfigResult<Url> {
    let Ok(url) = Url::parse(raw.trim()) else {
        return Err(ConfigError::invalid(field, raw, "not a URL"));
    };
    ensure_http_scheme(field, &url)?;
    Ok(url)
}

fn parse_template(raw: &str) -> ConfigResult<ItemUrlTemplate> {
    let Some(template) = ItemUrlTemplate::new(raw) else {
        return Err(ConfigError::invalid(
            "item_url_template",
            raw,
            "must contain the {id} placeholder",
        ));
    };
    let sample = template
        .url_for("0123456789abcdef")
        .map_err(|_| ConfigError::invalid("item_url_template", raw, "not a URL"))?;
    ensure_http_scheme("item_url_template", &sample)?;
    Ok(template)
}

fn ensure_http_scheme(field: &'static str, url: &Url) -> ConfigResult<()> {
    let reason = "scheme must be http or https";
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::invalid(field, url.as_str(), reason)),
    }
}

fn existing_file(field: &'static str, path: Option<PathBuf>) -> ConfigResult<Option<PathBuf>> {
    match path {
        Some(path) if !path.is_file() => {
            let value = path.display().to_string();
            Err(ConfigError::invalid(field, value, "file does not exist"))
        }
        other => Ok(other),
    }
}

fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> ConfigResult<Option<DaemonCredentials>> {
    let Some(username) = username else {
        if password.is_some() {
            return Err(ConfigError::InvalidField {
                field: "daemon.password",
                value: None,
                reason: "requires daemon.username",
            });
        }
        return Ok(None);
    };
    if username.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "daemon.username",
            value: None,
            reason: "must not be blank",
        });
    }
    Ok(Some(DaemonCredentials {
        username,
        password: password.unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DaemonDocument;

    fn minimal() -> ConfigDocument {
        ConfigDocument {
            desired_list_url: Some("https://tracker.example/active.txt".into()),
            item_url_template: Some("https://tracker.example/t/{id}.torrent".into()),
            ..ConfigDocument::default()
        }
    }

    #[test]
    fn minimal_document_gets_defaults() {
        let config = validate(minimal()).expect("minimal document is valid");
        assert_eq!(config.minimum_expected_count, 100);
        assert!((config.max_removal_fraction - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.add_concurrency, 4);
        assert_eq!(
            config.daemon.rpc_url.as_str(),
            "http://localhost:9091/transmission/rpc"
        );
        assert!(config.daemon.credentials.is_none());
        assert!(config.ca_cert_path.is_none());
    }

    #[test]
    fn desired_list_url_is_required() {
        let doc = ConfigDocument {
            desired_list_url: None,
            ..minimal()
        };
        assert!(matches!(
            validate(doc),
            Err(ConfigError::MissingField {
                field: "desired_list_url"
            })
        ));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let doc = ConfigDocument {
            item_url_template: Some("https://tracker.example/t/{hash}".into()),
            ..minimal()
        };
        assert!(matches!(
            validate(doc),
            Err(ConfigError::InvalidField {
                field: "item_url_template",
                ..
            })
        ));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        let doc = ConfigDocument {
            desired_list_url: Some("ftp://tracker.example/list".into()),
            ..minimal()
        };
        assert!(matches!(
            validate(doc),
            Err(ConfigError::InvalidField {
                field: "desired_list_url",
                reason: "scheme must be http or https",
                ..
            })
        ));
    }

    #[test]
    fn removal_fraction_must_be_a_ratio() {
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let doc = ConfigDocument {
                max_removal_fraction: Some(bad),
                ..minimal()
            };
            assert!(validate(doc).is_err(), "fraction {bad} should be rejected");
        }
        let doc = ConfigDocument {
            max_removal_fraction: Some(1.0),
            ..minimal()
        };
        assert!(validate(doc).is_ok());
    }

    #[test]
    fn zero_timeout_and_concurrency_are_rejected() {
        let doc = ConfigDocument {
            request_timeout_secs: Some(0),
            ..minimal()
        };
        assert!(validate(doc).is_err());

        let doc = ConfigDocument {
            add_concurrency: Some(0),
            ..minimal()
        };
        assert!(validate(doc).is_err());
    }

    #[test]
    fn password_requires_username() {
        let doc = ConfigDocument {
            daemon: DaemonDocument {
                rpc_url: None,
                username: None,
                password: Some("secret".into()),
            },
            ..minimal()
        };
        assert!(matches!(
            validate(doc),
            Err(ConfigError::InvalidField {
                field: "daemon.password",
                ..
            })
        ));
    }

    #[test]
    fn username_without_password_uses_empty_password() {
        let doc = ConfigDocument {
            daemon: DaemonDocument {
                rpc_url: Some("http://10.0.0.2:9091/transmission/rpc".into()),
                username: Some("admin".into()),
                password: None,
            },
            ..minimal()
        };
        let config = validate(doc).expect("valid");
        assert_eq!(
            config.daemon.credentials,
            Some(DaemonCredentials {
                username: "admin".into(),
                password: String::new(),
            })
        );
    }

    #[test]
    fn missing_cert_file_is_rejected() {
        let doc = ConfigDocument {
            ca_cert_path: Some(PathBuf::from("/definitely/not/here/ca.pem")),
            ..minimal()
        };
        assert!(matches!(
            validate(doc),
            Err(ConfigError::InvalidField {
                field: "ca_cert_path",
                ..
            })
        ));
    }
}
