//! Argument parsing, the pass driver, and exit-code mapping.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use seedsync_config::{SyncConfig, defaults::CONFIG_FILE_NAME};
use seedsync_core::{GuardPipeline, PassOptions, ReconcilePass, RunReport};
use seedsync_telemetry::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, new_run_id, run_span,
};
use tracing::{Instrument, debug, info};

use crate::client::{CliDependencies, CliError, CliResult};
use crate::output::{log_summary, render_diff};

#[derive(Parser, Debug)]
#[command(
    name = "seedsync",
    version,
    about = "Converge a Transmission daemon toward an authoritative torrent list"
)]
pub(crate) struct Cli {
    /// YAML configuration file. Defaults to `seedsync.yaml` when present.
    #[arg(long, env = "SEEDSYNC_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// Plan and print the diff without touching the daemon.
    #[arg(long, env = "SEEDSYNC_DRY_RUN")]
    pub(crate) dry_run: bool,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "SEEDSYNC_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    /// Log output format; pretty in debug builds and JSON in release builds by default.
    #[arg(long, env = "SEEDSYNC_LOG_FORMAT", value_parser = parse_log_format)]
    pub(crate) log_format: Option<LogFormat>,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}

/// Parses CLI arguments, installs logging, and runs one reconciliation pass.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("error: {err:#}");
        return 3;
    }

    match execute(&cli, &mut io::stdout()).await {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

/// Load configuration, build collaborators, and drive the pass. The diff is written to
/// `out` once the guards pass and before anything is mutated.
pub(crate) async fn execute(cli: &Cli, out: &mut impl Write) -> CliResult<RunReport> {
    let config = load_config(cli.config.as_deref())?;
    let deps = CliDependencies::from_config(&config)?;

    let run_id = new_run_id();
    let span = run_span(run_id, cli.dry_run);
    async move {
        let guards = GuardPipeline::standard(
            config.minimum_expected_count,
            config.max_removal_fraction,
        );
        debug!(guards = ?guards.names(), "guard pipeline assembled");

        let pass = ReconcilePass::new(
            deps.source,
            deps.daemon,
            guards,
            PassOptions {
                add_concurrency: config.add_concurrency,
                dry_run: cli.dry_run,
            },
        );

        info!(rpc_url = %config.daemon.rpc_url, "reconciliation started");
        let prepared = pass.prepare().await?;
        render_diff(out, prepared.diff())?;

        let report = pass.apply(prepared).await;
        log_summary(&report);
        Ok::<_, CliError>(report)
    }
    .instrument(span)
    .await
}

fn load_config(path: Option<&Path>) -> CliResult<SyncConfig> {
    let config = match path {
        Some(path) => seedsync_config::load(Some(path))?,
        None => {
            let fallback = Path::new(CONFIG_FILE_NAME);
            seedsync_config::load(fallback.is_file().then_some(fallback))?
        }
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use seedsync_core::{Identifier, RemovalOutcome};
    use seedsync_transmission::SESSION_HEADER;
    use serde_json::json;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    const RPC_PATH: &str = "/transmission/rpc";
    const SESSION: &str = "session-1";
    const PERMISSIVE: &str = "minimum_expected_count: 1\nmax_removal_fraction: 1.0\n";
    const SHORT_TIMEOUT: &str = "minimum_expected_count: 1\nrequest_timeout_secs: 1\n";

    struct Fixture {
        server: MockServer,
        _dir: TempDir,
        config_path: PathBuf,
    }

    impl Fixture {
        async fn new(extra: &str) -> Self {
            let server = MockServer::start_async().await;
            let dir = TempDir::new().expect("tempdir");
            let config_path = dir.path().join("seedsync.yaml");
            fs::write(
                &config_path,
                format!(
                    "desired_list_url: {list}\n\
                     item_url_template: {item}\n\
                     add_concurrency: 2\n\
                     {extra}\
                     daemon:\n\
                     \x20 rpc_url: {rpc}\n",
                    list = server.url("/active.txt"),
                    item = server.url("/t/{id}.torrent"),
                    rpc = server.url(RPC_PATH),
                ),
            )
            .expect("write config");
            Self {
                server,
                _dir: dir,
                config_path,
            }
        }

        fn cli(&self, extra: &[&str]) -> Cli {
            let config = self.config_path.display().to_string();
            let mut args = vec!["seedsync", "--config", config.as_str()];
            args.extend_from_slice(extra);
            Cli::try_parse_from(args).expect("arguments parse")
        }

        fn mock_session(&self) {
            self.server.mock(|when, then| {
                when.method(POST)
                    .path(RPC_PATH)
                    .json_body(json!({"method": "session-get"}));
                then.status(409).header(SESSION_HEADER, SESSION);
            });
        }

        fn mock_desired(&self, body: &str) {
            self.server.mock(|when, then| {
                when.method(GET).path("/active.txt");
                then.status(200).body(body);
            });
        }

        fn mock_current(&self, hashes: &[&str]) {
            let torrents: Vec<_> = hashes
                .iter()
                .map(|hash| json!({"hashString": hash}))
                .collect();
            self.server.mock(|when, then| {
                when.method(POST)
                    .path(RPC_PATH)
                    .header("x-transmission-session-id", SESSION)
                    .json_body(json!({
                        "method": "torrent-get",
                        "arguments": {"fields": ["hashString"]}
                    }));
                then.status(200).json_body(json!({
                    "result": "success",
                    "arguments": {"torrents": torrents}
                }));
            });
        }
    }

    fn id(raw: &str) -> Identifier {
        Identifier::parse(raw).expect("identifier")
    }

    #[tokio::test]
    async fn full_pass_removes_then_adds_and_prints_diff() {
        let fixture = Fixture::new(PERMISSIVE).await;
        fixture.mock_session();
        fixture.mock_desired("a\nb\n");
        fixture.mock_current(&["b", "c"]);
        fixture.server.mock(|when, then| {
            when.method(GET).path("/t/a.torrent");
            then.status(200).body("d8:announce");
        });
        let remove = fixture.server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-remove",
                "arguments": {"ids": ["c"], "delete-local-data": true}
            }));
            then.status(200).json_body(json!({"result": "success"}));
        });
        let add = fixture.server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-add",
                "arguments": {"metainfo": "ZDg6YW5ub3VuY2U="}
            }));
            then.status(200).json_body(json!({
                "result": "success",
                "arguments": {"torrent-added": {"hashString": "a", "name": "a"}}
            }));
        });

        let mut out = Vec::new();
        let report = execute(&fixture.cli(&[]), &mut out)
            .await
            .expect("pass succeeds");

        remove.assert();
        add.assert();
        assert_eq!(report.removal, RemovalOutcome::Removed { count: 1 });
        assert!(report.added.contains(&id("a")));
        assert!(!report.has_partial_failures());

        let printed: serde_json::Value = serde_json::from_slice(&out).expect("diff JSON");
        assert_eq!(printed, json!({"to_add": ["a"], "to_remove": ["c"]}));
    }

    #[tokio::test]
    async fn hung_payload_times_out_without_blocking_siblings() {
        let fixture = Fixture::new(SHORT_TIMEOUT).await;
        fixture.mock_session();
        fixture.mock_desired("a\nb\n");
        fixture.mock_current(&[]);
        fixture.server.mock(|when, then| {
            when.method(GET).path("/t/a.torrent");
            then.status(200)
                .body("d8:announce")
                .delay(Duration::from_secs(3));
        });
        fixture.server.mock(|when, then| {
            when.method(GET).path("/t/b.torrent");
            then.status(200).body("d8:announce");
        });
        let add = fixture.server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-add",
                "arguments": {"metainfo": "ZDg6YW5ub3VuY2U="}
            }));
            then.status(200).json_body(json!({
                "result": "success",
                "arguments": {"torrent-added": {"hashString": "b", "name": "b"}}
            }));
        });

        let mut out = Vec::new();
        let report = execute(&fixture.cli(&[]), &mut out)
            .await
            .expect("timeouts are per item");

        add.assert_calls(1);
        assert!(report.added.contains(&id("b")));
        assert!(!report.added.contains(&id("a")));
        let reason = report.skipped.get(&id("a")).expect("a skipped");
        assert!(reason.contains("timed out"), "{reason}");
        assert_eq!(report.removal, RemovalOutcome::Skipped);
    }

    #[tokio::test]
    async fn guard_abort_maps_to_exit_one_without_mutation() {
        let fixture = Fixture::new("minimum_expected_count: 5\n").await;
        fixture.mock_session();
        fixture.mock_desired("a\nb\n");
        fixture.mock_current(&["z"]);
        let payload = fixture.server.mock(|when, then| {
            when.method(GET).path("/t/a.torrent");
            then.status(200).body("d8:announce");
        });
        let remove = fixture.server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-remove",
                "arguments": {"ids": ["z"], "delete-local-data": true}
            }));
            then.status(200).json_body(json!({"result": "success"}));
        });

        let mut out = Vec::new();
        let err = execute(&fixture.cli(&[]), &mut out)
            .await
            .expect_err("guard trips");

        assert_eq!(err.exit_code(), 1);
        assert!(err.display_message().contains("too few desired items"));
        assert!(out.is_empty(), "nothing printed on abort");
        payload.assert_calls(0);
        remove.assert_calls(0);
    }

    #[tokio::test]
    async fn dry_run_prints_plan_and_leaves_daemon_alone() {
        let fixture = Fixture::new(PERMISSIVE).await;
        fixture.mock_session();
        fixture.mock_desired("a\nb\n");
        fixture.mock_current(&["b", "c"]);
        let payload = fixture.server.mock(|when, then| {
            when.method(GET).path("/t/a.torrent");
            then.status(200).body("d8:announce");
        });
        let remove = fixture.server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-remove",
                "arguments": {"ids": ["c"], "delete-local-data": true}
            }));
            then.status(200).json_body(json!({"result": "success"}));
        });

        let mut out = Vec::new();
        let report = execute(&fixture.cli(&["--dry-run"]), &mut out)
            .await
            .expect("dry run succeeds");

        assert!(report.dry_run);
        assert_eq!(report.removal, RemovalOutcome::Skipped);
        assert!(report.added.is_empty());
        payload.assert_calls(0);
        remove.assert_calls(0);
        let printed: serde_json::Value = serde_json::from_slice(&out).expect("diff JSON");
        assert_eq!(printed, json!({"to_add": ["a"], "to_remove": ["c"]}));
    }

    #[tokio::test]
    async fn rejected_credentials_are_fatal() {
        let fixture = Fixture::new("").await;
        fixture.server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(401);
        });

        let mut out = Vec::new();
        let err = execute(&fixture.cli(&[]), &mut out)
            .await
            .expect_err("401 is fatal");

        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("authenticate"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn unreadable_config_maps_to_exit_two() {
        let cli = Cli::try_parse_from(["seedsync", "--config", "/no/such/seedsync.yaml"])
            .expect("arguments parse");
        let mut out = Vec::new();
        let err = execute(&cli, &mut out).await.expect_err("missing file");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn log_format_flag_parses() {
        let cli = Cli::try_parse_from(["seedsync", "--log-format", "json", "--dry-run"])
            .expect("arguments parse");
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(cli.dry_run);
        assert!(Cli::try_parse_from(["seedsync", "--log-format", "xml"]).is_err());
    }
}
