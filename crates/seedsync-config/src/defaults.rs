//! Default values applied when the document leaves a field out.

/// Default Transmission RPC endpoint.
pub const DAEMON_RPC_URL: &str = "http://localhost:9091/transmission/rpc";
/// Smallest desired set accepted before the run aborts.
pub const MINIMUM_EXPECTED_COUNT: usize = 100;
/// Largest share of loaded torrents a single run may remove.
pub const MAX_REMOVAL_FRACTION: f64 = 0.10;
/// Per-request timeout for every outbound call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Concurrent fetch-then-submit additions.
pub const ADD_CONCURRENCY: usize = 4;
/// Placeholder substituted with the identifier in `item_url_template`.
pub const ID_PLACEHOLDER: &str = "{id}";
/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE_NAME: &str = "seedsync.yaml";
