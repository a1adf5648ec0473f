#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File-backed configuration for a reconciliation run.
//!
//! Layout: `model.rs` (raw document and validated config), `defaults.rs` (default values),
//! `validate.rs` (document to config conversion), `loader.rs` (YAML + environment overlay),
//! `error.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, load, load_with_env, parse_document};
pub use model::{
    ConfigDocument, DaemonConfig, DaemonCredentials, DaemonDocument, ItemUrlTemplate, SyncConfig,
};
pub use validate::validate;
