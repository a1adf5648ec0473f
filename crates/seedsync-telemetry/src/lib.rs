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

//! Logging setup and run-scoped tracing context for seedsync.
//!
//! Layout: `init.rs` (subscriber installation and formats), `context.rs` (run span helpers).

pub mod context;
pub mod init;

pub use context::{new_run_id, run_span};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
