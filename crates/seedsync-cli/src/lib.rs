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
#![allow(clippy::redundant_pub_crate)]

//! `seedsync` binary: one reconciliation pass per invocation.
//!
//! Layout:
//! - `cli.rs`: argument parsing, the pass driver, and exit-code mapping
//! - `client.rs`: HTTP client construction and the CLI error type
//! - `source.rs`: HTTP implementation of the desired-state source
//! - `output.rs`: stdout rendering and the run summary
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod output;
pub(crate) mod source;

pub use cli::run;
