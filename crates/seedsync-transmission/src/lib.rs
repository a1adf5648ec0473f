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

//! Transmission RPC client implementing the `TorrentDaemon` seam.
//!
//! Layout: `client.rs` (HTTP plumbing and the RPC envelope), `auth.rs` (session bootstrap),
//! `torrents.rs` (`torrent-get` / `torrent-remove` / `torrent-add`), `models.rs` (wire types),
//! `daemon.rs` (trait implementation), `error.rs`.

mod auth;
mod client;
mod daemon;
mod error;
mod models;
mod torrents;

pub use auth::SESSION_HEADER;
pub use client::{BasicCredentials, DEFAULT_RPC_URL, TransmissionClient};
pub use error::{TransmissionError, TransmissionResult};
