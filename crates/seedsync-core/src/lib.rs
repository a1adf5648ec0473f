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

//! Reconciliation engine that converges a torrent daemon toward a desired identifier set.
//!
//! Layout: `model` (identifiers, sets, diff, session/payload values), `guard.rs` (pre-mutation
//! guard pipeline), `plan.rs` (diff computation behind the guards), `service` (collaborator
//! traits), `reconcile.rs` (the pass state machine and per-item outcomes), `error.rs`.

pub mod error;
pub mod guard;
pub mod model;
pub mod plan;
pub mod reconcile;
pub mod service;

pub use error::{Stage, SyncError, SyncResult};
pub use guard::{Guard, GuardPipeline, GuardViolation, MaxRemovalFraction, MinimumDesiredCount};
pub use model::{AddResult, Diff, Identifier, IdentifierSet, Payload, SessionToken};
pub use plan::{PlanContext, plan};
pub use reconcile::{PassOptions, PreparedPass, ReconcilePass, RemovalOutcome, RunReport};
pub use service::{DesiredStateSource, TorrentDaemon};
