//! Collaborator traits the reconciliation pass is driven through.

use async_trait::async_trait;

use crate::model::{AddResult, Identifier, IdentifierSet, Payload, SessionToken};

/// Authoritative source of the desired identifier set and per-item payloads.
#[async_trait]
pub trait DesiredStateSource: Send + Sync {
    /// Fetch the identifiers that should be loaded. Blank entries are already dropped.
    async fn desired(&self) -> anyhow::Result<IdentifierSet>;

    /// Fetch the metainfo bytes for one identifier.
    ///
    /// Implementations return an error when the payload is unavailable (non-success status or
    /// empty body); the caller skips that item.
    async fn payload(&self, id: &Identifier) -> anyhow::Result<Payload>;
}

/// Remote torrent daemon reached through a session-authenticated protocol.
#[async_trait]
pub trait TorrentDaemon: Send + Sync {
    /// Obtain the session token used by every later call in the run.
    async fn authenticate(&self) -> anyhow::Result<SessionToken>;

    /// Enumerate the identifiers currently loaded.
    async fn list_current(&self, session: &SessionToken) -> anyhow::Result<IdentifierSet>;

    /// Remove every identifier in one batch, deleting local data.
    async fn remove(&self, session: &SessionToken, ids: &IdentifierSet) -> anyhow::Result<()>;

    /// Admit one torrent by its metainfo.
    async fn add(&self, session: &SessionToken, payload: Payload) -> anyhow::Result<AddResult>;
}
