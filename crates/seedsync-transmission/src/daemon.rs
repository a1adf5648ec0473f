use async_trait::async_trait;
use seedsync_core::{AddResult, IdentifierSet, Payload, SessionToken, TorrentDaemon};

use crate::client::TransmissionClient;

#[async_trait]
impl TorrentDaemon for TransmissionClient {
    async fn authenticate(&self) -> anyhow::Result<SessionToken> {
        Ok(Self::authenticate(self).await?)
    }

    async fn list_current(&self, session: &SessionToken) -> anyhow::Result<IdentifierSet> {
        Ok(self.list_hashes(session).await?)
    }

    async fn remove(&self, session: &SessionToken, ids: &IdentifierSet) -> anyhow::Result<()> {
        Ok(self.remove_torrents(session, ids).await?)
    }

    async fn add(&self, session: &SessionToken, payload: Payload) -> anyhow::Result<AddResult> {
        Ok(self.add_metainfo(session, &payload).await?)
    }
}
