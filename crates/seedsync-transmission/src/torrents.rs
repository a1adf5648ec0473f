use base64::{Engine as _, engine::general_purpose};
use serde::de::IgnoredAny;
use seedsync_core::{AddResult, Identifier, IdentifierSet, Payload, SessionToken};

use crate::client::TransmissionClient;
use crate::error::{TransmissionError, TransmissionResult};
use crate::models::{
    TorrentAddArguments, TorrentAddResponse, TorrentGetArguments, TorrentGetResponse,
    TorrentRemoveArguments,
};

const METHOD_GET: &str = "torrent-get";
const METHOD_REMOVE: &str = "torrent-remove";
const METHOD_ADD: &str = "torrent-add";
const HASH_FIELD: &str = "hashString";

impl TransmissionClient {
    /// Hash strings of every torrent the daemon has loaded.
    /// `torrent-get` with `fields: ["hashString"]`.
    ///
    /// # Errors
    ///
    /// Any transport, status, envelope, or decoding failure; a blank hash is rejected.
    pub async fn list_hashes(&self, session: &SessionToken) -> TransmissionResult<IdentifierSet> {
        let args = TorrentGetArguments {
            fields: &[HASH_FIELD],
        };
        let response: Option<TorrentGetResponse> = self.call(session, METHOD_GET, args).await?;
        let Some(response) = response else {
            let method = METHOD_GET;
            return Err(TransmissionError::MissingArguments { method });
        };

        response
            .torrents
            .into_iter()
            .map(|torrent| {
                Identifier::parse(&torrent.hash_string).ok_or(TransmissionError::BlankHash)
            })
            .collect()
    }

    /// Remove torrents by hash and delete their local data.
    /// `torrent-remove` with `delete-local-data: true`.
    ///
    /// # Errors
    ///
    /// Any transport, status, or envelope failure.
    pub async fn remove_torrents(
        &self,
        session: &SessionToken,
        ids: &IdentifierSet,
    ) -> TransmissionResult<()> {
        let args = TorrentRemoveArguments {
            ids: ids.iter().map(Identifier::as_str).collect(),
            delete_local_data: true,
        };
        self.call::<_, IgnoredAny>(session, METHOD_REMOVE, args).await?;
        Ok(())
    }

    /// Admit a torrent from its metainfo bytes.
    /// `torrent-add` with base64 `metainfo`.
    ///
    /// # Errors
    ///
    /// Any transport, status, or envelope failure, including the daemon rejecting the metainfo.
    pub async fn add_metainfo(
        &self,
        session: &SessionToken,
        payload: &Payload,
    ) -> TransmissionResult<AddResult> {
        let args = TorrentAddArguments {
            metainfo: general_purpose::STANDARD.encode(payload.as_bytes()),
        };
        let response: Option<TorrentAddResponse> = self.call(session, METHOD_ADD, args).await?;
        let Some(response) = response else {
            return Ok(AddResult::Added);
        };

        if let Some(existing) = response.duplicate {
            tracing::debug!(
                hash = existing.hash_string.as_deref().unwrap_or_default(),
                name = existing.name.as_deref().unwrap_or_default(),
                "torrent-add reported duplicate"
            );
            return Ok(AddResult::Duplicate);
        }
        if let Some(added) = response.added {
            tracing::debug!(
                hash = added.hash_string.as_deref().unwrap_or_default(),
                name = added.name.as_deref().unwrap_or_default(),
                "torrent-add accepted"
            );
        }
        Ok(AddResult::Added)
    }
}
