//! Wire types for the Transmission RPC protocol.

use serde::{Deserialize, Serialize};

/// Request envelope: `{"method": ..., "arguments": {...}}`.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, A> {
    pub(crate) method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) arguments: Option<A>,
}

/// Response envelope: `{"result": "success", "arguments": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<R> {
    pub(crate) result: String,
    pub(crate) arguments: Option<R>,
}

/// Arguments for `torrent-get`.
#[derive(Debug, Serialize)]
pub(crate) struct TorrentGetArguments<'a> {
    pub(crate) fields: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
pub(crate) struct TorrentGetResponse {
    #[serde(default)]
    pub(crate) torrents: Vec<TorrentHash>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TorrentHash {
    #[serde(rename = "hashString")]
    pub(crate) hash_string: String,
}

/// Arguments for `torrent-remove`.
#[derive(Debug, Serialize)]
pub(crate) struct TorrentRemoveArguments<'a> {
    pub(crate) ids: Vec<&'a str>,
    #[serde(rename = "delete-local-data")]
    pub(crate) delete_local_data: bool,
}

/// Arguments for `torrent-add`; `metainfo` is base64-encoded `.torrent` content.
#[derive(Debug, Serialize)]
pub(crate) struct TorrentAddArguments {
    pub(crate) metainfo: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TorrentAddResponse {
    #[serde(rename = "torrent-added")]
    pub(crate) added: Option<AddedTorrent>,
    #[serde(rename = "torrent-duplicate")]
    pub(crate) duplicate: Option<AddedTorrent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddedTorrent {
    #[serde(rename = "hashString")]
    pub(crate) hash_string: Option<String>,
    pub(crate) name: Option<String>,
}
