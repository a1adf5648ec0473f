//! HTTP implementation of the desired-state source.
//!
//! The desired list is newline-delimited text at a fixed URL; each item's metainfo lives at
//! the configured template with `{id}` substituted.

use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use seedsync_config::ItemUrlTemplate;
use seedsync_core::{DesiredStateSource, Identifier, IdentifierSet, Payload};
use tracing::debug;
use url::Url;

/// Desired-state source backed by two HTTP endpoints.
#[derive(Debug, Clone)]
pub(crate) struct HttpDesiredSource {
    client: Client,
    list_url: Url,
    item_url_template: ItemUrlTemplate,
}

impl HttpDesiredSource {
    pub(crate) const fn new(
        client: Client,
        list_url: Url,
        item_url_template: ItemUrlTemplate,
    ) -> Self {
        Self {
            client,
            list_url,
            item_url_template,
        }
    }
}

#[async_trait]
impl DesiredStateSource for HttpDesiredSource {
    async fn desired(&self) -> anyhow::Result<IdentifierSet> {
        let response = self
            .client
            .get(self.list_url.clone())
            .send()
            .await
            .with_context(|| format!("desired list request to {} failed", self.list_url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("desired list returned status {status}");
        }

        let body = response
            .text()
            .await
            .context("failed to read desired list body")?;
        let desired = IdentifierSet::from_lines(&body);
        debug!(url = %self.list_url, count = desired.len(), "desired list fetched");
        Ok(desired)
    }

    async fn payload(&self, id: &Identifier) -> anyhow::Result<Payload> {
        let url = self
            .item_url_template
            .url_for(id.as_str())
            .map_err(|err| anyhow!("item URL for {id} is invalid: {err}"))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("payload request failed")?;

        let status = response.status();
        if status != StatusCode::OK {
            bail!("payload returned status {status}");
        }

        let bytes = response
            .bytes()
            .await
            .context("failed to read payload body")?;
        if bytes.is_empty() {
            bail!("payload body is empty");
        }
        Ok(Payload::new(bytes.to_vec()))
    }
}
