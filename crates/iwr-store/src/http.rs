//! HTTP implementation of [`StoreClient`] against a running warehouse.

use async_trait::async_trait;
use iwr_types::{AttributeSet, EntityId, EntityType};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::{RawDocument, StoreClient};
use crate::xml;

/// Warehouse client speaking the plain REST interface.
///
/// One instance per configured warehouse; it is cheap to clone and is meant
/// to be shared behind an `Arc<dyn StoreClient>`.
#[derive(Debug, Clone)]
pub struct HttpStore {
    /// Base URL without a trailing slash
    base_url: String,

    client: Client,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: EntityType) -> String {
        format!("{}/{}", self.base_url, collection.collection())
    }

    fn object_url(&self, collection: EntityType, id: &EntityId, leaf: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, collection.collection(), id, leaf)
    }

    /// Turn a non-success response into a transport error, keeping the body
    /// for diagnostics.
    async fn unexpected(context: &str, response: Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StoreError::Transport(format!("{context}: status {status}: {body}"))
    }
}

#[async_trait]
impl StoreClient for HttpStore {
    async fn get_attributes(&self, collection: EntityType, id: &EntityId) -> StoreResult<AttributeSet> {
        let url = self.object_url(collection, id, "_attrs");
        debug!(%url, "loading attributes");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(StoreError::NotFound {
                    collection,
                    id: id.clone(),
                })
            }
            status if !status.is_success() => {
                return Err(Self::unexpected(&url, response).await);
            }
            _ => {}
        }

        let body = response.text().await?;
        let mut attributes = AttributeSet::new();
        for listed in xml::parse_attribute_listing(&body)? {
            // Listings may name an attribute without inlining its value.
            let content = match listed.content {
                Some(content) => content,
                None => self
                    .get_attribute(collection, id, &listed.name)
                    .await?
                    .unwrap_or_default(),
            };
            attributes.insert(listed.name, content);
        }
        Ok(attributes)
    }

    async fn get_attribute(
        &self,
        collection: EntityType,
        id: &EntityId,
        name: &str,
    ) -> StoreResult<Option<String>> {
        let url = self.object_url(collection, id, name);
        debug!(%url, "reading attribute");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            _ => Err(Self::unexpected(&url, response).await),
        }
    }

    async fn put_attribute(
        &self,
        collection: EntityType,
        id: &EntityId,
        name: &str,
        content: &str,
    ) -> StoreResult<()> {
        let url = self.object_url(collection, id, name);
        debug!(%url, content, "writing attribute");

        let response = self
            .client
            .put(&url)
            .body(content.to_string())
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                collection,
                id: id.clone(),
            }),
            status if status.is_success() => Ok(()),
            _ => Err(Self::unexpected(&url, response).await),
        }
    }

    async fn list_ids(&self, collection: EntityType) -> StoreResult<Vec<EntityId>> {
        let url = self.collection_url(collection);
        debug!(%url, "listing collection");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(StoreError::CollectionNotFound(collection)),
            status if !status.is_success() => {
                return Err(Self::unexpected(&url, response).await);
            }
            _ => {}
        }

        let body = response.text().await?;
        let ids = xml::parse_key_listing(&body)?
            .into_iter()
            .filter_map(|key| match EntityId::new(key.clone()) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(%collection, key, error = %e, "ignoring unusable key in listing");
                    None
                }
            })
            .collect();
        Ok(ids)
    }

    async fn get_raw(&self, path: &str) -> StoreResult<RawDocument> {
        let path = path.trim_start_matches('/');
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "fetching raw resource");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(StoreError::PathNotFound(path.to_string())),
            status if !status.is_success() => {
                return Err(Self::unexpected(&url, response).await);
            }
            _ => {}
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(RawDocument {
            content_type,
            body: response.text().await?,
        })
    }
}
