//! HTTP adapter for a PokeAPI-compatible REST catalog.

use super::wire::{GenerationResource, SpeciesResource, VariantResource};
use super::MetadataProvider;
use crate::config::CatalogConfig;
use crate::error::ProviderError;
use crate::item::{canonical_form, normalize_id, ItemRecord};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Catalog client over HTTP
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            client: build_client(config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "catalog request");

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        let response = response.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

impl Default for HttpCatalog {
    fn default() -> Self {
        Self::new(&CatalogConfig::default())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(config: &CatalogConfig) -> Client {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn build_client(_config: &CatalogConfig) -> Client {
    Client::new()
}

#[async_trait(?Send)]
impl MetadataProvider for HttpCatalog {
    async fn get_item(&self, id: &str) -> Result<ItemRecord, ProviderError> {
        let variant: VariantResource = self
            .fetch(&format!("pokemon/{}", canonical_form(id)))
            .await?;
        let species: SpeciesResource = self.fetch(&format!("pokemon-species/{}", id)).await?;

        Ok(ItemRecord {
            id: id.to_string(),
            categories: variant.category_tags(),
            era: species.generation.as_ref().map(|g| g.name.clone()),
            rare: species.is_legendary || species.is_mythical,
            lineage: species.lineage_id(),
        })
    }

    async fn list_scope(&self, unit: &str) -> Result<Vec<String>, ProviderError> {
        let generation: GenerationResource = self.fetch(&format!("generation/{}", unit)).await?;
        Ok(generation
            .pokemon_species
            .into_iter()
            .map(|species| normalize_id(&species.name))
            .filter(|id| !id.is_empty())
            .collect())
    }
}
