//! JSON shapes of the PokeAPI-compatible catalog resources we read.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct NamedResource {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UrlResource {
    pub url: String,
}

/// `GET /generation/{unit}`
#[derive(Debug, Deserialize)]
pub(crate) struct GenerationResource {
    #[serde(default)]
    pub pokemon_species: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// `GET /pokemon/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct VariantResource {
    #[serde(default)]
    pub types: Vec<TypeSlot>,
}

impl VariantResource {
    /// Type names ordered by slot
    pub fn category_tags(mut self) -> Vec<String> {
        self.types.sort_by_key(|t| t.slot);
        self.types.into_iter().map(|t| t.kind.name).collect()
    }
}

/// `GET /pokemon-species/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct SpeciesResource {
    pub generation: Option<NamedResource>,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
    pub evolution_chain: Option<UrlResource>,
}

impl SpeciesResource {
    /// Trailing numeric segment of the evolution chain URL
    pub fn lineage_id(&self) -> Option<String> {
        let url = self.evolution_chain.as_ref()?.url.trim_end_matches('/');
        let id = url.rsplit('/').next()?;
        (!id.is_empty()).then(|| id.to_string())
    }
}
