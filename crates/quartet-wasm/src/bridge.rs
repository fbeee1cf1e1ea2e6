//! Plain-Rust helpers behind the JavaScript surface.

use quartet_core::{CatalogConfig, GeneratorConfig, Scope, ThrottleConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options accepted by the `QuartetGame` constructor. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// "1-3", "2" or "1,4,5"
    pub eras: Option<String>,
    pub seed: Option<u64>,
    pub base_url: Option<String>,
    pub spacing_ms: Option<u64>,
    pub retries: Option<u32>,
}

/// Runtime configuration derived from [`Options`]
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub generator: GeneratorConfig,
    pub throttle: ThrottleConfig,
    pub catalog: CatalogConfig,
}

impl Options {
    pub fn resolve(&self) -> Result<Resolved, String> {
        let mut generator = GeneratorConfig::default();
        let mut throttle = ThrottleConfig::default();
        let mut catalog = CatalogConfig::default();

        if let Some(eras) = &self.eras {
            generator.scope = Scope::parse(eras).ok_or_else(|| format!("invalid era range {:?}", eras))?;
        }
        generator.seed = self.seed;
        if let Some(retries) = self.retries {
            generator.fetch_retries = retries;
        }
        if let Some(url) = &self.base_url {
            catalog.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = self.spacing_ms {
            throttle.min_spacing = Duration::from_millis(ms);
        }

        Ok(Resolved {
            generator,
            throttle,
            catalog,
        })
    }
}

/// Browser timers take whole milliseconds as u32
pub fn timeout_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
