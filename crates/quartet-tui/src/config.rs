use crate::theme::Theme;
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use quartet_core::{CatalogConfig, GeneratorConfig, RarityRule, Scope, ThrottleConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Find four groups of four among sixteen catalog items
#[derive(Debug, Parser)]
#[command(name = "quartet", version, about)]
pub struct Args {
    /// Catalog eras to draw from, e.g. "1-3", "2" or "1,4,5"
    #[arg(long, value_name = "RANGE")]
    pub eras: Option<String>,

    /// Seed for a reproducible board
    #[arg(long)]
    pub seed: Option<u64>,

    /// Catalog API root
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Minimum milliseconds between catalog requests
    #[arg(long, value_name = "MS")]
    pub spacing_ms: Option<u64>,

    /// Extra attempts after a transient lookup failure
    #[arg(long)]
    pub retries: Option<u32>,

    /// What counts as a rare item
    #[arg(long, value_enum)]
    pub rarity: Option<RarityChoice>,

    #[arg(long, value_enum)]
    pub theme: Option<ThemeChoice>,

    /// Write logs here (nothing is logged otherwise)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Rebuild the candidate pool instead of reusing the cached one
    #[arg(long)]
    pub fresh_pool: bool,

    /// Config file (defaults to <config dir>/quartet/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityChoice {
    /// The catalog's legendary/mythical flag
    Attribute,
    /// Only the `rare_ids` list from the config file
    Curated,
    /// Either of the above
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl ThemeChoice {
    pub fn theme(self) -> Theme {
        match self {
            ThemeChoice::Dark => Theme::dark(),
            ThemeChoice::Light => Theme::light(),
            ThemeChoice::HighContrast => Theme::high_contrast(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            ThemeChoice::Dark => ThemeChoice::Light,
            ThemeChoice::Light => ThemeChoice::HighContrast,
            ThemeChoice::HighContrast => ThemeChoice::Dark,
        }
    }
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub generator: GeneratorConfig,
    pub throttle: ThrottleConfig,
    pub catalog: CatalogConfig,
    pub rarity: Option<RarityChoice>,
    /// Identifiers used by the curated rarity rules
    pub rare_ids: BTreeSet<String>,
    pub theme: ThemeChoice,
}

impl FileConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quartet").join("config.json"))
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse config at {:?}", path))
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub throttle: ThrottleConfig,
    pub catalog: CatalogConfig,
    pub theme: ThemeChoice,
    pub fresh_pool: bool,
}

impl Settings {
    /// Merge command-line flags over the file configuration
    pub fn resolve(args: &Args, file: FileConfig) -> anyhow::Result<Self> {
        let FileConfig {
            mut generator,
            mut throttle,
            mut catalog,
            rarity,
            rare_ids,
            theme,
        } = file;

        if let Some(eras) = &args.eras {
            generator.scope = match Scope::parse(eras) {
                Some(scope) => scope,
                None => bail!("invalid era range {:?}", eras),
            };
        }
        if args.seed.is_some() {
            generator.seed = args.seed;
        }
        if let Some(retries) = args.retries {
            generator.fetch_retries = retries;
        }
        if let Some(choice) = args.rarity.or(rarity) {
            generator.rarity = match choice {
                RarityChoice::Attribute => RarityRule::Attribute,
                RarityChoice::Curated if rare_ids.is_empty() => {
                    bail!("curated rarity needs a non-empty rare_ids list in the config file")
                }
                RarityChoice::Curated => RarityRule::Curated(rare_ids),
                RarityChoice::Either => RarityRule::AttributeOrCurated(rare_ids),
            };
        }
        if let Some(url) = &args.base_url {
            catalog.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = args.spacing_ms {
            throttle.min_spacing = Duration::from_millis(ms);
        }

        generator.validate()?;

        Ok(Self {
            generator,
            throttle,
            catalog,
            theme: args.theme.unwrap_or(theme),
            fresh_pool: args.fresh_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("quartet").chain(flags.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_flags_or_file() {
        let settings = Settings::resolve(&args(&[]), FileConfig::default()).unwrap();
        assert_eq!(settings.generator, GeneratorConfig::default());
        assert_eq!(settings.throttle.min_spacing, Duration::from_millis(120));
        assert_eq!(settings.catalog.base_url, "https://pokeapi.co/api/v2");
        assert_eq!(settings.theme, ThemeChoice::Dark);
        assert!(!settings.fresh_pool);
    }

    #[test]
    fn test_flags_win_over_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "generator": { "scope": { "units": ["4"] }, "seed": 3 },
                "throttle": { "min_spacing": 500 },
                "theme": "light"
            }"#,
        )
        .unwrap();
        assert_eq!(file.generator.group_size, 4);

        let settings = Settings::resolve(
            &args(&["--eras", "2-3", "--seed", "9", "--spacing-ms", "0", "--fresh-pool"]),
            file,
        )
        .unwrap();
        assert_eq!(settings.generator.scope, Scope::eras(2, 3));
        assert_eq!(settings.generator.seed, Some(9));
        assert_eq!(settings.throttle.min_spacing, Duration::ZERO);
        assert_eq!(settings.theme, ThemeChoice::Light);
        assert!(settings.fresh_pool);
    }

    #[test]
    fn test_file_values_survive_missing_flags() {
        let file = FileConfig {
            generator: GeneratorConfig::eras(5, 6).with_seed(1),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args(&["--retries", "3"]), file).unwrap();
        assert_eq!(settings.generator.scope, Scope::eras(5, 6));
        assert_eq!(settings.generator.seed, Some(1));
        assert_eq!(settings.generator.fetch_retries, 3);
    }

    #[test]
    fn test_rarity_choices() {
        let file = FileConfig {
            rare_ids: ["ditto".to_string()].into_iter().collect(),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args(&["--rarity", "either"]), file.clone()).unwrap();
        assert!(settings.generator.rarity.listed("ditto"));
        assert!(settings.generator.rarity.uses_attribute());

        let settings = Settings::resolve(&args(&["--rarity", "curated"]), file).unwrap();
        assert!(!settings.generator.rarity.uses_attribute());

        assert!(Settings::resolve(&args(&["--rarity", "curated"]), FileConfig::default()).is_err());
    }

    #[test]
    fn test_bad_era_range_rejected() {
        assert!(Settings::resolve(&args(&["--eras", "a-b"]), FileConfig::default()).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings =
            Settings::resolve(&args(&["--base-url", "http://localhost:8080/api/"]), FileConfig::default())
                .unwrap();
        assert_eq!(settings.catalog.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_empty_board_shape_rejected() {
        let file: FileConfig = serde_json::from_str(r#"{ "generator": { "group_count": 0 } }"#).unwrap();
        assert!(Settings::resolve(&args(&[]), file).is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("quartet-config-that-does-not-exist.json");
        assert_eq!(FileConfig::load(&path).unwrap(), FileConfig::default());
    }
}
