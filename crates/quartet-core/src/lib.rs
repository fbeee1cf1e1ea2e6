//! Quartet core: board generation and group validation for a four-by-four
//! connections puzzle built from a remote item catalog.
//!
//! Data flows one way: [`pool`] gathers candidate identifiers, [`strategy`]
//! carves groups out of them using [`provider`] metadata, [`assembler`]
//! orders the strategies into a complete partition, and [`game`] holds the
//! shuffled board that players guess against.

pub mod assembler;
pub mod config;
pub mod describe;
pub mod error;
pub mod game;
pub mod item;
pub mod lookup;
pub mod pool;
pub mod provider;
pub mod session;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;


pub use assembler::{BoardAssembler, Puzzle};
pub use config::{CatalogConfig, GeneratorConfig, RarityRule, Scope, ThrottleConfig};
pub use describe::Connection;
pub use error::{GenerateError, GuessError, ProviderError, SelectError};
pub use game::{BoardView, EntryView, GameState, GameStatus, GroupView, GuessOutcome, Toggle};
pub use item::ItemRecord;
pub use pool::{CandidatePool, PoolCache};
pub use provider::{MetadataProvider, NoPause, Pause, Throttled};
pub use session::{GenerationGuard, GenerationTicket, Generator};
pub use strategy::{Group, GroupRule, Strategy};

#[cfg(feature = "http")]
pub use provider::http::HttpCatalog;
