//! Session driver: pool build, assembly and board record fetch, plus the
//! generation counter that keeps stale results out of a newer session.

use crate::assembler::BoardAssembler;
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::game::GameState;
use crate::item::ItemRecord;
use crate::lookup::Lookup;
use crate::pool::PoolCache;
use crate::provider::MetadataProvider;
use futures::future::join_all;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{info, warn};

/// Monotonic generation counter shared by a session's requests
#[derive(Debug, Clone, Default)]
pub struct GenerationGuard {
    current: Rc<Cell<u64>>,
}

/// Proof that a generation was the latest one requested
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    id: u64,
    current: Rc<Cell<u64>>,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a generation, invalidating every earlier ticket
    pub fn begin(&self) -> GenerationTicket {
        let id = self.current.get().wrapping_add(1);
        self.current.set(id);
        GenerationTicket {
            id,
            current: Rc::clone(&self.current),
        }
    }
}

impl GenerationTicket {
    pub fn is_current(&self) -> bool {
        self.current.get() == self.id
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn check(&self) -> Result<(), GenerateError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(GenerateError::Superseded)
        }
    }
}

/// Builds complete game sessions from a metadata provider
pub struct Generator<P> {
    provider: P,
    config: GeneratorConfig,
    pools: PoolCache,
    guard: GenerationGuard,
}

impl<P: MetadataProvider> Generator<P> {
    pub fn new(provider: P, config: GeneratorConfig) -> Self {
        Self {
            provider,
            config,
            pools: PoolCache::new(),
            guard: GenerationGuard::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GeneratorConfig) {
        self.config = config;
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn pools(&self) -> &PoolCache {
        &self.pools
    }

    pub fn guard(&self) -> &GenerationGuard {
        &self.guard
    }

    /// Generate a new session, reusing a memoized pool when available
    pub async fn generate(&self) -> Result<GameState, GenerateError> {
        let ticket = self.guard.begin();
        self.generate_guarded(&ticket, false).await
    }

    /// Generate with an explicit ticket.
    ///
    /// Returns `Superseded` as soon as a newer generation has begun, so a
    /// stale board is never published. Either a complete board comes back or
    /// nothing does.
    pub async fn generate_guarded(
        &self,
        ticket: &GenerationTicket,
        fresh_pool: bool,
    ) -> Result<GameState, GenerateError> {
        self.config.validate()?;
        let required = self.config.board_size();
        let pool = self
            .pools
            .get_or_build(&self.provider, &self.config.scope, required, fresh_pool)
            .await?;
        ticket.check()?;

        let mut lookup = Lookup::new(&self.provider, &self.config);
        let puzzle = BoardAssembler::new(pool.ids().to_vec(), &mut lookup)
            .assemble()
            .await?;
        ticket.check()?;

        let failures = lookup.failures();
        let mut known = lookup.into_records();
        let missing: Vec<&String> = puzzle
            .layout
            .iter()
            .filter(|id| !known.contains_key(id.as_str()))
            .collect();
        let fetched = join_all(missing.iter().map(|id| self.provider.get_item(id))).await;
        ticket.check()?;

        for (id, result) in missing.into_iter().zip(fetched) {
            let record = match result {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(%id, error = %err, "board item shown without attributes");
                    None
                }
            };
            known.insert(id.clone(), record);
        }

        let records: HashMap<String, ItemRecord> = known
            .into_iter()
            .filter_map(|(id, record)| Some((id, record?)))
            .filter(|(id, _)| puzzle.layout.contains(id))
            .collect();

        info!(
            generation = ticket.id(),
            pool = pool.len(),
            lookup_failures = failures,
            "session ready"
        );
        Ok(GameState::new(puzzle, &records))
    }
}
