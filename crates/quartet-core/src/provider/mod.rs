//! Metadata provider boundary.
//!
//! A provider answers two questions: what are the attributes of an item, and
//! which items belong to a scope unit. It never retries; callers decide how to
//! degrade. Providers are rate-sensitive, so production code wraps them in
//! [`Throttled`].

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
mod wire;

use crate::config::ThrottleConfig;
use crate::error::ProviderError;
use crate::item::ItemRecord;
use async_trait::async_trait;
use futures::lock::Mutex;
use std::time::Duration;

/// Queryable item catalog
#[async_trait(?Send)]
pub trait MetadataProvider {
    /// Attributes of a single item
    async fn get_item(&self, id: &str) -> Result<ItemRecord, ProviderError>;

    /// Identifiers belonging to one scope unit
    async fn list_scope(&self, unit: &str) -> Result<Vec<String>, ProviderError>;
}

#[async_trait(?Send)]
impl<P: MetadataProvider + ?Sized> MetadataProvider for std::rc::Rc<P> {
    async fn get_item(&self, id: &str) -> Result<ItemRecord, ProviderError> {
        (**self).get_item(id).await
    }

    async fn list_scope(&self, unit: &str) -> Result<Vec<String>, ProviderError> {
        (**self).list_scope(unit).await
    }
}

/// Non-blocking delay, supplied by the host runtime
#[async_trait(?Send)]
pub trait Pause {
    async fn pause(&self, duration: Duration);
}

/// Pause that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

#[async_trait(?Send)]
impl Pause for NoPause {
    async fn pause(&self, _duration: Duration) {}
}

/// Provider wrapper enforcing a minimum spacing between calls.
///
/// Calls queue on an async mutex; every call after the first waits
/// `min_spacing` before reaching the inner provider, so concurrent callers
/// are spaced out rather than rejected.
pub struct Throttled<P, S> {
    inner: P,
    pause: S,
    config: ThrottleConfig,
    gate: Mutex<GateState>,
}

#[derive(Default)]
struct GateState {
    calls: u64,
}

impl<P, S> Throttled<P, S> {
    pub fn new(inner: P, pause: S, config: ThrottleConfig) -> Self {
        Self {
            inner,
            pause,
            config,
            gate: Mutex::new(GateState::default()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P, S: Pause> Throttled<P, S> {
    async fn wait_turn(&self) {
        let mut gate = self.gate.lock().await;
        if gate.calls > 0 && !self.config.min_spacing.is_zero() {
            self.pause.pause(self.config.min_spacing).await;
        }
        gate.calls += 1;
    }
}

#[async_trait(?Send)]
impl<P: MetadataProvider, S: Pause> MetadataProvider for Throttled<P, S> {
    async fn get_item(&self, id: &str) -> Result<ItemRecord, ProviderError> {
        self.wait_turn().await;
        self.inner.get_item(id).await
    }

    async fn list_scope(&self, unit: &str) -> Result<Vec<String>, ProviderError> {
        self.wait_turn().await;
        self.inner.list_scope(unit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryCatalog;
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// Records requested pauses instead of sleeping
    #[derive(Default)]
    struct RecordingPause {
        pauses: RefCell<Vec<Duration>>,
    }

    #[async_trait(?Send)]
    impl Pause for &RecordingPause {
        async fn pause(&self, duration: Duration) {
            self.pauses.borrow_mut().push(duration);
        }
    }

    #[test]
    fn test_throttle_spaces_every_call_after_the_first() {
        let catalog = MemoryCatalog::sample();
        let pause = RecordingPause::default();
        let config = ThrottleConfig {
            min_spacing: Duration::from_millis(50),
        };
        let throttled = Throttled::new(catalog, &pause, config);

        block_on(async {
            throttled.list_scope("1").await.unwrap();
            throttled.get_item("bulbasaur").await.unwrap();
            let _ = throttled.get_item("missingno").await;
        });

        assert_eq!(*pause.pauses.borrow(), vec![Duration::from_millis(50); 2]);
        assert_eq!(throttled.inner().item_calls(), 2);
    }

    #[test]
    fn test_throttle_serializes_concurrent_calls() {
        let catalog = MemoryCatalog::sample();
        let pause = RecordingPause::default();
        let throttled = Throttled::new(catalog, &pause, ThrottleConfig::default());

        let ids = ["bulbasaur", "ivysaur", "charmander", "squirtle"];
        let results = block_on(futures::future::join_all(
            ids.iter().map(|id| throttled.get_item(id)),
        ));

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(pause.pauses.borrow().len(), ids.len() - 1);
    }

    #[test]
    fn test_zero_spacing_never_pauses() {
        let pause = RecordingPause::default();
        let config = ThrottleConfig {
            min_spacing: Duration::ZERO,
        };
        let throttled = Throttled::new(MemoryCatalog::sample(), &pause, config);
        block_on(async {
            throttled.get_item("bulbasaur").await.unwrap();
            throttled.get_item("ivysaur").await.unwrap();
        });
        assert!(pause.pauses.borrow().is_empty());
    }
}
