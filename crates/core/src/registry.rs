//! Strategy registry: the engine's only view of available strategies.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use feecalc_shared::FeeConfig;
use tracing::debug;

use crate::error::{FeeError, FeeResult};
use crate::strategy::{
    AdyenInterchangePlusPlusStrategy, CompositeFeeStrategy, FeeStrategy, FlatRateStrategy,
    PayPalCommercialTransactionStrategy, WiseTransferStrategy,
};

/// Name-keyed collection of strategies.
///
/// Registering a name twice replaces the earlier strategy.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Arc<dyn FeeStrategy>>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the five built-in strategies.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_core::StrategyRegistry;
    ///
    /// let registry = StrategyRegistry::with_defaults(8).unwrap();
    /// assert!(registry.has("stripe.standard_card"));
    /// assert!(registry.has("wise.transfer"));
    /// ```
    pub fn with_defaults(scale: u32) -> FeeResult<Self> {
        let mut registry = Self::new();
        registry
            .register(FlatRateStrategy::stripe_standard_card(scale)?)
            .register(FlatRateStrategy::stripe_international_surcharge(scale)?)
            .register(PayPalCommercialTransactionStrategy::new(scale)?)
            .register(WiseTransferStrategy::new(scale)?)
            .register(AdyenInterchangePlusPlusStrategy::new(scale)?);
        Ok(registry)
    }

    /// Creates a registry from configuration.
    ///
    /// Registers the built-ins, then every configured flat strategy, then
    /// every configured composite. Composite children are resolved against
    /// what is registered so far, so a composite may reference an earlier
    /// one.
    pub fn from_config(config: &FeeConfig) -> FeeResult<Self> {
        let scale = config.strategy_scale()?;
        let mut registry = Self::with_defaults(scale)?;
        for custom in &config.strategies.custom {
            registry.register(FlatRateStrategy::new(
                &custom.name,
                &custom.percentage_rate,
                &custom.fixed_fee,
                scale,
            )?);
        }
        for composite in &config.strategies.composite {
            let children = composite
                .strategies
                .iter()
                .map(|name| registry.get(name))
                .collect::<FeeResult<Vec<_>>>()?;
            registry.register(
                CompositeFeeStrategy::new(&composite.name, children, scale)?
                    .with_max_iterations(config.max_iterations()),
            );
        }
        Ok(registry)
    }

    /// Registers a strategy under its own name.
    pub fn register<S: FeeStrategy + 'static>(&mut self, strategy: S) -> &mut Self {
        self.register_shared(Arc::new(strategy))
    }

    /// Registers an already shared strategy.
    pub fn register_shared(&mut self, strategy: Arc<dyn FeeStrategy>) -> &mut Self {
        let name = strategy.name().to_string();
        if self.strategies.insert(name.clone(), strategy).is_some() {
            debug!(strategy = %name, "replaced registered fee strategy");
        }
        self
    }

    /// Looks up a strategy by name.
    pub fn get(&self, name: &str) -> FeeResult<Arc<dyn FeeStrategy>> {
        self.strategies
            .get(name.trim())
            .cloned()
            .ok_or_else(|| FeeError::StrategyNotFound(name.trim().to_string()))
    }

    /// Returns true if a strategy is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.strategies.contains_key(name.trim())
    }

    /// Returns every registered strategy in name order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn FeeStrategy>> {
        self.strategies.values().cloned().collect()
    }

    /// Returns every registered name in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
