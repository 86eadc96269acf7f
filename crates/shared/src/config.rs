//! Fee engine configuration management.

use serde::Deserialize;

use crate::error::MoneyResult;
use crate::math::Math;

/// Fee engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeeConfig {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Built-in and custom strategy configuration.
    #[serde(default)]
    pub strategies: StrategiesConfig,
    /// Composite solver configuration.
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Scale every request and result amount is normalized to.
    #[serde(default = "default_engine_scale")]
    pub scale: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale: default_engine_scale(),
        }
    }
}

fn default_engine_scale() -> i64 {
    2
}

/// Strategy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategiesConfig {
    /// Scale used by the built-in strategies.
    #[serde(default = "default_strategy_scale")]
    pub scale: i64,
    /// Flat percentage + fixed strategies registered next to the built-ins.
    #[serde(default)]
    pub custom: Vec<CustomStrategyConfig>,
    /// Composite strategies built from already registered strategies.
    #[serde(default)]
    pub composite: Vec<CompositeStrategyConfig>,
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        Self {
            scale: default_strategy_scale(),
            custom: Vec::new(),
            composite: Vec::new(),
        }
    }
}

fn default_strategy_scale() -> i64 {
    8
}

/// A flat strategy declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomStrategyConfig {
    /// Registry name.
    pub name: String,
    /// Percentage in decimal format (e.g. "0.029").
    pub percentage_rate: String,
    /// Fixed surcharge.
    #[serde(default = "default_fixed_fee")]
    pub fixed_fee: String,
}

fn default_fixed_fee() -> String {
    "0".to_string()
}

/// A composite strategy declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositeStrategyConfig {
    /// Registry name.
    pub name: String,
    /// Names of the child strategies, in evaluation order.
    pub strategies: Vec<String>,
}

/// Composite solver configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    /// Maximum bisection iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_max_iterations() -> u32 {
    50
}

impl FeeConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `FEECALC__*` environment variables (e.g. `FEECALC__ENGINE__SCALE`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FEECALC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the validated engine scale.
    pub fn engine_scale(&self) -> MoneyResult<u32> {
        Math::checked_scale(self.engine.scale)
    }

    /// Returns the validated strategy scale.
    pub fn strategy_scale(&self) -> MoneyResult<u32> {
        Math::checked_scale(self.strategies.scale)
    }

    /// Returns the solver iteration cap, never below one.
    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.solver.max_iterations.max(1)
    }
}
