//! Configuration for the calculator engine.
//!
//! [`EngineConfig`] is a plain struct: construct it in code, starting from
//! [`Default`] and adjusting with the `with_*` setters. No config-file format
//! is involved.
//!
//! # Example
//!
//! ```rust
//! use scicalc::{CalculatorEngine, EngineConfig, OperatorNotation};
//!
//! let config = EngineConfig::default()
//!     .with_history_capacity(50)
//!     .with_notation(OperatorNotation::Symbol);
//!
//! let engine = CalculatorEngine::with_config(config);
//! assert_eq!(engine.config().history_capacity, 50);
//! ```

use serde::{Deserialize, Serialize};

use crate::scicalc::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_DISPLAY_LIMIT};
use crate::scicalc::operation::{Operator, UnaryFunction};

/// How operators and functions are spelled in recorded history expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorNotation {
    /// Canonical names: `"7 add 3"`, `"sqrt(16)"`, `"log10(100)"`.
    #[default]
    Name,
    /// Keypad symbols: `"7 + 3"`, `"√(16)"`, `"log(100)"`.
    Symbol,
}

impl OperatorNotation {
    pub fn operator(self, op: Operator) -> &'static str {
        match self {
            OperatorNotation::Name => op.name(),
            OperatorNotation::Symbol => op.symbol(),
        }
    }

    pub fn function(self, func: UnaryFunction) -> &'static str {
        match self {
            OperatorNotation::Name => func.name(),
            OperatorNotation::Symbol => func.symbol(),
        }
    }
}

/// Tunables for a [`CalculatorEngine`](crate::CalculatorEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of history entries retained (default 20).
    pub history_capacity: usize,
    /// How many entries [`recent_history`](crate::CalculatorEngine::recent_history)
    /// returns (default 10).
    pub history_display_limit: usize,
    /// Spelling used when recording expressions.
    pub notation: OperatorNotation,
}

impl EngineConfig {
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_history_display_limit(mut self, limit: usize) -> Self {
        self.history_display_limit = limit;
        self
    }

    pub fn with_notation(mut self, notation: OperatorNotation) -> Self {
        self.notation = notation;
        self
    }
}

impl Default for EngineConfig {
    /// 20 retained entries, 10 displayed, names in expressions.
    ///
    /// ```rust
    /// use scicalc::{EngineConfig, OperatorNotation};
    ///
    /// let config = EngineConfig::default();
    /// assert_eq!(config.history_capacity, 20);
    /// assert_eq!(config.history_display_limit, 10);
    /// assert_eq!(config.notation, OperatorNotation::Name);
    /// ```
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_display_limit: DEFAULT_HISTORY_DISPLAY_LIMIT,
            notation: OperatorNotation::default(),
        }
    }
}
