//! # scicalc
//!
//! scicalc is the state machine behind a keypad-driven scientific calculator.
//! It turns a stream of discrete key presses into a running result and a short
//! rolling history, and ships the plumbing around it: a single-owner session
//! actor, an event hook for "a new result is available", and a client and
//! server for saving results remotely.
//!
//! The crate provides:
//!
//! * **Engine**: [`CalculatorEngine`] owns the display, the pending operation,
//!   the entry-mode flag and a history capped at 20 entries
//! * **Actions**: [`Action`] covers every key, parses keypad labels (`"7"`,
//!   `"×"`, `"√"`, `"="`, ...) and dispatches onto the engine
//! * **Sessions**: [`CalculatorSession`] runs an engine on a tokio task so
//!   several callers can share it, emitting [`CalculatorEvent`]s
//! * **Remote saves**: [`SaveClient`] posts `{expression, result}` to a
//!   persistence endpoint; [`server`] implements that endpoint (feature
//!   `server`)
//!
//! ## Core Concepts
//!
//! ### Left-to-right evaluation
//!
//! There is no precedence and parentheses are literal characters. Each new
//! operator collapses whatever was pending:
//!
//! ```rust
//! use scicalc::{CalculatorEngine, Operator};
//!
//! let mut engine = CalculatorEngine::new();
//! engine.enter_digit('2');
//! engine.select_operator(Operator::Add);
//! engine.enter_digit('3');
//! engine.select_operator(Operator::Multiply);
//! engine.enter_digit('4');
//! engine.evaluate();
//!
//! assert_eq!(engine.display(), "20");
//! ```
//!
//! ### Results are values, never errors
//!
//! Division by zero, `sqrt` of a negative number or an unparseable display
//! produce `Infinity` / `NaN` text on the display and in history:
//!
//! ```rust
//! use scicalc::{Action, CalculatorEngine};
//!
//! let mut engine = CalculatorEngine::new();
//! for label in ["5", "÷", "0", "="] {
//!     label.parse::<Action>().unwrap().apply(&mut engine);
//! }
//! assert_eq!(engine.display(), "Infinity");
//! ```
//!
//! ### Sessions and events
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use scicalc::{CalculatorEngine, CalculatorEvent, CalculatorSession, EventHandler, SaveClient};
//!
//! struct PrintResults;
//!
//! #[async_trait]
//! impl EventHandler for PrintResults {
//!     async fn on_calculator_event(&self, event: &CalculatorEvent) {
//!         if let CalculatorEvent::ResultRecorded { expression, result, .. } = event {
//!             println!("{} = {}", expression, result);
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     scicalc::init_logger();
//!
//!     let handle = CalculatorSession::new(CalculatorEngine::new())
//!         .with_event_handler(Arc::new(PrintResults))
//!         .with_save_client(SaveClient::new("http://127.0.0.1:8080/calculations"))
//!         .spawn();
//!
//!     for label in ["1", "6", "√"] {
//!         handle.press(label).await?;
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications embedding scicalc opt in to `RUST_LOG` driven diagnostics by
/// calling this early; calling it again is harmless.
///
/// ```rust
/// scicalc::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `scicalc` module.
pub mod scicalc;

// Re-exporting key items for easier external access.
pub use scicalc::action;
pub use scicalc::action::{Action, KeyParseError};
pub use scicalc::config;
pub use scicalc::config::{EngineConfig, OperatorNotation};
pub use scicalc::engine;
pub use scicalc::engine::{CalculatorEngine, EngineSnapshot, PendingOperation, Transition};
pub use scicalc::event;
pub use scicalc::event::{CalculatorEvent, EventHandler};
pub use scicalc::history;
pub use scicalc::history::{History, HistoryEntry};
pub use scicalc::number;
pub use scicalc::operation;
pub use scicalc::operation::{Operator, UnaryFunction, UnknownOperationError};
pub use scicalc::save_client;
pub use scicalc::save_client::{SaveClient, SaveError, SaveReceipt, SavedCalculation};
#[cfg(feature = "server")]
pub use scicalc::server;
pub use scicalc::session;
pub use scicalc::session::{CalculatorSession, SessionError, SessionHandle};
