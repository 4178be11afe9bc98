//! Calculator session event system.
//!
//! A [`CalculatorSession`](crate::CalculatorSession) reports what happens to
//! its engine through a single [`EventHandler`] trait:
//!
//! - **Display updates**: every applied action ends with a
//!   [`DisplayChanged`](CalculatorEvent::DisplayChanged)
//! - **New results**: evaluations and unary functions additionally emit
//!   [`ResultRecorded`](CalculatorEvent::ResultRecorded), the hook for
//!   "a new result is available"
//! - **Remote saves**: when a save client is attached, the outcome of each
//!   fire-and-forget save arrives as [`SaveCompleted`](CalculatorEvent::SaveCompleted)
//!
//! The handler is shared as `Arc<dyn EventHandler>`; events are delivered in
//! the order the session applies actions, except `SaveCompleted`, which
//! arrives whenever the network call finishes.
//!
//! # Example
//!
//! ```rust,no_run
//! use scicalc::event::{CalculatorEvent, EventHandler};
//! use async_trait::async_trait;
//!
//! struct Toasts;
//!
//! #[async_trait]
//! impl EventHandler for Toasts {
//!     async fn on_calculator_event(&self, event: &CalculatorEvent) {
//!         match event {
//!             CalculatorEvent::ResultRecorded { expression, result, .. } => {
//!                 println!("{} = {}", expression, result);
//!             }
//!             CalculatorEvent::SaveCompleted { success: false, error, .. } => {
//!                 println!("Could not save: {}", error.as_deref().unwrap_or("unknown"));
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::scicalc::action::Action;

/// Events emitted by a [`CalculatorSession`](crate::CalculatorSession).
///
/// Every variant carries the `session_id` so one handler can serve several
/// sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorEvent {
    /// An action was applied. Fired for every action, including no-ops such
    /// as a second decimal point.
    DisplayChanged {
        /// Identifier of the emitting session.
        session_id: String,
        /// The action that was applied.
        action: Action,
        /// Display text after the action.
        display: String,
    },

    /// An evaluation or unary function recorded a history entry.
    ResultRecorded {
        /// Identifier of the emitting session.
        session_id: String,
        /// Expression text as recorded in history, e.g. `"7 add 3"`.
        expression: String,
        /// Result text as recorded in history, e.g. `"10"`.
        result: String,
    },

    /// A remote save finished.
    ///
    /// Engine state is never affected by the outcome; the entry was already
    /// in history before the save started.
    SaveCompleted {
        /// Identifier of the emitting session.
        session_id: String,
        /// Expression that was sent.
        expression: String,
        /// `true` if the endpoint answered with a 2xx status.
        success: bool,
        /// Error message on failure, `None` on success.
        error: Option<String>,
    },
}

impl CalculatorEvent {
    pub fn session_id(&self) -> &str {
        match self {
            CalculatorEvent::DisplayChanged { session_id, .. }
            | CalculatorEvent::ResultRecorded { session_id, .. }
            | CalculatorEvent::SaveCompleted { session_id, .. } => session_id,
        }
    }
}

/// Receiver for [`CalculatorEvent`]s.
///
/// The default implementation is a no-op, so a handler only overrides what it
/// needs. The `Send + Sync` bound lets the handler be shared between the
/// session task and the detached save tasks.
///
/// # Re-entrancy
///
/// `DisplayChanged` and `ResultRecorded` are awaited on the session task
/// itself. A handler must not await a [`SessionHandle`](crate::SessionHandle)
/// request on the same session from inside `on_calculator_event`: the
/// session cannot answer until the handler returns, so both sides wait
/// forever. Feed follow-up actions from a spawned task instead:
///
/// ```rust,no_run
/// # use async_trait::async_trait;
/// # use scicalc::{CalculatorEvent, EventHandler, SessionHandle};
/// struct Repeat {
///     handle: SessionHandle,
/// }
///
/// #[async_trait]
/// impl EventHandler for Repeat {
///     async fn on_calculator_event(&self, event: &CalculatorEvent) {
///         if let CalculatorEvent::ResultRecorded { .. } = event {
///             let handle = self.handle.clone();
///             tokio::spawn(async move {
///                 let _ = handle.press("√").await;
///             });
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called for each event emitted by a session.
    async fn on_calculator_event(&self, _event: &CalculatorEvent) {}
}
