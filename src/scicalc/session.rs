//! # Calculator Session
//!
//! Runs a [`CalculatorEngine`] inside its own tokio task so that any number of
//! callers can drive it without sharing `&mut` access. Callers hold a cheap,
//! clonable [`SessionHandle`]; each request travels through an mpsc queue and
//! is applied to the engine one at a time, in arrival order.
//!
//! After each action the session:
//!
//! 1. emits [`CalculatorEvent::DisplayChanged`]
//! 2. if a history entry was recorded, emits [`CalculatorEvent::ResultRecorded`]
//! 3. if a [`SaveClient`] is attached, spawns a detached save of that entry and
//!    later reports [`CalculatorEvent::SaveCompleted`]
//!
//! Events 1 and 2 are delivered before the caller gets its [`Transition`]
//! back. Saves are never awaited by the session and their outcome never
//! touches engine state.
//!
//! Because events 1 and 2 are awaited on the session task, a handler that
//! awaits a request on its own session deadlocks; see
//! [`EventHandler`](crate::EventHandler#re-entrancy).
//!
//! The session task ends once every handle has been dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use scicalc::{Action, CalculatorEngine, CalculatorSession, Operator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = CalculatorSession::new(CalculatorEngine::new()).spawn();
//!
//!     handle.press("7").await?;
//!     handle.apply(Action::Operator(Operator::Add)).await?;
//!     handle.press("3").await?;
//!     let transition = handle.press("=").await?;
//!
//!     assert_eq!(transition.display, "10");
//!     Ok(())
//! }
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::scicalc::action::Action;
use crate::scicalc::engine::{CalculatorEngine, EngineSnapshot, Transition};
use crate::scicalc::event::{CalculatorEvent, EventHandler};
use crate::scicalc::history::HistoryEntry;
use crate::scicalc::save_client::SaveClient;

/// Default depth of the action queue.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Error returned by [`SessionHandle`] operations.
#[derive(Debug, Clone)]
pub struct SessionError {
    message: String,
}

impl SessionError {
    pub fn new(message: impl Into<String>) -> Self {
        SessionError {
            message: message.into(),
        }
    }

    fn closed() -> Self {
        SessionError::new("session is no longer running")
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session error: {}", self.message)
    }
}

impl Error for SessionError {}

enum Command {
    Apply {
        action: Action,
        reply: oneshot::Sender<Transition>,
    },
    Snapshot {
        reply: oneshot::Sender<EngineSnapshot>,
    },
    ClearHistory {
        reply: oneshot::Sender<()>,
    },
}

/// Builder and task state for a session.
///
/// Configure with the `with_*` methods, then call [`spawn`](Self::spawn).
pub struct CalculatorSession {
    id: String,
    engine: CalculatorEngine,
    event_handler: Option<Arc<dyn EventHandler>>,
    save_client: Option<Arc<SaveClient>>,
    queue_capacity: usize,
}

impl CalculatorSession {
    /// Wrap `engine` in a session with a fresh random id.
    pub fn new(engine: CalculatorEngine) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            engine,
            event_handler: None,
            save_client: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Save every recorded result through `client`.
    pub fn with_save_client(mut self, client: SaveClient) -> Self {
        self.save_client = Some(Arc::new(client));
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Start the session task. Must be called from within a tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let id: Arc<str> = Arc::from(self.id.as_str());
        info!("calculator session {} started", id);
        tokio::spawn(self.run(receiver));
        SessionHandle { id, sender }
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<Command>) {
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Apply { action, reply } => {
                    let transition = self.apply(action).await;
                    // The caller may have given up waiting; the action still counts.
                    let _ = reply.send(transition);
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.engine.snapshot());
                }
                Command::ClearHistory { reply } => {
                    self.engine.clear_history();
                    let _ = reply.send(());
                }
            }
        }
        info!("calculator session {} closed", self.id);
    }

    async fn apply(&mut self, action: Action) -> Transition {
        let transition = action.apply(&mut self.engine);
        debug!(
            "session {}: {} -> '{}'",
            self.id, action, transition.display
        );

        self.emit(CalculatorEvent::DisplayChanged {
            session_id: self.id.clone(),
            action,
            display: transition.display.clone(),
        })
        .await;

        if let Some(entry) = &transition.recorded {
            self.emit(CalculatorEvent::ResultRecorded {
                session_id: self.id.clone(),
                expression: entry.expression.clone(),
                result: entry.result.clone(),
            })
            .await;
            self.spawn_save(entry);
        }

        transition
    }

    async fn emit(&self, event: CalculatorEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_calculator_event(&event).await;
        }
    }

    /// Fire-and-forget save of `entry`.
    fn spawn_save(&self, entry: &HistoryEntry) {
        let Some(client) = &self.save_client else {
            return;
        };

        let client = Arc::clone(client);
        let handler = self.event_handler.clone();
        let session_id = self.id.clone();
        let expression = entry.expression.clone();
        let result = entry.result.clone();

        tokio::spawn(async move {
            let outcome = client.save(&expression, &result).await;
            let error = match &outcome {
                Ok(receipt) => {
                    info!("saved '{}' as #{}", expression, receipt.id);
                    None
                }
                Err(e) => {
                    warn!("could not save '{}': {}", expression, e);
                    Some(e.to_string())
                }
            };

            if let Some(handler) = handler {
                handler
                    .on_calculator_event(&CalculatorEvent::SaveCompleted {
                        session_id,
                        expression,
                        success: error.is_none(),
                        error,
                    })
                    .await;
            }
        });
    }
}

/// Clonable handle to a running [`CalculatorSession`].
#[derive(Clone)]
pub struct SessionHandle {
    id: Arc<str>,
    sender: mpsc::Sender<Command>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue `action` and wait for the resulting transition.
    pub async fn apply(&self, action: Action) -> Result<Transition, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Apply { action, reply }).await?;
        response.await.map_err(|_| SessionError::closed())
    }

    /// Parse a keypad label and apply it.
    ///
    /// # Errors
    ///
    /// Fails on unknown labels (the engine is not touched) or when the
    /// session has stopped.
    pub async fn press(&self, label: &str) -> Result<Transition, SessionError> {
        let action = label
            .parse::<Action>()
            .map_err(|e| SessionError::new(e.to_string()))?;
        self.apply(action).await
    }

    /// Copy of the engine state after every previously queued action.
    pub async fn snapshot(&self) -> Result<EngineSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| SessionError::closed())
    }

    pub async fn clear_history(&self) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::ClearHistory { reply }).await?;
        response.await.map_err(|_| SessionError::closed())
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SessionError::closed())
    }
}
