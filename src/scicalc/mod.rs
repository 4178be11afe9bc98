// src/scicalc/mod.rs

pub mod action;
pub mod config;
pub mod engine;
pub mod event;
pub mod history;
pub mod number;
pub mod operation;
pub mod save_client;
#[cfg(feature = "server")]
pub mod server;
pub mod session;

// Let's explicitly export the engine so it is reachable as scicalc::CalculatorEngine
// instead of scicalc::scicalc::engine::CalculatorEngine
pub use engine::CalculatorEngine;
pub use session::CalculatorSession;
