//! # Calculator Engine
//!
//! The state machine behind the keypad. A [`CalculatorEngine`] owns the
//! display text, an optional pending `(operand, operator)` pair, the
//! entry-mode flag and the capped history log, and exposes one mutating
//! method per user action.
//!
//! ## Entry mode
//!
//! The engine is always in one of two modes:
//!
//! - **fresh entry** (`entry_mode() == true`): the next digit replaces the
//!   display. Entered after any operator, function, evaluation or clear.
//! - **appending** (`entry_mode() == false`): digits are appended. Entered by
//!   the first digit or decimal point typed in fresh-entry mode.
//!
//! On top of that sits the pending-operation slot, which is either empty or
//! holds exactly one operand and operator.
//!
//! ## Left-to-right chaining
//!
//! There is no operator precedence. Selecting an operator while a pending
//! operation has a freshly typed second operand evaluates the pending one
//! first:
//!
//! ```rust
//! use scicalc::{CalculatorEngine, Operator};
//!
//! let mut engine = CalculatorEngine::new();
//! engine.enter_digit('2');
//! engine.select_operator(Operator::Add);
//! engine.enter_digit('3');
//! engine.select_operator(Operator::Multiply); // collapses 2 + 3
//! engine.enter_digit('4');
//! engine.evaluate();
//!
//! assert_eq!(engine.display(), "20");
//! assert_eq!(engine.history().len(), 2);
//! ```
//!
//! ## Numeric anomalies
//!
//! Nothing here returns an error. Unparseable display text becomes NaN,
//! undefined math (`5 ÷ 0`, `sqrt(-1)`) produces IEEE sentinels, and those
//! values are shown and recorded as text (`"Infinity"`, `"NaN"`).
//!
//! ## Thread Safety
//!
//! The engine is a plain owned value with `&mut self` actions. To drive it
//! from several tasks, wrap it in a [`CalculatorSession`](crate::CalculatorSession).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::scicalc::config::EngineConfig;
use crate::scicalc::history::{History, HistoryEntry};
use crate::scicalc::number::{format_number, parse_number};
use crate::scicalc::operation::{Operator, UnaryFunction};

const ZERO: &str = "0";

/// A first operand waiting for its second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub operand: f64,
    pub operator: Operator,
}

/// What an action changed: the display afterwards and the history entry it
/// recorded, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub display: String,
    pub recorded: Option<HistoryEntry>,
}

impl Transition {
    /// `true` when the action produced a new result.
    pub fn has_result(&self) -> bool {
        self.recorded.is_some()
    }
}

/// Point-in-time copy of everything a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub display: String,
    pub pending: Option<PendingOperation>,
    /// One-line preview of the pending operation, e.g. `"7 +"`.
    pub preview: Option<String>,
    pub entry_mode: bool,
    /// Full history, newest first.
    pub history: Vec<HistoryEntry>,
}

/// Single-owner calculator state machine.
#[derive(Debug, Clone)]
pub struct CalculatorEngine {
    display: String,
    pending: Option<PendingOperation>,
    entry_mode: bool,
    history: History,
    config: EngineConfig,
}

impl CalculatorEngine {
    /// Engine with the default configuration (20 history entries, names in
    /// expressions).
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            display: ZERO.to_string(),
            pending: None,
            entry_mode: true,
            history: History::with_capacity(config.history_capacity),
            config,
        }
    }

    // ---- Actions ----

    /// Type one character of the current number.
    ///
    /// Digits and the literal parentheses `(` / `)` take this path; none of
    /// them are validated or interpreted. A `.` is routed to
    /// [`enter_decimal_point`](Self::enter_decimal_point) so the display never
    /// holds two decimal points.
    ///
    /// Any other character is appended as typed. [`Action`](crate::Action)
    /// parsing and deserialization only ever produce digits and parentheses.
    pub fn enter_digit(&mut self, digit: char) -> Transition {
        if digit == '.' {
            return self.enter_decimal_point();
        }

        if self.entry_mode {
            self.display = digit.to_string();
            self.entry_mode = false;
        } else if self.display == ZERO {
            self.display = digit.to_string();
        } else {
            self.display.push(digit);
        }

        debug!("digit '{}' -> display '{}'", digit, self.display);
        self.transition(None)
    }

    /// Append a decimal point unless the display already has one.
    ///
    /// The point is appended even in fresh-entry mode, so `7`, `+`, `.`
    /// leaves `"7."` on the display; numeric parsing resolves it later.
    pub fn enter_decimal_point(&mut self) -> Transition {
        if !self.display.contains('.') {
            self.display.push('.');
            self.entry_mode = false;
            debug!("decimal point -> display '{}'", self.display);
        }
        self.transition(None)
    }

    /// Choose a binary operator.
    ///
    /// If an operation is already pending and a second operand has been typed
    /// since, that operation is evaluated first and its result becomes the
    /// new first operand. Otherwise the current display is the first operand
    /// (choosing `+` then `×` simply swaps the operator).
    pub fn select_operator(&mut self, operator: Operator) -> Transition {
        let mut operand = parse_number(&self.display);
        let mut recorded = None;

        if self.pending.is_some() && !self.entry_mode {
            if let Some((value, entry)) = self.collapse_pending() {
                operand = value;
                recorded = Some(entry);
            }
        }

        self.pending = Some(PendingOperation { operand, operator });
        self.entry_mode = true;

        debug!("operator {} pending on {}", operator, format_number(operand));
        self.transition(recorded)
    }

    /// Apply a unary function to the current display and record the result.
    ///
    /// The pending operation, if any, is left alone so that e.g. `9 + √16 =`
    /// yields 13.
    pub fn apply_unary_function(&mut self, function: UnaryFunction) -> Transition {
        let value = parse_number(&self.display);
        let result = format_number(function.apply(value));
        let expression = format!(
            "{}({})",
            self.config.notation.function(function),
            self.display
        );

        let entry = self.record(expression, result.clone());
        self.display = result;
        self.entry_mode = true;

        debug!("{} -> display '{}'", entry.expression, self.display);
        self.transition(Some(entry))
    }

    /// Evaluate the pending operation against the current display.
    ///
    /// Does nothing at all when no operation is pending.
    pub fn evaluate(&mut self) -> Transition {
        let recorded = self.collapse_pending().map(|(_, entry)| entry);
        self.transition(recorded)
    }

    /// Reset display and pending operation. History is kept.
    pub fn clear(&mut self) -> Transition {
        self.display = ZERO.to_string();
        self.pending = None;
        self.entry_mode = true;
        debug!("cleared");
        self.transition(None)
    }

    /// Drop the last character of the display, falling back to `"0"`.
    ///
    /// Entry mode and the pending operation are untouched.
    pub fn backspace(&mut self) -> Transition {
        if self.display.chars().count() > 1 {
            self.display.pop();
        } else {
            self.display = ZERO.to_string();
        }
        self.transition(None)
    }

    /// Put the result of history entry `index` (0 = newest) back on the display.
    ///
    /// An out-of-range index changes nothing. Entry mode and the pending
    /// operation are untouched.
    pub fn recall_history(&mut self, index: usize) -> Transition {
        if let Some(entry) = self.history.get(index) {
            self.display = entry.result.clone();
            debug!("recalled history #{} -> display '{}'", index, self.display);
        }
        self.transition(None)
    }

    /// Forget every recorded result.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ---- Queries ----

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn pending(&self) -> Option<PendingOperation> {
        self.pending
    }

    pub fn entry_mode(&self) -> bool {
        self.entry_mode
    }

    /// Full history, newest first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The prefix of the history a panel lists (10 entries by default).
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        self.history.recent(self.config.history_display_limit)
    }

    /// One-line preview of the pending operation using keypad symbols,
    /// e.g. `"7 +"`.
    pub fn preview(&self) -> Option<String> {
        self.pending
            .map(|p| format!("{} {}", format_number(p.operand), p.operator.symbol()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            display: self.display.clone(),
            pending: self.pending,
            preview: self.preview(),
            entry_mode: self.entry_mode,
            history: self.history.snapshot(),
        }
    }

    // ---- Internals ----

    /// Evaluate and clear the pending operation.
    ///
    /// Shared by [`evaluate`](Self::evaluate) and the chaining path of
    /// [`select_operator`](Self::select_operator). Returns the numeric result
    /// and the entry it recorded, or `None` when nothing was pending.
    fn collapse_pending(&mut self) -> Option<(f64, HistoryEntry)> {
        let pending = self.pending.take()?;
        let current = parse_number(&self.display);
        let value = pending.operator.apply(pending.operand, current);

        let expression = format!(
            "{} {} {}",
            format_number(pending.operand),
            self.config.notation.operator(pending.operator),
            format_number(current)
        );
        let result = format_number(value);

        let entry = self.record(expression, result.clone());
        self.display = result;
        self.entry_mode = true;

        debug!("{} = {}", entry.expression, entry.result);
        Some((value, entry))
    }

    fn record(&mut self, expression: String, result: String) -> HistoryEntry {
        let entry = HistoryEntry::new(expression, result);
        self.history.record(entry.clone());
        entry
    }

    fn transition(&self, recorded: Option<HistoryEntry>) -> Transition {
        Transition {
            display: self.display.clone(),
            recorded,
        }
    }
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_digits(engine: &mut CalculatorEngine, digits: &str) {
        for d in digits.chars() {
            engine.enter_digit(d);
        }
    }

    #[test]
    fn test_initial_state() {
        let engine = CalculatorEngine::new();
        assert_eq!(engine.display(), "0");
        assert!(engine.entry_mode());
        assert!(engine.pending().is_none());
        assert!(engine.history().is_empty());
        assert!(engine.preview().is_none());
    }

    #[test]
    fn test_collapse_pending_without_operation_is_none() {
        let mut engine = CalculatorEngine::new();
        type_digits(&mut engine, "12");
        assert!(engine.collapse_pending().is_none());
        assert_eq!(engine.display(), "12");
        assert!(!engine.entry_mode());
    }

    #[test]
    fn test_chained_operator_records_intermediate_result() {
        let mut engine = CalculatorEngine::new();
        type_digits(&mut engine, "6");
        engine.select_operator(Operator::Subtract);
        type_digits(&mut engine, "2");
        let transition = engine.select_operator(Operator::Power);

        assert!(transition.has_result());
        assert_eq!(transition.display, "4");
        assert_eq!(
            engine.pending(),
            Some(PendingOperation {
                operand: 4.0,
                operator: Operator::Power
            })
        );
        assert_eq!(engine.preview().as_deref(), Some("4 ^"));
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut engine = CalculatorEngine::new();
        type_digits(&mut engine, "7");
        engine.select_operator(Operator::Add);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.display, "7");
        assert_eq!(snapshot.preview.as_deref(), Some("7 +"));
        assert!(snapshot.entry_mode);
        assert!(snapshot.history.is_empty());
    }
}
