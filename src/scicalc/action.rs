//! Typed user actions and keypad label parsing.
//!
//! Every button on the keypad maps to one [`Action`]. Parsing a label with
//! [`str::parse`] gives the action, and [`Action::apply`] routes it to the
//! matching [`CalculatorEngine`] method, so front ends only ever deal in
//! labels or actions.
//!
//! ```rust
//! use scicalc::{Action, CalculatorEngine};
//!
//! let mut engine = CalculatorEngine::new();
//! for label in ["7", "+", "3", "="] {
//!     let action: Action = label.parse().unwrap();
//!     action.apply(&mut engine);
//! }
//! assert_eq!(engine.display(), "10");
//! ```

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::scicalc::engine::{CalculatorEngine, Transition};
use crate::scicalc::operation::{Operator, UnaryFunction};

/// Error for keypad labels that match no button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParseError {
    label: String,
}

impl KeyParseError {
    pub fn new(label: impl Into<String>) -> Self {
        KeyParseError {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown key: '{}'", self.label)
    }
}

impl Error for KeyParseError {}

/// One discrete user action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// A digit `0`-`9` or a literal parenthesis.
    Digit(#[serde(deserialize_with = "entry_char")] char),
    DecimalPoint,
    Operator(Operator),
    Function(UnaryFunction),
    Evaluate,
    Clear,
    Backspace,
    /// Put a history result back on the display (0 = newest).
    RecallHistory(usize),
}

/// Deserialize the payload of [`Action::Digit`], rejecting anything that is
/// not a keypad entry character.
fn entry_char<'de, D>(deserializer: D) -> Result<char, D::Error>
where
    D: Deserializer<'de>,
{
    let c = char::deserialize(deserializer)?;
    if Action::is_entry_char(c) {
        Ok(c)
    } else {
        Err(de::Error::custom(format!("not a keypad digit: '{}'", c)))
    }
}

impl Action {
    /// Characters accepted by [`Action::Digit`].
    pub fn is_entry_char(c: char) -> bool {
        c.is_ascii_digit() || c == '(' || c == ')'
    }

    /// Run the action against `engine`.
    pub fn apply(self, engine: &mut CalculatorEngine) -> Transition {
        match self {
            Action::Digit(d) => engine.enter_digit(d),
            Action::DecimalPoint => engine.enter_decimal_point(),
            Action::Operator(op) => engine.select_operator(op),
            Action::Function(func) => engine.apply_unary_function(func),
            Action::Evaluate => engine.evaluate(),
            Action::Clear => engine.clear(),
            Action::Backspace => engine.backspace(),
            Action::RecallHistory(index) => engine.recall_history(index),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Digit(d) => write!(f, "{}", d),
            Action::DecimalPoint => f.write_str("."),
            Action::Operator(op) => f.write_str(op.symbol()),
            Action::Function(func) => f.write_str(func.symbol()),
            Action::Evaluate => f.write_str("="),
            Action::Clear => f.write_str("C"),
            Action::Backspace => f.write_str("⌫"),
            Action::RecallHistory(index) => write!(f, "recall {}", index),
        }
    }
}

impl FromStr for Action {
    type Err = KeyParseError;

    /// Parse a keypad label.
    ///
    /// Accepts the labels printed on the buttons (`"7"`, `"."`, `"+"`, `"−"`,
    /// `"×"`, `"÷"`, `"x^y"`, `"%"`, `"sin"`, `"log"`, `"√"`, `"("`, `"="`,
    /// `"C"`, `"⌫"`), their ASCII spellings (`"-"`, `"*"`, `"/"`, `"^"`,
    /// `"sqrt"`, `"backspace"`, `"clear"`), canonical operator names, and
    /// `"recall N"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();

        let mut chars = label.chars();
        if let (Some(c), None) = (chars.next(), chars.clone().next()) {
            if Action::is_entry_char(c) {
                return Ok(Action::Digit(c));
            }
        }

        match label {
            "." | "," => return Ok(Action::DecimalPoint),
            "=" | "enter" | "evaluate" => return Ok(Action::Evaluate),
            "C" | "c" | "AC" | "clear" => return Ok(Action::Clear),
            "⌫" | "←" | "backspace" | "del" => return Ok(Action::Backspace),
            _ => {}
        }

        if let Some(index) = label.strip_prefix("recall") {
            return index
                .trim()
                .parse::<usize>()
                .map(Action::RecallHistory)
                .map_err(|_| KeyParseError::new(s));
        }

        if let Ok(op) = label.parse::<Operator>() {
            return Ok(Action::Operator(op));
        }
        if let Ok(func) = label.parse::<UnaryFunction>() {
            return Ok(Action::Function(func));
        }

        Err(KeyParseError::new(s))
    }
}
