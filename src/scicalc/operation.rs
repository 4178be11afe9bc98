//! Binary operators and unary scientific functions.
//!
//! Both enums carry two spellings: a canonical lowercase name (`add`, `sqrt`)
//! used in logs, serialised payloads and the default history notation, and the
//! keypad symbol (`+`, `√`) shown on the buttons. [`FromStr`] accepts either.
//!
//! # Example
//!
//! ```rust
//! use scicalc::{Operator, UnaryFunction};
//!
//! assert_eq!(Operator::Power.apply(2.0, 10.0), 1024.0);
//! assert_eq!("×".parse::<Operator>().unwrap(), Operator::Multiply);
//!
//! // Trigonometric functions take degrees.
//! assert!((UnaryFunction::Sin.apply(90.0) - 1.0).abs() < 1e-12);
//! assert_eq!("log10".parse::<UnaryFunction>().unwrap(), UnaryFunction::Log10);
//! ```

use std::error::Error;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a name or symbol does not match any operator/function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperationError {
    input: String,
}

impl UnknownOperationError {
    fn new(input: &str) -> Self {
        UnknownOperationError {
            input: input.to_string(),
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for UnknownOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown operation: '{}'", self.input)
    }
}

impl Error for UnknownOperationError {}

/// A binary operator that can be pending between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

impl Operator {
    /// Every operator, in keypad order.
    pub const ALL: [Operator; 6] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Power,
        Operator::Modulo,
    ];

    /// Canonical lowercase name (`"add"`, `"modulo"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::Power => "power",
            Operator::Modulo => "modulo",
        }
    }

    /// Symbol printed on the keypad.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
            Operator::Power => "^",
            Operator::Modulo => "%",
        }
    }

    /// Apply the operator with IEEE-754 semantics.
    ///
    /// Nothing is guarded: `x ÷ 0` is ±infinity (or NaN for `0 ÷ 0`) and
    /// `%` is the truncated remainder, carrying the sign of `lhs`. A NaN
    /// exponent always yields NaN, including `1 ^ NaN`.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
            Operator::Power => power(lhs, rhs),
            Operator::Modulo => lhs % rhs,
        }
    }
}

/// `lhs ^ rhs` where a NaN exponent, or an infinite exponent on a base of
/// magnitude one, is NaN rather than the C `pow` answer of 1.
fn power(lhs: f64, rhs: f64) -> f64 {
    if rhs.is_nan() || (rhs.is_infinite() && lhs.abs() == 1.0) {
        return f64::NAN;
    }
    lhs.powf(rhs)
}

/// Degrees to radians, multiplying by π before dividing by 180.
fn degrees_to_radians(value: f64) -> f64 {
    value * PI / 180.0
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = UnknownOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let op = match trimmed {
            "+" => Operator::Add,
            // ASCII hyphen and the typographic minus used on the keypad
            "-" | "−" => Operator::Subtract,
            "×" | "*" | "x" => Operator::Multiply,
            "÷" | "/" => Operator::Divide,
            "^" | "x^y" | "**" => Operator::Power,
            "%" => Operator::Modulo,
            _ => {
                return Operator::ALL
                    .iter()
                    .copied()
                    .find(|op| op.name().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownOperationError::new(s))
            }
        };
        Ok(op)
    }
}

/// A single-argument scientific function applied to the current display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryFunction {
    Sin,
    Cos,
    Tan,
    Log10,
    Ln,
    Sqrt,
}

impl UnaryFunction {
    /// Every function, in keypad order.
    pub const ALL: [UnaryFunction; 6] = [
        UnaryFunction::Sin,
        UnaryFunction::Cos,
        UnaryFunction::Tan,
        UnaryFunction::Log10,
        UnaryFunction::Ln,
        UnaryFunction::Sqrt,
    ];

    /// Canonical lowercase name (`"sin"`, `"log10"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            UnaryFunction::Sin => "sin",
            UnaryFunction::Cos => "cos",
            UnaryFunction::Tan => "tan",
            UnaryFunction::Log10 => "log10",
            UnaryFunction::Ln => "ln",
            UnaryFunction::Sqrt => "sqrt",
        }
    }

    /// Label printed on the keypad.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryFunction::Sin => "sin",
            UnaryFunction::Cos => "cos",
            UnaryFunction::Tan => "tan",
            UnaryFunction::Log10 => "log",
            UnaryFunction::Ln => "ln",
            UnaryFunction::Sqrt => "√",
        }
    }

    /// Evaluate the function.
    ///
    /// Trigonometric functions interpret `value` in degrees. There is no
    /// domain validation: `ln(-1)` and `sqrt(-4)` are NaN, `log10(0)` is
    /// negative infinity.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            UnaryFunction::Sin => degrees_to_radians(value).sin(),
            UnaryFunction::Cos => degrees_to_radians(value).cos(),
            UnaryFunction::Tan => degrees_to_radians(value).tan(),
            UnaryFunction::Log10 => value.log10(),
            UnaryFunction::Ln => value.ln(),
            UnaryFunction::Sqrt => value.sqrt(),
        }
    }
}

impl fmt::Display for UnaryFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnaryFunction {
    type Err = UnknownOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "√" => return Ok(UnaryFunction::Sqrt),
            "log" | "lg" => return Ok(UnaryFunction::Log10),
            _ => {}
        }
        UnaryFunction::ALL
            .iter()
            .copied()
            .find(|func| func.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownOperationError::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_arithmetic() {
        assert_eq!(Operator::Add.apply(7.0, 3.0), 10.0);
        assert_eq!(Operator::Subtract.apply(7.0, 3.0), 4.0);
        assert_eq!(Operator::Multiply.apply(7.0, 3.0), 21.0);
        assert_eq!(Operator::Divide.apply(9.0, 3.0), 3.0);
        assert_eq!(Operator::Power.apply(2.0, 3.0), 8.0);
        assert_eq!(Operator::Modulo.apply(17.0, 5.0), 2.0);
    }

    #[test]
    fn test_modulo_keeps_dividend_sign() {
        assert_eq!(Operator::Modulo.apply(-7.0, 3.0), -1.0);
        assert_eq!(Operator::Modulo.apply(7.0, -3.0), 1.0);
        assert_eq!(Operator::Modulo.apply(5.5, 2.0), 1.5);
    }

    #[test]
    fn test_division_by_zero_is_not_guarded() {
        assert_eq!(Operator::Divide.apply(5.0, 0.0), f64::INFINITY);
        assert_eq!(Operator::Divide.apply(-5.0, 0.0), f64::NEG_INFINITY);
        assert!(Operator::Divide.apply(0.0, 0.0).is_nan());
        assert!(Operator::Modulo.apply(5.0, 0.0).is_nan());
    }

    #[test]
    fn test_power_with_nan_or_infinite_exponent() {
        assert!(Operator::Power.apply(1.0, f64::NAN).is_nan());
        assert!(Operator::Power.apply(1.0, f64::INFINITY).is_nan());
        assert!(Operator::Power.apply(-1.0, f64::NEG_INFINITY).is_nan());
        assert!(Operator::Power.apply(f64::NAN, 2.0).is_nan());
        assert_eq!(Operator::Power.apply(f64::NAN, 0.0), 1.0);
        assert_eq!(Operator::Power.apply(2.0, f64::INFINITY), f64::INFINITY);
        assert_eq!(Operator::Power.apply(0.5, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("+".parse::<Operator>().unwrap(), Operator::Add);
        assert_eq!("−".parse::<Operator>().unwrap(), Operator::Subtract);
        assert_eq!("-".parse::<Operator>().unwrap(), Operator::Subtract);
        assert_eq!("÷".parse::<Operator>().unwrap(), Operator::Divide);
        assert_eq!("x^y".parse::<Operator>().unwrap(), Operator::Power);
        assert_eq!("Modulo".parse::<Operator>().unwrap(), Operator::Modulo);

        let err = "avg".parse::<Operator>().unwrap_err();
        assert_eq!(err.input(), "avg");
        assert_eq!(err.to_string(), "Unknown operation: 'avg'");
    }

    #[test]
    fn test_trig_uses_degrees() {
        assert!((UnaryFunction::Sin.apply(30.0) - 0.5).abs() < 1e-12);
        assert!((UnaryFunction::Cos.apply(60.0) - 0.5).abs() < 1e-12);
        assert!((UnaryFunction::Tan.apply(45.0) - 1.0).abs() < 1e-12);
        assert_eq!(UnaryFunction::Sin.apply(0.0), 0.0);
    }

    #[test]
    fn test_trig_multiplies_by_pi_before_dividing() {
        for degrees in [6.0, 19.0, 37.5, 123.0, 701.0] {
            let radians = degrees * PI / 180.0;
            assert_eq!(UnaryFunction::Sin.apply(degrees), radians.sin());
            assert_eq!(UnaryFunction::Cos.apply(degrees), radians.cos());
            assert_eq!(UnaryFunction::Tan.apply(degrees), radians.tan());
        }
    }

    #[test]
    fn test_logs_and_roots() {
        assert_eq!(UnaryFunction::Log10.apply(1000.0), 3.0);
        assert_eq!(UnaryFunction::Ln.apply(1.0), 0.0);
        assert_eq!(UnaryFunction::Sqrt.apply(16.0), 4.0);

        assert!(UnaryFunction::Sqrt.apply(-4.0).is_nan());
        assert!(UnaryFunction::Ln.apply(-1.0).is_nan());
        assert_eq!(UnaryFunction::Log10.apply(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_function_parsing() {
        assert_eq!("√".parse::<UnaryFunction>().unwrap(), UnaryFunction::Sqrt);
        assert_eq!("log".parse::<UnaryFunction>().unwrap(), UnaryFunction::Log10);
        assert_eq!("LN".parse::<UnaryFunction>().unwrap(), UnaryFunction::Ln);
        assert!("exp".parse::<UnaryFunction>().is_err());
    }

    #[test]
    fn test_serde_uses_names() {
        assert_eq!(
            serde_json::to_string(&Operator::Multiply).unwrap(),
            "\"multiply\""
        );
        assert_eq!(
            serde_json::from_str::<UnaryFunction>("\"log10\"").unwrap(),
            UnaryFunction::Log10
        );
    }
}
