//! Conversions between display text and `f64`.
//!
//! # Formatting
//!
//! [`format_number`] produces the shortest text that parses back to the same
//! `f64`:
//!
//! | value                     | text                    |
//! |---------------------------|-------------------------|
//! | `10.0`                    | `10`                    |
//! | `0.1 + 0.2`               | `0.30000000000000004`   |
//! | `-0.0`                    | `0`                     |
//! | `1e21`                    | `1e+21`                 |
//! | `0.00000015`              | `1.5e-7`                |
//! | `f64::NAN`                | `NaN`                   |
//! | `f64::NEG_INFINITY`       | `-Infinity`             |
//!
//! Plain decimal notation is used for magnitudes in `[1e-6, 1e21)`,
//! scientific notation with an explicit exponent sign outside it.
//!
//! # Parsing
//!
//! [`parse_number`] reads the longest numeric prefix of the text and ignores
//! the rest, so a display such as `"5."` or `"12(3"` still yields a number.
//! Text without a numeric prefix (`"."`, `""`, `"("`) is NaN.

/// Lower bound (inclusive) of the plain decimal range.
const PLAIN_MIN: f64 = 1e-6;
/// Upper bound (exclusive) of the plain decimal range.
const PLAIN_MAX: f64 = 1e21;

/// Render a number the way the display shows it.
///
/// ```rust
/// use scicalc::number::format_number;
///
/// assert_eq!(format_number(4.0), "4");
/// assert_eq!(format_number(5.0 / 0.0), "Infinity");
/// assert_eq!(format_number(2f64.powi(80)), "1.2089258196146292e+24");
/// ```
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (PLAIN_MIN..PLAIN_MAX).contains(&magnitude) {
        return format!("{}", value);
    }

    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => scientific,
    }
}

/// Parse the longest numeric prefix of `text`.
///
/// Accepts leading whitespace, an optional sign, digits with at most one
/// decimal point, an optional exponent, or the words `Infinity` /
/// `-Infinity`. Returns NaN when no digits are found.
///
/// ```rust
/// use scicalc::number::parse_number;
///
/// assert_eq!(parse_number("5."), 5.0);
/// assert_eq!(parse_number(" -2.5e3xyz"), -2500.0);
/// assert!(parse_number(".").is_nan());
/// ```
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    if s[pos..].starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = scan_digits(bytes, pos);
    pos += int_digits.len();

    let mut frac_digits: &[u8] = &[];
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = scan_digits(bytes, pos + 1);
        if int_digits.is_empty() && frac_digits.is_empty() {
            return f64::NAN;
        }
        pos += 1 + frac_digits.len();
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return f64::NAN;
    }

    let mut exponent = String::new();
    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp_pos = pos + 1;
        let mut exp_sign = "";
        match bytes.get(exp_pos) {
            Some(b'-') => {
                exp_sign = "-";
                exp_pos += 1;
            }
            Some(b'+') => exp_pos += 1,
            _ => {}
        }
        let exp_digits = scan_digits(bytes, exp_pos);
        if !exp_digits.is_empty() {
            exponent = format!("e{}{}", exp_sign, ascii(exp_digits));
        }
    }

    // Rebuild a canonical literal so `str::parse` never sees a bare "." edge.
    let literal = format!(
        "{}{}.{}{}",
        if negative { "-" } else { "" },
        if int_digits.is_empty() {
            "0"
        } else {
            ascii(int_digits)
        },
        if frac_digits.is_empty() {
            "0"
        } else {
            ascii(frac_digits)
        },
        exponent
    );

    literal.parse::<f64>().unwrap_or(f64::NAN)
}

fn scan_digits(bytes: &[u8], start: usize) -> &[u8] {
    let tail = bytes.get(start..).unwrap_or(&[]);
    let len = tail.iter().take_while(|b| b.is_ascii_digit()).count();
    &tail[..len]
}

fn ascii(digits: &[u8]) -> &str {
    // Only ASCII digits are ever scanned.
    std::str::from_utf8(digits).unwrap_or("0")
}
