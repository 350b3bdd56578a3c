//! Domain Services
//!
//! Pure domain logic: problem generation and answer parsing.

use rand::Rng;
use serde_json::Value;

use crate::domain::value_objects::{MathProblem, Operator};

/// Draw a random problem with both operands in `min..=max`
pub fn generate_problem<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> MathProblem {
    let a = rng.random_range(min..=max);
    let b = rng.random_range(min..=max);
    let operator = Operator::ALL[rng.random_range(0..Operator::ALL.len())];
    MathProblem::new(a, b, operator)
}

/// Interpret a submitted answer the way a lenient form field would.
///
/// Strings yield their leading integer (`" 12abc"` is 12, `"3.9"` is 3);
/// JSON numbers are truncated toward zero. Anything else is no answer.
pub fn parse_answer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Leading integer of a string: optional whitespace, optional sign, digits.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
