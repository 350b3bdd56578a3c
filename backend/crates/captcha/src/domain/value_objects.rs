//! Domain Value Objects
//!
//! Immutable value types for the captcha domain.

use std::fmt;

/// Arithmetic operator shown in a captcha question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
        }
    }

    pub fn apply(&self, left: i64, right: i64) -> i64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
        }
    }
}

/// A generated arithmetic problem
///
/// Subtraction problems are normalised so the left operand is never smaller
/// than the right one, keeping every answer non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathProblem {
    left: i64,
    right: i64,
    operator: Operator,
}

impl MathProblem {
    pub fn new(a: i64, b: i64, operator: Operator) -> Self {
        let (left, right) = if operator == Operator::Subtract && a < b {
            (b, a)
        } else {
            (a, b)
        };
        Self {
            left,
            right,
            operator,
        }
    }

    /// e.g. `"7 - 3 = ?"`
    pub fn question(&self) -> String {
        format!("{} {} {} = ?", self.left, self.operator.symbol(), self.right)
    }

    pub fn answer(&self) -> i64 {
        self.operator.apply(self.left, self.right)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }
}

impl fmt::Display for MathProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.question())
    }
}
