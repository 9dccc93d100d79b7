//! Numeric operand classification and the arithmetic helpers.
//!
//! # Promotion table
//!
//! Keyed by the kinds of `a` (first operand) and `b` (second operand):
//!
//! | a        | b        | performed as            | result   |
//! |----------|----------|-------------------------|----------|
//! | signed   | signed   | `i64` op                | signed   |
//! | signed   | unsigned | `b` widened to `i64`    | signed   |
//! | signed   | float    | `a` widened to `f64`    | float    |
//! | unsigned | signed   | `a` widened to `i64`    | signed   |
//! | unsigned | unsigned | `u64` op                | unsigned |
//! | unsigned | float    | `a` widened to `f64`    | float    |
//! | float    | signed   | `b` widened to `f64`    | float    |
//! | float    | unsigned | `b` widened to `f64`    | float    |
//! | float    | float    | `f64` op                | float    |
//!
//! Every operator takes its operands as `(b, a)` so that the template
//! pipeline `a | add(b=…)` reads naturally; the result is always `a ⊕ b`.

use std::fmt;

use serde_json::Value;

use crate::error::FunctionError;

// ---------------------------------------------------------------------------
// Kind / Number
// ---------------------------------------------------------------------------

/// Runtime kind of a template value, as far as arithmetic is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    SignedInt,
    UnsignedInt,
    Float,
    Unsupported,
}

/// Classify a template value.
///
/// Integers that fit in `i64` are signed; only larger ones are unsigned.
/// Every other JSON number is a float.
pub fn classify(value: &Value) -> Kind {
    match value {
        Value::Number(n) if n.is_i64() => Kind::SignedInt,
        Value::Number(n) if n.is_u64() => Kind::UnsignedInt,
        Value::Number(_) => Kind::Float,
        _ => Kind::Unsupported,
    }
}

/// A classified numeric operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Number {
    pub fn kind(&self) -> Kind {
        match self {
            Number::Signed(_) => Kind::SignedInt,
            Number::Unsigned(_) => Kind::UnsignedInt,
            Number::Float(_) => Kind::Float,
        }
    }

    /// `None` for any value [`classify`] reports as unsupported.
    pub fn from_value(value: &Value) -> Option<Number> {
        let n = match value {
            Value::Number(n) => n,
            _ => return None,
        };
        match classify(value) {
            Kind::UnsignedInt => n.as_u64().map(Number::Unsigned),
            Kind::SignedInt => n.as_i64().map(Number::Signed),
            Kind::Float => n.as_f64().map(Number::Float),
            Kind::Unsupported => None,
        }
    }

    /// Non-finite floats have no JSON number form and become strings.
    pub fn to_value(self) -> Value {
        match self {
            Number::Signed(v) => Value::from(v),
            Number::Unsigned(v) => Value::from(v),
            Number::Float(v) => serde_json::Number::from_f64(v)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(v.to_string())),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Number::Signed(_) => "i64",
            Number::Unsigned(_) => "u64",
            Number::Float(_) => "f64",
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Signed(v) => v.fmt(f),
            Number::Unsigned(v) => v.fmt(f),
            Number::Float(v) => v.fmt(f),
        }
    }
}

/// Type label used in "unknown type" messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Number(_) => match Number::from_value(value) {
            Some(n) => n.type_name(),
            None => "number",
        },
    }
}

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// The arithmetic helpers exposed to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Operator {
    /// All operators in a stable order.
    pub fn all() -> &'static [Operator] {
        &[
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
            Operator::Modulo,
        ]
    }

    /// Name under which the operator is registered.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::Modulo => "modulo",
        }
    }

    fn accepts_float(&self) -> bool {
        !matches!(self, Operator::Modulo)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Promotion + dispatch
// ---------------------------------------------------------------------------

/// Operand pair after promotion to a common kind, `(a, b)` order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Promoted {
    Signed(i64, i64),
    Unsigned(u64, u64),
    Float(f64, f64),
}

fn widen(op: Operator, v: u64) -> Result<i64, FunctionError> {
    i64::try_from(v).map_err(|_| FunctionError::Overflow { op: op.name() })
}

fn promote(op: Operator, a: Number, b: Number) -> Result<Promoted, FunctionError> {
    use Number::{Float, Signed, Unsigned};
    Ok(match (a, b) {
        (Signed(a), Signed(b)) => Promoted::Signed(a, b),
        (Signed(a), Unsigned(b)) => Promoted::Signed(a, widen(op, b)?),
        (Signed(a), Float(b)) => Promoted::Float(a as f64, b),
        (Unsigned(a), Signed(b)) => Promoted::Signed(widen(op, a)?, b),
        (Unsigned(a), Unsigned(b)) => Promoted::Unsigned(a, b),
        (Unsigned(a), Float(b)) => Promoted::Float(a as f64, b),
        (Float(a), Signed(b)) => Promoted::Float(a, b as f64),
        (Float(a), Unsigned(b)) => Promoted::Float(a, b as f64),
        (Float(a), Float(b)) => Promoted::Float(a, b),
    })
}

fn unknown(op: Operator, n: Number) -> FunctionError {
    FunctionError::UnknownType {
        op: op.name(),
        value: n.to_string(),
        type_name: n.type_name(),
    }
}

macro_rules! integer_op {
    ($op:expr, $a:expr, $b:expr) => {{
        let (op, a, b) = ($op, $a, $b);
        let zero_divisor = b == 0 && matches!(op, Operator::Divide | Operator::Modulo);
        if zero_divisor {
            Err(FunctionError::DivisionByZero { op: op.name() })
        } else {
            let result = match op {
                Operator::Add => a.checked_add(b),
                Operator::Subtract => a.checked_sub(b),
                Operator::Multiply => a.checked_mul(b),
                Operator::Divide => a.checked_div(b),
                Operator::Modulo => a.checked_rem(b),
            };
            result.ok_or(FunctionError::Overflow { op: op.name() })
        }
    }};
}

fn float_op(op: Operator, a: f64, b: f64) -> f64 {
    match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => a / b,
        Operator::Modulo => a % b,
    }
}

/// Compute `a ⊕ b` for operands given in pipeline order `(b, a)`.
pub fn apply(op: Operator, b: Number, a: Number) -> Result<Number, FunctionError> {
    if !op.accepts_float() {
        if a.kind() == Kind::Float {
            return Err(unknown(op, a));
        }
        if b.kind() == Kind::Float {
            return Err(unknown(op, b));
        }
    }
    match promote(op, a, b)? {
        Promoted::Signed(a, b) => integer_op!(op, a, b).map(Number::Signed),
        Promoted::Unsigned(a, b) => integer_op!(op, a, b).map(Number::Unsigned),
        Promoted::Float(a, b) => Ok(Number::Float(float_op(op, a, b))),
    }
}

fn operand(op: Operator, value: &Value) -> Result<Number, FunctionError> {
    Number::from_value(value).ok_or_else(|| FunctionError::UnknownType {
        op: op.name(),
        value: value.to_string(),
        type_name: type_name(value),
    })
}

/// [`apply`] over raw template values; `a` is checked before `b`.
pub fn apply_values(op: Operator, b: &Value, a: &Value) -> Result<Value, FunctionError> {
    let a = operand(op, a)?;
    let b = operand(op, b)?;
    apply(op, b, a).map(Number::to_value)
}

/// `a + b`.
pub fn add(b: Number, a: Number) -> Result<Number, FunctionError> {
    apply(Operator::Add, b, a)
}

/// `a - b`.
pub fn subtract(b: Number, a: Number) -> Result<Number, FunctionError> {
    apply(Operator::Subtract, b, a)
}

/// `a * b`.
pub fn multiply(b: Number, a: Number) -> Result<Number, FunctionError> {
    apply(Operator::Multiply, b, a)
}

/// `a / b`; truncates on integers.
pub fn divide(b: Number, a: Number) -> Result<Number, FunctionError> {
    apply(Operator::Divide, b, a)
}

/// `a % b`; integers only.
pub fn modulo(b: Number, a: Number) -> Result<Number, FunctionError> {
    apply(Operator::Modulo, b, a)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
