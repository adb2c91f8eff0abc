use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::{QueryError, Result},
    filter::{Conjunction, Operation},
    key::PropertyKey,
    property::PropertyBag,
};

#[cfg(feature = "pg")]
mod pg;

/// Digits allowed before the decimal point, leading zeros aside.
pub const MAX_INTEGER_DIGITS: usize = 18;

/// Digits allowed after the decimal point.
pub const MAX_FRACTION_DIGITS: usize = 10;

/// Shape of a stored value that takes part in numeric comparisons. Mirrors
/// [`parse_decimal`], range bounds included, so every engine agrees on which
/// values are numbers.
pub const NUMERIC_PATTERN: &str =
    r"^\s*[-+]?0*([0-9]{1,18}(\.[0-9]{0,10})?|\.[0-9]{1,10})\s*$";

/// Right-hand side of a comparison, typed by its operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Text(String),
    Numeric(Decimal),
}

/// One property comparison, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub key: PropertyKey,
    pub operation: Operation,
    pub operand: Operand,
}

impl Comparison {
    pub fn new(key: PropertyKey, operation: Operation, value: &str) -> Result<Self> {
        let operand = if operation.is_numeric() {
            match parse_decimal(value) {
                Numeric::Value(value) => Operand::Numeric(value),
                Numeric::OutOfRange => {
                    return Err(QueryError::NumericOutOfRange {
                        key: key.to_string(),
                        value: value.to_owned(),
                    })
                }
                Numeric::Invalid => {
                    return Err(QueryError::NonNumericOperand {
                        key: key.to_string(),
                        value: value.to_owned(),
                        operation: operation.to_string(),
                    })
                }
            }
        } else {
            Operand::Text(value.to_owned())
        };

        Ok(Self {
            key,
            operation,
            operand,
        })
    }

    /// Evaluates the comparison against a property bag. A missing key never
    /// matches, and neither does a stored value that is not a number within
    /// range when the operator is numeric.
    pub fn matches(&self, properties: &PropertyBag) -> bool {
        let Some(stored) = properties.get(&self.key) else {
            return false;
        };

        match (&self.operation, &self.operand) {
            (Operation::Eq, Operand::Text(value)) => stored == value,
            (Operation::Ne, Operand::Text(value)) => stored != value,
            (Operation::Like, Operand::Text(value)) => stored.contains(value.as_str()),
            (operation, Operand::Numeric(value)) => {
                let Numeric::Value(stored) = parse_decimal(stored) else {
                    return false;
                };

                match operation {
                    Operation::Gt => stored > *value,
                    Operation::Gte => stored >= *value,
                    Operation::Lt => stored < *value,
                    Operation::Lte => stored <= *value,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

/// `name = event_name AND <every comparison>`.
///
/// Only conjunctions are supported; the parser keeps richer join information
/// that this type does not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub event_name: String,
    pub comparisons: Vec<Comparison>,
}

impl Predicate {
    pub fn matches(&self, name: &str, properties: &PropertyBag) -> bool {
        name == self.event_name && self.comparisons.iter().all(|c| c.matches(properties))
    }
}

/// Compiles parsed conditions into a predicate scoped to `event_name`.
pub fn compile(event_name: impl Into<String>, conjunction: &Conjunction) -> Result<Predicate> {
    let comparisons = conjunction
        .conditions
        .iter()
        .map(|condition| {
            Comparison::new(
                condition.key.clone(),
                conjunction.operation,
                &condition.value,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Predicate {
        event_name: event_name.into(),
        comparisons,
    })
}

pub(crate) enum Numeric {
    Value(Decimal),
    OutOfRange,
    Invalid,
}

/// Lenient decimal parsing shared by operands and stored values: surrounding
/// whitespace is ignored, exponents and digit separators are not accepted.
/// Kept in line with [`NUMERIC_PATTERN`].
pub(crate) fn parse_decimal(value: &str) -> Numeric {
    let value = value.trim();
    let negative = value.starts_with('-');
    let unsigned = value.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(value);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits(integer)
        || !fraction.map_or(true, digits)
        || (integer.is_empty() && fraction.map_or(true, str::is_empty))
    {
        return Numeric::Invalid;
    }

    if integer.trim_start_matches('0').len() > MAX_INTEGER_DIGITS
        || fraction.map_or(0, str::len) > MAX_FRACTION_DIGITS
    {
        return Numeric::OutOfRange;
    }

    let integer = if integer.is_empty() { "0" } else { integer };
    let parsed = match fraction.filter(|fraction| !fraction.is_empty()) {
        Some(fraction) => Decimal::from_str(&format!("{integer}.{fraction}")),
        None => Decimal::from_str(integer),
    };

    match parsed {
        Ok(value) if negative => Numeric::Value(-value),
        Ok(value) => Numeric::Value(value),
        Err(_) => Numeric::Invalid,
    }
}
