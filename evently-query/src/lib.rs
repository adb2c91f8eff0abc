#![forbid(unsafe_code)]
//! Property filter language for evently.
//!
//! A filter is written as `key&value&op&join[&key&value&op&join...]` and
//! goes through three steps:
//!
//! 1. [`Filter::parse`] checks the grammar and validates every key,
//! 2. [`Filter::conjunction`] lowers it to the supported subset (one shared
//!    operator, every condition ANDed),
//! 3. [`compile`] turns the conjunction into a [`Predicate`] that the store
//!    evaluates in memory or renders to SQL (`pg` feature).

mod compile;
mod error;
mod filter;
mod key;
mod property;

pub use compile::{
    compile, Comparison, Operand, Predicate, MAX_FRACTION_DIGITS, MAX_INTEGER_DIGITS,
    NUMERIC_PATTERN,
};
pub use error::{QueryError, Result};
pub use filter::{
    parse, Conjunction, Filter, FilterCondition, FilterGroup, JoinDirective, Operation,
    GROUP_LEN, TOKEN_SEPARATOR,
};
pub use key::{validate_key, PropertyKey, MAX_KEY_LEN};
pub use property::{key_sets_match, Property, PropertyBag};
pub use rust_decimal::Decimal;
