/// Errors raised while parsing a filter expression or compiling it into a
/// predicate. Every variant describes caller input, none of them is an
/// infrastructure failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A property key failed validation.
    #[error("invalid property key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The filter has fewer than one full `key&value&op&join` group.
    #[error("where clause must have at least 4 parts (key&value&operation&joinOperation)")]
    TooFewTokens,

    /// The filter token count is not a multiple of four.
    #[error("where clause has {0} parts, expected a multiple of 4")]
    MalformedTokenCount(usize),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("unsupported join operation: {0}")]
    UnsupportedJoin(String),

    #[error("mixed operations not supported in current implementation")]
    MixedOperations,

    #[error("no properties found in where clause")]
    NoConditions,

    /// A numeric comparison was requested with a value that is not a number.
    #[error("numeric value expected for operation {operation} on '{key}', got '{value}'")]
    NonNumericOperand {
        key: String,
        value: String,
        operation: String,
    },

    /// A numeric comparison operand has more digits than numbers may carry.
    #[error("numeric value out of range on '{key}': '{value}' (at most 18 integer and 10 fraction digits)")]
    NumericOutOfRange { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, QueryError>;
