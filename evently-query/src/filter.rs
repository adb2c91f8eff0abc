use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::{QueryError, Result},
    key::PropertyKey,
};

/// Token separator of the filter language.
pub const TOKEN_SEPARATOR: char = '&';

/// Number of tokens in one `key&value&op&join` group.
pub const GROUP_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "like")]
    Like,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Eq => "=",
            Operation::Ne => "!=",
            Operation::Gt => ">",
            Operation::Gte => ">=",
            Operation::Lt => "<",
            Operation::Lte => "<=",
            Operation::Like => "like",
        }
    }

    /// Whether the stored value is compared as a decimal number.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Operation::Gt | Operation::Gte | Operation::Lt | Operation::Lte
        )
    }
}

impl FromStr for Operation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Operation::Eq),
            "!=" => Ok(Operation::Ne),
            ">" => Ok(Operation::Gt),
            ">=" => Ok(Operation::Gte),
            "<" => Ok(Operation::Lt),
            "<=" => Ok(Operation::Lte),
            "like" => Ok(Operation::Like),
            other => Err(QueryError::UnsupportedOperation(other.to_owned())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinDirective {
    And,
    Or,
    End,
}

impl FromStr for JoinDirective {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "and" => Ok(JoinDirective::And),
            "or" => Ok(JoinDirective::Or),
            "end" => Ok(JoinDirective::End),
            other => Err(QueryError::UnsupportedJoin(other.to_owned())),
        }
    }
}

impl fmt::Display for JoinDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinDirective::And => "and",
            JoinDirective::Or => "or",
            JoinDirective::End => "end",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub key: PropertyKey,
    pub value: String,
}

/// One `key&value&op&join` group as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub condition: FilterCondition,
    pub operation: Operation,
    pub join: JoinDirective,
}

/// Parsed filter expression.
///
/// Keeps every group with its own operator and join directive, even though
/// only a flat conjunction sharing one operator can be evaluated today (see
/// [`Filter::conjunction`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub groups: Vec<FilterGroup>,
}

impl Filter {
    pub fn parse(input: &str) -> Result<Self> {
        let tokens: Vec<&str> = input.split(TOKEN_SEPARATOR).collect();

        if tokens.len() < GROUP_LEN {
            return Err(QueryError::TooFewTokens);
        }

        if tokens.len() % GROUP_LEN != 0 {
            return Err(QueryError::MalformedTokenCount(tokens.len()));
        }

        let mut groups = Vec::new();

        for chunk in tokens.chunks_exact(GROUP_LEN) {
            let group = FilterGroup {
                condition: FilterCondition {
                    key: PropertyKey::new(chunk[0])?,
                    value: chunk[1].to_owned(),
                },
                operation: chunk[2].parse()?,
                join: chunk[3].parse()?,
            };

            let end = group.join == JoinDirective::End;
            groups.push(group);

            if end {
                break;
            }
        }

        if groups.is_empty() {
            return Err(QueryError::NoConditions);
        }

        Ok(Self { groups })
    }

    /// Lowers the filter to the supported subset: every condition ANDed
    /// under a single shared operator. Join directives do not change the
    /// result.
    pub fn conjunction(self) -> Result<Conjunction> {
        let mut groups = self.groups.into_iter();
        let first = groups.next().ok_or(QueryError::NoConditions)?;
        let operation = first.operation;
        let mut conditions = vec![first.condition];

        for group in groups {
            if group.operation != operation {
                return Err(QueryError::MixedOperations);
            }

            conditions.push(group.condition);
        }

        Ok(Conjunction {
            conditions,
            operation,
        })
    }
}

impl FromStr for Filter {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Filter::parse(s)
    }
}

/// Conditions that must all hold, compared with one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conjunction {
    pub conditions: Vec<FilterCondition>,
    pub operation: Operation,
}

/// Parses a `key&value&op&join[&...]` expression into the conditions and the
/// operator they share.
pub fn parse(input: &str) -> Result<Conjunction> {
    Filter::parse(input)?.conjunction()
}
