// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for plan compilation and search

/// Failure to turn a query into a search plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("{0}: unknown primary or operator")]
    UnknownPredicate(String),

    #[error("{0}: requires additional arguments")]
    MissingArgument(String),

    #[error("-exec: no terminating \";\"")]
    MissingExecTerminator,

    #[error("unbalanced parentheses: {0}")]
    UnbalancedParens(&'static str),

    #[error("(): empty inner expression")]
    EmptyExpression,

    #[error("!: no following expression")]
    DanglingNot,

    #[error("-o: expression missing on one side")]
    DanglingOr,

    #[error("-above: no following expression")]
    DanglingAbove,

    #[error("-below: no following expression")]
    DanglingBelow,

    #[error("-above: cannot be followed by another -above")]
    RepeatedAbove,

    #[error("-below: cannot be followed by another -below")]
    RepeatedBelow,

    #[error("invalid regular expression {pattern:?}: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{keyword}: invalid comparison {input:?}: {reason}")]
    InvalidComparison {
        keyword: String,
        input: String,
        reason: String,
    },

    #[error("{keyword}: {value:?} is not an integer")]
    InvalidNumber { keyword: String, value: String },

    #[error("{keyword}: invalid depth qualifier {qualifier:?}")]
    InvalidQualifier { keyword: String, qualifier: String },

    #[error("-bool: unknown boolean operator {0:?}")]
    InvalidBoolOp(String),
}

/// Failure of a whole search call
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("plan contains -exec but no exec handler was supplied")]
    MissingExecHandler,
}

impl SearchError {
    /// Legacy integer status for a failed search
    pub fn status_code(&self) -> i64 {
        -1
    }
}
