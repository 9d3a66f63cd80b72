// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Comparison expressions and value matching

use crate::db::Attributes;
use crate::error::CompileError;
use glob::{MatchOptions, Pattern};
use pest::Parser;
use pest_derive::Parser;
use std::cmp::Ordering;
use std::fmt;

#[derive(Parser)]
#[grammar = "plan/comparison.pest"]
struct ComparisonParser;

pub(crate) const CASE_SENSITIVE: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

pub(crate) const CASE_INSENSITIVE: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

pub(crate) fn compile_glob(pattern: &str) -> Result<Pattern, CompileError> {
    Pattern::new(pattern).map_err(|err| CompileError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.msg.to_string(),
    })
}

/// Relational operator of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(CompareOp::Eq),
            ">" => Some(CompareOp::Gt),
            ">=" | "=>" => Some(CompareOp::Ge),
            "<" => Some(CompareOp::Lt),
            "<=" | "=<" => Some(CompareOp::Le),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }

    /// Whether `candidate.cmp(reference)` satisfies the operator
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed `subject [op value]` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub subject: String,
    pub op: Option<CompareOp>,
    pub value: String,
}

impl Comparison {
    pub fn parse(keyword: &str, input: &str) -> Result<Self, CompileError> {
        let invalid = |reason: String| CompileError::InvalidComparison {
            keyword: keyword.to_string(),
            input: input.to_string(),
            reason,
        };

        let mut pairs = ComparisonParser::parse(Rule::comparison, input)
            .map_err(|err| invalid(err.variant.message().to_string()))?;
        let comparison = pairs
            .next()
            .ok_or_else(|| invalid("empty comparison".to_string()))?;

        let mut parsed = Comparison {
            subject: String::new(),
            op: None,
            value: String::new(),
        };
        for pair in comparison.into_inner() {
            match pair.as_rule() {
                Rule::subject => parsed.subject = unescape(pair.as_str()),
                Rule::operator => {
                    parsed.op = Some(
                        CompareOp::from_symbol(pair.as_str())
                            .ok_or_else(|| invalid(format!("unknown operator {}", pair.as_str())))?,
                    )
                }
                Rule::value => parsed.value = pair.as_str().to_string(),
                _ => {}
            }
        }
        Ok(parsed)
    }
}

fn unescape(subject: &str) -> String {
    let mut out = String::with_capacity(subject.len());
    let mut chars = subject.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            if let Some(&next @ ('=' | '<' | '>')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Right-hand side of an attribute or parameter comparison
#[derive(Debug, Clone)]
pub enum ValueMatcher {
    /// All-digit values compare as integers
    Numeric(i64),
    /// Anything else: glob for `=`, byte order for `<`/`>`
    Text { pattern: Pattern, literal: String },
}

impl ValueMatcher {
    pub fn new(value: &str) -> Result<Self, CompileError> {
        if is_numeric(value) {
            if let Ok(number) = value.parse() {
                return Ok(ValueMatcher::Numeric(number));
            }
        }
        Ok(ValueMatcher::Text {
            pattern: compile_glob(value)?,
            literal: value.to_string(),
        })
    }

    pub fn matches(&self, op: CompareOp, candidate: &str) -> bool {
        match self {
            ValueMatcher::Numeric(reference) => candidate
                .trim()
                .parse::<i64>()
                .map_or(false, |number| op.holds(number.cmp(reference))),
            ValueMatcher::Text { pattern, literal } => {
                let order = candidate.as_bytes().cmp(literal.as_bytes());
                let glob = || pattern.matches_with(candidate, CASE_SENSITIVE);
                match op {
                    CompareOp::Eq => glob(),
                    CompareOp::Gt => order == Ordering::Greater,
                    CompareOp::Lt => order == Ordering::Less,
                    CompareOp::Ge => glob() || order == Ordering::Greater,
                    CompareOp::Le => glob() || order == Ordering::Less,
                }
            }
        }
    }
}

/// `-attr` / `-param` argument: a glob over keys with an optional value test
#[derive(Debug, Clone)]
pub struct KeyValueFilter {
    raw: String,
    key: Pattern,
    value: Option<(CompareOp, ValueMatcher)>,
}

impl KeyValueFilter {
    pub fn parse(keyword: &str, input: &str) -> Result<Self, CompileError> {
        let comparison = Comparison::parse(keyword, input)?;
        if comparison.subject.is_empty() {
            return Err(CompileError::InvalidComparison {
                keyword: keyword.to_string(),
                input: input.to_string(),
                reason: "missing name".to_string(),
            });
        }

        let value = match comparison.op {
            Some(op) => Some((op, ValueMatcher::new(&comparison.value)?)),
            None => None,
        };

        Ok(Self {
            raw: input.to_string(),
            key: compile_glob(&comparison.subject)?,
            value,
        })
    }

    /// True if some entry has a matching key and, when a value test is
    /// present, a matching value
    pub fn matches(&self, entries: &Attributes) -> bool {
        entries.iter().any(|(key, value)| {
            self.key.matches_with(key, CASE_SENSITIVE)
                && self
                    .value
                    .as_ref()
                    .map_or(true, |(op, matcher)| matcher.matches(*op, value))
        })
    }
}

impl fmt::Display for KeyValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Integer test used by `-size`, `-depth` and `-nnodes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFilter {
    pub op: CompareOp,
    pub value: i64,
}

impl NumericFilter {
    /// Accepts `n`, `[op]n` and `subject[op]n` where `subject` names the
    /// implicit quantity (e.g. `depth>=2`)
    pub fn parse(keyword: &str, subject: &str, input: &str) -> Result<Self, CompileError> {
        let comparison = Comparison::parse(keyword, input)?;
        let (op, value) = match comparison.op {
            None => (CompareOp::Eq, comparison.subject.as_str()),
            Some(op) => {
                if !comparison.subject.is_empty() && comparison.subject != subject {
                    return Err(CompileError::InvalidComparison {
                        keyword: keyword.to_string(),
                        input: input.to_string(),
                        reason: format!("unexpected left-hand side {:?}", comparison.subject),
                    });
                }
                (op, comparison.value.as_str())
            }
        };

        let value = value
            .trim()
            .parse::<i64>()
            .map_err(|_| CompileError::InvalidNumber {
                keyword: keyword.to_string(),
                value: value.to_string(),
            })?;
        Ok(Self { op, value })
    }

    pub fn matches(&self, quantity: i64) -> bool {
        self.op.holds(quantity.cmp(&self.value))
    }
}

impl fmt::Display for NumericFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.value)
    }
}

/// Parse a keyword suffix such as `>=2` into an operator and a count
pub(crate) fn parse_qualifier(
    keyword: &str,
    qualifier: &str,
) -> Result<(CompareOp, usize), CompileError> {
    let invalid = || CompileError::InvalidQualifier {
        keyword: keyword.to_string(),
        qualifier: qualifier.to_string(),
    };

    let comparison = Comparison::parse(keyword, qualifier)?;
    match comparison.op {
        Some(op) if comparison.subject.is_empty() => {
            let count = comparison.value.parse::<usize>().map_err(|_| invalid())?;
            Ok((op, count))
        }
        _ => Err(invalid()),
    }
}
