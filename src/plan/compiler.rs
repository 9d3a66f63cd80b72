// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Query compiler
//!
//! Compilation runs in four passes over a flat item stream:
//! tokenizing keywords into items, folding parentheses into groups,
//! folding negations and `-above`/`-below` onto their operands, and
//! finally folding `-o` into binary nodes.

use super::comparison::{compile_glob, parse_qualifier, KeyValueFilter, NumericFilter};
use super::node::{DepthRange, ExecTemplate, NodeKind, Plan, PlanNode};
use super::options::{self, Arity, Keyword, OptionSpec};
use crate::db::BoolOp;
use crate::error::CompileError;
use regex::{Regex, RegexBuilder};
use std::iter::Peekable;
use std::vec::IntoIter;

#[derive(Debug)]
enum Item {
    Node(PlanNode),
    Open,
    Close,
    Not,
    Or,
    Above(DepthRange),
    Below(DepthRange),
    Group(Vec<Item>),
}

/// Compile a tokenized query into a plan
pub(crate) fn compile<S: AsRef<str>>(args: &[S]) -> Result<Plan, CompileError> {
    let (items, has_action) = tokenize(args)?;
    check_balance(&items)?;

    let items = if has_action {
        items
    } else if items.is_empty() {
        vec![Item::Node(PlanNode::new(NodeKind::Print))]
    } else {
        let mut wrapped = Vec::with_capacity(items.len() + 3);
        wrapped.push(Item::Open);
        wrapped.extend(items);
        wrapped.push(Item::Close);
        wrapped.push(Item::Node(PlanNode::new(NodeKind::Print)));
        wrapped
    };

    fold(paren_fold(items)?)
}

fn tokenize<S: AsRef<str>>(args: &[S]) -> Result<(Vec<Item>, bool), CompileError> {
    let mut items = Vec::new();
    let mut has_action = false;
    let mut tokens = args.iter().map(|arg| arg.as_ref());

    while let Some(token) = tokens.next() {
        let (name, qualifier) = split_qualifier(token);
        let entry = options::lookup(name)
            .ok_or_else(|| CompileError::UnknownPredicate(token.to_string()))?;

        // -depth takes an attached comparison as its argument
        let (depth, inline_argument) = match qualifier {
            Some(qualifier) if entry.keyword == Keyword::Depth => (None, Some(qualifier)),
            Some(qualifier) => (Some(qualifier_range(entry, qualifier)?), None),
            None => (None, None),
        };

        let item = match entry.keyword {
            Keyword::And => continue,
            Keyword::Not => Item::Not,
            Keyword::Open => Item::Open,
            Keyword::Close => Item::Close,
            Keyword::Or => Item::Or,
            Keyword::Above => Item::Above(depth.unwrap_or(DepthRange::RELATIVE)),
            Keyword::Below => Item::Below(depth.unwrap_or(DepthRange::RELATIVE)),
            keyword => {
                let kind = match entry.arity {
                    Arity::None => predicate(keyword, name, "")?,
                    Arity::One => {
                        let argument = match inline_argument {
                            Some(argument) => argument,
                            None => next_argument(&mut tokens, name)?,
                        };
                        predicate(keyword, name, argument)?
                    }
                    Arity::UntilSemicolon => NodeKind::Exec(exec_template(&mut tokens, name)?),
                };
                has_action |= matches!(kind, NodeKind::Print | NodeKind::Exec(_));
                Item::Node(PlanNode::with_depth(kind, depth.unwrap_or(DepthRange::ANY)))
            }
        };
        items.push(item);
    }

    Ok((items, has_action))
}

/// Split `-above>=2` into `("-above", Some(">=2"))`
fn split_qualifier(token: &str) -> (&str, Option<&str>) {
    if token.len() > 1 && token.starts_with('-') {
        if let Some(index) = token[1..].find(|c| matches!(c, '=' | '<' | '>')) {
            let index = index + 1;
            return (&token[..index], Some(&token[index..]));
        }
    }
    (token, None)
}

fn qualifier_range(entry: &OptionSpec, qualifier: &str) -> Result<DepthRange, CompileError> {
    let floor = match entry.keyword {
        Keyword::Above | Keyword::Below => 1,
        Keyword::Not | Keyword::And | Keyword::Or | Keyword::Open | Keyword::Close => {
            return Err(CompileError::InvalidQualifier {
                keyword: entry.name.to_string(),
                qualifier: qualifier.to_string(),
            })
        }
        _ => 0,
    };
    let (op, count) = parse_qualifier(entry.name, qualifier)?;
    Ok(DepthRange::from_qualifier(op, count, floor))
}

fn next_argument<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<&'a str, CompileError> {
    tokens
        .next()
        .ok_or_else(|| CompileError::MissingArgument(name.to_string()))
}

fn exec_template<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<ExecTemplate, CompileError> {
    let mut argv = Vec::new();
    for token in tokens.by_ref() {
        if token == ";" {
            if argv.is_empty() {
                return Err(CompileError::MissingArgument(name.to_string()));
            }
            return Ok(ExecTemplate::new(argv));
        }
        argv.push(token.to_string());
    }
    Err(CompileError::MissingExecTerminator)
}

fn predicate(keyword: Keyword, name: &str, argument: &str) -> Result<NodeKind, CompileError> {
    let kind = match keyword {
        Keyword::Name => NodeKind::Name(compile_glob(argument)?),
        Keyword::IName => NodeKind::IName(compile_glob(argument)?),
        Keyword::Path => NodeKind::Path(compile_glob(argument)?),
        Keyword::Regex => NodeKind::Regex(compile_regex(argument, false)?),
        Keyword::IRegex => NodeKind::IRegex(compile_regex(argument, true)?),
        Keyword::Attr => NodeKind::Attr(KeyValueFilter::parse(name, argument)?),
        Keyword::Param => NodeKind::Param(KeyValueFilter::parse(name, argument)?),
        Keyword::StdAttr => NodeKind::StdAttr,
        Keyword::Type => NodeKind::Type(compile_glob(argument)?),
        Keyword::Size => NodeKind::Size(NumericFilter::parse(name, "size", argument)?),
        Keyword::Bool => NodeKind::Bool(
            BoolOp::from_symbol(argument)
                .ok_or_else(|| CompileError::InvalidBoolOp(argument.to_string()))?,
        ),
        Keyword::Depth => NodeKind::Depth(NumericFilter::parse(name, "depth", argument)?),
        Keyword::MinDepth => NodeKind::MinDepth(parse_count(name, argument)?),
        Keyword::MaxDepth => NodeKind::MaxDepth(parse_count(name, argument)?),
        Keyword::NNodes => NodeKind::NNodes(NumericFilter::parse(name, "nnodes", argument)?),
        Keyword::Idn => NodeKind::Idn,
        Keyword::Print => NodeKind::Print,
        Keyword::Not
        | Keyword::Open
        | Keyword::Close
        | Keyword::And
        | Keyword::Or
        | Keyword::Above
        | Keyword::Below
        | Keyword::Exec => return Err(CompileError::UnknownPredicate(name.to_string())),
    };
    Ok(kind)
}

fn compile_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, CompileError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|err| CompileError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
}

fn parse_count(name: &str, argument: &str) -> Result<usize, CompileError> {
    argument
        .trim()
        .parse()
        .map_err(|_| CompileError::InvalidNumber {
            keyword: name.to_string(),
            value: argument.to_string(),
        })
}

fn check_balance(items: &[Item]) -> Result<(), CompileError> {
    let mut open = 0usize;
    for item in items {
        match item {
            Item::Open => open += 1,
            Item::Close => {
                open = open
                    .checked_sub(1)
                    .ok_or(CompileError::UnbalancedParens("`)` without matching `(`"))?;
            }
            _ => {}
        }
    }
    if open > 0 {
        return Err(CompileError::UnbalancedParens("missing closing `)`"));
    }
    Ok(())
}

/// Collapse every `( ... )` into an [`Item::Group`]
fn paren_fold(items: Vec<Item>) -> Result<Vec<Item>, CompileError> {
    let mut items = items.into_iter();
    let mut folded = Vec::new();
    while let Some(item) = yank_expr(&mut items)? {
        if matches!(item, Item::Close) {
            return Err(CompileError::UnbalancedParens("`)` without matching `(`"));
        }
        folded.push(item);
    }
    Ok(folded)
}

fn yank_expr(items: &mut IntoIter<Item>) -> Result<Option<Item>, CompileError> {
    let Some(item) = items.next() else {
        return Ok(None);
    };
    if !matches!(item, Item::Open) {
        return Ok(Some(item));
    }

    let mut inner = Vec::new();
    loop {
        match yank_expr(items)? {
            None => return Err(CompileError::UnbalancedParens("missing closing `)`")),
            Some(Item::Close) if inner.is_empty() => return Err(CompileError::EmptyExpression),
            Some(Item::Close) => return Ok(Some(Item::Group(inner))),
            Some(item) => inner.push(item),
        }
    }
}

enum Operand {
    Node(PlanNode),
    Or,
}

/// Unary and disjunction folds over a paren-free item list
fn fold(items: Vec<Item>) -> Result<Plan, CompileError> {
    let mut items = items.into_iter().peekable();
    let mut operands = Vec::new();
    while let Some(item) = items.next() {
        match item {
            Item::Or => operands.push(Operand::Or),
            item => operands.push(Operand::Node(fold_operand(item, &mut items)?)),
        }
    }
    fold_or(operands)
}

fn fold_operand(
    item: Item,
    rest: &mut Peekable<IntoIter<Item>>,
) -> Result<PlanNode, CompileError> {
    match item {
        Item::Node(node) => Ok(node),
        Item::Group(inner) => Ok(PlanNode::new(NodeKind::Expr(fold(inner)?))),
        Item::Not => {
            let mut negations = 1;
            while matches!(rest.peek(), Some(Item::Not)) {
                rest.next();
                negations += 1;
            }
            let operand = match rest.next() {
                None | Some(Item::Or) => return Err(CompileError::DanglingNot),
                Some(next) => fold_operand(next, rest)?,
            };
            if negations % 2 == 0 {
                Ok(operand)
            } else {
                Ok(PlanNode::new(NodeKind::Not(vec![operand])))
            }
        }
        Item::Above(depth) => {
            let operand = match rest.next() {
                None | Some(Item::Or) => return Err(CompileError::DanglingAbove),
                Some(Item::Above(_)) => return Err(CompileError::RepeatedAbove),
                Some(next) => fold_operand(next, rest)?,
            };
            Ok(PlanNode::with_depth(NodeKind::Above(vec![operand]), depth))
        }
        Item::Below(depth) => {
            let operand = match rest.next() {
                None | Some(Item::Or) => return Err(CompileError::DanglingBelow),
                Some(Item::Below(_)) => return Err(CompileError::RepeatedBelow),
                Some(next) => fold_operand(next, rest)?,
            };
            Ok(PlanNode::with_depth(NodeKind::Below(vec![operand]), depth))
        }
        Item::Or => Err(CompileError::DanglingOr),
        Item::Open | Item::Close => Err(CompileError::UnbalancedParens("unexpected parenthesis")),
    }
}

/// Everything left of the first `-o` becomes the left branch; the fold of
/// the remainder becomes the right branch
fn fold_or(operands: Vec<Operand>) -> Result<Plan, CompileError> {
    let mut left = Vec::new();
    let mut operands = operands.into_iter();
    while let Some(operand) = operands.next() {
        match operand {
            Operand::Node(node) => left.push(node),
            Operand::Or => {
                if left.is_empty() {
                    return Err(CompileError::DanglingOr);
                }
                let right = fold_or(operands.collect())?;
                if right.is_empty() {
                    return Err(CompileError::DanglingOr);
                }
                return Ok(vec![PlanNode::new(NodeKind::Or(left, right))]);
            }
        }
    }
    Ok(left)
}
