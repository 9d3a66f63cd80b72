// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Keyword table for the query language

/// Recognized query keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Not,
    Open,
    Close,
    And,
    Above,
    Attr,
    Below,
    Bool,
    Depth,
    Exec,
    Idn,
    IName,
    IRegex,
    MaxDepth,
    MinDepth,
    Name,
    NNodes,
    Or,
    Param,
    Path,
    Print,
    Regex,
    Size,
    StdAttr,
    Type,
}

/// Arguments a keyword consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    None,
    One,
    /// Everything up to a literal `;`
    UntilSemicolon,
}

pub(crate) struct OptionSpec {
    pub name: &'static str,
    pub keyword: Keyword,
    pub arity: Arity,
}

const fn option(name: &'static str, keyword: Keyword, arity: Arity) -> OptionSpec {
    OptionSpec {
        name,
        keyword,
        arity,
    }
}

/// Sorted by byte order for binary search
pub(crate) static OPTIONS: &[OptionSpec] = &[
    option("!", Keyword::Not, Arity::None),
    option("(", Keyword::Open, Arity::None),
    option(")", Keyword::Close, Arity::None),
    option("-a", Keyword::And, Arity::None),
    option("-ab", Keyword::Above, Arity::None),
    option("-above", Keyword::Above, Arity::None),
    option("-and", Keyword::And, Arity::None),
    option("-attr", Keyword::Attr, Arity::One),
    option("-below", Keyword::Below, Arity::None),
    option("-bl", Keyword::Below, Arity::None),
    option("-bool", Keyword::Bool, Arity::One),
    option("-depth", Keyword::Depth, Arity::One),
    option("-exec", Keyword::Exec, Arity::UntilSemicolon),
    option("-idn", Keyword::Idn, Arity::None),
    option("-iname", Keyword::IName, Arity::One),
    option("-iregex", Keyword::IRegex, Arity::One),
    option("-maxdepth", Keyword::MaxDepth, Arity::One),
    option("-mindepth", Keyword::MinDepth, Arity::One),
    option("-name", Keyword::Name, Arity::One),
    option("-nnodes", Keyword::NNodes, Arity::One),
    option("-not", Keyword::Not, Arity::None),
    option("-o", Keyword::Or, Arity::None),
    option("-or", Keyword::Or, Arity::None),
    option("-param", Keyword::Param, Arity::One),
    option("-path", Keyword::Path, Arity::One),
    option("-print", Keyword::Print, Arity::None),
    option("-regex", Keyword::Regex, Arity::One),
    option("-size", Keyword::Size, Arity::One),
    option("-stdattr", Keyword::StdAttr, Arity::None),
    option("-type", Keyword::Type, Arity::One),
];

pub(crate) fn lookup(name: &str) -> Option<&'static OptionSpec> {
    OPTIONS
        .binary_search_by(|option| option.name.cmp(name))
        .ok()
        .map(|index| &OPTIONS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in OPTIONS.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "{} must sort before {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("-name").map(|o| o.keyword), Some(Keyword::Name));
        assert_eq!(lookup("-ab").map(|o| o.keyword), Some(Keyword::Above));
        assert_eq!(lookup("!").map(|o| o.keyword), Some(Keyword::Not));
        assert_eq!(lookup("-exec").map(|o| o.arity), Some(Arity::UntilSemicolon));
        assert!(lookup("-nam").is_none());
        assert!(lookup("name").is_none());
    }
}
