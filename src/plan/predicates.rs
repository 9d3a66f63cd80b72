// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Leaf predicate evaluation

use super::comparison::{CASE_INSENSITIVE, CASE_SENSITIVE};
use super::node::NodeKind;
use crate::accessor::{incoming_matrix, ObjectView};
use crate::db::{Attributes, Database};
use crate::path::FullPath;
use glob::Pattern;

/// Attributes written by standard geometry tools
pub const STANDARD_ATTRIBUTES: &[&str] = &[
    "GIFTmater",
    "aircode",
    "inherit",
    "los",
    "material_id",
    "oshader",
    "region",
    "region_id",
    "rgb",
];

/// Types that carry no solid geometry
const NON_GEOMETRIC_TYPES: &[&str] = &[
    "annot",
    "binary",
    "constraint",
    "datum",
    "grip",
    "joint",
    "script",
    "sketch",
];

/// Geometric types that do not bound a finite volume
const NON_VOLUMETRIC_TYPES: &[&str] = &["half", "pnts"];

const MATRIX_TOLERANCE: f64 = 1e-12;

/// Evaluate a non-composite node against the current object of `path`
pub(crate) fn evaluate(kind: &NodeKind, db: &dyn Database, path: &FullPath) -> bool {
    let view = ObjectView::new(db, path.current());
    match kind {
        NodeKind::Name(pattern) => pattern.matches_with(view.name(), CASE_SENSITIVE),
        NodeKind::IName(pattern) => pattern.matches_with(view.name(), CASE_INSENSITIVE),
        NodeKind::Path(pattern) => pattern.matches_with(&path.to_path_string(db), CASE_SENSITIVE),
        NodeKind::Regex(regex) | NodeKind::IRegex(regex) => {
            regex.is_match(&path.to_path_string(db))
        }
        NodeKind::Attr(filter) => view
            .attributes()
            .is_some_and(|attributes| filter.matches(&attributes)),
        NodeKind::Param(filter) => view
            .parameters()
            .is_some_and(|parameters| filter.matches(&parameters)),
        NodeKind::StdAttr => view.attributes().is_some_and(|a| is_standard(&a)),
        NodeKind::Type(pattern) => type_matches(pattern, &view),
        NodeKind::Size(filter) => filter.matches(i64::try_from(view.size()).unwrap_or(i64::MAX)),
        NodeKind::Bool(op) => path.current_step().op == *op,
        NodeKind::Depth(filter) => filter.matches(path.depth() as i64),
        NodeKind::MinDepth(min) => path.depth() >= *min,
        NodeKind::MaxDepth(max) => path.depth() <= *max,
        NodeKind::NNodes(filter) => view
            .leaf_count()
            .is_some_and(|count| filter.matches(count as i64)),
        NodeKind::Idn => incoming_matrix(db, path)
            .is_some_and(|matrix| matrix.is_identity(MATRIX_TOLERANCE)),
        NodeKind::Above(_)
        | NodeKind::Below(_)
        | NodeKind::Not(_)
        | NodeKind::Or(..)
        | NodeKind::Expr(_)
        | NodeKind::Print
        | NodeKind::Exec(_) => false,
    }
}

fn is_standard(attributes: &Attributes) -> bool {
    !attributes.is_empty()
        && attributes
            .keys()
            .all(|key| STANDARD_ATTRIBUTES.contains(&key.as_str()))
}

fn type_matches(pattern: &Pattern, view: &ObjectView<'_>) -> bool {
    let matches = |label: &str| pattern.matches_with(label, CASE_SENSITIVE);

    if view.is_combination() {
        if view.is_region() && ["r", "reg", "region"].into_iter().any(matches) {
            return true;
        }
        return ["c", "comb", "combination"].into_iter().any(matches);
    }

    let Some(label) = view.type_label() else {
        return false;
    };
    let label: &str = &label;
    if matches(label) {
        return true;
    }

    let shape = !NON_GEOMETRIC_TYPES.contains(&label);
    if matches("shape") && shape {
        return true;
    }

    let plate = is_plate(label, view);
    if matches("plate") && plate {
        return true;
    }

    matches("volume") && shape && !plate && !NON_VOLUMETRIC_TYPES.contains(&label)
}

fn is_plate(label: &str, view: &ObjectView<'_>) -> bool {
    match label {
        "cline" => true,
        "bot" => view
            .parameters()
            .and_then(|parameters| parameters.get("mode").cloned())
            .is_some_and(|mode| mode.starts_with("plate")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BoolOp, MemoryDatabase, ObjectId};
    use crate::plan::comparison::compile_glob;

    fn type_check(db: &MemoryDatabase, id: ObjectId, pattern: &str) -> bool {
        let kind = NodeKind::Type(compile_glob(pattern).unwrap());
        evaluate(&kind, db, &FullPath::root(id))
    }

    #[test]
    fn test_combination_types() {
        let mut db = MemoryDatabase::new();
        let comb = db.add_combination("assembly", &[]);
        let region = db.add_region("part.r", &[]);

        assert!(type_check(&db, comb, "comb"));
        assert!(type_check(&db, comb, "c"));
        assert!(!type_check(&db, comb, "region"));
        assert!(type_check(&db, region, "r"));
        assert!(type_check(&db, region, "combination"));
    }

    #[test]
    fn test_primitive_types() {
        let mut db = MemoryDatabase::new();
        let sph = db.add_primitive("ball", "sph");
        let sketch = db.add_primitive("profile", "sketch");
        let half = db.add_primitive("ground", "half");
        let cline = db.add_primitive("wire", "cline");
        let plate_bot = db.add_primitive("skin", "bot");
        db.set_parameter(plate_bot, "mode", "plate_nocos");
        let solid_bot = db.add_primitive("hull", "bot");
        db.set_parameter(solid_bot, "mode", "volume");

        assert!(type_check(&db, sph, "sph"));
        assert!(type_check(&db, sph, "s*"));
        assert!(!type_check(&db, sph, "comb"));

        assert!(type_check(&db, sph, "shape"));
        assert!(!type_check(&db, sketch, "shape"));

        assert!(type_check(&db, cline, "plate"));
        assert!(type_check(&db, plate_bot, "plate"));
        assert!(!type_check(&db, solid_bot, "plate"));

        assert!(type_check(&db, sph, "volume"));
        assert!(type_check(&db, solid_bot, "volume"));
        assert!(!type_check(&db, plate_bot, "volume"));
        assert!(!type_check(&db, half, "volume"));
        assert!(type_check(&db, half, "shape"));
    }

    #[test]
    fn test_unavailable_type_never_matches() {
        let mut db = MemoryDatabase::new();
        let sph = db.add_primitive("ball", "sph");
        db.mark_damaged(sph);
        assert!(!type_check(&db, sph, "*"));
    }

    #[test]
    fn test_standard_attributes() {
        let mut db = MemoryDatabase::new();
        let bare = db.add_primitive("bare", "sph");
        let standard = db.add_region("std.r", &[]);
        db.set_attribute(standard, "region_id", "1000");
        db.set_attribute(standard, "rgb", "0/255/0");
        let custom = db.add_region("custom.r", &[]);
        db.set_attribute(custom, "region_id", "1001");
        db.set_attribute(custom, "owner", "me");

        let check = |id| evaluate(&NodeKind::StdAttr, &db, &FullPath::root(id));
        assert!(!check(bare));
        assert!(check(standard));
        assert!(!check(custom));
    }

    #[test]
    fn test_bool_and_depth() {
        let mut db = MemoryDatabase::new();
        let a = db.add_combination("A", &[(BoolOp::Union, "B"), (BoolOp::Subtract, "C")]);
        db.add_primitive("B", "sph");
        db.add_primitive("C", "sph");

        let paths = crate::path::build_paths(&db, a, false);
        let subtract = NodeKind::Bool(BoolOp::Subtract);
        let hits: Vec<bool> = paths.iter().map(|p| evaluate(&subtract, &db, p)).collect();
        assert_eq!(hits, vec![false, false, true]);

        assert!(evaluate(&NodeKind::MinDepth(1), &db, &paths[1]));
        assert!(!evaluate(&NodeKind::MaxDepth(0), &db, &paths[1]));
    }
}
