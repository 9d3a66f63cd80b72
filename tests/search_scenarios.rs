// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end searches over a small vehicle assembly

use dbsearch::{
    db_search, db_search_full_paths, db_search_unique_objects, BoolOp, CombTree, Database,
    MemoryDatabase, Search, SearchError, SearchFlags, SearchOutcome, SearchResults,
};
use nalgebra::{Matrix4, Vector3};

/// car
///   u body.r     (u body.s, - cabin.s)
///   u engine.r   (u engine.s)
///   u wheels     (u wheel.r, u wheel.r translated)
/// wheel.r        (u tire.s, - hub.s)
/// spare.s        unreferenced primitive
/// scratch        hidden, unreferenced combination (u cabin.s)
fn vehicle() -> MemoryDatabase {
    let mut db = MemoryDatabase::new();
    db.add_combination(
        "car",
        &[
            (BoolOp::Union, "body.r"),
            (BoolOp::Union, "engine.r"),
            (BoolOp::Union, "wheels"),
        ],
    );

    let body = db.add_region("body.r", &[(BoolOp::Union, "body.s"), (BoolOp::Subtract, "cabin.s")]);
    db.set_attribute(body, "region_id", "100");
    db.set_attribute(body, "material_name", "steel");

    let engine = db.add_region("engine.r", &[(BoolOp::Union, "engine.s")]);
    db.set_attribute(engine, "region_id", "200");
    db.set_attribute(engine, "rgb", "64/64/64");

    let rear = Matrix4::new_translation(&Vector3::new(0.0, 2500.0, 0.0));
    db.add_combination_tree(
        "wheels",
        false,
        Some(CombTree::combine(
            BoolOp::Union,
            CombTree::leaf("wheel.r"),
            CombTree::leaf_with_matrix("wheel.r", rear),
        )),
    );

    let wheel = db.add_region("wheel.r", &[(BoolOp::Union, "tire.s"), (BoolOp::Subtract, "hub.s")]);
    db.set_attribute(wheel, "material_name", "rubber");

    let body_solid = db.add_primitive("body.s", "arb8");
    db.set_size(body_solid, 4096);
    db.add_primitive("cabin.s", "arb8");
    db.add_primitive("engine.s", "rpp");
    db.add_primitive("tire.s", "tor");
    db.add_primitive("hub.s", "rcc");
    db.add_primitive("spare.s", "sph");

    let scratch = db.add_combination("scratch", &[(BoolOp::Union, "cabin.s")]);
    db.set_hidden(scratch, true);
    db
}

/// Each matching path prints once, so outside unique mode the match count
/// and the result length agree
fn search(db: &MemoryDatabase, flags: SearchFlags, query: &str) -> Vec<String> {
    let outcome = db_search(flags, query, &[], Some(db), None).unwrap();
    let results = outcome.results().unwrap();
    if !flags.contains(SearchFlags::RETURN_UNIQ_DP) {
        assert_eq!(outcome.count(), results.len(), "{}", query);
    }
    results.to_strings(db)
}

/// hull
///   u plate.s    bot, mode=plate_nocos
///   u solid.s    bot, mode=volume
///   u edge.s     cline
///   u ground.s   half
///   u sketch1    sketch
fn armor() -> MemoryDatabase {
    let mut db = MemoryDatabase::new();
    db.add_combination(
        "hull",
        &[
            (BoolOp::Union, "plate.s"),
            (BoolOp::Union, "solid.s"),
            (BoolOp::Union, "edge.s"),
            (BoolOp::Union, "ground.s"),
            (BoolOp::Union, "sketch1"),
        ],
    );
    let plate = db.add_primitive("plate.s", "bot");
    db.set_parameter(plate, "mode", "plate_nocos");
    let solid = db.add_primitive("solid.s", "bot");
    db.set_parameter(solid, "mode", "volume");
    db.add_primitive("edge.s", "cline");
    db.add_primitive("ground.s", "half");
    db.add_primitive("sketch1", "sketch");
    db
}

fn paths(db: &MemoryDatabase, query: &str) -> Vec<String> {
    search(db, SearchFlags::empty(), query)
}

#[test]
fn test_every_path_matches_empty_query() {
    let db = vehicle();
    let outcome = db_search(SearchFlags::empty(), "", &[], Some(&db), None).unwrap();
    assert_eq!(outcome.count(), 14);

    let found = outcome.results().unwrap().to_strings(&db);
    assert_eq!(found.first().map(String::as_str), Some("/car"));
    assert_eq!(found.last().map(String::as_str), Some("/spare.s"));
    // Both wheel instances print, so the display strings repeat.
    assert_eq!(found.len(), 14);
}

#[test]
fn test_shared_leaf_counts_each_instance() {
    let db = vehicle();
    let outcome = db_search(SearchFlags::empty(), "-name tire.s", &[], Some(&db), None).unwrap();
    assert_eq!(outcome.status_code(), 2);
    assert_eq!(
        outcome.results().unwrap().to_strings(&db),
        vec!["/car/wheels/wheel.r/tire.s", "/car/wheels/wheel.r/tire.s"]
    );

    let found = db_search_full_paths(SearchFlags::empty(), "-name tire.s", &[], &db).unwrap();
    assert_ne!(found[0], found[1]);
}

#[test]
fn test_unique_objects() {
    let db = vehicle();
    let outcome =
        db_search(SearchFlags::RETURN_UNIQ_DP, "-name tire.s", &[], Some(&db), None).unwrap();
    assert_eq!(outcome.count(), 2);
    assert_eq!(
        outcome.results(),
        Some(&SearchResults::Objects(vec![db.lookup("tire.s").unwrap()]))
    );

    let regions = db_search_unique_objects(SearchFlags::empty(), "-type region", &[], &db).unwrap();
    let names: Vec<&str> = regions.iter().map(|&id| db.name(id)).collect();
    assert_eq!(names, vec!["body.r", "engine.r", "wheel.r"]);
}

#[test]
fn test_type_queries() {
    let db = vehicle();
    assert_eq!(
        paths(&db, "-type region"),
        vec![
            "/car/body.r",
            "/car/engine.r",
            "/car/wheels/wheel.r",
            "/car/wheels/wheel.r"
        ]
    );
    assert_eq!(paths(&db, "-type comb").len(), 6);
    assert_eq!(paths(&db, "-type tor").len(), 2);
    assert_eq!(
        paths(&db, "-type arb*"),
        vec!["/car/body.r/body.s", "/car/body.r/cabin.s"]
    );
}

#[test]
fn test_geometry_classes() {
    let db = armor();
    assert_eq!(paths(&db, "-type plate"), vec!["/hull/plate.s", "/hull/edge.s"]);
    assert_eq!(paths(&db, "-type volume"), vec!["/hull/solid.s"]);
    assert_eq!(
        paths(&db, "-type shape"),
        vec!["/hull/plate.s", "/hull/solid.s", "/hull/edge.s", "/hull/ground.s"]
    );
    assert_eq!(paths(&db, "-type sketch"), vec!["/hull/sketch1"]);
}

#[test]
fn test_parameter_queries() {
    let db = armor();
    assert_eq!(paths(&db, "-param mode=plate*"), vec!["/hull/plate.s"]);
    assert_eq!(paths(&db, "-param mode"), vec!["/hull/plate.s", "/hull/solid.s"]);
    assert_eq!(paths(&db, "-type bot -not -param mode=volume"), vec!["/hull/plate.s"]);
    assert!(paths(&db, "-param thickness").is_empty());
}

#[test]
fn test_attribute_queries() {
    let db = vehicle();
    assert_eq!(paths(&db, "-attr material_name=steel"), vec!["/car/body.r"]);
    assert_eq!(paths(&db, "-attr region_id>150"), vec!["/car/engine.r"]);
    assert_eq!(paths(&db, "-attr region_id").len(), 2);
    assert_eq!(paths(&db, "-stdattr"), vec!["/car/engine.r"]);
    assert_eq!(
        paths(&db, "-attr material_name=r*").len(),
        2,
        "glob values match both wheel instances"
    );
}

#[test]
fn test_boolean_operation_filter() {
    let db = vehicle();
    assert_eq!(
        paths(&db, "-bool -"),
        vec![
            "/car/body.r/cabin.s",
            "/car/wheels/wheel.r/hub.s",
            "/car/wheels/wheel.r/hub.s"
        ]
    );
}

#[test]
fn test_depth_limits() {
    let db = vehicle();
    let found = paths(&db, "-mindepth 2 -maxdepth 2");
    assert_eq!(
        found,
        vec![
            "/car/body.r/body.s",
            "/car/body.r/cabin.s",
            "/car/engine.r/engine.s",
            "/car/wheels/wheel.r",
            "/car/wheels/wheel.r"
        ]
    );
    assert_eq!(paths(&db, "-depth=0"), vec!["/car", "/spare.s"]);
    assert_eq!(paths(&db, "-depth>=3").len(), 4);
}

#[test]
fn test_size_and_leaf_count() {
    let db = vehicle();
    assert_eq!(paths(&db, "-size >1000"), vec!["/car/body.r/body.s"]);
    assert_eq!(paths(&db, "-nnodes 3"), vec!["/car"]);
    assert_eq!(paths(&db, "-nnodes 2").len(), 4);
}

#[test]
fn test_identity_matrix() {
    let db = vehicle();
    let outcome = db_search(SearchFlags::empty(), "-name wheel.r -idn", &[], Some(&db), None).unwrap();
    assert_eq!(outcome.count(), 1);
    assert_eq!(
        paths(&db, "-name wheel.r -not -idn"),
        vec!["/car/wheels/wheel.r"]
    );
}

#[test]
fn test_above_and_below() {
    let db = vehicle();
    assert_eq!(
        paths(&db, "-type comb -below -name hub.s"),
        vec![
            "/car",
            "/car/wheels",
            "/car/wheels/wheel.r",
            "/car/wheels/wheel.r"
        ]
    );
    assert_eq!(
        paths(&db, "-above -attr material_name=rubber"),
        vec![
            "/car/wheels/wheel.r/tire.s",
            "/car/wheels/wheel.r/hub.s",
            "/car/wheels/wheel.r/tire.s",
            "/car/wheels/wheel.r/hub.s"
        ]
    );
    assert_eq!(paths(&db, "-below=1 -name wheel.r"), vec!["/car/wheels"]);
}

#[test]
fn test_failed_above_disqualifies_path() {
    let db = vehicle();
    let outcome = db_search(
        SearchFlags::empty(),
        "-above -name nothing -o -name spare.s",
        &[],
        Some(&db),
        None,
    )
    .unwrap();
    assert_eq!(outcome.count(), 0);
    assert!(outcome.results().unwrap().is_empty());
}

#[test]
fn test_or_and_grouping() {
    let db = vehicle();
    assert_eq!(
        paths(&db, "-name engine.* -o -name spare.s"),
        vec!["/car/engine.r", "/car/engine.r/engine.s", "/spare.s"]
    );
    assert_eq!(
        paths(&db, "( -name body.* -o -name engine.* ) -type region"),
        vec!["/car/body.r", "/car/engine.r"]
    );
    assert_eq!(paths(&db, "! -name *.s -not -name *.r"), vec!["/car", "/car/wheels"]);
}

#[test]
fn test_path_and_regex() {
    let db = vehicle();
    assert_eq!(paths(&db, "-path /car/wheels/*/hub.s").len(), 2);
    assert_eq!(
        paths(&db, "-regex engine\\.s$"),
        vec!["/car/engine.r/engine.s"]
    );
    assert_eq!(paths(&db, "-iregex BODY\\.R$"), vec!["/car/body.r"]);
    assert_eq!(paths(&db, "-iname SPARE.S"), vec!["/spare.s"]);
}

#[test]
fn test_hidden_objects() {
    let db = vehicle();
    assert!(paths(&db, "-name scratch").is_empty());
    assert_eq!(
        search(&db, SearchFlags::HIDDEN, "-name scratch"),
        vec!["/scratch"]
    );
    assert_eq!(
        search(&db, SearchFlags::HIDDEN, "-name cabin.s"),
        vec!["/car/body.r/cabin.s", "/scratch/cabin.s"]
    );
}

#[test]
fn test_explicit_start_objects() {
    let db = vehicle();
    let wheels = db.lookup("wheels").unwrap();
    let outcome =
        db_search(SearchFlags::empty(), "-name tire.s", &[wheels], Some(&db), None).unwrap();
    assert_eq!(
        outcome.results().unwrap().to_strings(&db),
        vec!["/wheels/wheel.r/tire.s", "/wheels/wheel.r/tire.s"]
    );
}

#[test]
fn test_flat_and_tree_modes() {
    let db = vehicle();
    assert_eq!(search(&db, SearchFlags::FLAT, "-type comb"), vec!["car"]);
    assert_eq!(
        search(&db, SearchFlags::FLAT | SearchFlags::TREE, "-type comb").len(),
        6
    );
}

#[test]
fn test_or_evaluates_right_branch_only_on_failure() {
    let db = vehicle();
    let mut calls: Vec<(String, String)> = Vec::new();
    let mut record = |argv: &[String]| {
        calls.push((argv[0].clone(), argv[1].clone()));
        argv[0] == "second" || argv[1].ends_with(".s")
    };

    let outcome = Search::new(SearchFlags::empty())
        .exec_handler(&mut record)
        .query("-exec first {} ; -o -exec second {} ;", Some(&db))
        .unwrap();
    assert_eq!(outcome.count(), 14);
    assert!(outcome.results().unwrap().is_empty());

    let first = calls.iter().filter(|(cmd, _)| cmd == "first").count();
    let second: Vec<&str> = calls
        .iter()
        .filter(|(cmd, _)| cmd == "second")
        .map(|(_, path)| path.as_str())
        .collect();
    assert_eq!(first, 14);
    assert_eq!(
        second,
        vec![
            "/car",
            "/car/body.r",
            "/car/engine.r",
            "/car/wheels",
            "/car/wheels/wheel.r",
            "/car/wheels/wheel.r"
        ]
    );
}

#[test]
fn test_print_in_right_branch_after_left_fails() {
    let db = vehicle();
    let outcome = db_search(
        SearchFlags::empty(),
        "-name body.r -print -o -name engine.r -print",
        &[],
        Some(&db),
        None,
    )
    .unwrap();
    assert_eq!(outcome.count(), 2);
    assert_eq!(
        outcome.results().unwrap().to_strings(&db),
        vec!["/car/body.r", "/car/engine.r"]
    );
}

#[test]
fn test_exec_in_right_branch_after_left_fails() {
    let db = vehicle();
    let mut calls = Vec::new();
    let mut record = |argv: &[String]| {
        calls.push(argv[1].clone());
        true
    };

    let outcome = Search::new(SearchFlags::empty())
        .exec_handler(&mut record)
        .query("-name body.r -o -name engine.* -exec record {} ;", Some(&db))
        .unwrap();
    assert_eq!(outcome.count(), 3);
    assert!(outcome.results().unwrap().is_empty());
    assert_eq!(calls, vec!["/car/engine.r", "/car/engine.r/engine.s"]);
}

#[test]
fn test_exec_substitutes_object_names_in_unique_mode() {
    let db = vehicle();
    let mut seen = Vec::new();
    let mut record = |argv: &[String]| {
        seen.push(argv.to_vec());
        true
    };

    let outcome = Search::new(SearchFlags::RETURN_UNIQ_DP)
        .exec_handler(&mut record)
        .query("-name engine.s -exec echo found:{} ;", Some(&db))
        .unwrap();
    assert_eq!(outcome.count(), 1);
    assert_eq!(seen, vec![vec!["echo".to_string(), "found:engine.s".to_string()]]);
}

#[test]
fn test_exec_requires_handler() {
    let db = vehicle();
    let err = db_search(SearchFlags::QUIET, "-exec echo {} ;", &[], Some(&db), None).unwrap_err();
    assert!(matches!(err, SearchError::MissingExecHandler));
    assert_eq!(err.status_code(), -1);
}

#[test]
fn test_repeated_searches_are_identical() {
    let db = vehicle();
    let query = "-type region -o -bool -";
    let first = db_search(SearchFlags::empty(), query, &[], Some(&db), None).unwrap();
    let second = db_search(SearchFlags::empty(), query, &[], Some(&db), None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_damaged_objects_do_not_match() {
    let mut db = vehicle();
    let engine = db.lookup("engine.r").unwrap();
    db.mark_damaged(engine);

    assert_eq!(paths(&db, "-attr region_id"), vec!["/car/body.r"]);
    assert!(paths(&db, "-name engine.s").is_empty());
    assert_eq!(paths(&db, "-name engine.r"), vec!["/car/engine.r"]);
}

#[test]
fn test_cycle_terminates() {
    let mut db = MemoryDatabase::new();
    let a = db.add_combination("A", &[(BoolOp::Union, "B")]);
    db.add_combination("B", &[(BoolOp::Union, "A")]);

    let outcome = db_search(SearchFlags::empty(), "", &[a], Some(&db), None).unwrap();
    assert_eq!(outcome.count(), 3);
    assert_eq!(
        outcome.results().unwrap().to_strings(&db),
        vec!["/A", "/A/B", "/A/B/A"]
    );

    // the repeated object is matched where it closes the cycle
    let named = db_search(SearchFlags::empty(), "-name A", &[a], Some(&db), None).unwrap();
    assert_eq!(named.results().unwrap().to_strings(&db), vec!["/A", "/A/B/A"]);
}

#[test]
fn test_probe_and_status_codes() {
    let outcome = db_search(SearchFlags::QUIET, "-type region", &[], None, None).unwrap();
    assert_eq!(outcome, SearchOutcome::Probe);
    assert_eq!(outcome.status_code(), -2);

    let err = db_search(SearchFlags::QUIET, "( -name a", &[], None, None).unwrap_err();
    assert_eq!(err.status_code(), -1);
}
