// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dbsearch::{db_search, BoolOp, MemoryDatabase, SearchFlags, SearchPlan};

/// `levels` nested assemblies, each holding `fanout` copies of the next
/// level plus one region per copy
fn assembly(levels: usize, fanout: usize) -> MemoryDatabase {
    let mut db = MemoryDatabase::new();
    for level in 0..levels {
        let name = format!("assy{}", level);
        let region = format!("part{}.r", level);
        let child = format!("assy{}", level + 1);

        let mut members = Vec::new();
        for _ in 0..fanout {
            members.push((BoolOp::Union, region.as_str()));
            if level + 1 < levels {
                members.push((BoolOp::Union, child.as_str()));
            }
        }
        db.add_combination(&name, &members);

        let solid = format!("part{}.s", level);
        let hole = format!("hole{}.s", level);
        let id = db.add_region(&region, &[(BoolOp::Union, solid.as_str()), (BoolOp::Subtract, hole.as_str())]);
        db.set_attribute(id, "material_name", if level % 2 == 0 { "steel" } else { "aluminum" });
        db.add_primitive(&solid, "arb8");
        db.add_primitive(&hole, "rcc");
    }
    db
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    let queries = [
        ("simple", "-name *.r"),
        ("or", "-name *.r -o -type comb -o -bool -"),
        ("nested", "( -type region -not -attr material_name=steel ) -above>=2 -name assy*"),
    ];
    for (label, query) in queries {
        group.bench_with_input(BenchmarkId::new(label, ""), &query, |b, query| {
            b.iter(|| SearchPlan::parse(black_box(query)).unwrap());
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for levels in [3usize, 4, 5] {
        let db = assembly(levels, 3);
        group.bench_with_input(BenchmarkId::new("name", levels), &db, |b, db| {
            b.iter(|| db_search(SearchFlags::empty(), "-name part*.s", &[], Some(db), None).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("unique_attr", levels), &db, |b, db| {
            b.iter(|| {
                db_search(
                    SearchFlags::RETURN_UNIQ_DP,
                    "-attr material_name=steel",
                    &[],
                    Some(db),
                    None,
                )
                .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("above", levels), &db, |b, db| {
            b.iter(|| {
                db_search(SearchFlags::empty(), "-bool - -above -type region", &[], Some(db), None)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_search);
criterion_main!(benches);
