// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `trellis_property` path resolution and enumeration.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use trellis_property::{Context, ListProperty, NodeProperty, Property, Schema};

#[derive(Clone)]
struct Doc {
    sections: Vec<Section>,
}

#[derive(Clone)]
struct Section {
    title: Option<String>,
    entries: Vec<String>,
}

struct DocSchema {
    section: ListProperty<Doc, Section>,
    title: Property<Doc, String>,
    entry: ListProperty<Doc, String>,
}

fn doc_schema() -> DocSchema {
    let mut schema = Schema::new();
    let doc = schema.root::<Doc>("doc");
    let sections = schema.field_mut(
        &doc,
        "sections",
        |d: &Doc| Some(&d.sections),
        |d: &mut Doc| Some(&mut d.sections),
        |d: &mut Doc, v| d.sections = v.unwrap_or_default(),
    );
    let section = schema.elements(&sections, "section");
    let title = schema.field(&section, "title", |s: &Section| s.title.as_ref());
    let entries = schema.field_mut(
        &section,
        "entries",
        |s: &Section| Some(&s.entries),
        |s: &mut Section| Some(&mut s.entries),
        |s: &mut Section, v| s.entries = v.unwrap_or_default(),
    );
    let entry = schema.elements(&entries, "entry");
    DocSchema {
        section,
        title,
        entry,
    }
}

fn doc(sections: usize, entries: usize) -> Doc {
    Doc {
        sections: (0..sections)
            .map(|s| Section {
                title: Some(format!("section {s}")),
                entries: (0..entries).map(|e| format!("entry {s}/{e}")).collect(),
            })
            .collect(),
    }
}

#[derive(Clone)]
struct TreeNode {
    kids: Vec<TreeNode>,
}

fn tree(depth: usize, fanout: usize) -> TreeNode {
    TreeNode {
        kids: if depth == 0 {
            Vec::new()
        } else {
            (0..fanout).map(|_| tree(depth - 1, fanout)).collect()
        },
    }
}

fn tree_schema() -> NodeProperty<TreeNode, TreeNode> {
    let mut schema = Schema::new();
    let root = schema.root::<TreeNode>("tree");
    schema.nodes(
        &root,
        "node",
        |n: &TreeNode| &n.kids,
        |n: &mut TreeNode| &mut n.kids,
    )
}

fn bench_resolve(c: &mut Criterion) {
    let schema = doc_schema();
    let obj = doc(64, 8);

    let mut group = c.benchmark_group("path/resolve");

    group.bench_function("field_through_list", |b| {
        let cx = Context::of(schema.section.at(31));
        b.iter(|| black_box(schema.title.get(&obj, &cx).unwrap()))
    });

    group.bench_function("list_two_levels", |b| {
        let cx = Context::from_refs([schema.section.at(31), schema.entry.at(5)]);
        b.iter(|| black_box(schema.entry.get(&obj, &cx).unwrap()))
    });

    group.bench_function("exists_interrupted", |b| {
        let hollow = Doc {
            sections: vec![Section {
                title: None,
                entries: Vec::new(),
            }],
        };
        let cx = Context::of(schema.section.at(0));
        b.iter(|| black_box(schema.title.exists(&hollow, &cx).unwrap()))
    });

    let node = tree_schema();
    for depth in [4_usize, 16] {
        let chain = tree(depth, 1);
        let cx = Context::of(node.route((0..depth).map(|_| 0_isize)));
        group.bench_function(BenchmarkId::new("route_depth", depth), |b| {
            b.iter(|| black_box(node.get(&chain, &cx).unwrap()))
        });
    }

    group.finish();
}

fn bench_enumerate(c: &mut Criterion) {
    let schema = doc_schema();
    let obj = doc(64, 8);

    let mut group = c.benchmark_group("path/enumerate");

    group.bench_function("contextualize_wide", |b| {
        b.iter(|| black_box(schema.entry.contextualize(&obj).unwrap().len()))
    });

    group.bench_function("occurrences_wide", |b| {
        b.iter(|| black_box(schema.entry.occurrences(&obj).unwrap()))
    });

    let node = tree_schema();
    let wide = tree(4, 4);
    group.bench_function("subtree_walk", |b| {
        b.iter(|| black_box(node.occurrences(&wide).unwrap()))
    });

    group.finish();
}

fn bench_mutate(c: &mut Criterion) {
    let schema = doc_schema();
    let obj = doc(64, 8);

    let mut group = c.benchmark_group("path/mutate");

    group.bench_function("set_indexed", |b| {
        let cx = Context::from_refs([schema.section.at(31), schema.entry.at(5)]);
        b.iter_batched(
            || obj.clone(),
            |mut obj| {
                schema
                    .entry
                    .set(&mut obj, String::from("replaced"), &cx)
                    .unwrap();
                black_box(obj);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("insert_extract", |b| {
        let cx = Context::of(schema.section.at(31));
        b.iter_batched(
            || obj.clone(),
            |mut obj| {
                schema
                    .entry
                    .insert(&mut obj, String::from("appended"), &cx)
                    .unwrap();
                black_box(schema.entry.extract(&mut obj, &cx).unwrap());
                black_box(obj);
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_enumerate, bench_mutate);
criterion_main!(benches);
