//! Criterion benchmarks for docquery.
//!
//! Covers the hot paths of a request:
//! - Predicate compilation
//! - Federated row access
//! - Row iteration

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use docquery::dictionary::{DataType, MemoryDictionary, NamespaceMap, QName, TypeRegistry};
use docquery::federation::{FederatedResultSet, QueryOptions};
use docquery::query::*;
use docquery::repository::MemoryEntityLookup;
use docquery::search::{HitResultSet, ResultSet};

const CM: &str = "urn:content";

/// Build `selectors` aligned results of `rows` rows each.
fn build_federation(selectors: usize, rows: usize) -> FederatedResultSet {
    let results: Vec<(String, Arc<dyn ResultSet>)> = (0..selectors)
        .map(|s| {
            let hits = (0..rows).map(|i| (i.to_string(), (i % 10) as f32 / 10.0));
            let result: Arc<dyn ResultSet> = Arc::new(HitResultSet::from_hits(hits));
            (format!("s{s}"), result)
        })
        .collect();
    FederatedResultSet::new(
        results,
        QueryOptions::default().with_max_items(rows),
        Arc::new(MemoryEntityLookup::new()),
    )
    .unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let types = TypeRegistry::builder()
        .add_type(QName::new(CM, "object"), None)
        .add_type(QName::new(CM, "document"), Some(QName::new(CM, "object")))
        .build()
        .unwrap();
    let dictionary = MemoryDictionary::new(types)
        .with_property(QName::new(CM, "name"), DataType::Text)
        .with_property(QName::new(CM, "title"), DataType::MlText)
        .with_property(QName::new(CM, "size"), DataType::Long);
    let context = QueryBuilderContext::new(
        Arc::new(dictionary),
        Arc::new(NamespaceMap::new().with_prefix("cm", CM)),
        TenantContext::domain("acme.com"),
        SearchParameters::new(),
        MlAnalysisMode::LocaleAndAll,
        Arc::new(StaticSnapshot::new(1)),
    );
    let predicate = Predicate::and(vec![
        Predicate::is_type("cm:object"),
        Predicate::like("cm:name", "budget%"),
        Predicate::compare("cm:size", CompareOp::Ge, 1024i64),
        Predicate::full_text_in("cm:title", "annual financial report"),
    ]);
    let sort = SortSpec::new().by_property("cm:name", true);

    c.bench_function("compile_predicate", |b| {
        b.iter(|| context.compile(black_box(&predicate), black_box(&sort)).unwrap())
    });
}

fn bench_row_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_access");
    for selectors in [1, 2, 4] {
        let set = build_federation(selectors, 1000);
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::from_parameter(selectors), &set, |b, set| {
            b.iter(|| {
                for i in 0..1000 {
                    black_box(set.entity_id(i).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let set = build_federation(2, 10_000);
    let mut group = c.benchmark_group("iteration");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("rows", |b| {
        b.iter(|| {
            let mut total = 0.0f32;
            for row in set.iter().unwrap() {
                total += row.unwrap().score().unwrap();
            }
            black_box(total)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_compile, bench_row_access, bench_iteration);
criterion_main!(benches);
