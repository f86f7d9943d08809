//! Type analysis and substitution benchmarks
//!
//! Measures analysis cost on balanced arithmetic trees of growing depth.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use symath::{analyze, substitute, BinaryKind, Bindings, Expr, TypeAnalyzer, UnaryKind};

fn balanced_tree(depth: usize) -> Expr {
    if depth == 0 {
        return Expr::var("x");
    }
    let kind = if depth % 2 == 0 { BinaryKind::Add } else { BinaryKind::Mul };
    let left = Expr::unary(UnaryKind::Sin, balanced_tree(depth - 1));
    Expr::binary(kind, left, balanced_tree(depth - 1)).expect("arithmetic operands are always valid")
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for depth in [4, 8, 12].iter() {
        let tree = balanced_tree(*depth);
        group.bench_with_input(BenchmarkId::new("pure", depth), &tree, |b, tree| {
            b.iter(|| analyze(black_box(tree)))
        });

        let analyzer = TypeAnalyzer::unbounded();
        group.bench_with_input(BenchmarkId::new("checked", depth), &tree, |b, tree| {
            b.iter(|| analyzer.check(black_box(tree)))
        });
    }

    group.finish();
}

fn bench_substitute(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitute");
    let bindings: Bindings = [("x".to_string(), Arc::new(Expr::number(2.0)))].into_iter().collect();

    for depth in [4, 8, 12].iter() {
        let tree = Arc::new(balanced_tree(*depth));
        group.bench_with_input(BenchmarkId::new("bind_all", depth), &tree, |b, tree| {
            b.iter(|| substitute(black_box(tree), &bindings))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_substitute);
criterion_main!(benches);
