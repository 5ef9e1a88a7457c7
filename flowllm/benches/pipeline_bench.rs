//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowllm::prelude::*;

fn values_benchmark(c: &mut Criterion) {
    let base: Values = (0..32).map(|i| (format!("key{i}"), format!("value{i}"))).collect();
    let overlay: Values = (16..48).map(|i| (format!("key{i}"), format!("other{i}"))).collect();

    c.bench_function("values_merge", |b| {
        b.iter(|| black_box(base.merge([&overlay])));
    });
}

fn pipeline_benchmark(c: &mut Criterion) {
    let Ok(rt) = tokio::runtime::Builder::new_multi_thread().enable_all().build() else {
        return;
    };

    let chain = Chain::new()
        .then(Template::new("Tell me about {product}."))
        .then(MapOutputTo::new("prompt"))
        .then(TrimSpace::new(["prompt"]));
    let parallel = (0..8).fold(ParallelChain::new(4), |chain, i| {
        chain.branch(handler_fn(move |vals| Ok(Values::from([(format!("b{i}"), vals.get("product"))]))))
    });
    let input = [Values::from([("product", "socks")])];

    c.bench_function("chain_three_steps", |b| {
        b.iter(|| rt.block_on(chain.call(&CallContext::background(), black_box(&input))));
    });

    c.bench_function("parallel_eight_branches", |b| {
        b.iter(|| rt.block_on(parallel.call(&CallContext::background(), black_box(&input))));
    });
}

criterion_group!(benches, values_benchmark, pipeline_benchmark);
criterion_main!(benches);
