use criterion::BenchmarkId;
use criterion::{criterion_group, criterion_main, Criterion};
use fatptr_host::prelude::*;
use std::hint::black_box;
use test::wasms::TestWasm;

/// the codec on its own
pub fn fat_ptr_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("fat_ptr_codec");

    group.bench_function("decode64", |b| {
        b.iter(|| decode64(black_box(0x0000_0005_0000_000A)))
    });
    group.bench_function("encode64", |b| {
        b.iter(|| encode64(black_box(0x0A), black_box(0x05)))
    });
    group.bench_function("decode128", |b| {
        b.iter(|| decode128(black_box(0x0000_0004_0000_0003_0000_0002_0000_0001)))
    });

    group.finish();
}

/// compile a module
pub fn wasm_module_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("wasm_module_compile");
    let builder = ModuleBuilder::new(HostConfig::default().metering_limit);

    for wasm in [TestWasm::Empty, TestWasm::Io, TestWasm::Token] {
        group.bench_function(BenchmarkId::new("wasm_module_compile", wasm.name()), |b| {
            b.iter(|| {
                builder.from_binary(wasm.bytes()).unwrap();
            })
        });
    }

    group.finish();
}

/// instantiate a cached module
pub fn wasm_instance(c: &mut Criterion) {
    let mut group = c.benchmark_group("wasm_instance");

    for wasm in [TestWasm::Empty, TestWasm::Io, TestWasm::Token] {
        group.bench_function(BenchmarkId::new("wasm_instance", wasm.name()), |b| {
            b.iter(|| {
                wasm.instance();
            })
        });
    }

    group.finish();
}

/// a full round trip through h_gen_id
pub fn wasm_call_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("wasm_call_create");
    let mut contract = TestWasm::Token.instance();

    group.bench_function("create", |b| {
        b.iter(|| {
            contract.create().unwrap();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    fat_ptr_codec,
    wasm_module_compile,
    wasm_instance,
    wasm_call_create,
);

criterion_main!(benches);
