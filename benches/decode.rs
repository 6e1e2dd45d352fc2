/// Decode throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use order_workload::{generate_into, Decoder, GeneratorConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_workload(n_lines: usize) -> String {
    let config = GeneratorConfig {
        n_lines,
        ..Default::default()
    };
    let (out, _) = generate_into(&config, ChaCha8Rng::seed_from_u64(7), Vec::new())
        .expect("generate workload");
    String::from_utf8(out).expect("workload is ascii")
}

fn bench_decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");

    for n_lines in [1000, 10000, 100000].iter() {
        let text = create_workload(*n_lines);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_lines), &text, |b, text| {
            b.iter(|| {
                let (_, count) = Decoder::decode_stream(black_box(text), |_| true).unwrap();
                black_box(count)
            });
        });
    }

    group.finish();
}

fn bench_decode_line(c: &mut Criterion) {
    c.bench_function("decode_order_line", |b| {
        b.iter(|| black_box(Decoder::decode_line(black_box("17 B 48213 QXRT 1532 24"), 3)))
    });

    c.bench_function("decode_cancel_line", |b| {
        b.iter(|| black_box(Decoder::decode_line(black_box("17 C 48213"), 3)))
    });
}

criterion_group!(benches, bench_decode_throughput, bench_decode_line);
criterion_main!(benches);
