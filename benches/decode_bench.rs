use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flatrec::{Decoder, SchemaRegistry};
use pprof::criterion::Output;

flatrec::record! {
    #[derive(Debug, Default)]
    struct Trade {
        version: i32 = r#"len:"2""#,
        side: String = r#"len:"1""#,
        symbol: String = r#"sep:"\x1c" len:"12""#,
        qty: i64 = r#"sep:"\x1c""#,
        fills: Vec<i64> = r#"sep:"\x1c" count:"3""#,
    }
}

const TRADE_DEFINITIONS: &str = r#"
Trade = int version `len:"2"`; string side `len:"1"`; string symbol `sep:"\x1c" len:"12"`; int qty `sep:"\x1c"`; []int fills `sep:"\x1c" count:"3"`
"#;

/// Helper function to create a buffer of back-to-back trade records
fn create_trades(num_records: usize) -> Vec<u8> {
    let mut data = Vec::new();

    for i in 0..num_records {
        data.extend_from_slice(b"01");
        data.push(if i % 2 == 0 { b'B' } else { b'S' });
        data.extend_from_slice(format!("SYM{}", i % 97).as_bytes());
        data.push(0x1c);
        data.extend_from_slice((i * 10).to_string().as_bytes());
        data.push(0x1c);
        for fill in 0..3 {
            data.extend_from_slice((i as i64 - fill).to_string().as_bytes());
            data.push(0x1c);
        }
    }

    data
}

fn benchmark_typed(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_typed");

    for num_records in [100, 10_000] {
        let data = create_trades(num_records);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_function(BenchmarkId::new("records", num_records), |b| {
            b.iter(|| {
                let mut decoder = Decoder::new(black_box(&data));
                let mut trade = Trade::default();
                while !decoder.is_exhausted() {
                    decoder.decode(&mut trade).unwrap();
                }
                black_box(trade);
            });
        });
    }

    group.finish();
}

fn benchmark_dynamic(c: &mut Criterion) {
    let registry = SchemaRegistry::from_definitions(TRADE_DEFINITIONS).unwrap();
    let data = create_trades(10_000);
    let size = data.len();

    let mut group = c.benchmark_group("decode_dynamic");
    group.throughput(Throughput::Bytes(size as u64));
    group.sample_size(20);

    group.bench_function(BenchmarkId::new("10k_records", size), |b| {
        b.iter(|| {
            let values = registry.decode_all("Trade", black_box(&data)).unwrap();
            black_box(values);
        });
    });

    group.finish();
}

fn benchmark_definitions(c: &mut Criterion) {
    c.bench_function("parse_definitions", |b| {
        b.iter(|| {
            let registry = SchemaRegistry::from_definitions(black_box(TRADE_DEFINITIONS)).unwrap();
            black_box(registry);
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(pprof::criterion::PProfProfiler::new(100, Output::Flamegraph(None)));
    targets =
        benchmark_typed,
        benchmark_dynamic,
        benchmark_definitions
}
criterion_main!(benches);
