//! ChaCha20 benchmark
use benches::{criterion_group_bench, Benchmarker};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::num::NonZeroUsize;

use chacha20_ietf::{
    cipher::{KeyIvInit, StreamCipher},
    ChaCha20, Config, CounterMode, Session,
};

const KB: usize = 1024;

fn bench(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("stream-cipher");

    for size in &[KB, 2 * KB, 4 * KB, 8 * KB, 16 * KB] {
        let mut buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("apply_keystream", size), |b| {
            let key = Default::default();
            let nonce = Default::default();
            let mut cipher = ChaCha20::new(&key, &nonce);
            b.iter(|| cipher.apply_keystream(&mut buf));
        });
    }

    group.finish();
}

fn session(config: Config) -> Session {
    // restart so repeated iterations never exhaust the counter space
    let config = config.counter_mode(CounterMode::Restart);
    Session::with_config(&Default::default(), &Default::default(), config)
}

fn bench_session(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("chacha20-session");

    for size in &[KB, 16 * KB, 256 * KB, 1024 * KB] {
        let mut buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("process", size), |b| {
            let mut session = session(Config::default());
            b.iter(|| session.process(&mut buf));
        });

        for workers in [2, 4] {
            let workers = NonZeroUsize::new(workers).unwrap();
            let id = format!("process_parallel/{workers}");
            group.bench_function(BenchmarkId::new(id, size), |b| {
                let mut session = session(Config::default());
                b.iter(|| session.process_parallel(&mut buf, workers));
            });
        }
    }

    group.finish();
}

criterion_group_bench!(benches, bench);
criterion_group_bench!(benches_session, bench_session);
criterion_main!(benches, benches_session);
