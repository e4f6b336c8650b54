use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use sm4_core::{encrypt_block, expand_key, Mode, Sm4Key};

fn bench_block(c: &mut Criterion) {
    let key = Sm4Key::from([0u8; 16]);
    let round_keys = expand_key(&key);
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);

    let mut group = c.benchmark_group("block");
    group.bench_function("expand_key", |b| {
        b.iter(|| expand_key(&key));
    });
    group.bench_function("encrypt_block", |b| {
        let mut block = [0u8; 16];
        rng.fill_bytes(&mut block);
        b.iter(|| encrypt_block(&block, &round_keys));
    });
    group.finish();
}

fn bench_modes(c: &mut Criterion) {
    let round_keys = expand_key(&Sm4Key::from([1u8; 16]));
    let iv = [0u8; 16];
    let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
    let mut data = vec![0u8; 64 * 1024];
    rng.fill_bytes(&mut data);

    let mut group = c.benchmark_group("modes");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(data.len() as u64));
    for mode in Mode::ALL {
        group.bench_with_input(BenchmarkId::new("encrypt", mode), &data, |b, data| {
            let mut buf = data.clone();
            b.iter(|| mode.encrypt_in_place(&round_keys, &iv, &mut buf));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_block, bench_modes);
criterion_main!(benches);
