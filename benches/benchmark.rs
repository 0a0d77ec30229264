use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustymazf::{bootstrap::Bootstrap, counts::ReadCountTable, enrichment::EnrichmentTable};

const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];

/// All 4^5 reads of length 5 with counts following a simple skewed pattern
fn library(offset: u64) -> ReadCountTable {
    let mut table = ReadCountTable::new();
    for i in 0..1024u64 {
        let read = (0..5)
            .map(|pos| NUCLEOTIDES[((i >> (2 * pos)) & 3) as usize])
            .collect::<String>();
        table.insert(read, ((i * 37 + offset) % 97 + 1) as i64).unwrap();
    }
    table
}

fn criterion_benchmark(c: &mut Criterion) {
    let control = library(0);
    let sample = library(11);
    let n = Bootstrap::resample_size(&control, &sample);

    c.bench_function("enrichment 1024 reads", |b| {
        b.iter(|| EnrichmentTable::compute(&control, &sample).unwrap())
    });
    c.bench_function("resample control", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        b.iter(|| Bootstrap::resample(&control, n, &mut rng).unwrap())
    });
    c.bench_function("bootstrap 10 trials", |b| {
        let bootstrap = Bootstrap::new(10).seed(0);
        b.iter(|| bootstrap.estimate(&control, &sample).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
