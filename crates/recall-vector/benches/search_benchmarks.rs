//! Benchmarks for exact top-k retrieval.
//!
//! Uses 1,000 passages by default. Set `BENCH_FULL_SCALE=1` to run against
//! 50,000 passages:
//!
//! ```bash
//! BENCH_FULL_SCALE=1 cargo bench -p recall-vector
//! ```

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use recall_vector::embedding::{EmbeddingService, HashEmbedding};
use recall_vector::{Collection, RetrievalIndex};

const CI_PASSAGE_COUNT: usize = 1_000;
const FULL_SCALE_PASSAGE_COUNT: usize = 50_000;
const DIMENSIONS: usize = 768;

fn passage_count() -> usize {
    if std::env::var("BENCH_FULL_SCALE").is_ok() {
        FULL_SCALE_PASSAGE_COUNT
    } else {
        CI_PASSAGE_COUNT
    }
}

fn passage_text(index: usize) -> String {
    format!(
        "Colonists on Mars trade in Red-Credits and need an Aero-2000 suit to \
         breathe outside the habitat domes. Passage number {}",
        index
    )
}

/// Build a collection populated with `count` hash-embedded passages.
fn build_collection(count: usize) -> (Collection, HashEmbedding) {
    let embedder = HashEmbedding::new(DIMENSIONS).expect("valid dimensions");
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    let mut collection = Collection::with_dimensions("bench", DIMENSIONS).expect("valid dimensions");
    for i in 0..count {
        let text = passage_text(i);
        let vector = rt.block_on(embedder.embed(&text)).expect("embed failed");
        collection
            .add(i.to_string(), text, vector)
            .expect("insert failed");
    }
    (collection, embedder)
}

fn bench_search(c: &mut Criterion) {
    let count = passage_count();
    let (collection, embedder) = build_collection(count);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");
    let query = rt
        .block_on(embedder.embed("How do I buy things on Mars?"))
        .expect("query embed failed");

    let index = RetrievalIndex::new(&collection);
    let mut group = c.benchmark_group("exact_search");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(10));

    for k in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new(format!("top_k_{}passages", count), k), &k, |b, &k| {
            b.iter(|| {
                let hits = index.search(&query, k).expect("search failed");
                assert_eq!(hits.len(), k.min(count));
                hits.len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
