use criterion::{black_box, criterion_group, criterion_main, Criterion};

use deepmemory_core::config::{DimensionSpec, QuotaPlan};
use deepmemory_core::models::{Bucket, CandidateKey, Metadata, SourceId};
use deepmemory_retrieval::{fuse, EvidenceAssembler, RankedItem, RankedSource};
use uuid::Uuid;

/// Four dimensions of 50 hits each over a pool of 120 ids, plus a graph source.
fn build_sources() -> Vec<RankedSource> {
    let mut sources: Vec<RankedSource> = (0..4)
        .map(|d| RankedSource {
            source: SourceId::Dimension(format!("d{d}")),
            weight: 0.25,
            items: (0..50)
                .map(|i| RankedItem {
                    key: CandidateKey::Vector(format!("v{}", (i * (d + 3)) % 120)),
                    metadata: Metadata::new(),
                    graph_distance: None,
                })
                .collect(),
        })
        .collect();
    sources.push(RankedSource {
        source: SourceId::Graph,
        weight: 0.3,
        items: (0..50)
            .map(|i| RankedItem {
                key: CandidateKey::Node(format!("Person:p{i}")),
                metadata: Metadata::new(),
                graph_distance: Some(1 + i / 10),
            })
            .collect(),
    });
    sources
}

fn bench_fusion(c: &mut Criterion) {
    let sources = build_sources();
    c.bench_function("rrf_fuse_5x50", |b| b.iter(|| fuse(black_box(&sources), 60)));

    let dims = vec![
        DimensionSpec::verbatim("d0"),
        DimensionSpec::instructed("d1", "A:"),
        DimensionSpec::instructed("d2", "B:"),
        DimensionSpec::instructed("d3", "C:").with_bucket(Bucket::TemporalContext),
    ];
    let assembler = EvidenceAssembler::new(QuotaPlan::default(), 50, true, &dims);
    let fused = fuse(&sources, 60);
    c.bench_function("assemble_50", |b| {
        b.iter(|| assembler.assemble(Uuid::nil(), black_box(fused.clone())))
    });
}

criterion_group!(benches, bench_fusion);
criterion_main!(benches);
