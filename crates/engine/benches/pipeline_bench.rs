//! 파이프라인 벤치마크
//!
//! 프로젝트 식별 결정과 BOM 문서 직렬화 성능을 측정합니다.

use std::path::{Path, PathBuf};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use time::macros::datetime;

use bomdetect_core::types::DetectorKind;
use bomdetect_engine::{
    ArtifactGenerator, BomFormat, CodeLocation, Dependency, DependencyGraph, DocumentOverrides,
    Evaluation, ExtractionOutcome, IdentityOptions, IdentityResolver, ProjectIdentity,
};

/// `width`개의 루트 각각이 `depth`단 체인을 가진 그래프
fn synthetic_graph(dir: &Path, width: usize, depth: usize) -> DependencyGraph {
    let mut graph = DependencyGraph::new(dir).with_project(Some("bench-app"), Some("1.0.0"));
    for w in 0..width {
        let mut parent = graph.add_root(Dependency::new(format!("root-{w}"), "1.0.0"));
        for d in 0..depth {
            parent = graph.add_child(parent, Dependency::new(format!("dep-{w}-{d}"), "0.1.0"));
        }
    }
    graph
}

fn evaluations(count: usize) -> Vec<Evaluation> {
    (0..count)
        .map(|i| {
            let dir = PathBuf::from(format!("/repo/module-{i}"));
            let graph = DependencyGraph::new(&dir)
                .with_project(Some(format!("module-{i}")), Some(format!("{i}.0.0")));
            Evaluation {
                kind: DetectorKind::ALL[i % DetectorKind::ALL.len()],
                path: dir,
                depth: count - i,
                outcome: ExtractionOutcome::Succeeded {
                    graphs: vec![graph],
                },
            }
        })
        .collect()
}

fn bench_identity_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity_resolution");
    let options = IdentityOptions::default();
    let resolver = IdentityResolver::new(&options);
    let now = datetime!(2024-01-01 00:00:00 UTC);

    for count in [10, 100, 1000] {
        let evals = evaluations(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &evals, |b, evals| {
            b.iter(|| resolver.resolve_at(black_box(evals), Path::new("/repo"), now));
        });
    }
    group.finish();
}

fn bench_document_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_rendering");
    let resolved = ProjectIdentity::new("bench-app", "1.0.0");

    for format in [BomFormat::CycloneDx, BomFormat::Spdx] {
        for (width, depth) in [(10, 5), (100, 10)] {
            let locations = vec![CodeLocation {
                kind: DetectorKind::Npm,
                relative_path: String::new(),
                name: "bench-app/1.0.0 npm bom".to_owned(),
                graph: synthetic_graph(Path::new("/repo"), width, depth),
            }];
            let generator =
                ArtifactGenerator::new("/tmp/unused", format, DocumentOverrides::default());
            let groups = generator.plan_per_project(&locations, &resolved);

            group.throughput(Throughput::Elements((width * (depth + 1)) as u64));
            group.bench_with_input(
                BenchmarkId::new(format.to_string(), width * (depth + 1)),
                &groups[0],
                |b, bom_group| {
                    b.iter(|| generator.render(black_box(bom_group)));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_identity_resolution, bench_document_rendering);
criterion_main!(benches);
