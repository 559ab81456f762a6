//! 탐지기 실행 엔진
//!
//! [`ExecutionEngine`]은 탐지기 목록을 입력 순서대로, 후보 디렉토리마다 평가합니다.
//!
//! # 평가 순서
//!
//! 1. 필터가 종류를 제외하면 건너뜀 (평가 기록도, 실패 기록도 없음)
//! 2. 적용 불가이거나 실행 게이트가 거부하면 건너뜀
//! 3. 추출 실행. `Err`는 로그를 남기고 해당 종류의 실패로 기록한 뒤 계속 진행
//! 4. 빈 결과는 "기여하지 않음"으로 취급
//!
//! 엔진은 탐지기를 재정렬하거나 재시도하지 않습니다.

use std::collections::BTreeSet;
use std::path::PathBuf;

use metrics::counter;
use tracing::{debug, info, warn};

use bomdetect_core::metrics as m;
use bomdetect_core::types::DetectorKind;

use crate::detector::{Detector, RunGate};
use crate::filter::DetectorFilter;
use crate::search::Candidate;
use crate::types::DependencyGraph;

/// 단일 평가 결과
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// 적용 불가 또는 실행 게이트 거부
    NotApplicable,
    /// 추출 성공 (빈 `graphs`는 기여하지 않음을 뜻함)
    Succeeded {
        /// 추출된 그래프
        graphs: Vec<DependencyGraph>,
    },
    /// 추출 실패
    Failed {
        /// 실패 사유
        reason: String,
    },
}

/// (탐지기 종류, 후보 경로) 하나에 대한 평가 기록
#[derive(Debug)]
pub struct Evaluation {
    /// 탐지기 종류
    pub kind: DetectorKind,
    /// 후보 디렉토리
    pub path: PathBuf,
    /// 스캔 루트로부터의 깊이
    pub depth: usize,
    /// 평가 결과
    pub outcome: ExtractionOutcome,
}

impl Evaluation {
    /// 하나 이상의 그래프를 추출했는지 여부
    pub fn contributed(&self) -> bool {
        matches!(&self.outcome, ExtractionOutcome::Succeeded { graphs } if !graphs.is_empty())
    }

    /// 추출 실패 여부
    pub fn failed(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Failed { .. })
    }

    /// 추출된 그래프 (성공이 아니면 빈 슬라이스)
    pub fn graphs(&self) -> &[DependencyGraph] {
        match &self.outcome {
            ExtractionOutcome::Succeeded { graphs } => graphs,
            _ => &[],
        }
    }

    /// 이름을 제안한 첫 번째 그래프의 (이름, 버전) 제안
    ///
    /// 버전은 같은 그래프에서 가져오며 비어 있을 수 있습니다.
    pub fn suggestion(&self) -> Option<(&str, Option<&str>)> {
        self.graphs()
            .iter()
            .find_map(|g| g.suggested_name().map(|name| (name, g.suggested_version())))
    }
}

/// 실행 엔진 결과
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// 입력 순서대로의 평가 기록
    pub evaluations: Vec<Evaluation>,
    /// 하나 이상의 탐지기가 기여했는지 여부
    pub found_any: bool,
}

impl ExtractionReport {
    /// 추출 중 실패한 탐지기 종류
    pub fn failed_kinds(&self) -> BTreeSet<DetectorKind> {
        self.evaluations
            .iter()
            .filter(|e| e.failed())
            .map(|e| e.kind)
            .collect()
    }

    /// 하나 이상의 그래프를 추출한 탐지기 종류
    pub fn successful_kinds(&self) -> BTreeSet<DetectorKind> {
        self.evaluations
            .iter()
            .filter(|e| e.contributed())
            .map(|e| e.kind)
            .collect()
    }

    /// 기여한 평가만 입력 순서대로 순회합니다.
    pub fn contributions(&self) -> impl Iterator<Item = &Evaluation> {
        self.evaluations.iter().filter(|e| e.contributed())
    }

    /// 종류별 추출 그래프를 평가 순서대로 소유권과 함께 넘깁니다.
    pub fn into_graphs(self) -> Vec<(DetectorKind, DependencyGraph)> {
        self.evaluations
            .into_iter()
            .flat_map(|e| {
                let kind = e.kind;
                let graphs = match e.outcome {
                    ExtractionOutcome::Succeeded { graphs } => graphs,
                    _ => Vec::new(),
                };
                graphs.into_iter().map(move |g| (kind, g))
            })
            .collect()
    }
}

/// 탐지기 실행 엔진
pub struct ExecutionEngine<'a> {
    filter: &'a DetectorFilter,
    gate: &'a dyn RunGate,
}

impl<'a> ExecutionEngine<'a> {
    /// 필터와 실행 게이트로 엔진을 생성합니다.
    pub fn new(filter: &'a DetectorFilter, gate: &'a dyn RunGate) -> Self {
        Self { filter, gate }
    }

    /// 모든 탐지기를 후보 디렉토리마다 순차 평가합니다.
    ///
    /// 탐지기 실패로 중단되지 않으며 항상 보고서를 반환합니다.
    pub fn run(&self, detectors: &[Box<dyn Detector>], candidates: &[Candidate]) -> ExtractionReport {
        let mut report = ExtractionReport::default();

        for detector in detectors {
            let kind = detector.kind();
            if !self.filter.should_include(kind.as_str()) {
                info!(kind = %kind, "detector excluded by filter");
                continue;
            }

            if !self.gate.should_run(detector.as_ref()) {
                info!(kind = %kind, "detector rejected by run gate");
                for candidate in candidates {
                    record(&mut report, kind, candidate, ExtractionOutcome::NotApplicable);
                }
                continue;
            }

            for candidate in candidates {
                let outcome = evaluate(detector.as_ref(), candidate);
                record(&mut report, kind, candidate, outcome);
            }
        }

        report.found_any = report.evaluations.iter().any(Evaluation::contributed);
        if !report.found_any {
            info!("no detector contributed dependency data");
        }
        report
    }
}

fn evaluate(detector: &dyn Detector, candidate: &Candidate) -> ExtractionOutcome {
    let kind = detector.kind();
    if !detector.is_applicable(&candidate.path) {
        return ExtractionOutcome::NotApplicable;
    }

    debug!(kind = %kind, path = %candidate.path.display(), "extracting");
    match detector.extract(&candidate.path) {
        Ok(graphs) if graphs.is_empty() => {
            info!(
                kind = %kind,
                path = %candidate.path.display(),
                "detector produced no dependency graphs"
            );
            ExtractionOutcome::Succeeded { graphs }
        }
        Ok(graphs) => {
            info!(
                kind = %kind,
                path = %candidate.path.display(),
                graphs = graphs.len(),
                depth = candidate.depth,
                "extraction succeeded"
            );
            ExtractionOutcome::Succeeded { graphs }
        }
        Err(e) => {
            warn!(
                kind = %kind,
                path = %candidate.path.display(),
                error = %e,
                "extraction failed, continuing with next detector"
            );
            counter!(m::DETECTOR_FAILURES_TOTAL, m::LABEL_KIND => kind.as_str()).increment(1);
            ExtractionOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

fn record(
    report: &mut ExtractionReport,
    kind: DetectorKind,
    candidate: &Candidate,
    outcome: ExtractionOutcome,
) {
    let result = match &outcome {
        ExtractionOutcome::NotApplicable => "not_applicable",
        ExtractionOutcome::Succeeded { graphs } if graphs.is_empty() => "empty",
        ExtractionOutcome::Succeeded { .. } => "success",
        ExtractionOutcome::Failed { .. } => "failure",
    };
    counter!(
        m::DETECTOR_EVALUATIONS_TOTAL,
        m::LABEL_KIND => kind.as_str(),
        m::LABEL_RESULT => result
    )
    .increment(1);

    report.evaluations.push(Evaluation {
        kind,
        path: candidate.path.clone(),
        depth: candidate.depth,
        outcome,
    });
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use bomdetect_core::error::DetectorError;

    use super::*;
    use crate::detector::ConfigRunGate;
    use crate::types::Dependency;

    struct StubDetector {
        kind: DetectorKind,
        applicable: bool,
        fail: bool,
        graphs: usize,
        external: bool,
    }

    impl StubDetector {
        fn ok(kind: DetectorKind, graphs: usize) -> Box<dyn Detector> {
            Box::new(Self {
                kind,
                applicable: true,
                fail: false,
                graphs,
                external: false,
            })
        }

        fn failing(kind: DetectorKind) -> Box<dyn Detector> {
            Box::new(Self {
                kind,
                applicable: true,
                fail: true,
                graphs: 0,
                external: false,
            })
        }
    }

    impl Detector for StubDetector {
        fn kind(&self) -> DetectorKind {
            self.kind
        }

        fn is_applicable(&self, _dir: &Path) -> bool {
            self.applicable
        }

        fn extract(&self, dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError> {
            if self.fail {
                return Err(DetectorError::Parse {
                    path: dir.display().to_string(),
                    reason: "broken".to_owned(),
                });
            }
            Ok((0..self.graphs)
                .map(|i| {
                    let mut g = DependencyGraph::new(dir);
                    g.add_root(Dependency::new(format!("dep{i}"), "1.0"));
                    g
                })
                .collect())
        }

        fn requires_external_tool(&self) -> bool {
            self.external
        }
    }

    fn root() -> Vec<Candidate> {
        vec![Candidate {
            path: PathBuf::from("/repo"),
            depth: 0,
        }]
    }

    #[test]
    fn failure_does_not_abort_remaining_detectors() {
        let filter = DetectorFilter::allow_all();
        let gate = ConfigRunGate::default();
        let detectors = vec![
            StubDetector::failing(DetectorKind::Maven),
            StubDetector::ok(DetectorKind::Npm, 1),
        ];

        let report = ExecutionEngine::new(&filter, &gate).run(&detectors, &root());

        assert_eq!(report.failed_kinds(), BTreeSet::from([DetectorKind::Maven]));
        assert_eq!(report.successful_kinds(), BTreeSet::from([DetectorKind::Npm]));
        assert!(report.found_any);
    }

    #[test]
    fn excluded_detectors_leave_no_evaluation() {
        let filter = DetectorFilter::new(&[], &["maven".to_owned()]).unwrap();
        let gate = ConfigRunGate::default();
        let detectors = vec![StubDetector::failing(DetectorKind::Maven)];

        let report = ExecutionEngine::new(&filter, &gate).run(&detectors, &root());

        assert!(report.evaluations.is_empty());
        assert!(report.failed_kinds().is_empty());
    }

    #[test]
    fn empty_result_is_neither_success_nor_failure() {
        let filter = DetectorFilter::allow_all();
        let gate = ConfigRunGate::default();
        let detectors = vec![StubDetector::ok(DetectorKind::Cargo, 0)];

        let report = ExecutionEngine::new(&filter, &gate).run(&detectors, &root());

        assert!(!report.found_any);
        assert!(report.successful_kinds().is_empty());
        assert!(report.failed_kinds().is_empty());
    }

    #[test]
    fn gate_rejection_is_not_a_failure() {
        let filter = DetectorFilter::allow_all();
        let gate = ConfigRunGate::new(false);
        let detectors: Vec<Box<dyn Detector>> = vec![Box::new(StubDetector {
            kind: DetectorKind::Pip,
            applicable: true,
            fail: true,
            graphs: 0,
            external: true,
        })];

        let report = ExecutionEngine::new(&filter, &gate).run(&detectors, &root());

        assert!(report.failed_kinds().is_empty());
        assert!(matches!(
            report.evaluations[0].outcome,
            ExtractionOutcome::NotApplicable
        ));
    }

    #[test]
    fn not_applicable_detector_is_not_extracted() {
        let filter = DetectorFilter::allow_all();
        let gate = ConfigRunGate::default();
        let detectors: Vec<Box<dyn Detector>> = vec![Box::new(StubDetector {
            kind: DetectorKind::Go,
            applicable: false,
            fail: true,
            graphs: 0,
            external: false,
        })];

        let report = ExecutionEngine::new(&filter, &gate).run(&detectors, &root());
        assert!(report.failed_kinds().is_empty());
        assert!(!report.found_any);
    }

    #[test]
    fn evaluations_follow_detector_then_candidate_order() {
        let filter = DetectorFilter::allow_all();
        let gate = ConfigRunGate::default();
        let detectors = vec![
            StubDetector::ok(DetectorKind::Npm, 1),
            StubDetector::ok(DetectorKind::Cargo, 1),
        ];
        let candidates = vec![
            Candidate {
                path: PathBuf::from("/repo"),
                depth: 0,
            },
            Candidate {
                path: PathBuf::from("/repo/web"),
                depth: 1,
            },
        ];

        let report = ExecutionEngine::new(&filter, &gate).run(&detectors, &candidates);
        let order: Vec<(DetectorKind, usize)> =
            report.evaluations.iter().map(|e| (e.kind, e.depth)).collect();
        assert_eq!(
            order,
            vec![
                (DetectorKind::Npm, 0),
                (DetectorKind::Npm, 1),
                (DetectorKind::Cargo, 0),
                (DetectorKind::Cargo, 1),
            ]
        );
    }

    #[test]
    fn into_graphs_keeps_evaluation_order() {
        let filter = DetectorFilter::allow_all();
        let gate = ConfigRunGate::default();
        let detectors = vec![
            StubDetector::ok(DetectorKind::Npm, 2),
            StubDetector::ok(DetectorKind::Cargo, 1),
        ];

        let graphs = ExecutionEngine::new(&filter, &gate)
            .run(&detectors, &root())
            .into_graphs();
        let kinds: Vec<DetectorKind> = graphs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![DetectorKind::Npm, DetectorKind::Npm, DetectorKind::Cargo]
        );
    }
}
