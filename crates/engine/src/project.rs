//! 프로젝트 매니저 -- 한 번의 실행 전체 흐름 관리
//!
//! [`ProjectManager`]는 탐색부터 BOM 문서 작성까지 모든 단계를 순서대로 실행하고,
//! 각 단계의 실패를 하나의 [`StatusAggregator`]에 모아 최종 종료 분류를 계산합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! scan_root --> find_candidates --> ExecutionEngine --> Vec<Evaluation>
//!                                                           |
//!                               +---------------------------+
//!                               |                           |
//!                        IdentityResolver         CodeLocationAggregator
//!                               |                           |
//!                        ProjectIdentity  -------->  Vec<CodeLocation>
//!                                                           |
//!                                                  ArtifactGenerator
//!                                                           |
//!                                                  {tag}_{name}_{version}_bom.json
//! ```
//!
//! 어느 단계도 실행을 중단시키지 않습니다. 상태는 단계 순서대로 기록되며
//! 실패는 이후의 성공 기록으로 덮어써지지 않습니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use bomdetect_core::types::{DetectorKind, ExitClassification};

use crate::bom::{ArtifactGenerator, BomGroup, DocumentOverrides, WrittenArtifact};
use crate::code_location::CodeLocationAggregator;
use crate::config::EngineConfig;
use crate::detector::{ConfigRunGate, Detector};
use crate::engine::{Evaluation, ExecutionEngine, ExtractionOutcome};
use crate::error::EngineError;
use crate::filter::DetectorFilter;
use crate::identity::{IdentityResolver, ProjectIdentity};
use crate::search::find_candidates;
use crate::status::{DetectorStatus, StatusAggregator};

/// 평가 하나의 요약
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    /// 탐지기 종류
    pub kind: DetectorKind,
    /// 후보 디렉토리
    pub path: PathBuf,
    /// 스캔 루트로부터의 깊이
    pub depth: usize,
    /// `not_applicable`, `empty`, `success`, `failure`
    pub result: &'static str,
    /// 추출된 그래프 수
    pub graphs: usize,
    /// 실패 사유
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&Evaluation> for EvaluationSummary {
    fn from(evaluation: &Evaluation) -> Self {
        let (result, reason) = match &evaluation.outcome {
            ExtractionOutcome::NotApplicable => ("not_applicable", None),
            ExtractionOutcome::Succeeded { graphs } if graphs.is_empty() => ("empty", None),
            ExtractionOutcome::Succeeded { .. } => ("success", None),
            ExtractionOutcome::Failed { reason } => ("failure", Some(reason.clone())),
        };
        Self {
            kind: evaluation.kind,
            path: evaluation.path.clone(),
            depth: evaluation.depth,
            result,
            graphs: evaluation.graphs().len(),
            reason,
        }
    }
}

/// 작성에 실패한 문서
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactFailure {
    /// 출력 파일 이름
    pub file_name: String,
    /// 실패 사유
    pub error: String,
}

/// 한 번의 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// 스캔 루트
    pub scan_root: PathBuf,
    /// 결정된 프로젝트 식별 정보
    pub identity: ProjectIdentity,
    /// 하나 이상의 탐지기가 기여했는지 여부
    pub found_any: bool,
    /// 입력 순서대로의 평가 요약
    pub evaluations: Vec<EvaluationSummary>,
    /// 코드 로케이션 이름
    pub code_locations: Vec<String>,
    /// 작성된 BOM 문서
    pub artifacts: Vec<WrittenArtifact>,
    /// 작성에 실패한 BOM 문서
    pub artifact_errors: Vec<ArtifactFailure>,
    /// 탐지기 종류별 최종 상태
    pub statuses: BTreeMap<DetectorKind, DetectorStatus>,
    /// 최종 종료 분류
    pub exit: ExitClassification,
}

/// 프로젝트 매니저
///
/// 설정과 탐지기 목록을 소유하며, [`run`](Self::run)을 여러 번 호출해도
/// 호출마다 새 상태 집계기를 사용합니다.
pub struct ProjectManager {
    config: EngineConfig,
    detectors: Vec<Box<dyn Detector>>,
    filter: DetectorFilter,
    gate: ConfigRunGate,
}

impl ProjectManager {
    /// 설정을 검증하고 매니저를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 값이 유효하지 않거나 필터 패턴을 컴파일할 수 없으면 에러를 반환합니다.
    pub fn new(
        config: EngineConfig,
        detectors: Vec<Box<dyn Detector>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let filter = config.filter()?;
        let gate = config.run_gate();
        Ok(Self {
            config,
            detectors,
            filter,
            gate,
        })
    }

    /// 엔진 설정
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 등록된 탐지기 종류 (입력 순서)
    pub fn detector_kinds(&self) -> Vec<DetectorKind> {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    /// 스캔 루트 하나에 대해 전체 흐름을 실행합니다.
    pub fn run(&self, scan_root: &Path) -> RunReport {
        let mut status = StatusAggregator::new();
        info!(root = %scan_root.display(), "starting bill-of-materials detection");

        let candidates = match find_candidates(scan_root, &self.config.search) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(root = %scan_root.display(), error = %e, "search failed");
                status.record_search_status(ExitClassification::SearchFailure);
                Vec::new()
            }
        };

        let engine = ExecutionEngine::new(&self.filter, &self.gate);
        let report = engine.run(&self.detectors, &candidates);

        for kind in report.failed_kinds() {
            status.record_failure(kind);
        }
        for kind in report.successful_kinds() {
            status.record_success(kind);
        }

        let identity = IdentityResolver::new(&self.config.identity)
            .resolve(&report.evaluations, scan_root);
        info!(name = %identity.name, version = %identity.version, "project identity resolved");

        let evaluations: Vec<EvaluationSummary> =
            report.evaluations.iter().map(EvaluationSummary::from).collect();
        let found_any = report.found_any;

        let aggregation = CodeLocationAggregator::new(
            scan_root,
            &self.config.code_location_prefix,
            &self.config.code_location_suffix,
        )
        .aggregate(report.into_graphs(), &identity);
        for kind in &aggregation.failed_kinds {
            status.record_failure(*kind);
        }
        let locations = aggregation.locations;

        let generator = ArtifactGenerator::new(
            &self.config.output_dir,
            self.config.format,
            DocumentOverrides {
                name: self.config.identity.name.clone(),
                version: self.config.identity.version.clone(),
            },
        );
        // 통합 모드는 코드 로케이션이 없어도 루트 프로젝트만 담은 문서 하나를 씁니다.
        let groups: Vec<BomGroup<'_>> = if let Some(aggregate_name) = &self.config.aggregate_name {
            vec![generator.plan_aggregate(&locations, aggregate_name, &identity)]
        } else if locations.is_empty() {
            info!("no code locations found, no bill of materials will be written");
            Vec::new()
        } else {
            generator.plan_per_project(&locations, &identity)
        };

        let mut artifacts = Vec::new();
        let mut artifact_errors = Vec::new();
        for outcome in generator.write_all(&groups) {
            match outcome.result {
                Ok(written) => artifacts.push(written),
                Err(e) => {
                    for kind in &outcome.kinds {
                        status.record_failure(*kind);
                    }
                    artifact_errors.push(ArtifactFailure {
                        file_name: outcome.file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let exit = status.classify();
        info!(
            documents = artifacts.len(),
            failed_documents = artifact_errors.len(),
            exit = %exit,
            "bill-of-materials detection finished"
        );

        RunReport {
            scan_root: scan_root.to_path_buf(),
            identity,
            found_any,
            evaluations,
            code_locations: locations.iter().map(|l| l.name.clone()).collect(),
            artifacts,
            artifact_errors,
            statuses: status.snapshot(),
            exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use bomdetect_core::error::DetectorError;

    use super::*;
    use crate::config::EngineConfigBuilder;
    use crate::types::{Dependency, DependencyGraph};

    struct FixedDetector {
        kind: DetectorKind,
        fail: bool,
    }

    impl Detector for FixedDetector {
        fn kind(&self) -> DetectorKind {
            self.kind
        }

        fn is_applicable(&self, _dir: &Path) -> bool {
            true
        }

        fn extract(&self, dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError> {
            if self.fail {
                return Err(DetectorError::Parse {
                    path: dir.display().to_string(),
                    reason: "broken".to_owned(),
                });
            }
            let mut graph = DependencyGraph::new(dir);
            graph.add_root(Dependency::new("left-pad", "1.3.0"));
            Ok(vec![graph])
        }
    }

    fn manager(out: &Path, detectors: Vec<Box<dyn Detector>>) -> ProjectManager {
        let config = EngineConfigBuilder::new()
            .output_dir(out)
            .max_depth(0)
            .project_name("demo")
            .project_version("1.0")
            .build()
            .unwrap();
        ProjectManager::new(config, detectors).unwrap()
    }

    #[test]
    fn new_rejects_invalid_filter_pattern() {
        let config = EngineConfig {
            include: vec!["[".to_owned()],
            ..EngineConfig::default()
        };
        assert!(ProjectManager::new(config, Vec::new()).is_err());
    }

    #[test]
    fn run_writes_document_and_reports_success() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let manager = manager(
            out.path(),
            vec![Box::new(FixedDetector {
                kind: DetectorKind::Npm,
                fail: false,
            })],
        );

        let report = manager.run(root.path());
        assert_eq!(report.exit, ExitClassification::Success);
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(report.statuses[&DetectorKind::Npm], DetectorStatus::Success);
        assert!(report.artifacts[0].path.exists());
    }

    #[test]
    fn run_records_failure_without_aborting() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let manager = manager(
            out.path(),
            vec![
                Box::new(FixedDetector {
                    kind: DetectorKind::Cargo,
                    fail: true,
                }),
                Box::new(FixedDetector {
                    kind: DetectorKind::Npm,
                    fail: false,
                }),
            ],
        );

        let report = manager.run(root.path());
        assert_eq!(report.exit, ExitClassification::BomToolFailure);
        assert_eq!(report.statuses[&DetectorKind::Cargo], DetectorStatus::Failure);
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(report.evaluations[0].result, "failure");
        assert!(report.evaluations[0].reason.is_some());
    }

    #[test]
    fn missing_root_is_search_failure() {
        let out = tempfile::tempdir().unwrap();
        let missing = out.path().join("does-not-exist");
        let manager = manager(
            out.path(),
            vec![Box::new(FixedDetector {
                kind: DetectorKind::Npm,
                fail: false,
            })],
        );

        let report = manager.run(&missing);
        assert_eq!(report.exit, ExitClassification::SearchFailure);
        assert!(report.evaluations.is_empty());
        assert!(report.artifacts.is_empty());
    }

    #[test]
    fn report_serializes_to_json() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let manager = manager(
            out.path(),
            vec![Box::new(FixedDetector {
                kind: DetectorKind::Npm,
                fail: false,
            })],
        );

        let json = serde_json::to_value(manager.run(root.path())).unwrap();
        assert_eq!(json["exit"], "success");
        assert_eq!(json["statuses"]["npm"], "success");
        assert_eq!(json["identity"]["name"], "demo");
    }
}
