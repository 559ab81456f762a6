//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 단계는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! CLI는 exporter를 설치하지 않으므로, 라이브러리를 임베드하는 쪽에서
//! recorder를 설치했을 때만 값이 수집됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `bomdetect_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(bomdetect_core::metrics::DETECTOR_FAILURES_TOTAL, "kind" => "npm").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 탐지기 종류 레이블 키 (cargo, npm, ...)
pub const LABEL_KIND: &str = "kind";

/// 결과 레이블 키 (success, failure, not_applicable, empty)
pub const LABEL_RESULT: &str = "result";

/// BOM 형식 레이블 키 (cyclonedx, spdx)
pub const LABEL_FORMAT: &str = "format";

// ─── Execution Engine 메트릭 ───────────────────────────────────────

/// 탐지기 평가 수 (counter, label: kind, result)
pub const DETECTOR_EVALUATIONS_TOTAL: &str = "bomdetect_detector_evaluations_total";

/// 탐지기 추출 실패 수 (counter, label: kind)
pub const DETECTOR_FAILURES_TOTAL: &str = "bomdetect_detector_failures_total";

// ─── Code Location 메트릭 ──────────────────────────────────────────

/// 생성된 코드 로케이션 수 (counter, label: kind)
pub const CODE_LOCATIONS_TOTAL: &str = "bomdetect_code_locations_total";

// ─── Artifact 메트릭 ───────────────────────────────────────────────

/// 작성된 BOM 문서 수 (counter, label: format)
pub const BOM_DOCUMENTS_WRITTEN_TOTAL: &str = "bomdetect_bom_documents_written_total";

/// 작성 실패한 BOM 문서 수 (counter, label: format)
pub const BOM_DOCUMENTS_FAILED_TOTAL: &str = "bomdetect_bom_documents_failed_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다. recorder가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        DETECTOR_EVALUATIONS_TOTAL,
        "Detector evaluations by kind and result"
    );
    describe_counter!(
        DETECTOR_FAILURES_TOTAL,
        "Detector extractions that returned an error"
    );
    describe_counter!(CODE_LOCATIONS_TOTAL, "Code locations created by kind");
    describe_counter!(
        BOM_DOCUMENTS_WRITTEN_TOTAL,
        "Bill-of-materials documents written"
    );
    describe_counter!(
        BOM_DOCUMENTS_FAILED_TOTAL,
        "Bill-of-materials documents that failed to serialize or write"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        DETECTOR_EVALUATIONS_TOTAL,
        DETECTOR_FAILURES_TOTAL,
        CODE_LOCATIONS_TOTAL,
        BOM_DOCUMENTS_WRITTEN_TOTAL,
        BOM_DOCUMENTS_FAILED_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("bomdetect_"),
                "Metric '{}' does not start with 'bomdetect_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES {
            assert!(name.ends_with("_total"), "Counter '{}' must end with _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_KIND, LABEL_RESULT, LABEL_FORMAT] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
