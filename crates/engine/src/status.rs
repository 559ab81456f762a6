//! 상태 집계 -- 탐지기 종류별 성공/실패와 최종 종료 분류
//!
//! 실행 단계마다 [`StatusAggregator`]를 `&mut`로 넘겨 갱신하고,
//! 마지막에 [`StatusAggregator::classify`]로 종료 분류를 얻습니다.
//!
//! 한 번 기록된 실패는 이후의 성공 보고로 덮어쓰지 않습니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use bomdetect_core::types::{DetectorKind, ExitClassification};

/// 탐지기 종류별 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorStatus {
    /// 성공
    Success,
    /// 실패
    Failure,
}

impl fmt::Display for DetectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// 상태 집계기
#[derive(Debug, Default)]
pub struct StatusAggregator {
    statuses: BTreeMap<DetectorKind, DetectorStatus>,
    search: Option<ExitClassification>,
}

impl StatusAggregator {
    /// 빈 집계기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 실패를 기록합니다. 기존 성공도 실패로 바뀝니다.
    pub fn record_failure(&mut self, kind: DetectorKind) {
        let previous = self.statuses.insert(kind, DetectorStatus::Failure);
        if previous == Some(DetectorStatus::Success) {
            debug!(kind = %kind, "detector status downgraded to failure");
        }
    }

    /// 성공을 기록합니다. 이미 항목이 있으면 아무것도 하지 않습니다.
    pub fn record_success(&mut self, kind: DetectorKind) {
        self.statuses.entry(kind).or_insert(DetectorStatus::Success);
    }

    /// 탐색 단계의 상태를 기록합니다.
    pub fn record_search_status(&mut self, status: ExitClassification) {
        self.search = Some(status);
    }

    /// 종류별 상태
    pub fn status(&self, kind: DetectorKind) -> Option<DetectorStatus> {
        self.statuses.get(&kind).copied()
    }

    /// 현재 상태 맵의 사본
    pub fn snapshot(&self) -> BTreeMap<DetectorKind, DetectorStatus> {
        self.statuses.clone()
    }

    /// 최종 종료 분류
    ///
    /// 실패한 종류가 하나라도 있으면 `BomToolFailure`, 그 외 탐색 상태가 있으면
    /// 그 값, 없으면 `Success`입니다.
    pub fn classify(&self) -> ExitClassification {
        if self
            .statuses
            .values()
            .any(|s| *s == DetectorStatus::Failure)
        {
            return ExitClassification::BomToolFailure;
        }
        self.search.unwrap_or(ExitClassification::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregator_is_success() {
        assert_eq!(StatusAggregator::new().classify(), ExitClassification::Success);
    }

    #[test]
    fn failure_is_never_downgraded() {
        let mut status = StatusAggregator::new();
        status.record_failure(DetectorKind::Npm);
        status.record_success(DetectorKind::Npm);
        assert_eq!(status.status(DetectorKind::Npm), Some(DetectorStatus::Failure));
    }

    #[test]
    fn failure_overrides_earlier_success() {
        let mut status = StatusAggregator::new();
        status.record_success(DetectorKind::Cargo);
        status.record_failure(DetectorKind::Cargo);
        assert_eq!(status.status(DetectorKind::Cargo), Some(DetectorStatus::Failure));
    }

    #[test]
    fn any_failure_wins_over_successes() {
        let mut status = StatusAggregator::new();
        status.record_success(DetectorKind::Cargo);
        status.record_success(DetectorKind::Pip);
        status.record_failure(DetectorKind::Maven);
        status.record_search_status(ExitClassification::SearchFailure);
        assert_eq!(status.classify(), ExitClassification::BomToolFailure);
    }

    #[test]
    fn search_status_reported_without_failures() {
        let mut status = StatusAggregator::new();
        status.record_success(DetectorKind::Cargo);
        status.record_search_status(ExitClassification::SearchFailure);
        assert_eq!(status.classify(), ExitClassification::SearchFailure);
    }

    #[test]
    fn one_entry_per_kind() {
        let mut status = StatusAggregator::new();
        status.record_success(DetectorKind::Npm);
        status.record_success(DetectorKind::Npm);
        assert_eq!(status.snapshot().len(), 1);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&DetectorStatus::Failure).unwrap();
        assert_eq!(json, "\"failure\"");
    }
}
