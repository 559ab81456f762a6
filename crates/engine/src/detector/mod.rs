//! 탐지기 -- 생태계별 의존성 추출 단위
//!
//! [`Detector`] trait은 각 빌드/패키지 생태계의 탐지기가 구현해야 하는 인터페이스입니다.
//! 실행 엔진은 이 trait만 알고 있으며, 구체 타입은 [`Detector::kind`]로만 구분합니다.
//!
//! # 기본 탐지기
//!
//! - `Cargo.lock` (TOML) -- [`CargoDetector`]
//! - `package-lock.json` (JSON) -- [`NpmDetector`]
//! - `requirements.txt` -- [`PipDetector`] (외부 도구 필요로 표시)
//!
//! # 확장
//!
//! 새로운 생태계를 지원하려면 `Detector` trait을 구현하고
//! [`default_detectors`] 또는 호출자가 만든 목록에 추가합니다.

pub mod cargo;
pub mod npm;
pub mod pip;

use std::path::Path;

use bomdetect_core::error::DetectorError;
use bomdetect_core::types::DetectorKind;

use crate::types::DependencyGraph;

pub use cargo::CargoDetector;
pub use npm::NpmDetector;
pub use pip::PipDetector;

/// 의존성 파일 최대 크기 (바이트)
const MAX_MANIFEST_SIZE: u64 = 10 * 1024 * 1024;

/// 탐지기 trait
///
/// 후보 디렉토리 하나에 대해 적용 가능 여부를 판단하고,
/// 적용 가능하면 하나 이상의 [`DependencyGraph`]를 추출합니다.
pub trait Detector: Send + Sync {
    /// 이 탐지기의 종류를 반환합니다.
    fn kind(&self) -> DetectorKind;

    /// 주어진 디렉토리에 이 탐지기를 적용할 수 있는지 확인합니다.
    ///
    /// 파일 존재 여부만으로 판별하며 내용을 파싱하지 않습니다.
    fn is_applicable(&self, dir: &Path) -> bool;

    /// 디렉토리에서 의존성 그래프를 추출합니다.
    ///
    /// 빈 `Vec`은 "기여하지 않음"으로 취급되며 실패가 아닙니다.
    fn extract(&self, dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError>;

    /// 외부 프로세스(패키지 매니저 등) 실행이 필요한지 여부
    fn requires_external_tool(&self) -> bool {
        false
    }
}

/// 실행 게이트
///
/// 적용 가능 여부와 독립적으로, 설정에 따라 탐지기 실행을 허용할지 결정합니다.
pub trait RunGate {
    /// 탐지기를 실행해도 되는지 판단합니다.
    fn should_run(&self, detector: &dyn Detector) -> bool;
}

/// 설정 기반 실행 게이트
///
/// `detectors.allow_external_tools = false`이면 외부 도구가 필요한 탐지기를 막습니다.
#[derive(Debug, Clone, Copy)]
pub struct ConfigRunGate {
    allow_external_tools: bool,
}

impl ConfigRunGate {
    /// 새 게이트를 생성합니다.
    pub fn new(allow_external_tools: bool) -> Self {
        Self {
            allow_external_tools,
        }
    }
}

impl Default for ConfigRunGate {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RunGate for ConfigRunGate {
    fn should_run(&self, detector: &dyn Detector) -> bool {
        self.allow_external_tools || !detector.requires_external_tool()
    }
}

/// 기본 탐지기 목록 (cargo, npm, pip 순서 고정)
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(CargoDetector),
        Box::new(NpmDetector),
        Box::new(PipDetector),
    ]
}

/// 의존성 파일을 읽습니다.
///
/// 크기 제한을 넘는 파일은 파싱 실패로 처리합니다.
pub(crate) fn read_manifest(path: &Path) -> Result<String, DetectorError> {
    let display = path.display().to_string();
    let metadata = std::fs::metadata(path).map_err(|e| DetectorError::Read {
        path: display.clone(),
        source: e,
    })?;
    if metadata.len() > MAX_MANIFEST_SIZE {
        return Err(DetectorError::Parse {
            path: display,
            reason: format!(
                "file too large: {} bytes (max: {MAX_MANIFEST_SIZE})",
                metadata.len()
            ),
        });
    }
    std::fs::read_to_string(path).map_err(|e| DetectorError::Read {
        path: display,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ToolDetector;

    impl Detector for ToolDetector {
        fn kind(&self) -> DetectorKind {
            DetectorKind::Conda
        }

        fn is_applicable(&self, _dir: &Path) -> bool {
            true
        }

        fn extract(&self, _dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError> {
            Ok(Vec::new())
        }

        fn requires_external_tool(&self) -> bool {
            true
        }
    }

    #[test]
    fn default_detectors_order_is_fixed() {
        let kinds: Vec<DetectorKind> = default_detectors().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![DetectorKind::Cargo, DetectorKind::Npm, DetectorKind::Pip]
        );
    }

    #[test]
    fn gate_allows_everything_when_external_tools_allowed() {
        let gate = ConfigRunGate::new(true);
        assert!(gate.should_run(&ToolDetector));
        assert!(gate.should_run(&CargoDetector));
    }

    #[test]
    fn gate_blocks_external_tool_detectors() {
        let gate = ConfigRunGate::new(false);
        assert!(!gate.should_run(&ToolDetector));
        assert!(!gate.should_run(&PipDetector));
        assert!(gate.should_run(&NpmDetector));
    }

    #[test]
    fn read_manifest_reports_missing_file() {
        let err = read_manifest(Path::new("/nonexistent/Cargo.lock")).unwrap_err();
        assert!(matches!(err, DetectorError::Read { .. }));
    }
}
