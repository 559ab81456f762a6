//! 엔진 에러 타입
//!
//! [`EngineError`]는 엔진 내부에서 호출자에게 전달되는 에러를 나타냅니다.
//! `From<EngineError> for BomDetectError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! 탐지기 추출 실패는 이 타입으로 전달되지 않습니다. 엔진 경계에서
//! [`DetectorError`](bomdetect_core::DetectorError)를 잡아 종류별 실패 상태로 기록합니다.
//!
//! # 에러 카테고리
//!
//! - **설정**: `Config`, `Filter`
//! - **탐색**: `InvalidRoot`, `Walk`
//! - **BOM 산출물**: `Serialization`, `Write`

use bomdetect_core::error::{ArtifactError, BomDetectError, ConfigError, SearchError};

/// 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// include/exclude 패턴 컴파일 실패
    #[error("invalid detector pattern '{pattern}': {reason}")]
    Filter {
        /// 문제의 패턴
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 스캔 루트가 디렉토리가 아님
    #[error("scan root is not a directory: {root}")]
    InvalidRoot {
        /// 스캔 루트 경로
        root: String,
    },

    /// 디렉토리 순회 실패
    #[error("walk failed under {root}: {reason}")]
    Walk {
        /// 스캔 루트 경로
        root: String,
        /// 실패 사유
        reason: String,
    },

    /// BOM 문서 직렬화 실패
    #[error("serialization failed for {document}: {reason}")]
    Serialization {
        /// 문서 파일 이름
        document: String,
        /// 실패 사유
        reason: String,
    },

    /// BOM 파일 쓰기 실패
    #[error("write failed: {path}: {source}")]
    Write {
        /// 대상 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl From<EngineError> for BomDetectError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Config { field, reason } => {
                BomDetectError::Config(ConfigError::InvalidValue { field, reason })
            }
            EngineError::Filter { pattern, reason } => {
                BomDetectError::Config(ConfigError::InvalidValue {
                    field: "detectors".to_owned(),
                    reason: format!("invalid pattern '{pattern}': {reason}"),
                })
            }
            EngineError::InvalidRoot { root } => {
                BomDetectError::Search(SearchError::InvalidRoot(root))
            }
            EngineError::Walk { root, reason } => {
                BomDetectError::Search(SearchError::Walk(format!("{root}: {reason}")))
            }
            EngineError::Serialization { document, reason } => {
                BomDetectError::Artifact(ArtifactError::Serialize { document, reason })
            }
            EngineError::Write { path, source } => BomDetectError::Artifact(ArtifactError::Write {
                path,
                reason: source.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = EngineError::Config {
            field: "bom.format".to_owned(),
            reason: "must be one of: cyclonedx, spdx".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bom.format"));
        assert!(msg.contains("cyclonedx"));
    }

    #[test]
    fn filter_error_display() {
        let err = EngineError::Filter {
            pattern: "[cargo".to_owned(),
            reason: "unclosed character class".to_owned(),
        };
        assert!(err.to_string().contains("[cargo"));
    }

    #[test]
    fn write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = EngineError::Write {
            path: "/out/npm_app_1.0_bom.json".to_owned(),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("npm_app_1.0_bom.json"));
        assert!(msg.contains("read-only"));
    }

    #[test]
    fn converts_to_bomdetect_error() {
        let err = EngineError::Serialization {
            document: "cargo_app_1.0_bom.json".to_owned(),
            reason: "recursion limit".to_owned(),
        };
        let top: BomDetectError = err.into();
        assert!(matches!(top, BomDetectError::Artifact(_)));
        assert!(top.to_string().contains("recursion limit"));
    }

    #[test]
    fn invalid_root_converts_to_search_error() {
        let err = EngineError::InvalidRoot {
            root: "/missing".to_owned(),
        };
        let top: BomDetectError = err.into();
        assert!(matches!(top, BomDetectError::Search(SearchError::InvalidRoot(_))));
    }

    #[test]
    fn filter_error_converts_to_config_error() {
        let err = EngineError::Filter {
            pattern: "{".to_owned(),
            reason: "unclosed alternate group".to_owned(),
        };
        let top: BomDetectError = err.into();
        assert!(matches!(top, BomDetectError::Config(_)));
    }
}
