//! 에러 타입: 도메인별 에러 정의
//!
//! 전파 정책:
//! - 탐지기 추출 실패, 코드 로케이션 병합 실패는 탐지기 종류별 상태로 기록되고 실행을 중단하지 않습니다.
//! - 산출물(BOM 문서) 쓰기 실패만 호출자에게 `Result`로 전달됩니다.

/// bomdetect 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum BomDetectError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 탐지기 실행 에러
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),

    /// 탐색(search) 단계 에러
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// BOM 산출물 생성 에러
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 탐지기 추출 에러
///
/// 탐지기 구현이 `extract()`에서 반환합니다. 엔진 경계에서 잡혀
/// 해당 탐지기 종류의 실패로 기록됩니다.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// 의존성 파일 파싱 실패
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    /// 외부 도구 실행 실패
    #[error("external tool '{tool}' failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    /// 파일 읽기 실패
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// 탐색 단계 에러
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// 스캔 루트가 존재하지 않거나 디렉토리가 아님
    #[error("scan root is not a directory: {0}")]
    InvalidRoot(String),

    /// 디렉토리 순회 실패
    #[error("walk failed: {0}")]
    Walk(String),
}

/// BOM 산출물 에러
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// 직렬화 실패
    #[error("serialization failed for {document}: {reason}")]
    Serialize { document: String, reason: String },

    /// 파일 쓰기 실패
    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}
