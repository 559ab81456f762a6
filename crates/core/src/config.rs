//! 설정 관리: bomdetect.toml 파싱 및 런타임 설정
//!
//! [`BomDetectConfig`]는 모든 단계의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`BOMDETECT_PROJECT_NAME=my-app` 형식)
//! 3. 설정 파일 (`bomdetect.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), bomdetect_core::error::BomDetectError> {
//! use bomdetect_core::config::BomDetectConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = BomDetectConfig::load("bomdetect.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = BomDetectConfig::parse("[project]\nname = \"my-app\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BomDetectError, ConfigError};

/// `search.max_depth` 상한
const MAX_SEARCH_DEPTH: usize = 32;

/// 버전 기본값 스킴: 현재 시각(UTC)
pub const VERSION_SCHEME_TIMESTAMP: &str = "timestamp";
/// 버전 기본값 스킴: 고정 텍스트
pub const VERSION_SCHEME_TEXT: &str = "text";

/// bomdetect 통합 설정
///
/// `bomdetect.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomDetectConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 프로젝트 식별 설정
    #[serde(default)]
    pub project: ProjectConfig,
    /// 탐지기 필터 / 실행 게이트 설정
    #[serde(default)]
    pub detectors: DetectorsConfig,
    /// 후보 디렉토리 탐색 설정
    #[serde(default)]
    pub search: SearchConfig,
    /// BOM 산출물 설정
    #[serde(default)]
    pub bom: BomConfig,
}

impl BomDetectConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BomDetectError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작하는 [`load`](Self::load)
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, BomDetectError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(BomDetectError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BomDetectError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BomDetectError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BomDetectError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, BomDetectError> {
        toml::from_str(toml_str).map_err(|e| {
            BomDetectError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `BOMDETECT_{SECTION}_{FIELD}`
    /// 예: `BOMDETECT_BOM_AGGREGATE_NAME=platform`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "BOMDETECT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "BOMDETECT_GENERAL_LOG_FORMAT");

        // Project
        override_string(&mut self.project.name, "BOMDETECT_PROJECT_NAME");
        override_string(&mut self.project.version, "BOMDETECT_PROJECT_VERSION");
        override_string(
            &mut self.project.preferred_detector,
            "BOMDETECT_PROJECT_PREFERRED_DETECTOR",
        );
        override_string(
            &mut self.project.default_version_scheme,
            "BOMDETECT_PROJECT_DEFAULT_VERSION_SCHEME",
        );
        override_string(
            &mut self.project.default_version_text,
            "BOMDETECT_PROJECT_DEFAULT_VERSION_TEXT",
        );
        override_string(
            &mut self.project.default_version_timeformat,
            "BOMDETECT_PROJECT_DEFAULT_VERSION_TIMEFORMAT",
        );
        override_string(
            &mut self.project.code_location_prefix,
            "BOMDETECT_PROJECT_CODE_LOCATION_PREFIX",
        );
        override_string(
            &mut self.project.code_location_suffix,
            "BOMDETECT_PROJECT_CODE_LOCATION_SUFFIX",
        );

        // Detectors
        override_csv(&mut self.detectors.include, "BOMDETECT_DETECTORS_INCLUDE");
        override_csv(&mut self.detectors.exclude, "BOMDETECT_DETECTORS_EXCLUDE");
        override_bool(
            &mut self.detectors.allow_external_tools,
            "BOMDETECT_DETECTORS_ALLOW_EXTERNAL_TOOLS",
        );

        // Search
        override_usize(&mut self.search.max_depth, "BOMDETECT_SEARCH_MAX_DEPTH");
        override_csv(&mut self.search.exclude_dirs, "BOMDETECT_SEARCH_EXCLUDE_DIRS");

        // BOM
        override_string(&mut self.bom.output_dir, "BOMDETECT_BOM_OUTPUT_DIR");
        override_string(&mut self.bom.aggregate_name, "BOMDETECT_BOM_AGGREGATE_NAME");
        override_string(&mut self.bom.format, "BOMDETECT_BOM_FORMAT");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// `project.preferred_detector`는 검증하지 않습니다. 알 수 없는 값은
    /// 프로젝트 식별 단계에서 로그만 남기고 자동 결정으로 넘어갑니다.
    pub fn validate(&self) -> Result<(), BomDetectError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_schemes = [VERSION_SCHEME_TIMESTAMP, VERSION_SCHEME_TEXT];
        if !valid_schemes.contains(&self.project.default_version_scheme.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "project.default_version_scheme".to_owned(),
                reason: format!("must be one of: {}", valid_schemes.join(", ")),
            }
            .into());
        }

        if self.search.max_depth > MAX_SEARCH_DEPTH {
            return Err(ConfigError::InvalidValue {
                field: "search.max_depth".to_owned(),
                reason: format!("must be 0-{MAX_SEARCH_DEPTH}"),
            }
            .into());
        }

        let valid_bom_formats = ["cyclonedx", "spdx"];
        if !valid_bom_formats.contains(&self.bom.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "bom.format".to_owned(),
                reason: format!("must be one of: {}", valid_bom_formats.join(", ")),
            }
            .into());
        }

        if self.bom.output_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "bom.output_dir".to_owned(),
                reason: "output directory must not be empty".to_owned(),
            }
            .into());
        }

        if Path::new(&self.bom.output_dir)
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(ConfigError::InvalidValue {
                field: "bom.output_dir".to_owned(),
                reason: "output directory contains path traversal pattern '..'".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 프로젝트 식별 설정
///
/// 빈 문자열은 "설정되지 않음"을 뜻합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// 명시적 프로젝트 이름
    pub name: String,
    /// 명시적 프로젝트 버전
    pub version: String,
    /// 이름/버전 제안을 우선 채택할 탐지기 종류
    pub preferred_detector: String,
    /// 버전을 결정하지 못했을 때의 스킴 (timestamp, text)
    pub default_version_scheme: String,
    /// `text` 스킴에서 사용할 버전 문자열
    pub default_version_text: String,
    /// `timestamp` 스킴에서 사용할 `time` 포맷 설명
    pub default_version_timeformat: String,
    /// 코드 로케이션 이름 접두사
    pub code_location_prefix: String,
    /// 코드 로케이션 이름 접미사
    pub code_location_suffix: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            preferred_detector: String::new(),
            default_version_scheme: VERSION_SCHEME_TEXT.to_owned(),
            default_version_text: "Default Detect Version".to_owned(),
            default_version_timeformat:
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]".to_owned(),
            code_location_prefix: String::new(),
            code_location_suffix: String::new(),
        }
    }
}

/// 탐지기 필터 / 실행 게이트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorsConfig {
    /// 포함할 탐지기 종류 패턴 (비어 있으면 전부)
    pub include: Vec<String>,
    /// 제외할 탐지기 종류 패턴
    pub exclude: Vec<String>,
    /// 외부 도구가 필요한 탐지기 실행 허용 여부
    pub allow_external_tools: bool,
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            allow_external_tools: true,
        }
    }
}

/// 후보 디렉토리 탐색 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 스캔 루트로부터 최대 탐색 깊이 (0이면 루트만)
    pub max_depth: usize,
    /// 내려가지 않을 디렉토리 이름
    pub exclude_dirs: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            exclude_dirs: vec![
                ".git".to_owned(),
                "node_modules".to_owned(),
                "target".to_owned(),
                "build".to_owned(),
                ".venv".to_owned(),
            ],
        }
    }
}

/// BOM 산출물 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BomConfig {
    /// 출력 디렉토리
    pub output_dir: String,
    /// 통합(aggregate) BOM 이름. 비어 있으면 프로젝트별 모드
    pub aggregate_name: String,
    /// BOM 형식 (cyclonedx, spdx)
    pub format: String,
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            output_dir: "./bomdetect-output".to_owned(),
            aggregate_name: String::new(),
            format: "cyclonedx".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
