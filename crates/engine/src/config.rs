//! 엔진 설정
//!
//! [`EngineConfig`]는 core의 [`BomDetectConfig`]에서 문자열 값을 해석하여
//! 엔진이 바로 쓸 수 있는 타입(오버라이드 `Option`, 버전 스킴, BOM 형식)으로 바꿉니다.
//!
//! # 사용 예시
//!
//! ```
//! use bomdetect_engine::{BomFormat, EngineConfigBuilder};
//!
//! let config = EngineConfigBuilder::new()
//!     .output_dir("./out")
//!     .aggregate_name("platform")
//!     .format(BomFormat::Spdx)
//!     .build()
//!     .unwrap();
//! assert!(config.is_aggregate());
//! ```

use std::path::{Component, Path, PathBuf};

use bomdetect_core::config::{BomDetectConfig, SearchConfig, VERSION_SCHEME_TIMESTAMP};

use crate::detector::ConfigRunGate;
use crate::error::EngineError;
use crate::filter::DetectorFilter;
use crate::types::{BomFormat, non_blank};

/// `search.max_depth` 상한
const MAX_SEARCH_DEPTH: usize = 32;

/// 버전을 결정하지 못했을 때의 기본 버전 스킴
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionScheme {
    /// 현재 UTC 시각을 `time` 포맷 설명으로 포맷
    Timestamp(String),
    /// 고정 텍스트
    Text(String),
}

/// 프로젝트 식별 옵션
#[derive(Debug, Clone)]
pub struct IdentityOptions {
    /// 명시적 프로젝트 이름
    pub name: Option<String>,
    /// 명시적 프로젝트 버전
    pub version: Option<String>,
    /// 선호 탐지기 종류 이름 (검증하지 않은 원문)
    pub preferred_detector: String,
    /// 기본 버전 스킴
    pub version_scheme: VersionScheme,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            preferred_detector: String::new(),
            version_scheme: VersionScheme::Text("Default Detect Version".to_owned()),
        }
    }
}

/// 엔진 설정
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 프로젝트 식별 옵션
    pub identity: IdentityOptions,
    /// 코드 로케이션 이름 접두사
    pub code_location_prefix: String,
    /// 코드 로케이션 이름 접미사
    pub code_location_suffix: String,
    /// 포함할 탐지기 종류 패턴
    pub include: Vec<String>,
    /// 제외할 탐지기 종류 패턴
    pub exclude: Vec<String>,
    /// 외부 도구가 필요한 탐지기 실행 허용
    pub allow_external_tools: bool,
    /// 후보 디렉토리 탐색 설정
    pub search: SearchConfig,
    /// BOM 출력 디렉토리
    pub output_dir: PathBuf,
    /// 통합 BOM 이름 (`Some`이면 통합 모드)
    pub aggregate_name: Option<String>,
    /// BOM 형식
    pub format: BomFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_core(&BomDetectConfig::default())
    }
}

impl EngineConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    ///
    /// 빈 문자열 오버라이드는 `None`이 되고, 알 수 없는 BOM 형식은 CycloneDX로 대체됩니다.
    pub fn from_core(core: &BomDetectConfig) -> Self {
        let project = &core.project;
        let version_scheme = if project.default_version_scheme == VERSION_SCHEME_TIMESTAMP {
            VersionScheme::Timestamp(project.default_version_timeformat.clone())
        } else {
            VersionScheme::Text(project.default_version_text.clone())
        };

        Self {
            identity: IdentityOptions {
                name: owned_non_blank(&project.name),
                version: owned_non_blank(&project.version),
                preferred_detector: project.preferred_detector.clone(),
                version_scheme,
            },
            code_location_prefix: project.code_location_prefix.clone(),
            code_location_suffix: project.code_location_suffix.clone(),
            include: core.detectors.include.clone(),
            exclude: core.detectors.exclude.clone(),
            allow_external_tools: core.detectors.allow_external_tools,
            search: core.search.clone(),
            output_dir: PathBuf::from(&core.bom.output_dir),
            aggregate_name: owned_non_blank(&core.bom.aggregate_name),
            format: BomFormat::from_str_loose(&core.bom.format).unwrap_or(BomFormat::CycloneDx),
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `output_dir`: 비어 있으면 안 되며 `..` 컴포넌트를 포함할 수 없음
    /// - `search.max_depth`: 0-32
    /// - `include`/`exclude`: 유효한 glob 패턴
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(EngineError::Config {
                field: "bom.output_dir".to_owned(),
                reason: "output directory must not be empty".to_owned(),
            });
        }

        if self
            .output_dir
            .components()
            .any(|c| c == Component::ParentDir)
        {
            return Err(EngineError::Config {
                field: "bom.output_dir".to_owned(),
                reason: "output directory contains path traversal pattern '..'".to_owned(),
            });
        }

        if self.search.max_depth > MAX_SEARCH_DEPTH {
            return Err(EngineError::Config {
                field: "search.max_depth".to_owned(),
                reason: format!("must be 0-{MAX_SEARCH_DEPTH}"),
            });
        }

        self.filter()?;
        Ok(())
    }

    /// include/exclude 패턴으로 탐지기 필터를 만듭니다.
    pub fn filter(&self) -> Result<DetectorFilter, EngineError> {
        DetectorFilter::new(&self.include, &self.exclude)
    }

    /// 설정 기반 실행 게이트
    pub fn run_gate(&self) -> ConfigRunGate {
        ConfigRunGate::new(self.allow_external_tools)
    }

    /// 통합 모드 여부
    pub fn is_aggregate(&self) -> bool {
        self.aggregate_name.is_some()
    }

    /// 출력 디렉토리
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn owned_non_blank(value: &str) -> Option<String> {
    non_blank(Some(value)).map(str::to_owned)
}

/// [`EngineConfig`] 빌더
///
/// 기본값 또는 core 설정에서 시작하여 CLI 인자 같은 최우선 값을 덮어씁니다.
/// 빈 문자열은 "설정 안 함"으로 취급합니다.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// core 설정에서 시작하는 빌더를 생성합니다.
    pub fn from_core(core: &BomDetectConfig) -> Self {
        Self {
            config: EngineConfig::from_core(core),
        }
    }

    /// 명시적 프로젝트 이름을 설정합니다.
    pub fn project_name(mut self, name: impl AsRef<str>) -> Self {
        self.config.identity.name = owned_non_blank(name.as_ref());
        self
    }

    /// 명시적 프로젝트 버전을 설정합니다.
    pub fn project_version(mut self, version: impl AsRef<str>) -> Self {
        self.config.identity.version = owned_non_blank(version.as_ref());
        self
    }

    /// 선호 탐지기 종류 이름을 설정합니다.
    pub fn preferred_detector(mut self, kind: impl Into<String>) -> Self {
        self.config.identity.preferred_detector = kind.into();
        self
    }

    /// 기본 버전 스킴을 설정합니다.
    pub fn version_scheme(mut self, scheme: VersionScheme) -> Self {
        self.config.identity.version_scheme = scheme;
        self
    }

    /// 코드 로케이션 이름 접두사/접미사를 설정합니다.
    pub fn code_location_affixes(
        mut self,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.config.code_location_prefix = prefix.into();
        self.config.code_location_suffix = suffix.into();
        self
    }

    /// 포함할 탐지기 종류 패턴을 설정합니다.
    pub fn include(mut self, patterns: Vec<String>) -> Self {
        self.config.include = patterns;
        self
    }

    /// 제외할 탐지기 종류 패턴을 설정합니다.
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude = patterns;
        self
    }

    /// 외부 도구 허용 여부를 설정합니다.
    pub fn allow_external_tools(mut self, allow: bool) -> Self {
        self.config.allow_external_tools = allow;
        self
    }

    /// 최대 탐색 깊이를 설정합니다.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.search.max_depth = depth;
        self
    }

    /// 출력 디렉토리를 설정합니다.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 통합 BOM 이름을 설정합니다. 빈 문자열이면 프로젝트별 모드입니다.
    pub fn aggregate_name(mut self, name: impl AsRef<str>) -> Self {
        self.config.aggregate_name = owned_non_blank(name.as_ref());
        self
    }

    /// BOM 형식을 설정합니다.
    pub fn format(mut self, format: BomFormat) -> Self {
        self.config.format = format;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `EngineError::Config` 또는 `EngineError::Filter` 반환
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
