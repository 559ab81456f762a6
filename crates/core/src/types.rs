//! 공통 도메인 타입: 탐지기 종류, 프로세스 종료 분류
//!
//! [`DetectorKind`]는 모든 단계에서 그룹화/분류 키로 사용되며,
//! 문자열 표현은 필터 패턴과 출력 파일 이름에 그대로 쓰입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 탐지기 종류 (빌드/패키지 생태계 하나당 하나)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Rust (Cargo.lock)
    Cargo,
    /// Python (conda environment)
    Conda,
    /// Perl (cpanfile)
    Cpan,
    /// Go (go.mod / go.sum)
    Go,
    /// JVM (build.gradle)
    Gradle,
    /// JVM (pom.xml)
    Maven,
    /// JavaScript/TypeScript (package-lock.json)
    Npm,
    /// .NET (packages.config / *.csproj)
    Nuget,
    /// Python (requirements.txt, Pipfile.lock)
    Pip,
    /// Ruby (Gemfile.lock)
    Rubygems,
    /// Scala (build.sbt)
    Sbt,
}

impl DetectorKind {
    /// 알려진 전체 탐지기 종류 (열거 순서 고정)
    pub const ALL: [DetectorKind; 11] = [
        Self::Cargo,
        Self::Conda,
        Self::Cpan,
        Self::Go,
        Self::Gradle,
        Self::Maven,
        Self::Npm,
        Self::Nuget,
        Self::Pip,
        Self::Rubygems,
        Self::Sbt,
    ];

    /// 안정적인 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo",
            Self::Conda => "conda",
            Self::Cpan => "cpan",
            Self::Go => "go",
            Self::Gradle => "gradle",
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::Pip => "pip",
            Self::Rubygems => "rubygems",
            Self::Sbt => "sbt",
        }
    }

    /// 이름으로 탐지기 종류를 찾습니다 (대소문자 무시, 별칭 없음).
    ///
    /// 알려진 종류 집합에 정확히 속하는 이름만 받아들입니다.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Package URL 타입을 반환합니다.
    ///
    /// 예: Cargo -> "cargo", Pip -> "pypi"
    pub fn purl_type(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo",
            Self::Conda => "conda",
            Self::Cpan => "cpan",
            Self::Go => "golang",
            Self::Gradle | Self::Maven | Self::Sbt => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::Pip => "pypi",
            Self::Rubygems => "gem",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 프로세스 종료 분류
///
/// 셸에는 분류별로 서로 다른 종료 코드로 전달됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitClassification {
    /// 실패 없음
    Success,
    /// 하나 이상의 탐지기 종류가 실패
    BomToolFailure,
    /// 탐색 단계 실패
    SearchFailure,
}

impl ExitClassification {
    /// 프로세스 종료 코드
    ///
    /// | 분류              | 코드 |
    /// |-------------------|------|
    /// | success           | 0    |
    /// | bom-tool-failure  | 5    |
    /// | search-failure    | 6    |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::BomToolFailure => 5,
            Self::SearchFailure => 6,
        }
    }

    /// 성공 여부
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ExitClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::BomToolFailure => write!(f, "bom-tool-failure"),
            Self::SearchFailure => write!(f, "search-failure"),
        }
    }
}
