//! 프로젝트 식별 -- 최종 (이름, 버전) 결정
//!
//! [`IdentityResolver`]는 성공한 평가들의 제안과 외부 오버라이드로부터
//! 정확히 하나의 [`ProjectIdentity`]를 만듭니다. 실패하지 않습니다.
//!
//! # 결정 순서
//!
//! 먼저 이름을 제안한 평가 하나를 고릅니다.
//!
//! 1. 유효한 선호 탐지기 종류 중 이름을 제안한 첫 평가
//! 2. 없으면 이름을 제안한 평가 중 가장 얕은 것 (동률이면 입력 순서상 먼저)
//!
//! 이후 필드마다 따로 대체합니다.
//!
//! - 이름: 오버라이드, 고른 평가의 이름, 스캔 루트 디렉토리 이름
//! - 버전: 오버라이드, 고른 평가의 버전, 기본 버전 스킴
//!
//! 버전은 이름과 같은 평가에서만 가져옵니다. 다른 평가가 제안한 버전은 쓰지 않습니다.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use bomdetect_core::types::DetectorKind;

use crate::config::{IdentityOptions, VersionScheme};
use crate::engine::Evaluation;

/// 스캔 루트 이름을 알 수 없을 때의 이름
const UNKNOWN_PROJECT_NAME: &str = "unknown-project";

/// 결정된 프로젝트 식별 정보
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProjectIdentity {
    /// 프로젝트 이름
    pub name: String,
    /// 프로젝트 버전
    pub version: String,
}

impl ProjectIdentity {
    /// 새 식별 정보를 생성합니다.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// 프로젝트 식별 결정기
pub struct IdentityResolver<'a> {
    options: &'a IdentityOptions,
}

impl<'a> IdentityResolver<'a> {
    /// 식별 옵션으로 결정기를 생성합니다.
    pub fn new(options: &'a IdentityOptions) -> Self {
        Self { options }
    }

    /// 현재 시각을 기준으로 식별 정보를 결정합니다.
    pub fn resolve(&self, evaluations: &[Evaluation], scan_root: &Path) -> ProjectIdentity {
        self.resolve_at(evaluations, scan_root, OffsetDateTime::now_utc())
    }

    /// 주어진 시각을 기준으로 식별 정보를 결정합니다.
    ///
    /// 같은 입력에 대해 항상 같은 결과를 반환합니다.
    pub fn resolve_at(
        &self,
        evaluations: &[Evaluation],
        scan_root: &Path,
        now: OffsetDateTime,
    ) -> ProjectIdentity {
        let suggestion = pick(evaluations, self.preferred_kind());

        let name = self
            .options
            .name
            .clone()
            .or_else(|| suggestion.map(|(name, _)| name.to_owned()))
            .unwrap_or_else(|| {
                let fallback = root_name(scan_root);
                info!(name = %fallback, "no detector suggested a project name, using scan root name");
                fallback
            });

        let version = self
            .options
            .version
            .clone()
            .or_else(|| suggestion.and_then(|(_, version)| version).map(str::to_owned))
            .unwrap_or_else(|| {
                let fallback = self.default_version(now);
                info!(version = %fallback, "no project version suggested, using default");
                fallback
            });

        debug!(name = %name, version = %version, "resolved project identity");
        ProjectIdentity { name, version }
    }

    /// 설정된 선호 탐지기 종류 (없거나 알 수 없으면 `None`)
    fn preferred_kind(&self) -> Option<DetectorKind> {
        let raw = self.options.preferred_detector.trim();
        if raw.is_empty() {
            return None;
        }
        let kind = DetectorKind::from_name(raw);
        if kind.is_none() {
            info!(
                preferred_detector = raw,
                "preferred detector is not a known detector kind, resolving automatically"
            );
        }
        kind
    }

    /// 기본 버전 스킴에 따른 버전 문자열
    pub fn default_version(&self, now: OffsetDateTime) -> String {
        match &self.options.version_scheme {
            VersionScheme::Text(text) => text.clone(),
            VersionScheme::Timestamp(format) => format_timestamp(now, format),
        }
    }
}

/// 식별에 쓸 제안 하나를 고릅니다: 선호 종류의 첫 제안, 없으면 가장 얕은 제안.
fn pick(
    evaluations: &[Evaluation],
    preferred: Option<DetectorKind>,
) -> Option<(&str, Option<&str>)> {
    if let Some(kind) = preferred {
        let found = evaluations
            .iter()
            .filter(|e| e.kind == kind)
            .find_map(Evaluation::suggestion);
        if found.is_some() {
            return found;
        }
        debug!(kind = %kind, "preferred detector made no suggestion");
    }

    let mut best: Option<(usize, (&str, Option<&str>))> = None;
    for evaluation in evaluations {
        let Some(suggestion) = evaluation.suggestion() else {
            continue;
        };
        match best {
            Some((depth, _)) if depth <= evaluation.depth => {}
            _ => best = Some((evaluation.depth, suggestion)),
        }
    }
    best.map(|(_, suggestion)| suggestion)
}

fn root_name(scan_root: &Path) -> String {
    let named = |p: &Path| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
    };
    named(scan_root)
        .or_else(|| scan_root.canonicalize().ok().as_deref().and_then(named))
        .unwrap_or_else(|| UNKNOWN_PROJECT_NAME.to_owned())
}

/// `time` 포맷 설명으로 UTC 시각을 포맷합니다.
///
/// 포맷 설명이 잘못되었으면 경고 로그를 남기고 RFC3339로 대체합니다.
pub(crate) fn format_timestamp(now: OffsetDateTime, format: &str) -> String {
    let formatted = time::format_description::parse(format)
        .map_err(|e| e.to_string())
        .and_then(|items| now.format(&items).map_err(|e| e.to_string()));
    match formatted {
        Ok(value) => value,
        Err(e) => {
            warn!(format, error = %e, "invalid version time format, falling back to RFC3339");
            now.format(&Rfc3339)
                .unwrap_or_else(|_| now.unix_timestamp().to_string())
        }
    }
}
