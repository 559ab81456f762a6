//! 탐지기 include/exclude 필터
//!
//! 패턴은 탐지기 종류 이름(`cargo`, `npm`, ...)에 대한 glob이며
//! 대소문자를 구분하지 않습니다. include 목록이 비어 있으면
//! 제외되지 않은 모든 종류를 포함합니다.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::EngineError;

/// 탐지기 종류 이름 필터
#[derive(Debug, Clone)]
pub struct DetectorFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl DetectorFilter {
    /// include/exclude 패턴 목록으로 필터를 생성합니다.
    ///
    /// # Errors
    ///
    /// 패턴이 유효한 glob이 아니면 `EngineError::Filter`를 반환합니다.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, EngineError> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    /// 모든 종류를 포함하는 필터
    pub fn allow_all() -> Self {
        Self {
            include: None,
            exclude: None,
        }
    }

    /// 주어진 탐지기 종류 이름을 실행 대상에 포함할지 판단합니다.
    pub fn should_include(&self, kind_name: &str) -> bool {
        let included = self
            .include
            .as_ref()
            .map(|set| set.is_match(kind_name))
            .unwrap_or(true);
        let excluded = self
            .exclude
            .as_ref()
            .map(|set| set.is_match(kind_name))
            .unwrap_or(false);
        included && !excluded
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, EngineError> {
    let patterns: Vec<&str> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| EngineError::Filter {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| EngineError::Filter {
        pattern: "<set>".to_owned(),
        reason: e.to_string(),
    })?;
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn empty_lists_include_everything() {
        let filter = DetectorFilter::new(&[], &[]).unwrap();
        assert!(filter.should_include("cargo"));
        assert!(filter.should_include("npm"));
    }

    #[test]
    fn include_list_restricts() {
        let filter = DetectorFilter::new(&patterns(&["cargo", "npm"]), &[]).unwrap();
        assert!(filter.should_include("cargo"));
        assert!(filter.should_include("npm"));
        assert!(!filter.should_include("pip"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = DetectorFilter::new(&patterns(&["*"]), &patterns(&["pip"])).unwrap();
        assert!(filter.should_include("cargo"));
        assert!(!filter.should_include("pip"));
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let filter = DetectorFilter::new(&patterns(&["CARGO"]), &[]).unwrap();
        assert!(filter.should_include("cargo"));
    }

    #[test]
    fn glob_patterns_match_kind_names() {
        let filter = DetectorFilter::new(&[], &patterns(&["n*"])).unwrap();
        assert!(!filter.should_include("npm"));
        assert!(!filter.should_include("nuget"));
        assert!(filter.should_include("maven"));
    }

    #[test]
    fn blank_patterns_are_ignored() {
        let filter = DetectorFilter::new(&patterns(&["  "]), &[]).unwrap();
        assert!(filter.should_include("go"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = DetectorFilter::new(&patterns(&["[cargo"]), &[]).unwrap_err();
        assert!(matches!(err, EngineError::Filter { .. }));
    }

    #[test]
    fn allow_all_includes_everything() {
        assert!(DetectorFilter::allow_all().should_include("sbt"));
    }
}
