//! pip 탐지기
//!
//! [`PipDetector`]는 `requirements.txt`의 고정 버전(`name==version`) 항목을
//! 루트 의존성으로 만듭니다. 전이 의존성은 파이썬 인터프리터 없이는 알 수 없으므로
//! 외부 도구가 필요한 탐지기로 표시되어 실행 게이트의 대상이 됩니다.
//!
//! 같은 디렉토리의 `pyproject.toml` `[project]` 테이블에서 이름/버전을 제안합니다.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use bomdetect_core::error::DetectorError;
use bomdetect_core::types::DetectorKind;

use crate::detector::{Detector, read_manifest};
use crate::types::{Dependency, DependencyGraph};

const REQUIREMENTS: &str = "requirements.txt";
const PYPROJECT: &str = "pyproject.toml";

/// requirements.txt 탐지기
pub struct PipDetector;

#[derive(Deserialize)]
struct PyProject {
    #[serde(default)]
    project: Option<PyProjectTable>,
}

#[derive(Deserialize)]
struct PyProjectTable {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl Detector for PipDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Pip
    }

    fn is_applicable(&self, dir: &Path) -> bool {
        dir.join(REQUIREMENTS).is_file()
    }

    fn extract(&self, dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError> {
        let path = dir.join(REQUIREMENTS);
        let content = read_manifest(&path)?;

        let mut graph = DependencyGraph::new(dir);
        for (lineno, line) in content.lines().enumerate() {
            match parse_requirement(line) {
                Some(dependency) => {
                    graph.add_root(dependency);
                }
                None if !is_ignorable(line) => {
                    debug!(
                        path = %path.display(),
                        line = lineno + 1,
                        "skipping unpinned requirement"
                    );
                }
                None => {}
            }
        }

        if graph.is_empty() {
            return Ok(Vec::new());
        }

        let (name, version) = read_project(dir)?;
        Ok(vec![graph.with_project(name, version)])
    }

    fn requires_external_tool(&self) -> bool {
        true
    }
}

fn read_project(dir: &Path) -> Result<(Option<String>, Option<String>), DetectorError> {
    let path = dir.join(PYPROJECT);
    if !path.is_file() {
        return Ok((None, None));
    }
    let content = read_manifest(&path)?;
    let pyproject: PyProject = toml::from_str(&content).map_err(|e| DetectorError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(pyproject
        .project
        .map(|p| (p.name, p.version))
        .unwrap_or((None, None)))
}

/// `name[extra]==version ; marker  # comment` 형식의 한 줄을 파싱합니다.
fn parse_requirement(line: &str) -> Option<Dependency> {
    let line = strip_comment(line).trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    let spec = line.split(';').next().unwrap_or(line).trim();
    let (name, version) = spec.split_once("==")?;
    if version.starts_with('=') {
        // `===` 임의 동등 비교는 지원하지 않음
        return None;
    }
    let name = name.split('[').next().unwrap_or(name).trim();
    let version = version.trim();
    if name.is_empty() || version.is_empty() || version.contains(['*', ',']) {
        return None;
    }
    Some(Dependency::new(name.to_lowercase(), version))
}

fn strip_comment(line: &str) -> &str {
    match line.find(" #").or_else(|| line.starts_with('#').then_some(0)) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn is_ignorable(line: &str) -> bool {
    let line = strip_comment(line).trim();
    line.is_empty() || line.starts_with('-')
}
