//! Cargo 탐지기
//!
//! [`CargoDetector`]는 `Cargo.lock`을 파싱하여 [`DependencyGraph`]를 생성합니다.
//! 같은 디렉토리에 `Cargo.toml`의 `[package]`가 있으면 이름/버전을 제안합니다.
//!
//! # 그래프 구성
//!
//! - `source`가 없는 패키지는 워크스페이스 로컬 크레이트입니다.
//! - 로컬 크레이트의 직접 의존성이 그래프의 루트가 됩니다.
//! - `dependencies` 항목은 `"name"`, `"name version"`,
//!   `"name version (source)"` 형식을 모두 지원합니다.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use bomdetect_core::error::DetectorError;
use bomdetect_core::types::DetectorKind;

use crate::detector::{Detector, read_manifest};
use crate::types::{Dependency, DependencyGraph, NodeId};

const LOCKFILE: &str = "Cargo.lock";
const MANIFEST: &str = "Cargo.toml";

/// Cargo.lock 탐지기
pub struct CargoDetector;

/// Cargo.lock 구조 (파싱용)
#[derive(Deserialize)]
struct CargoLock {
    #[serde(default, rename = "package")]
    packages: Vec<LockPackage>,
}

/// Cargo.lock 내 개별 패키지 (파싱용)
#[derive(Deserialize)]
struct LockPackage {
    name: String,
    version: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Cargo.toml 구조 (이름/버전 제안용)
#[derive(Deserialize)]
struct CargoManifest {
    #[serde(default)]
    package: Option<ManifestPackage>,
}

/// `version.workspace = true` 같은 테이블 값은 제안에서 제외합니다.
#[derive(Deserialize)]
struct ManifestPackage {
    #[serde(default)]
    name: Option<toml::Value>,
    #[serde(default)]
    version: Option<toml::Value>,
}

impl Detector for CargoDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Cargo
    }

    fn is_applicable(&self, dir: &Path) -> bool {
        dir.join(LOCKFILE).is_file()
    }

    fn extract(&self, dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError> {
        let lock_path = dir.join(LOCKFILE);
        let content = read_manifest(&lock_path)?;
        let lock: CargoLock = toml::from_str(&content).map_err(|e| DetectorError::Parse {
            path: lock_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let (name, version) = read_project(dir)?;
        let graph = build_graph(dir, &lock)?.with_project(name, version);

        debug!(
            path = %lock_path.display(),
            nodes = graph.len(),
            roots = graph.roots().len(),
            "parsed Cargo.lock"
        );

        if graph.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![graph])
    }
}

fn read_project(dir: &Path) -> Result<(Option<String>, Option<String>), DetectorError> {
    let manifest_path = dir.join(MANIFEST);
    if !manifest_path.is_file() {
        return Ok((None, None));
    }
    let content = read_manifest(&manifest_path)?;
    let manifest: CargoManifest = toml::from_str(&content).map_err(|e| DetectorError::Parse {
        path: manifest_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let Some(package) = manifest.package else {
        return Ok((None, None));
    };
    let as_string = |value: Option<toml::Value>| match value {
        Some(toml::Value::String(s)) => Some(s),
        _ => None,
    };
    Ok((as_string(package.name), as_string(package.version)))
}

fn build_graph(dir: &Path, lock: &CargoLock) -> Result<DependencyGraph, DetectorError> {
    let mut graph = DependencyGraph::new(dir);

    // name -> [(version, index)]
    let mut by_name: HashMap<&str, Vec<(&str, usize)>> = HashMap::new();
    for (idx, pkg) in lock.packages.iter().enumerate() {
        by_name
            .entry(pkg.name.as_str())
            .or_default()
            .push((pkg.version.as_str(), idx));
    }

    let resolve = |spec: &str| -> Result<usize, DetectorError> {
        let mut parts = spec.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let version = parts.next();
        let candidates = by_name.get(name).map(Vec::as_slice).unwrap_or(&[]);
        let found = match version {
            Some(v) => candidates.iter().find(|(cv, _)| *cv == v),
            None if candidates.len() == 1 => candidates.first(),
            None => None,
        };
        found.map(|(_, idx)| *idx).ok_or_else(|| DetectorError::Parse {
            path: dir.join(LOCKFILE).display().to_string(),
            reason: format!("unresolvable dependency reference '{spec}'"),
        })
    };

    // 패키지 인덱스 -> 직접 의존성 인덱스
    let mut edges: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, pkg) in lock.packages.iter().enumerate() {
        let mut resolved = Vec::with_capacity(pkg.dependencies.len());
        for spec in &pkg.dependencies {
            resolved.push(resolve(spec)?);
        }
        edges.insert(idx, resolved);
    }

    let mut ids: HashMap<usize, NodeId> = HashMap::new();
    let locals: Vec<usize> = lock
        .packages
        .iter()
        .enumerate()
        .filter(|(_, p)| p.source.is_none())
        .map(|(idx, _)| idx)
        .collect();

    for local in &locals {
        for dep in edges.get(local).map(Vec::as_slice).unwrap_or(&[]) {
            let pkg = &lock.packages[*dep];
            let id = graph.add_root(Dependency::new(&pkg.name, &pkg.version));
            ids.insert(*dep, id);
        }
    }

    // 루트에서 도달 가능한 노드만 연결 (너비 우선)
    let mut queue: Vec<usize> = ids.keys().copied().collect();
    queue.sort_unstable();
    let mut cursor = 0;
    while cursor < queue.len() {
        let parent = queue[cursor];
        cursor += 1;
        let parent_id = ids[&parent];
        for child in edges.get(&parent).map(Vec::as_slice).unwrap_or(&[]) {
            let pkg = &lock.packages[*child];
            let child_id = graph.add_child(parent_id, Dependency::new(&pkg.name, &pkg.version));
            if ids.insert(*child, child_id).is_none() {
                queue.push(*child);
            }
        }
    }

    Ok(graph)
}
