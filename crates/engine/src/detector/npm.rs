//! npm 탐지기
//!
//! [`NpmDetector`]는 npm의 package-lock.json (v2/v3) 파일을 파싱하여
//! [`DependencyGraph`]를 생성합니다.
//!
//! # package-lock.json v3 형식 예시
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0", "dependencies": { "lodash": "^4.17.21" } },
//!     "node_modules/lodash": { "version": "4.17.21", "resolved": "...", "integrity": "sha512-..." }
//!   }
//! }
//! ```
//!
//! 의존성 이름은 node 모듈 해석 규칙대로 가장 가까운 `node_modules`부터
//! 상위로 올라가며 찾습니다.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use bomdetect_core::error::DetectorError;
use bomdetect_core::types::DetectorKind;

use crate::detector::{Detector, read_manifest};
use crate::types::{Dependency, DependencyGraph, NodeId};

const LOCKFILE: &str = "package-lock.json";
const NODE_MODULES: &str = "node_modules/";

/// package-lock.json 탐지기
pub struct NpmDetector;

/// package-lock.json 구조 (파싱용)
#[derive(Deserialize)]
struct NpmLockFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    packages: BTreeMap<String, NpmPackageEntry>,
}

/// package-lock.json 내 개별 패키지 (파싱용)
#[derive(Deserialize)]
struct NpmPackageEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    link: bool,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "optionalDependencies")]
    optional_dependencies: BTreeMap<String, String>,
}

impl NpmPackageEntry {
    fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.optional_dependencies.keys())
            .map(String::as_str)
    }
}

impl Detector for NpmDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Npm
    }

    fn is_applicable(&self, dir: &Path) -> bool {
        dir.join(LOCKFILE).is_file()
    }

    fn extract(&self, dir: &Path) -> Result<Vec<DependencyGraph>, DetectorError> {
        let lock_path = dir.join(LOCKFILE);
        let content = read_manifest(&lock_path)?;
        let lock: NpmLockFile =
            serde_json::from_str(&content).map_err(|e| DetectorError::Parse {
                path: lock_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let root = lock.packages.get("");
        let name = root
            .and_then(|r| r.name.clone())
            .or_else(|| lock.name.clone());
        let version = root
            .and_then(|r| r.version.clone())
            .or_else(|| lock.version.clone());

        let graph = build_graph(dir, &lock).with_project(name, version);
        debug!(
            path = %lock_path.display(),
            nodes = graph.len(),
            roots = graph.roots().len(),
            "parsed package-lock.json"
        );

        if graph.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![graph])
    }
}

fn build_graph(dir: &Path, lock: &NpmLockFile) -> DependencyGraph {
    let mut graph = DependencyGraph::new(dir);
    let mut ids: HashMap<&str, NodeId> = HashMap::new();
    let mut queue: Vec<&str> = Vec::new();

    let root_deps: Vec<&str> = match lock.packages.get("") {
        Some(root) => root
            .dependency_names()
            .chain(root.dev_dependencies.keys().map(String::as_str))
            .collect(),
        None => Vec::new(),
    };

    let root_keys: Vec<&str> = if root_deps.is_empty() {
        // v2 lockfile이 루트 항목 없이 생성된 경우: 최상위 node_modules 항목 전부
        lock.packages
            .keys()
            .map(String::as_str)
            .filter(|k| is_top_level(k))
            .collect()
    } else {
        root_deps
            .iter()
            .filter_map(|dep| resolve(lock, "", dep))
            .collect()
    };

    for key in root_keys {
        let Some(dependency) = dependency_for(lock, key) else {
            continue;
        };
        let id = graph.add_root(dependency);
        if ids.insert(key, id).is_none() {
            queue.push(key);
        }
    }

    let mut cursor = 0;
    while cursor < queue.len() {
        let parent_key = queue[cursor];
        cursor += 1;
        let parent_id = ids[parent_key];
        let Some(entry) = lock.packages.get(parent_key) else {
            continue;
        };
        for dep in entry.dependency_names() {
            let Some(child_key) = resolve(lock, parent_key, dep) else {
                debug!(parent = parent_key, dependency = dep, "unresolved npm dependency");
                continue;
            };
            let Some(dependency) = dependency_for(lock, child_key) else {
                continue;
            };
            let child_id = graph.add_child(parent_id, dependency);
            if ids.insert(child_key, child_id).is_none() {
                queue.push(child_key);
            }
        }
    }

    graph
}

/// `from` 위치에서 `name`을 node 모듈 해석 규칙으로 찾아 `packages` 키를 반환합니다.
fn resolve<'a>(lock: &'a NpmLockFile, from: &str, name: &str) -> Option<&'a str> {
    let mut base = from;
    loop {
        let candidate = if base.is_empty() {
            format!("{NODE_MODULES}{name}")
        } else {
            format!("{base}/{NODE_MODULES}{name}")
        };
        if let Some((key, _)) = lock.packages.get_key_value(candidate.as_str()) {
            return Some(key.as_str());
        }
        if base.is_empty() {
            return None;
        }
        base = parent_scope(base);
    }
}

/// `a/node_modules/b/node_modules/c` -> `a/node_modules/b`
fn parent_scope(key: &str) -> &str {
    match key.rfind(&format!("/{NODE_MODULES}")) {
        Some(pos) => &key[..pos],
        None => "",
    }
}

fn is_top_level(key: &str) -> bool {
    key.strip_prefix(NODE_MODULES)
        .is_some_and(|rest| !rest.contains(NODE_MODULES))
}

fn dependency_for(lock: &NpmLockFile, key: &str) -> Option<Dependency> {
    let entry = lock.packages.get(key)?;
    if entry.link {
        return None;
    }
    let version = entry.version.as_deref()?;
    let name = entry
        .name
        .clone()
        .unwrap_or_else(|| extract_package_name(key).to_owned());
    Some(Dependency::new(name, version))
}

/// "node_modules/@scope/name" 또는 "node_modules/name" 에서 패키지명 추출
fn extract_package_name(key: &str) -> &str {
    match key.rfind(NODE_MODULES) {
        Some(pos) => &key[pos + NODE_MODULES.len()..],
        None => key,
    }
}
