//! 도메인 타입 -- 의존성 그래프, BOM 형식, BOM 문서
//!
//! [`DependencyGraph`]는 모든 탐지기가 만들어 내는 공통 표현입니다.
//! 노드는 (이름, 버전)으로 식별되며, 같은 노드를 여러 부모가 공유할 수 있으므로
//! 트리가 아니라 DAG입니다.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bomdetect_core::types::DetectorKind;

/// 단일 의존성 노드
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// 패키지 이름
    pub name: String,
    /// 패키지 버전
    pub version: String,
}

impl Dependency {
    /// 새 의존성 노드를 생성합니다.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// 탐지기 종류에 맞는 Package URL을 생성합니다.
    ///
    /// 예: `pkg:cargo/serde@1.0.204`
    pub fn purl(&self, kind: DetectorKind) -> String {
        format!("pkg:{}/{}@{}", kind.purl_type(), self.name, self.version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// 그래프 내 노드 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// 의존성 그래프
///
/// 하나의 탐지기 추출 결과입니다. 자식 참조는 부모마다 유일하며
/// 삽입 순서를 유지합니다 (결정론적 출력을 위해서만 의미가 있습니다).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// 추출 원본 경로 (코드 로케이션 키의 일부)
    source_path: PathBuf,
    /// 탐지기가 제안한 프로젝트 이름
    project_name: Option<String>,
    /// 탐지기가 제안한 프로젝트 버전
    project_version: Option<String>,
    nodes: Vec<Dependency>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
    index: HashMap<Dependency, NodeId>,
}

impl DependencyGraph {
    /// 원본 경로로 빈 그래프를 생성합니다.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    /// 제안 프로젝트 이름/버전을 설정합니다.
    pub fn with_project(
        mut self,
        name: Option<impl Into<String>>,
        version: Option<impl Into<String>>,
    ) -> Self {
        self.project_name = name.map(Into::into);
        self.project_version = version.map(Into::into);
        self
    }

    /// 원본 경로
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// 제안 프로젝트 이름 (공백뿐이면 `None`)
    pub fn suggested_name(&self) -> Option<&str> {
        non_blank(self.project_name.as_deref())
    }

    /// 제안 프로젝트 버전 (공백뿐이면 `None`)
    pub fn suggested_version(&self) -> Option<&str> {
        non_blank(self.project_version.as_deref())
    }

    /// 루트(직접) 의존성을 추가합니다.
    pub fn add_root(&mut self, dependency: Dependency) -> NodeId {
        let id = self.intern(dependency);
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
        id
    }

    /// `parent`의 자식 의존성을 추가합니다.
    ///
    /// 같은 (이름, 버전) 노드는 그래프 전체에서 공유됩니다.
    pub fn add_child(&mut self, parent: NodeId, dependency: Dependency) -> NodeId {
        let id = self.intern(dependency);
        self.link(parent, id);
        id
    }

    /// 이미 존재하는 두 노드를 부모-자식으로 연결합니다.
    ///
    /// 자기 자신으로의 연결과 중복 연결은 무시합니다.
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        if let Some(children) = self.children.get_mut(parent.0)
            && !children.contains(&child)
        {
            children.push(child);
        }
    }

    /// (이름, 버전)으로 노드를 찾습니다.
    pub fn find(&self, name: &str, version: &str) -> Option<NodeId> {
        self.index.get(&Dependency::new(name, version)).copied()
    }

    /// 이름으로 첫 번째 노드를 찾습니다.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|d| d.name == name)
            .map(NodeId)
    }

    /// 노드 내용을 반환합니다.
    pub fn node(&self, id: NodeId) -> &Dependency {
        &self.nodes[id.0]
    }

    /// 루트 노드 목록
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// 자식 노드 목록
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 전체 노드를 삽입 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Dependency)> {
        self.nodes.iter().enumerate().map(|(i, d)| (NodeId(i), d))
    }

    /// 노드 수
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 노드가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn intern(&mut self, dependency: Dependency) -> NodeId {
        if let Some(id) = self.index.get(&dependency) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.index.insert(dependency.clone(), id);
        self.nodes.push(dependency);
        self.children.push(Vec::new());
        id
    }
}

impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DependencyGraph({}, {} nodes, {} roots)",
            self.source_path.display(),
            self.nodes.len(),
            self.roots.len(),
        )
    }
}

/// 공백뿐인 문자열을 `None`으로 취급합니다.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// BOM 출력 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BomFormat {
    /// CycloneDX 1.5 JSON
    CycloneDx,
    /// SPDX 2.3 JSON
    Spdx,
}

impl fmt::Display for BomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycloneDx => write!(f, "cyclonedx"),
            Self::Spdx => write!(f, "spdx"),
        }
    }
}

impl BomFormat {
    /// 문자열에서 BOM 형식을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cyclonedx" | "cdx" => Some(Self::CycloneDx),
            "spdx" => Some(Self::Spdx),
            _ => None,
        }
    }
}

/// 직렬화된 BOM 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomDocument {
    /// BOM 형식
    pub format: BomFormat,
    /// JSON 문자열 내용
    pub content: String,
    /// 포함된 컴포넌트 수 (루트 프로젝트 제외)
    pub component_count: usize,
}

impl fmt::Display for BomDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BomDocument(format={}, components={})",
            self.format, self.component_count,
        )
    }
}
