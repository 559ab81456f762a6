//! BOM 산출물 생성
//!
//! [`ArtifactGenerator`]는 코드 로케이션을 문서 단위([`BomGroup`])로 묶고,
//! 각 묶음을 CycloneDX 또는 SPDX JSON으로 직렬화하여 출력 디렉토리에 씁니다.
//!
//! # 모드
//!
//! - **프로젝트별** (기본): (탐지기 종류, 프로젝트 이름, 버전)마다 문서 하나
//! - **통합**: 통합 이름이 설정되면 모든 코드 로케이션을 문서 하나에 담음
//!
//! # 파일 이름
//!
//! `{tag}_{이름}_{버전}_bom.json` -- tag는 탐지기 종류 또는 통합 이름이며
//! 세 세그먼트 모두 [`escape::escape_segment`]로 이스케이프됩니다.
//!
//! # 쓰기
//!
//! 직렬화가 끝난 뒤에만 기존 파일을 지우고 `{파일}.tmp`에 쓴 다음 rename합니다.
//! 한 문서의 실패는 다른 문서 생성에 영향을 주지 않습니다.

pub mod cyclonedx;
pub mod escape;
pub mod spdx;
pub mod util;

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, warn};

use bomdetect_core::metrics as m;
use bomdetect_core::types::DetectorKind;

use crate::code_location::CodeLocation;
use crate::error::EngineError;
use crate::identity::ProjectIdentity;
use crate::types::{BomDocument, BomFormat, DependencyGraph, NodeId};

use self::escape::escape_segment;

/// 요약 레이블 메타데이터 속성 이름
pub const SUMMARY_PROPERTY: &str = "bomdetect:summary";

/// 명시적 이름/버전 오버라이드
#[derive(Debug, Clone, Default)]
pub struct DocumentOverrides {
    /// 문서 본문의 프로젝트 이름을 대체
    pub name: Option<String>,
    /// 문서 본문의 프로젝트 버전을 대체
    pub version: Option<String>,
}

/// 문서 하나로 직렬화될 코드 로케이션 묶음
#[derive(Debug)]
pub struct BomGroup<'a> {
    /// 파일 이름 첫 세그먼트 (탐지기 종류 또는 통합 이름)
    pub tag: String,
    /// 포함된 탐지기 종류
    pub kinds: BTreeSet<DetectorKind>,
    /// 파일 이름에 쓰이는 프로젝트 식별 정보
    pub identity: ProjectIdentity,
    /// 문서 본문에 쓰이는 프로젝트 식별 정보 (오버라이드 적용)
    pub document_identity: ProjectIdentity,
    /// 이름과 버전 오버라이드가 모두 있을 때의 요약 레이블
    pub summary: Option<String>,
    /// 통합 모드 여부 (코드 로케이션마다 하위 프로젝트 노드를 둠)
    pub aggregate: bool,
    /// 포함된 코드 로케이션
    pub locations: Vec<&'a CodeLocation>,
}

impl BomGroup<'_> {
    /// 출력 파일 이름
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_bom.json",
            escape_segment(&self.tag),
            escape_segment(&self.identity.name),
            escape_segment(&self.identity.version),
        )
    }
}

/// 작성된 산출물 정보
#[derive(Debug, Clone, Serialize)]
pub struct WrittenArtifact {
    /// 파일 경로
    pub path: PathBuf,
    /// BOM 형식
    pub format: BomFormat,
    /// 컴포넌트 수
    pub component_count: usize,
}

/// 문서 하나의 생성 결과
#[derive(Debug)]
pub struct ArtifactOutcome {
    /// 출력 파일 이름
    pub file_name: String,
    /// 문서에 포함된 탐지기 종류
    pub kinds: BTreeSet<DetectorKind>,
    /// 생성 결과
    pub result: Result<WrittenArtifact, EngineError>,
}

/// BOM 산출물 생성기
pub struct ArtifactGenerator {
    output_dir: PathBuf,
    format: BomFormat,
    overrides: DocumentOverrides,
}

impl ArtifactGenerator {
    /// 새 생성기를 생성합니다.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        format: BomFormat,
        overrides: DocumentOverrides,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            overrides,
        }
    }

    /// 출력 디렉토리
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 프로젝트별 모드의 문서 묶음을 만듭니다.
    ///
    /// 코드 로케이션은 (종류, 그래프 제안 이름 또는 결정된 이름,
    /// 그래프 제안 버전 또는 결정된 버전)으로 묶이며, 처음 등장한 순서를 유지합니다.
    pub fn plan_per_project<'a>(
        &self,
        locations: &'a [CodeLocation],
        resolved: &ProjectIdentity,
    ) -> Vec<BomGroup<'a>> {
        let mut groups: Vec<BomGroup<'a>> = Vec::new();
        let mut index: HashMap<(DetectorKind, ProjectIdentity), usize> = HashMap::new();

        for location in locations {
            let identity = ProjectIdentity::new(
                location.graph.suggested_name().unwrap_or(&resolved.name),
                location.graph.suggested_version().unwrap_or(&resolved.version),
            );
            let key = (location.kind, identity.clone());
            match index.get(&key) {
                Some(&slot) => groups[slot].locations.push(location),
                None => {
                    index.insert(key, groups.len());
                    let tag = location.kind.as_str().to_owned();
                    let kinds = BTreeSet::from([location.kind]);
                    groups.push(self.group(tag, kinds, identity, false, vec![location]));
                }
            }
        }
        groups
    }

    /// 통합 모드의 단일 문서 묶음을 만듭니다.
    pub fn plan_aggregate<'a>(
        &self,
        locations: &'a [CodeLocation],
        aggregate_name: &str,
        resolved: &ProjectIdentity,
    ) -> BomGroup<'a> {
        let kinds = locations.iter().map(|l| l.kind).collect();
        self.group(
            aggregate_name.to_owned(),
            kinds,
            resolved.clone(),
            true,
            locations.iter().collect(),
        )
    }

    fn group<'a>(
        &self,
        tag: String,
        kinds: BTreeSet<DetectorKind>,
        identity: ProjectIdentity,
        aggregate: bool,
        locations: Vec<&'a CodeLocation>,
    ) -> BomGroup<'a> {
        let document_identity = ProjectIdentity::new(
            self.overrides.name.as_deref().unwrap_or(&identity.name),
            self.overrides.version.as_deref().unwrap_or(&identity.version),
        );
        let summary = match (&self.overrides.name, &self.overrides.version) {
            (Some(name), Some(version)) => {
                Some(format!("{name}/{version}/{tag} bomdetect export"))
            }
            _ => None,
        };
        BomGroup {
            tag,
            kinds,
            identity,
            document_identity,
            summary,
            aggregate,
            locations,
        }
    }

    /// 묶음을 BOM 문서로 직렬화합니다.
    pub fn render(&self, group: &BomGroup<'_>) -> Result<BomDocument, EngineError> {
        let flat = FlatBom::from_group(group);
        match self.format {
            BomFormat::CycloneDx => cyclonedx::render(&flat, &group.file_name()),
            BomFormat::Spdx => spdx::render(&flat, &group.file_name()),
        }
    }

    /// 묶음 하나를 직렬화하여 파일로 씁니다.
    pub fn write(&self, group: &BomGroup<'_>) -> Result<WrittenArtifact, EngineError> {
        let document = self.render(group)?;
        let path = self.output_dir.join(group.file_name());

        std::fs::create_dir_all(&self.output_dir).map_err(|e| EngineError::Write {
            path: self.output_dir.display().to_string(),
            source: e,
        })?;

        if path.exists() {
            debug!(path = %path.display(), "removing existing bill of materials");
            std::fs::remove_file(&path).map_err(|e| EngineError::Write {
                path: path.display().to_string(),
                source: e,
            })?;
        }

        write_atomically(&path, document.content.as_bytes())?;
        info!(
            path = %path.display(),
            format = %document.format,
            components = document.component_count,
            "bill of materials written"
        );

        Ok(WrittenArtifact {
            path,
            format: document.format,
            component_count: document.component_count,
        })
    }

    /// 모든 묶음을 씁니다. 실패한 문서가 있어도 나머지를 계속 씁니다.
    pub fn write_all(&self, groups: &[BomGroup<'_>]) -> Vec<ArtifactOutcome> {
        groups
            .iter()
            .map(|group| {
                let result = self.write(group);
                let format = self.format.to_string();
                match &result {
                    Ok(_) => {
                        counter!(m::BOM_DOCUMENTS_WRITTEN_TOTAL, m::LABEL_FORMAT => format)
                            .increment(1);
                    }
                    Err(e) => {
                        warn!(
                            file = %group.file_name(),
                            error = %e,
                            "failed to write bill of materials"
                        );
                        counter!(m::BOM_DOCUMENTS_FAILED_TOTAL, m::LABEL_FORMAT => format)
                            .increment(1);
                    }
                }
                ArtifactOutcome {
                    file_name: group.file_name(),
                    kinds: group.kinds.clone(),
                    result,
                }
            })
            .collect()
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> Result<(), EngineError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let written = (|| -> std::io::Result<()> {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        std::fs::rename(&tmp, path)
    })();

    written.map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        EngineError::Write {
            path: path.display().to_string(),
            source: e,
        }
    })
}

/// 직렬화 형식과 무관한 평탄화된 문서 모델
#[derive(Debug)]
pub(crate) struct FlatBom {
    pub root: FlatComponent,
    pub summary: Option<String>,
    /// bom-ref 순서대로의 컴포넌트 (루트 제외, bom-ref 기준 중복 없음)
    pub components: Vec<FlatComponent>,
    /// (bom-ref, 직접 의존 bom-ref) -- 루트가 첫 항목
    pub dependencies: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Clone)]
pub(crate) struct FlatComponent {
    pub bom_ref: String,
    pub name: String,
    pub version: String,
    pub purl: Option<String>,
    pub application: bool,
}

impl FlatBom {
    pub(crate) fn from_group(group: &BomGroup<'_>) -> Self {
        let identity = &group.document_identity;
        let root = FlatComponent {
            bom_ref: format!("project:{}@{}", identity.name, identity.version),
            name: identity.name.clone(),
            version: identity.version.clone(),
            purl: None,
            application: true,
        };

        let mut flat = Self {
            root: root.clone(),
            summary: group.summary.clone(),
            components: Vec::new(),
            dependencies: vec![(root.bom_ref.clone(), Vec::new())],
        };
        let mut deps_index: HashMap<String, usize> = HashMap::from([(root.bom_ref.clone(), 0)]);

        for location in &group.locations {
            let roots = flat.add_graph(&mut deps_index, location.kind, &location.graph);
            if group.aggregate {
                let sub = FlatComponent {
                    bom_ref: format!("codelocation:{}:{}", location.kind, location.relative_path),
                    name: location.name.clone(),
                    version: identity.version.clone(),
                    purl: None,
                    application: true,
                };
                let sub_ref = sub.bom_ref.clone();
                flat.add_component(&mut deps_index, sub);
                flat.add_edges(&deps_index, &sub_ref, roots);
                flat.add_edges(&deps_index, &root.bom_ref, vec![sub_ref]);
            } else {
                flat.add_edges(&deps_index, &root.bom_ref, roots);
            }
        }
        flat
    }

    /// 그래프의 모든 노드와 간선을 추가하고 루트 bom-ref 목록을 반환합니다.
    fn add_graph(
        &mut self,
        deps_index: &mut HashMap<String, usize>,
        kind: DetectorKind,
        graph: &DependencyGraph,
    ) -> Vec<String> {
        let mut refs: HashMap<NodeId, String> = HashMap::with_capacity(graph.len());
        for (id, dep) in graph.iter() {
            let purl = dep.purl(kind);
            self.add_component(
                deps_index,
                FlatComponent {
                    bom_ref: purl.clone(),
                    name: dep.name.clone(),
                    version: dep.version.clone(),
                    purl: Some(purl.clone()),
                    application: false,
                },
            );
            refs.insert(id, purl);
        }

        for (id, _) in graph.iter() {
            let children: Vec<String> = graph
                .children(id)
                .iter()
                .filter_map(|c| refs.get(c).cloned())
                .collect();
            if let Some(parent) = refs.get(&id) {
                self.add_edges(deps_index, parent, children);
            }
        }
        graph
            .roots()
            .iter()
            .filter_map(|r| refs.get(r).cloned())
            .collect()
    }

    fn add_component(
        &mut self,
        deps_index: &mut HashMap<String, usize>,
        component: FlatComponent,
    ) {
        if deps_index.contains_key(&component.bom_ref) {
            return;
        }
        deps_index.insert(component.bom_ref.clone(), self.dependencies.len());
        self.dependencies.push((component.bom_ref.clone(), Vec::new()));
        self.components.push(component);
    }

    fn add_edges(
        &mut self,
        deps_index: &HashMap<String, usize>,
        parent: &str,
        children: Vec<String>,
    ) {
        let Some(&slot) = deps_index.get(parent) else {
            return;
        };
        let targets = &mut self.dependencies[slot].1;
        for child in children {
            if child != parent && !targets.contains(&child) {
                targets.push(child);
            }
        }
    }
}
