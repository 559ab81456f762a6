//! 코드 로케이션 집계
//!
//! 추출된 그래프를 (탐지기 종류, 스캔 루트 기준 상대 경로) 키로 중복 제거합니다.
//! 같은 키가 다시 나오면 나중 것이 앞의 것을 대체합니다 (last-write-wins).
//! 스캔 루트 밖의 경로를 가진 그래프는 키를 만들 수 없으므로 해당 종류의 실패로 기록합니다.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use metrics::counter;
use tracing::{debug, warn};

use bomdetect_core::metrics as m;
use bomdetect_core::types::DetectorKind;

use crate::identity::ProjectIdentity;
use crate::types::DependencyGraph;

/// 중복 제거된 추출 단위
#[derive(Debug, Clone)]
pub struct CodeLocation {
    /// 탐지기 종류
    pub kind: DetectorKind,
    /// 스캔 루트 기준 상대 경로 (`/` 구분, 루트는 빈 문자열)
    pub relative_path: String,
    /// 사람이 읽는 이름
    pub name: String,
    /// 의존성 그래프
    pub graph: DependencyGraph,
}

/// 집계 결과
#[derive(Debug, Default)]
pub struct AggregationResult {
    /// 처음 등장한 키 순서대로의 코드 로케이션
    pub locations: Vec<CodeLocation>,
    /// 키를 만들지 못한 탐지기 종류
    pub failed_kinds: BTreeSet<DetectorKind>,
}

/// 코드 로케이션 집계기
pub struct CodeLocationAggregator<'a> {
    scan_root: &'a Path,
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> CodeLocationAggregator<'a> {
    /// 스캔 루트와 이름 접두사/접미사로 집계기를 생성합니다.
    pub fn new(scan_root: &'a Path, prefix: &'a str, suffix: &'a str) -> Self {
        Self {
            scan_root,
            prefix,
            suffix,
        }
    }

    /// 그래프들을 코드 로케이션으로 집계합니다.
    pub fn aggregate(
        &self,
        graphs: Vec<(DetectorKind, DependencyGraph)>,
        identity: &ProjectIdentity,
    ) -> AggregationResult {
        let mut result = AggregationResult::default();
        let mut index: HashMap<(DetectorKind, String), usize> = HashMap::new();

        for (kind, graph) in graphs {
            let Some(relative_path) = self.relative_key(graph.source_path()) else {
                warn!(
                    kind = %kind,
                    path = %graph.source_path().display(),
                    root = %self.scan_root.display(),
                    "graph source path is outside the scan root"
                );
                result.failed_kinds.insert(kind);
                continue;
            };

            let location = CodeLocation {
                kind,
                name: self.location_name(identity, &relative_path, kind),
                relative_path,
                graph,
            };

            match index.get(&(kind, location.relative_path.clone())) {
                Some(&slot) => {
                    // TODO: 중복 키를 대체할지 거부할지 결정 필요. 지금은 나중 추출이 이깁니다.
                    warn!(
                        kind = %kind,
                        path = %location.relative_path,
                        "duplicate code location, later extraction replaces earlier one"
                    );
                    result.locations[slot] = location;
                }
                None => {
                    debug!(kind = %kind, name = %location.name, "code location created");
                    counter!(m::CODE_LOCATIONS_TOTAL, m::LABEL_KIND => kind.as_str()).increment(1);
                    index.insert((kind, location.relative_path.clone()), result.locations.len());
                    result.locations.push(location);
                }
            }
        }

        result
    }

    fn relative_key(&self, source: &Path) -> Option<String> {
        let relative = source.strip_prefix(self.scan_root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    /// `{prefix}{name}/{version}/{relative path} {kind} bom{suffix}`
    fn location_name(&self, identity: &ProjectIdentity, relative: &str, kind: DetectorKind) -> String {
        let mut segments = vec![identity.name.as_str(), identity.version.as_str()];
        if !relative.is_empty() {
            segments.push(relative);
        }
        format!(
            "{}{} {} bom{}",
            self.prefix,
            segments.join("/"),
            kind,
            self.suffix
        )
    }
}
