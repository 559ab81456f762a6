//! SPDX 2.3 JSON BOM 생성
//!
//! [SPDX](https://spdx.dev/) 2.3 사양에 따른 JSON 문서를 생성합니다.
//! 루트 프로젝트는 `documentDescribes`로, 의존 관계는 `DEPENDS_ON` 관계로 기록됩니다.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{FlatBom, FlatComponent, util};
use crate::error::EngineError;
use crate::types::{BomDocument, BomFormat};

const DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";

/// SPDX 2.3 문서 루트 구조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument<'a> {
    spdx_version: &'static str,
    #[serde(rename = "SPDXID")]
    spdx_id: &'static str,
    name: String,
    data_license: &'static str,
    document_namespace: String,
    creation_info: SpdxCreationInfo,
    document_describes: Vec<String>,
    packages: Vec<SpdxPackage<'a>>,
    relationships: Vec<SpdxRelationship>,
}

/// SPDX 생성 정보
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxCreationInfo {
    created: String,
    creators: Vec<String>,
}

/// SPDX 패키지
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage<'a> {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: &'a str,
    version_info: &'a str,
    download_location: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<SpdxExternalRef<'a>>,
}

/// SPDX 외부 참조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef<'a> {
    reference_category: &'static str,
    reference_type: &'static str,
    reference_locator: &'a str,
}

/// SPDX 관계
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: String,
    relationship_type: &'static str,
    related_spdx_element: String,
}

/// bom-ref -> SPDX ID 할당기
///
/// 정제 후 같은 ID가 되는 서로 다른 bom-ref에는 `-2`, `-3` 접미사를 붙입니다.
#[derive(Default)]
struct SpdxIds {
    by_ref: HashMap<String, String>,
    taken: HashSet<String>,
}

impl SpdxIds {
    fn assign(&mut self, component: &FlatComponent) -> String {
        if let Some(id) = self.by_ref.get(&component.bom_ref) {
            return id.clone();
        }
        let prefix = if component.application { "Project" } else { "Package" };
        let base = format!(
            "SPDXRef-{prefix}-{}-{}",
            util::sanitize_spdx_id(&component.name),
            util::sanitize_spdx_id(&component.version)
        );
        let mut id = base.clone();
        let mut n = 2;
        while !self.taken.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.by_ref.insert(component.bom_ref.clone(), id.clone());
        id
    }

    fn get(&self, bom_ref: &str) -> Option<&String> {
        self.by_ref.get(bom_ref)
    }
}

fn package<'a>(component: &'a FlatComponent, spdx_id: String) -> SpdxPackage<'a> {
    let external_refs = component
        .purl
        .as_deref()
        .map(|purl| {
            vec![SpdxExternalRef {
                reference_category: "PACKAGE-MANAGER",
                reference_type: "purl",
                reference_locator: purl,
            }]
        })
        .unwrap_or_default();

    SpdxPackage {
        spdx_id,
        name: &component.name,
        version_info: &component.version,
        download_location: "NOASSERTION",
        external_refs,
    }
}

/// 평탄화된 문서 모델에서 SPDX 2.3 JSON을 생성합니다.
pub(crate) fn render(bom: &FlatBom, document: &str) -> Result<BomDocument, EngineError> {
    let mut ids = SpdxIds::default();

    let root_id = ids.assign(&bom.root);
    let mut packages = vec![package(&bom.root, root_id.clone())];
    for component in &bom.components {
        let id = ids.assign(component);
        packages.push(package(component, id));
    }
    let component_count = bom.components.len();

    let mut relationships = vec![SpdxRelationship {
        spdx_element_id: DOCUMENT_ID.to_owned(),
        relationship_type: "DESCRIBES",
        related_spdx_element: root_id.clone(),
    }];
    for (parent, children) in &bom.dependencies {
        let Some(parent_id) = ids.get(parent) else {
            continue;
        };
        for child in children {
            if let Some(child_id) = ids.get(child) {
                relationships.push(SpdxRelationship {
                    spdx_element_id: parent_id.clone(),
                    relationship_type: "DEPENDS_ON",
                    related_spdx_element: child_id.clone(),
                });
            }
        }
    }

    let name = bom
        .summary
        .clone()
        .unwrap_or_else(|| format!("{}/{}", bom.root.name, bom.root.version));

    let doc = SpdxDocument {
        spdx_version: "SPDX-2.3",
        spdx_id: DOCUMENT_ID,
        name,
        data_license: "CC0-1.0",
        document_namespace: format!(
            "https://spdx.org/spdxdocs/{}-{}",
            util::TOOL_NAME,
            uuid::Uuid::new_v4()
        ),
        creation_info: SpdxCreationInfo {
            created: util::current_timestamp(),
            creators: vec![format!("Tool: {}-{}", util::TOOL_NAME, util::TOOL_VERSION)],
        },
        document_describes: vec![root_id],
        packages,
        relationships,
    };

    let content = serde_json::to_string_pretty(&doc).map_err(|e| EngineError::Serialization {
        document: document.to_owned(),
        reason: format!("SPDX serialization failed: {e}"),
    })?;

    Ok(BomDocument {
        format: BomFormat::Spdx,
        content,
        component_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(bom_ref: &str, name: &str, application: bool) -> FlatComponent {
        FlatComponent {
            bom_ref: bom_ref.to_owned(),
            name: name.to_owned(),
            version: "1.0".to_owned(),
            purl: (!application).then(|| bom_ref.to_owned()),
            application,
        }
    }

    fn sample(summary: Option<&str>) -> FlatBom {
        let root = component("project:shop@1.0", "shop", true);
        let a = component("pkg:npm/serde_json@1.0", "serde_json", false);
        let b = component("pkg:npm/serde-json@1.0", "serde-json", false);
        FlatBom {
            dependencies: vec![
                (root.bom_ref.clone(), vec![a.bom_ref.clone(), b.bom_ref.clone()]),
                (a.bom_ref.clone(), vec![b.bom_ref.clone()]),
                (b.bom_ref.clone(), Vec::new()),
            ],
            root,
            summary: summary.map(str::to_owned),
            components: vec![a, b],
        }
    }

    #[test]
    fn render_contains_required_fields() {
        let doc = render(&sample(None), "doc").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&doc.content).unwrap();

        assert_eq!(parsed["spdxVersion"], "SPDX-2.3");
        assert_eq!(parsed["SPDXID"], DOCUMENT_ID);
        assert_eq!(parsed["dataLicense"], "CC0-1.0");
        assert_eq!(parsed["name"], "shop/1.0");
        assert_eq!(doc.format, BomFormat::Spdx);
        assert_eq!(doc.component_count, 2);
    }

    #[test]
    fn colliding_sanitized_ids_are_made_unique() {
        let doc = render(&sample(None), "doc").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&doc.content).unwrap();

        let ids: Vec<&str> = parsed["packages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["SPDXID"].as_str().unwrap())
            .collect();
        let unique: HashSet<&&str> = ids.iter().collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(unique.len(), 3);
        assert!(ids.contains(&"SPDXRef-Package-serde-json-1.0-2"));
    }

    #[test]
    fn relationships_describe_root_and_dependencies() {
        let doc = render(&sample(None), "doc").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&doc.content).unwrap();

        let relationships = parsed["relationships"].as_array().unwrap();
        assert_eq!(relationships[0]["relationshipType"], "DESCRIBES");
        assert_eq!(relationships[0]["relatedSpdxElement"], "SPDXRef-Project-shop-1.0");
        let depends_on = relationships
            .iter()
            .filter(|r| r["relationshipType"] == "DEPENDS_ON")
            .count();
        assert_eq!(depends_on, 3);
    }

    #[test]
    fn summary_label_becomes_document_name() {
        let doc = render(&sample(Some("svc/7/npm bomdetect export")), "doc").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&doc.content).unwrap();
        assert_eq!(parsed["name"], "svc/7/npm bomdetect export");
    }

    #[test]
    fn purl_is_external_ref() {
        let doc = render(&sample(None), "doc").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&doc.content).unwrap();

        let first = &parsed["packages"][1];
        assert_eq!(first["externalRefs"][0]["referenceType"], "purl");
        assert_eq!(first["externalRefs"][0]["referenceLocator"], "pkg:npm/serde_json@1.0");
        assert!(parsed["packages"][0].get("externalRefs").is_none());
    }
}
