//! CycloneDX 1.5 JSON BOM 생성
//!
//! [CycloneDX](https://cyclonedx.org/) 1.5 사양에 따른 JSON 문서를 생성합니다.
//! 루트 프로젝트는 `metadata.component`에 들어가고, 의존 관계는 `dependencies`에
//! 루트부터 기록됩니다.

use serde::Serialize;

use super::{FlatBom, FlatComponent, SUMMARY_PROPERTY, util};
use crate::error::EngineError;
use crate::types::{BomDocument, BomFormat};

/// CycloneDX 1.5 BOM 루트 구조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom<'a> {
    bom_format: &'static str,
    spec_version: &'static str,
    serial_number: String,
    version: u32,
    metadata: CycloneDxMetadata<'a>,
    components: Vec<CycloneDxComponent<'a>>,
    dependencies: Vec<CycloneDxDependency<'a>>,
}

/// CycloneDX 메타데이터
#[derive(Serialize)]
struct CycloneDxMetadata<'a> {
    timestamp: String,
    tools: Vec<CycloneDxTool>,
    component: CycloneDxComponent<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<CycloneDxProperty<'a>>,
}

/// CycloneDX 도구 정보
#[derive(Serialize)]
struct CycloneDxTool {
    name: &'static str,
    version: &'static str,
}

/// CycloneDX 컴포넌트
#[derive(Serialize)]
struct CycloneDxComponent<'a> {
    #[serde(rename = "type")]
    component_type: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: &'a str,
    name: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
}

/// CycloneDX 속성
#[derive(Serialize)]
struct CycloneDxProperty<'a> {
    name: &'static str,
    value: &'a str,
}

/// CycloneDX 의존 관계
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxDependency<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    depends_on: Vec<&'a str>,
}

impl<'a> From<&'a FlatComponent> for CycloneDxComponent<'a> {
    fn from(c: &'a FlatComponent) -> Self {
        Self {
            component_type: if c.application { "application" } else { "library" },
            bom_ref: &c.bom_ref,
            name: &c.name,
            version: &c.version,
            purl: c.purl.as_deref(),
        }
    }
}

/// 평탄화된 문서 모델에서 CycloneDX 1.5 JSON을 생성합니다.
pub(crate) fn render(bom: &FlatBom, document: &str) -> Result<BomDocument, EngineError> {
    let components: Vec<CycloneDxComponent<'_>> = bom.components.iter().map(Into::into).collect();
    let component_count = components.len();

    let properties = bom
        .summary
        .as_deref()
        .map(|label| {
            vec![CycloneDxProperty {
                name: SUMMARY_PROPERTY,
                value: label,
            }]
        })
        .unwrap_or_default();

    let dependencies = bom
        .dependencies
        .iter()
        .map(|(reference, depends_on)| CycloneDxDependency {
            reference,
            depends_on: depends_on.iter().map(String::as_str).collect(),
        })
        .collect();

    let doc = CycloneDxBom {
        bom_format: "CycloneDX",
        spec_version: "1.5",
        serial_number: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
        version: 1,
        metadata: CycloneDxMetadata {
            timestamp: util::current_timestamp(),
            tools: vec![CycloneDxTool {
                name: util::TOOL_NAME,
                version: util::TOOL_VERSION,
            }],
            component: (&bom.root).into(),
            properties,
        },
        components,
        dependencies,
    };

    let content = serde_json::to_string_pretty(&doc).map_err(|e| EngineError::Serialization {
        document: document.to_owned(),
        reason: format!("CycloneDX serialization failed: {e}"),
    })?;

    Ok(BomDocument {
        format: BomFormat::CycloneDx,
        content,
        component_count,
    })
}
