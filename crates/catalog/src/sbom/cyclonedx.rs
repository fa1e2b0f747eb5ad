//! CycloneDX 1.5 JSON SBOM 생성
//!
//! [CycloneDX](https://cyclonedx.org/) 1.5 사양에 따른 JSON 문서를 생성합니다.
//! 컴포넌트의 `bom-ref`로 PURL을 사용하며, DependsOn 관계는 `dependencies` 섹션이 됩니다.

use std::collections::BTreeMap;

use serde::Serialize;

use super::util;
use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::identity::IdentityKey;
use crate::package::Package;
use crate::types::{DocumentFormat, PackageType, SbomDocument};

/// 관찰 위치 속성 이름
const LOCATION_PROPERTY: &str = "lockgraph:location";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom<'a> {
    bom_format: &'static str,
    spec_version: &'static str,
    serial_number: String,
    version: u32,
    metadata: CycloneDxMetadata,
    components: Vec<CycloneDxComponent<'a>>,
    dependencies: Vec<CycloneDxDependency<'a>>,
}

#[derive(Serialize)]
struct CycloneDxMetadata {
    timestamp: String,
    tools: Vec<CycloneDxTool>,
}

#[derive(Serialize)]
struct CycloneDxTool {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct CycloneDxComponent<'a> {
    #[serde(rename = "type")]
    component_type: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    version: &'a str,
    purl: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<CycloneDxHash>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<CycloneDxProperty>,
}

#[derive(Serialize)]
struct CycloneDxHash {
    alg: &'static str,
    content: String,
}

#[derive(Serialize)]
struct CycloneDxProperty {
    name: &'static str,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxDependency<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    depends_on: Vec<&'a str>,
}

/// 카탈로그에서 CycloneDX 1.5 JSON 문서를 생성합니다.
pub fn generate(catalog: &Catalog, timestamp: &str) -> Result<SbomDocument, CatalogError> {
    let components: Vec<CycloneDxComponent<'_>> = catalog.packages().map(component).collect();

    let mut edges: BTreeMap<&IdentityKey, Vec<&str>> = BTreeMap::new();
    for rel in catalog.relationships() {
        if let Some(target) = catalog.package(&rel.to) {
            edges.entry(&rel.from).or_default().push(target.purl());
        }
    }
    let dependencies = catalog
        .packages()
        .map(|pkg| CycloneDxDependency {
            reference: pkg.purl(),
            depends_on: edges.remove(&pkg.identity()).unwrap_or_default(),
        })
        .collect();

    let component_count = components.len();
    let bom = CycloneDxBom {
        bom_format: "CycloneDX",
        spec_version: "1.5",
        serial_number: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
        version: 1,
        metadata: CycloneDxMetadata {
            timestamp: timestamp.to_owned(),
            tools: vec![CycloneDxTool {
                name: "lockgraph",
                version: env!("CARGO_PKG_VERSION"),
            }],
        },
        components,
        dependencies,
    };

    let content = serde_json::to_string_pretty(&bom)
        .map_err(|e| CatalogError::Encode(format!("CycloneDX serialization failed: {e}")))?;

    Ok(SbomDocument {
        format: DocumentFormat::CycloneDx,
        content,
        component_count,
    })
}

fn component(pkg: &Package) -> CycloneDxComponent<'_> {
    // npm 스코프는 group으로 분리
    let (group, name) = match pkg.package_type() {
        PackageType::Npm => match pkg.name().split_once('/') {
            Some((scope, rest)) if scope.starts_with('@') => (Some(scope), rest),
            _ => (None, pkg.name()),
        },
        _ => (None, pkg.name()),
    };

    let hashes = util::package_digest(pkg)
        .map(|d| {
            vec![CycloneDxHash {
                alg: d.algorithm.cyclonedx_name(),
                content: d.value,
            }]
        })
        .unwrap_or_default();

    let properties = pkg
        .locations
        .iter()
        .map(|loc| CycloneDxProperty {
            name: LOCATION_PROPERTY,
            value: loc.to_string(),
        })
        .collect();

    CycloneDxComponent {
        component_type: "library",
        bom_ref: pkg.purl(),
        group,
        name,
        version: pkg.version(),
        purl: pkg.purl(),
        hashes,
        properties,
    }
}
