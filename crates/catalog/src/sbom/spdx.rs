//! SPDX 2.3 JSON SBOM 생성
//!
//! [SPDX](https://spdx.dev/) 2.3 사양에 따른 JSON 문서를 생성합니다.
//! 다른 패키지가 의존하지 않는 패키지는 문서가 `DESCRIBES` 하고,
//! DependsOn 관계는 `DEPENDS_ON`으로 출력됩니다.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::util;
use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::identity::IdentityKey;
use crate::package::Package;
use crate::types::{DocumentFormat, SbomDocument};

const DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";
const NAMESPACE_BASE: &str = "https://lockgraph.dev/spdx";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument<'a> {
    spdx_version: &'static str,
    #[serde(rename = "SPDXID")]
    spdx_id: &'static str,
    name: &'static str,
    data_license: &'static str,
    document_namespace: String,
    creation_info: SpdxCreationInfo,
    packages: Vec<SpdxPackage<'a>>,
    relationships: Vec<SpdxRelationship>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxCreationInfo {
    created: String,
    creators: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage<'a> {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: &'a str,
    version_info: &'a str,
    download_location: &'static str,
    files_analyzed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_info: Option<String>,
    external_refs: Vec<SpdxExternalRef<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<SpdxChecksum>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef<'a> {
    reference_category: &'static str,
    reference_type: &'static str,
    reference_locator: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxChecksum {
    algorithm: &'static str,
    checksum_value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: String,
    relationship_type: &'static str,
    related_spdx_element: String,
}

/// 카탈로그에서 SPDX 2.3 JSON 문서를 생성합니다.
pub fn generate(catalog: &Catalog, timestamp: &str) -> Result<SbomDocument, CatalogError> {
    let ids = assign_ids(catalog);
    let spdx_id = |key: &IdentityKey| ids.get(key).cloned();

    let packages: Vec<SpdxPackage<'_>> = catalog
        .packages()
        .map(|pkg| package(pkg, ids.get(&pkg.identity()).cloned().unwrap_or_default()))
        .collect();

    let mut relationships = Vec::new();
    let dependents: HashSet<&IdentityKey> = catalog.relationships().iter().map(|r| &r.to).collect();
    let mut roots: Vec<String> = catalog
        .packages()
        .map(|p| p.identity())
        .filter(|k| !dependents.contains(k))
        .filter_map(|k| spdx_id(&k))
        .collect();
    // 순환만 있는 그래프는 전체를 기술
    if roots.is_empty() {
        roots = packages.iter().map(|p| p.spdx_id.clone()).collect();
    }
    for root in roots {
        relationships.push(SpdxRelationship {
            spdx_element_id: DOCUMENT_ID.to_owned(),
            relationship_type: "DESCRIBES",
            related_spdx_element: root,
        });
    }
    for rel in catalog.relationships() {
        if let Some(from) = spdx_id(&rel.from)
            && let Some(to) = spdx_id(&rel.to)
        {
            relationships.push(SpdxRelationship {
                spdx_element_id: from,
                relationship_type: "DEPENDS_ON",
                related_spdx_element: to,
            });
        }
    }

    let component_count = packages.len();
    let doc = SpdxDocument {
        spdx_version: "SPDX-2.3",
        spdx_id: DOCUMENT_ID,
        name: "lockgraph-catalog",
        data_license: "CC0-1.0",
        document_namespace: format!("{NAMESPACE_BASE}/{}", uuid::Uuid::new_v4()),
        creation_info: SpdxCreationInfo {
            created: timestamp.to_owned(),
            creators: vec![format!("Tool: lockgraph-{}", env!("CARGO_PKG_VERSION"))],
        },
        packages,
        relationships,
    };

    let content = serde_json::to_string_pretty(&doc)
        .map_err(|e| CatalogError::Encode(format!("SPDX serialization failed: {e}")))?;

    Ok(SbomDocument {
        format: DocumentFormat::Spdx,
        content,
        component_count,
    })
}

fn package(pkg: &Package, spdx_id: String) -> SpdxPackage<'_> {
    let checksums = util::package_digest(pkg)
        .map(|d| {
            vec![SpdxChecksum {
                algorithm: d.algorithm.spdx_name(),
                checksum_value: d.value,
            }]
        })
        .unwrap_or_default();

    let source_info = (!pkg.locations.is_empty()).then(|| {
        let paths: Vec<String> = pkg.locations.iter().map(ToString::to_string).collect();
        format!("acquired package info from: {}", paths.join(", "))
    });

    SpdxPackage {
        spdx_id,
        name: pkg.name(),
        version_info: pkg.version(),
        download_location: "NOASSERTION",
        files_analyzed: false,
        source_info,
        external_refs: vec![SpdxExternalRef {
            reference_category: "PACKAGE-MANAGER",
            reference_type: "purl",
            reference_locator: pkg.purl(),
        }],
        checksums,
    }
}

/// 식별 키마다 결정적 SPDX ID를 부여합니다.
///
/// 허용 문자(`A-Za-z0-9.-`) 외에는 `-`로 바꾸며, 정리 후 겹치면 `-2`, `-3` 접미사를 붙입니다.
fn assign_ids(catalog: &Catalog) -> HashMap<IdentityKey, String> {
    let mut used: HashMap<String, usize> = HashMap::new();
    let mut ids = HashMap::with_capacity(catalog.package_count());

    for pkg in catalog.packages() {
        let base = format!(
            "SPDXRef-Package-{}-{}-{}",
            pkg.package_type().purl_type(),
            sanitize(pkg.name()),
            sanitize(pkg.version())
        );
        let n = used.entry(base.clone()).or_insert(0);
        *n += 1;
        let id = if *n == 1 { base } else { format!("{base}-{n}") };
        ids.insert(pkg.identity(), id);
    }
    ids
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect()
}
