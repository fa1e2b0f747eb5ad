//! packages.lock.json 추출기
//!
//! [`NugetLockExtractor`]는 NuGet의 `packages.lock.json` 파일에서
//! 패키지와 의존성 참조를 추출합니다.
//!
//! # packages.lock.json 형식 예시
//!
//! ```json
//! {
//!   "version": 1,
//!   "dependencies": {
//!     "net6.0": {
//!       "AutoMapper": {
//!         "type": "Direct",
//!         "requested": "[13.0.1, )",
//!         "resolved": "13.0.1",
//!         "contentHash": "/Fx1SbJ16qS7dU4i604Sle...",
//!         "dependencies": { "Microsoft.Extensions.Options": "6.0.0" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! target framework 그룹과 그 안의 항목은 파일에 적힌 순서대로 처리합니다.
//! 같은 이름이 여러 그룹에 나오면 (이름, resolved) 쌍마다 패키지를 한 번만 생성하고
//! 처음 나온 항목의 메타데이터를 사용합니다. 의존성 참조는 모든 항목에서 모읍니다.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::extractor::{Extraction, Extractor};
use crate::location::Location;
use crate::package::{DependencyType, NugetLockEntry, Package, PackageMetadata};
use crate::relationship::RawReference;
use crate::types::PackageType;

/// packages.lock.json 추출기
pub struct NugetLockExtractor;

/// packages.lock.json 구조 (파싱용)
#[derive(Deserialize)]
struct PackagesLockFile {
    #[serde(default, rename = "version")]
    _version: Option<u32>,
    #[serde(default)]
    dependencies: IndexMap<String, IndexMap<String, LockEntry>>,
}

/// target framework 그룹 내 개별 항목 (파싱용)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockEntry {
    #[serde(default, rename = "type")]
    dependency_type: Option<String>,
    #[serde(default)]
    requested: Option<String>,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    content_hash: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
}

impl Extractor for NugetLockExtractor {
    fn name(&self) -> &'static str {
        "nuget-packages-lock"
    }

    fn package_type(&self) -> PackageType {
        PackageType::Nuget
    }

    fn file_names(&self) -> &'static [&'static str] {
        &["packages.lock.json"]
    }

    fn extract(&self, content: &str, location: &Location) -> Result<Extraction, CatalogError> {
        let lock_file: PackagesLockFile = serde_json::from_str(content)
            .map_err(|e| CatalogError::malformed(location.path(), e))?;

        let mut extraction = Extraction::new();

        for (framework, entries) in lock_file.dependencies {
            for (name, entry) in entries {
                let Some(version) = entry.resolved.filter(|v| !v.is_empty()) else {
                    debug!(
                        path = location.path(),
                        framework = framework.as_str(),
                        package = name.as_str(),
                        "skipping lock entry without resolved version"
                    );
                    continue;
                };

                let dependency_type = entry.dependency_type.as_deref().and_then(DependencyType::parse);
                let metadata = PackageMetadata::NugetLockEntry(NugetLockEntry {
                    name: name.clone(),
                    version: version.clone(),
                    content_hash: entry.content_hash,
                    dependency_type,
                    requested: entry.requested,
                });

                let package = Package::new(PackageType::Nuget, name, version, location.clone())
                    .with_metadata(metadata);
                let identity = package.identity();
                extraction.add_package(package);

                for (dep_name, constraint) in entry.dependencies {
                    extraction.add_reference(RawReference::new(identity.clone(), dep_name, constraint));
                }
            }
        }

        Ok(extraction)
    }
}
