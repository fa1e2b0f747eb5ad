//! package-lock.json 추출기
//!
//! [`NpmLockExtractor`]는 npm의 package-lock.json (v2/v3) 파일에서
//! 패키지와 의존성 참조를 추출합니다.
//!
//! # package-lock.json v3 형식 예시
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0" },
//!     "node_modules/express": {
//!       "version": "4.18.2",
//!       "integrity": "sha512-...",
//!       "dependencies": { "accepts": "~1.3.8" }
//!     }
//!   }
//! }
//! ```
//!
//! 루트 항목(`""`)은 패키지로 취급하지 않으며, 나머지 항목은 파일에 적힌 순서대로 처리합니다.
//! 중첩 설치(`node_modules/a/node_modules/b`)는 이름이 같아도 버전이 다를 수 있으므로
//! 리졸버가 버전 제약으로 후보를 고릅니다. 같은 이름과 버전의 중첩 사본은 패키지를 한 번만
//! 만들지만, 각 사본이 선언한 의존성 참조는 모두 유지합니다.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::extractor::{Extraction, Extractor};
use crate::location::Location;
use crate::package::{NpmLockEntry, Package, PackageMetadata};
use crate::relationship::RawReference;
use crate::types::PackageType;

/// package-lock.json 추출기
pub struct NpmLockExtractor;

/// package-lock.json 구조 (파싱용)
#[derive(Deserialize)]
struct NpmLockFile {
    #[serde(default, rename = "lockfileVersion")]
    _lockfile_version: Option<u32>,
    #[serde(default)]
    packages: IndexMap<String, NpmPackageEntry>,
}

/// package-lock.json 내 개별 패키지 (파싱용)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NpmPackageEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    integrity: Option<String>,
    #[serde(default)]
    link: bool,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    optional_dependencies: IndexMap<String, String>,
}

impl Extractor for NpmLockExtractor {
    fn name(&self) -> &'static str {
        "npm-package-lock"
    }

    fn package_type(&self) -> PackageType {
        PackageType::Npm
    }

    fn file_names(&self) -> &'static [&'static str] {
        &["package-lock.json"]
    }

    fn extract(&self, content: &str, location: &Location) -> Result<Extraction, CatalogError> {
        let lock_file: NpmLockFile = serde_json::from_str(content)
            .map_err(|e| CatalogError::malformed(location.path(), e))?;

        let mut extraction = Extraction::new();

        for (key, entry) in lock_file.packages {
            // 루트 패키지는 키가 빈 문자열
            if key.is_empty() || entry.link {
                continue;
            }

            let name = entry.name.unwrap_or_else(|| extract_package_name(&key));
            let Some(version) = entry.version else {
                debug!(path = location.path(), key = key.as_str(), "skipping entry without version");
                continue;
            };

            let metadata = PackageMetadata::NpmLockEntry(NpmLockEntry {
                resolved: entry.resolved,
                integrity: entry.integrity,
            });
            let package =
                Package::new(PackageType::Npm, name, version, location.clone()).with_metadata(metadata);
            let identity = package.identity();
            extraction.add_package(package);

            for (dep_name, constraint) in entry
                .dependencies
                .into_iter()
                .chain(entry.optional_dependencies)
            {
                extraction.add_reference(RawReference::new(identity.clone(), dep_name, constraint));
            }
        }

        Ok(extraction)
    }
}

/// "node_modules/@scope/name" 또는 "node_modules/name" 에서 패키지명 추출
fn extract_package_name(key: &str) -> String {
    // 마지막 "node_modules/" 이후의 부분을 패키지명으로 사용
    match key.rfind("node_modules/") {
        Some(pos) => key[pos + "node_modules/".len()..].to_owned(),
        None => key.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PACKAGE_LOCK: &str = r#"{
  "name": "my-app",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": {
      "name": "my-app",
      "version": "1.0.0",
      "dependencies": {
        "express": "^4.18.0"
      }
    },
    "node_modules/accepts": {
      "version": "1.3.8",
      "integrity": "sha512-accepts"
    },
    "node_modules/express": {
      "version": "4.18.2",
      "resolved": "https://registry.npmjs.org/express/-/express-4.18.2.tgz",
      "integrity": "sha512-abc",
      "dependencies": {
        "accepts": "~1.3.8"
      },
      "optionalDependencies": {
        "fsevents": "^2.3.0"
      }
    }
  }
}"#;

    #[test]
    fn extract_sample_package_lock() {
        let result = NpmLockExtractor
            .extract(SAMPLE_PACKAGE_LOCK, &Location::new("package-lock.json"))
            .unwrap();

        // 루트 항목 제외
        assert_eq!(result.packages.len(), 2);
        let express = result.packages.iter().find(|p| p.name() == "express").unwrap();
        assert_eq!(express.purl(), "pkg:npm/express@4.18.2");
        assert_eq!(express.checksum(), Some("sha512-abc"));

        let deps: Vec<&str> = result
            .references
            .iter()
            .map(|r| r.dependency_name.as_str())
            .collect();
        assert_eq!(deps, vec!["accepts", "fsevents"]);
        assert!(result.references.iter().all(|r| r.dependent == express.identity()));
    }

    #[test]
    fn extract_empty_packages() {
        let result = NpmLockExtractor
            .extract(r#"{ "packages": {} }"#, &Location::new("package-lock.json"))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn extract_invalid_json_is_malformed() {
        let result = NpmLockExtractor.extract("not json!", &Location::new("package-lock.json"));
        assert!(matches!(result, Err(CatalogError::MalformedManifest { .. })));
    }

    #[test]
    fn scoped_package_purl() {
        let json = r#"{ "packages": { "node_modules/@types/node": { "version": "20.11.5" } } }"#;
        let result = NpmLockExtractor.extract(json, &Location::new("p")).unwrap();
        assert_eq!(result.packages[0].name(), "@types/node");
        assert_eq!(result.packages[0].purl(), "pkg:npm/%40types/node@20.11.5");
    }

    #[test]
    fn link_entries_are_skipped() {
        let json = r#"{ "packages": {
            "node_modules/local": { "resolved": "packages/local", "link": true },
            "packages/local": { "version": "0.1.0" }
        } }"#;
        let result = NpmLockExtractor.extract(json, &Location::new("p")).unwrap();
        assert_eq!(result.packages.len(), 1);
        assert_eq!(result.packages[0].name(), "packages/local");
    }

    #[test]
    fn extract_package_name_simple() {
        assert_eq!(extract_package_name("node_modules/lodash"), "lodash");
    }

    #[test]
    fn extract_package_name_scoped() {
        assert_eq!(
            extract_package_name("node_modules/@types/node"),
            "@types/node"
        );
    }

    #[test]
    fn extract_package_name_nested() {
        assert_eq!(
            extract_package_name("node_modules/express/node_modules/debug"),
            "debug"
        );
    }

    #[test]
    fn nested_copy_with_same_version_keeps_its_dependencies() {
        let json = r#"{
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "app", "version": "1.0.0" },
    "node_modules/debug": { "version": "2.6.9" },
    "node_modules/send/node_modules/debug": {
      "version": "2.6.9",
      "dependencies": { "ms": "2.0.0" }
    },
    "node_modules/ms": { "version": "2.0.0" }
  }
}"#;
        let result = NpmLockExtractor
            .extract(json, &Location::new("package-lock.json"))
            .unwrap();
        assert_eq!(result.packages.len(), 2);
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].dependency_name, "ms");
    }

    #[test]
    fn packages_keep_document_order() {
        let json = r#"{
  "packages": {
    "node_modules/zod": { "version": "3.22.4" },
    "node_modules/axios": { "version": "1.6.0" }
  }
}"#;
        let result = NpmLockExtractor
            .extract(json, &Location::new("package-lock.json"))
            .unwrap();
        let names: Vec<&str> = result.packages.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["zod", "axios"]);
    }
}
