//! Cargo.lock 추출기
//!
//! `[[package]]` 항목마다 패키지를 하나 만들고, `dependencies` 문자열을 참조로 변환합니다.
//!
//! 의존성 문자열 형식:
//! - `"name"` -- lockfile에 해당 이름이 하나뿐일 때 (제약 `*`)
//! - `"name version"` -- 같은 이름이 여러 버전일 때 (제약 `=version`)
//! - `"name version (source)"` -- 같은 이름/버전이 여러 소스에 있을 때

use serde::Deserialize;

use crate::error::CatalogError;
use crate::extractor::{Extraction, Extractor};
use crate::location::Location;
use crate::package::{CargoLockEntry, Package, PackageMetadata};
use crate::relationship::RawReference;
use crate::types::PackageType;

pub struct CargoLockExtractor;

#[derive(Deserialize)]
struct CargoLockFile {
    #[serde(default, rename = "package")]
    packages: Vec<CargoLockPackage>,
}

#[derive(Deserialize)]
struct CargoLockPackage {
    name: String,
    version: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl Extractor for CargoLockExtractor {
    fn name(&self) -> &'static str {
        "cargo-lock"
    }

    fn package_type(&self) -> PackageType {
        PackageType::Cargo
    }

    fn file_names(&self) -> &'static [&'static str] {
        &["Cargo.lock"]
    }

    fn extract(&self, content: &str, location: &Location) -> Result<Extraction, CatalogError> {
        let lock_file: CargoLockFile =
            toml::from_str(content).map_err(|e| CatalogError::malformed(location.path(), e))?;

        let mut extraction = Extraction::new();

        for entry in lock_file.packages {
            let metadata = PackageMetadata::CargoLockEntry(CargoLockEntry {
                source: entry.source,
                checksum: entry.checksum,
            });
            let package = Package::new(PackageType::Cargo, entry.name, entry.version, location.clone())
                .with_metadata(metadata);
            let identity = package.identity();
            extraction.add_package(package);

            for dep in &entry.dependencies {
                let (name, constraint) = parse_dependency(dep);
                extraction.add_reference(RawReference::new(identity.clone(), name, constraint));
            }
        }

        Ok(extraction)
    }
}

/// 의존성 문자열을 (이름, 버전 제약)으로 나눕니다.
fn parse_dependency(dep: &str) -> (&str, String) {
    let mut parts = dep.split_whitespace();
    let name = parts.next().unwrap_or(dep);
    match parts.next() {
        Some(version) => (name, format!("={version}")),
        None => (name, "*".to_owned()),
    }
}
