//! SBOM 문서 생성 -- 동결된 카탈로그의 하위 소비자
//!
//! 인코더는 카탈로그를 읽기만 하며 절대 변경하지 않습니다.

pub mod cyclonedx;
pub mod spdx;
pub mod util;

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::types::{DocumentFormat, SbomDocument};

/// 출력 형식별 문서 생성기
#[derive(Debug, Clone)]
pub struct SbomGenerator {
    format: DocumentFormat,
    timestamp: Option<String>,
}

impl SbomGenerator {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            timestamp: None,
        }
    }

    /// 생성 시각을 고정합니다 (재현 가능한 출력용).
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// 카탈로그를 문서로 인코딩합니다.
    ///
    /// # Errors
    ///
    /// 직렬화 실패 시 [`CatalogError::Encode`].
    pub fn generate(&self, catalog: &Catalog) -> Result<SbomDocument, CatalogError> {
        let timestamp = self
            .timestamp
            .clone()
            .unwrap_or_else(util::current_timestamp);

        let document = match self.format {
            DocumentFormat::CycloneDx => cyclonedx::generate(catalog, &timestamp)?,
            DocumentFormat::Spdx => spdx::generate(catalog, &timestamp)?,
            DocumentFormat::Json => SbomDocument {
                format: DocumentFormat::Json,
                content: serde_json::to_string_pretty(catalog)
                    .map_err(|e| CatalogError::Encode(format!("catalog serialization failed: {e}")))?,
                component_count: catalog.package_count(),
            },
        };

        debug!(
            format = %document.format,
            components = document.component_count,
            bytes = document.content.len(),
            "document generated"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::package::Package;
    use crate::types::PackageType;

    fn catalog() -> Catalog {
        let pkg = Package::new(PackageType::Cargo, "serde", "1.0.0", Location::new("Cargo.lock"));
        Catalog {
            packages: [(pkg.identity(), pkg)].into_iter().collect(),
            relationships: vec![],
        }
    }

    #[test]
    fn generates_each_format() {
        for format in [DocumentFormat::CycloneDx, DocumentFormat::Spdx, DocumentFormat::Json] {
            let doc = SbomGenerator::new(format).generate(&catalog()).unwrap();
            assert_eq!(doc.format, format);
            assert_eq!(doc.component_count, 1);
            serde_json::from_str::<serde_json::Value>(&doc.content).unwrap();
        }
    }

    #[test]
    fn fixed_timestamp_is_used() {
        let doc = SbomGenerator::new(DocumentFormat::CycloneDx)
            .with_timestamp("2020-05-05T05:05:05Z")
            .generate(&catalog())
            .unwrap();
        assert!(doc.content.contains("2020-05-05T05:05:05Z"));
    }

    #[test]
    fn json_dump_round_trips_catalog() {
        let original = catalog();
        let doc = SbomGenerator::new(DocumentFormat::Json).generate(&original).unwrap();
        let restored: Catalog = serde_json::from_str(&doc.content).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn generation_does_not_mutate_catalog() {
        let original = catalog();
        let copy = original.clone();
        SbomGenerator::new(DocumentFormat::Spdx).generate(&original).unwrap();
        assert_eq!(original, copy);
    }
}
