//! # lockgraph-catalog
//!
//! Catalog-assembly engine: turns independently extracted package manifests
//! into one deduplicated package catalog with a validated dependency graph.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`CatalogError`)
//! - [`config`]: Cataloger configuration (`CatalogConfig`, builder)
//! - [`types`]: Shared enums (`Ecosystem`, `PackageType`, `DocumentFormat`, `SbomDocument`)
//! - [`location`]: Evidence coordinates (`Location`, `LocationSet`)
//! - [`identity`]: Package identity key (`IdentityKey`)
//! - [`purl`]: Package URL builder
//! - [`package`]: Package model and per-ecosystem metadata, field-level merge
//! - [`relationship`]: Dependency edges (`Relationship`, `RawReference`)
//! - [`version`]: Lenient versions and version constraints
//! - [`extractor`]: Extractor contract, registry, NuGet/npm/Cargo lockfile extractors
//! - [`resolver`]: Scoped reference resolution within one extractor invocation
//! - [`assembler`]: Concurrent merge point (`CatalogAssembler`, `Submission`)
//! - [`validator`]: Post-assembly edge validation
//! - [`diagnostics`]: Non-fatal findings (`Diagnostic`, `Diagnostics`)
//! - [`catalog`]: The frozen catalog (`Catalog`)
//! - [`source`]: Directory-walking location provider
//! - [`cataloger`]: Orchestrator (`Cataloger`, `CatalogerBuilder`, worker pool, cancellation)
//! - [`sbom`]: Document encoders (`SbomGenerator`, CycloneDX, SPDX, JSON)
//!
//! # Architecture
//!
//! ```text
//! scan_dirs --> source::discover_manifests --> (content, location)*
//!                                                    |
//!                                  Extractor (concurrent, one per manifest)
//!                                                    |
//!                                  resolver::resolve (scoped to one invocation)
//!                                                    |
//!                                  CatalogAssembler::submit (mutex, merge by identity)
//!                                                    |
//!                                  finalize --> validator::validate --> Catalog
//!                                                                         |
//!                                                                   SbomGenerator
//! ```

pub mod assembler;
pub mod catalog;
pub mod cataloger;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod location;
pub mod package;
pub mod purl;
pub mod relationship;
pub mod resolver;
pub mod sbom;
pub mod source;
pub mod types;
pub mod validator;
pub mod version;

// --- Public API Re-exports ---

// Orchestrator
pub use cataloger::{CatalogOutcome, CatalogStats, Cataloger, CatalogerBuilder, Completeness};

// Configuration
pub use config::{CatalogConfig, CatalogConfigBuilder};

// Error
pub use error::CatalogError;

// Model
pub use catalog::Catalog;
pub use identity::IdentityKey;
pub use location::{Coordinates, Location, LocationSet, Provenance};
pub use package::{
    CargoLockEntry, DependencyType, FieldConflict, NpmLockEntry, NugetLockEntry, Package,
    PackageMetadata,
};
pub use relationship::{RawReference, Relationship, RelationshipType};
pub use types::{DocumentFormat, Ecosystem, PackageType, SbomDocument};

// Extractors
pub use extractor::{
    CargoLockExtractor, Extraction, Extractor, ExtractorRegistry, NpmLockExtractor,
    NugetLockExtractor,
};

// Assembly
pub use assembler::{CatalogAssembler, Submission};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use source::{Discovery, DiscoveryLimits, ManifestSource};

// SBOM Generator
pub use sbom::SbomGenerator;
