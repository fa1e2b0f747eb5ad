#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use lockgraph_catalog::{
    CatalogAssembler, DocumentFormat, Location, Package, PackageType, Relationship,
    SbomGenerator, Submission, validator,
};

/// 퍼저용 구조적 제출 입력
#[derive(Arbitrary, Debug)]
struct FuzzRun {
    submissions: Vec<FuzzSubmission>,
}

#[derive(Arbitrary, Debug)]
struct FuzzSubmission {
    packages: Vec<FuzzPackage>,
    /// (from, to) 인덱스, 범위 밖이면 카탈로그에 없는 끝점
    edges: Vec<(u8, u8)>,
}

#[derive(Arbitrary, Debug)]
struct FuzzPackage {
    kind: FuzzType,
    name: String,
    version: String,
}

#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzType {
    Nuget,
    Npm,
    Cargo,
}

impl From<FuzzType> for PackageType {
    fn from(t: FuzzType) -> Self {
        match t {
            FuzzType::Nuget => PackageType::Nuget,
            FuzzType::Npm => PackageType::Npm,
            FuzzType::Cargo => PackageType::Cargo,
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn to_submission(index: usize, input: &FuzzSubmission) -> Submission {
    let location = Location::new(format!("fuzz/{index}/packages.lock.json"));
    let packages: Vec<Package> = input
        .packages
        .iter()
        .take(32)
        .map(|p| {
            Package::new(
                p.kind.into(),
                truncate(&p.name, 64),
                truncate(&p.version, 32),
                location.clone(),
            )
        })
        .collect();

    let ghost = Package::new(PackageType::Npm, "ghost", "0.0.0", location.clone()).identity();
    let key = |i: u8| {
        packages
            .get(i as usize)
            .map(Package::identity)
            .unwrap_or_else(|| ghost.clone())
    };
    let relationships = input
        .edges
        .iter()
        .take(64)
        .map(|&(from, to)| Relationship::depends_on(key(from), key(to)))
        .collect();

    Submission::new(packages, relationships)
}

fuzz_target!(|run: FuzzRun| {
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(_) => return,
    };

    let catalog = runtime.block_on(async {
        let assembler = CatalogAssembler::new();
        for (i, s) in run.submissions.iter().take(16).enumerate() {
            assembler
                .submit(to_submission(i, s))
                .await
                .expect("submit before finalize must succeed");
        }
        let (catalog, mut diagnostics) = assembler
            .finalize()
            .await
            .expect("first finalize must succeed");
        validator::validate(catalog, &mut diagnostics)
    });

    assert!(validator::is_consistent(&catalog));

    for format in [DocumentFormat::CycloneDx, DocumentFormat::Spdx] {
        if let Ok(doc) = SbomGenerator::new(format)
            .with_timestamp("2024-01-01T00:00:00Z")
            .generate(&catalog)
        {
            let _: serde_json::Value =
                serde_json::from_str(&doc.content).expect("SBOM output must be valid JSON");
        }
    }
});
