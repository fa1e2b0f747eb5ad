#![no_main]

use libfuzzer_sys::fuzz_target;
use lockgraph_catalog::{Extractor, Location, CargoLockExtractor, resolver};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let location = Location::new("fuzz/Cargo.lock");
        if let Ok(extraction) = CargoLockExtractor.extract(content, &location) {
            // 해석된 엣지는 항상 같은 호출의 패키지를 가리켜야 한다
            let resolved = resolver::resolve(extraction, &location);
            for rel in &resolved.relationships {
                assert!(resolved.packages.iter().any(|p| p.identity() == rel.from));
                assert!(resolved.packages.iter().any(|p| p.identity() == rel.to));
            }
        }
    }
});
