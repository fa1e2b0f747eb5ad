//! 매니페스트 위치 제공자 -- 디렉토리 탐색
//!
//! 카탈로그 엔진은 `(내용, 위치)` 쌍만 받으며 파일 시스템에 직접 접근하지 않습니다.
//! 이 모듈은 로컬 디렉토리를 `walkdir`로 탐색하여 그 쌍을 만들어 주는 기본 제공자입니다.
//!
//! 모든 함수는 동기 I/O를 사용하므로 async 문맥에서는 `spawn_blocking` 안에서 호출해야 합니다.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::CatalogConfig;
use crate::extractor::ExtractorRegistry;
use crate::location::Location;

/// 내용과 위치가 있는 매니페스트 하나
#[derive(Debug, Clone)]
pub struct ManifestSource {
    pub location: Location,
    pub content: String,
}

impl ManifestSource {
    pub fn new(location: Location, content: impl Into<String>) -> Self {
        Self {
            location,
            content: content.into(),
        }
    }
}

/// 탐색 제한
#[derive(Debug, Clone)]
pub struct DiscoveryLimits {
    /// 최대 파일 크기 (바이트)
    pub max_file_size: usize,
    /// 최대 탐색 깊이
    pub max_depth: usize,
    /// 건너뛸 디렉토리 이름
    pub exclude_dirs: HashSet<String>,
}

impl DiscoveryLimits {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_depth: config.max_depth,
            exclude_dirs: config.exclude_dirs.iter().cloned().collect(),
        }
    }
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

/// 읽지 못한 후보 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// 탐색 결과
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// 읽기에 성공한 매니페스트 (경로 순)
    pub sources: Vec<ManifestSource>,
    /// 이름이 일치한 후보 파일 수 (읽기 실패 포함)
    pub candidates: usize,
    /// 크기 초과나 I/O 오류로 건너뛴 후보
    pub skipped: Vec<SkippedFile>,
}

impl Discovery {
    /// 후보는 있었지만 하나도 읽지 못했는지
    pub fn is_exhausted(&self) -> bool {
        self.candidates > 0 && self.sources.is_empty()
    }

    pub fn merge(&mut self, other: Discovery) {
        self.sources.extend(other.sources);
        self.candidates += other.candidates;
        self.skipped.extend(other.skipped);
    }
}

/// 디렉토리(또는 단일 파일)에서 레지스트리가 아는 매니페스트를 찾아 읽습니다.
///
/// 존재하지 않는 경로는 경고만 남기고 빈 결과를 반환합니다.
/// 심볼릭 링크는 따라가지 않습니다.
pub fn discover_manifests(
    root: &Path,
    registry: &ExtractorRegistry,
    limits: &DiscoveryLimits,
) -> Discovery {
    let mut discovery = Discovery::default();

    if !root.exists() {
        warn!(dir = %root.display(), "scan path does not exist");
        return discovery;
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(limits.max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !limits
                    .exclude_dirs
                    .contains(entry.file_name().to_string_lossy().as_ref())
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !registry.is_manifest(entry.path()) {
            continue;
        }

        discovery.candidates += 1;
        let path = entry.path().display().to_string();
        match read_candidate(entry.path(), limits.max_file_size) {
            Ok(content) => {
                debug!(path = %path, bytes = content.len(), "manifest discovered");
                discovery
                    .sources
                    .push(ManifestSource::new(Location::new(path), content));
            }
            Err(reason) => {
                warn!(path = %path, reason = %reason, "skipping manifest");
                discovery.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    discovery
}

fn read_candidate(path: &Path, max_file_size: usize) -> Result<String, String> {
    let metadata = std::fs::metadata(path).map_err(|e| format!("failed to read metadata: {e}"))?;
    let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if file_size > max_file_size {
        return Err(format!(
            "file too large: {file_size} bytes (max: {max_file_size})"
        ));
    }
    std::fs::read_to_string(path).map_err(|e| format!("failed to read file: {e}"))
}
