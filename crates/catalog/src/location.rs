//! 위치(증거) 모델
//!
//! [`Location`]은 어떤 사실이 관찰된 파일 좌표(경로 + 선택적 줄 번호)와
//! 그 사실을 발견한 방식([`Provenance`])을 나타냅니다.
//! [`LocationSet`]은 좌표 기준으로 중복을 제거하면서 최초 삽입 순서를 보존합니다.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 파일 좌표
///
/// 동일성 판단은 좌표만으로 이루어집니다 (provenance는 무시).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    /// 소스 루트 기준 파일 경로
    pub path: String,
    /// 파일 내 줄 번호 (1부터 시작, 알 수 없으면 None)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path, line),
            None => write!(f, "{}", self.path),
        }
    }
}

/// 위치를 발견한 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// 패키지를 직접 선언한 매니페스트/lockfile
    Primary,
    /// 패키지 존재를 뒷받침하는 부수 파일
    Supporting,
}

/// 관찰 위치
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 파일 좌표
    #[serde(flatten)]
    pub coordinates: Coordinates,
    /// 발견 방식
    pub provenance: Provenance,
}

impl Location {
    /// 주 증거(primary) 위치를 생성합니다.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            coordinates: Coordinates {
                path: path.into(),
                line: None,
            },
            provenance: Provenance::Primary,
        }
    }

    /// 줄 번호를 지정합니다.
    pub fn with_line(mut self, line: u32) -> Self {
        self.coordinates.line = Some(line);
        self
    }

    /// 발견 방식을 지정합니다.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// 파일 경로를 반환합니다.
    pub fn path(&self) -> &str {
        &self.coordinates.path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinates)
    }
}

/// 삽입 순서를 보존하며 좌표 기준으로 중복을 제거하는 위치 집합
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Location>", into = "Vec<Location>")]
pub struct LocationSet {
    entries: Vec<Location>,
    seen: HashSet<Coordinates>,
}

impl LocationSet {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 위치를 추가합니다. 이미 같은 좌표가 있으면 `false`를 반환하고 무시합니다.
    pub fn insert(&mut self, location: Location) -> bool {
        if self.seen.contains(&location.coordinates) {
            return false;
        }
        self.seen.insert(location.coordinates.clone());
        self.entries.push(location);
        true
    }

    /// 다른 집합의 위치를 순서대로 합칩니다. 새로 추가된 위치 수를 반환합니다.
    pub fn union(&mut self, other: &LocationSet) -> usize {
        other
            .entries
            .iter()
            .filter(|loc| self.insert((*loc).clone()))
            .count()
    }

    /// 좌표가 집합에 있는지 확인합니다.
    pub fn contains(&self, coordinates: &Coordinates) -> bool {
        self.seen.contains(coordinates)
    }

    /// 삽입 순서대로 위치를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.entries.iter()
    }

    /// 첫 번째로 관찰된 위치를 반환합니다.
    pub fn first(&self) -> Option<&Location> {
        self.entries.first()
    }

    /// 위치 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 순서를 무시한 좌표 집합을 반환합니다.
    ///
    /// 동시 제출 환경에서는 순서가 보장되지 않으므로 비교는 이 값으로 합니다.
    pub fn coordinate_set(&self) -> HashSet<&Coordinates> {
        self.seen.iter().collect()
    }
}

impl PartialEq for LocationSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for LocationSet {}

impl From<Location> for LocationSet {
    fn from(location: Location) -> Self {
        let mut set = Self::new();
        set.insert(location);
        set
    }
}

impl From<Vec<Location>> for LocationSet {
    fn from(locations: Vec<Location>) -> Self {
        let mut set = Self::new();
        for location in locations {
            set.insert(location);
        }
        set
    }
}

impl From<LocationSet> for Vec<Location> {
    fn from(set: LocationSet) -> Self {
        set.entries
    }
}
