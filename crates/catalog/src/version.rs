//! 버전 및 버전 제약 파싱 -- 리졸버 후보 선택용
//!
//! `semver` 크레이트를 기반으로 하되, lockfile에 실제로 나타나는 형식을 관대하게 받아들입니다.
//!
//! # 지원하는 제약 문법
//!
//! - NuGet 구간 표기: `[1.0,2.0)`, `(,3.0]`, `[6.0.0]`
//! - 단순 버전: `6.0.0` (NuGet/Cargo, 최소 버전 포함, 정확히 일치하는 후보 우선)
//! - 정확 버전: `=1.2.3`
//! - SemVer 요구사항: `^1.2`, `~1.3.8`, `>=1, <2`
//!
//! 파싱할 수 없는 제약은 `None`을 반환하며, 리졸버는 입력 순서상 첫 후보를 선택합니다.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version, VersionReq};

/// 관대하게 파싱된 버전
///
/// `1.0` → `1.0.0`, NuGet 4자리 버전(`1.2.3.4`)은 네 번째 자리를 revision으로 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenientVersion {
    base: Version,
    revision: u64,
}

impl LenientVersion {
    /// SemVer 기본 부분 (major.minor.patch[-pre])
    pub fn base(&self) -> &Version {
        &self.base
    }
}

impl Ord for LenientVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.base, &other.base);
        (a.major, a.minor, a.patch)
            .cmp(&(b.major, b.minor, b.patch))
            .then(self.revision.cmp(&other.revision))
            .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // 정식 릴리스가 pre-release보다 큼
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.pre.cmp(&b.pre),
            })
    }
}

impl PartialOrd for LenientVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 버전 문자열을 관대하게 파싱합니다.
///
/// 앞의 `v`는 무시하고, 빌드 메타데이터(`+...`)는 비교에서 제외합니다.
pub fn parse_version(input: &str) -> Option<LenientVersion> {
    let s = input.trim();
    let s = s.strip_prefix('v').unwrap_or(s);
    let s = s.split_once('+').map_or(s, |(head, _)| head);
    let (numeric, pre) = match s.split_once('-') {
        Some((numeric, pre)) => (numeric, Some(pre)),
        None => (s, None),
    };

    let mut parts = [0u64; 4];
    let mut count = 0;
    for piece in numeric.split('.') {
        if count == parts.len() || piece.is_empty() {
            return None;
        }
        parts[count] = piece.parse().ok()?;
        count += 1;
    }

    let pre = match pre {
        Some(p) => Prerelease::new(p).ok()?,
        None => Prerelease::EMPTY,
    };

    Some(LenientVersion {
        base: Version {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            pre,
            build: BuildMetadata::EMPTY,
        },
        revision: parts[3],
    })
}

/// 구간 경계
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: LenientVersion,
    pub inclusive: bool,
}

/// 파싱된 버전 제약
#[derive(Debug, Clone, PartialEq)]
pub enum VersionConstraint {
    /// 정확히 이 버전 (`=1.2.3`, `[1.2.3]`)
    Exact(LenientVersion),
    /// 이 버전 이상 (단순 버전 표기)
    Minimum(LenientVersion),
    /// NuGet 구간 표기
    Interval {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    /// SemVer 요구사항
    Semver(VersionReq),
}

impl VersionConstraint {
    /// 제약 문자열을 파싱합니다. 알 수 없는 문법이면 `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        if s.starts_with('[') || s.starts_with('(') {
            return parse_interval(s);
        }
        if let Some(exact) = s.strip_prefix('=')
            && let Some(v) = parse_version(exact)
        {
            return Some(Self::Exact(v));
        }
        if let Some(v) = parse_version(s) {
            return Some(Self::Minimum(v));
        }
        VersionReq::parse(s).ok().map(Self::Semver)
    }

    /// 버전이 제약을 만족하는지 확인합니다. 버전 파싱에 실패하면 `false`.
    pub fn matches(&self, version: &str) -> bool {
        let Some(v) = parse_version(version) else {
            return false;
        };
        match self {
            Self::Exact(want) => v == *want,
            Self::Minimum(min) => v >= *min,
            Self::Interval { lower, upper } => {
                let above = lower.as_ref().is_none_or(|b| match v.cmp(&b.version) {
                    Ordering::Greater => true,
                    Ordering::Equal => b.inclusive,
                    Ordering::Less => false,
                });
                let below = upper.as_ref().is_none_or(|b| match v.cmp(&b.version) {
                    Ordering::Less => true,
                    Ordering::Equal => b.inclusive,
                    Ordering::Greater => false,
                });
                above && below
            }
            Self::Semver(req) => v.revision == 0 && req.matches(&v.base),
        }
    }

    /// 제약이 가리키는 특정 버전과 정확히 일치하는지 확인합니다.
    ///
    /// 여러 후보 중 하나를 고를 때 단순 버전 표기를 정확 일치로 우선 해석하기 위해 사용합니다.
    pub fn is_pinned_to(&self, version: &str) -> bool {
        let Some(v) = parse_version(version) else {
            return false;
        };
        match self {
            Self::Exact(want) | Self::Minimum(want) => v == *want,
            Self::Interval {
                lower: Some(lo),
                upper: Some(hi),
            } => lo.inclusive && hi.inclusive && lo.version == hi.version && v == lo.version,
            _ => false,
        }
    }
}

fn parse_interval(s: &str) -> Option<VersionConstraint> {
    let lower_inclusive = s.starts_with('[');
    let upper_inclusive = match s.chars().last()? {
        ']' => true,
        ')' => false,
        _ => return None,
    };
    let inner = s.get(1..s.len() - 1)?.trim();

    let Some((lo, hi)) = inner.split_once(',') else {
        // [1.0] 형식만 허용
        if !(lower_inclusive && upper_inclusive) {
            return None;
        }
        return parse_version(inner).map(VersionConstraint::Exact);
    };

    let bound = |text: &str, inclusive: bool| -> Option<Option<Bound>> {
        let text = text.trim();
        if text.is_empty() {
            return Some(None);
        }
        let version = parse_version(text)?;
        Some(Some(Bound { version, inclusive }))
    };

    let lower = bound(lo, lower_inclusive)?;
    let upper = bound(hi, upper_inclusive)?;
    if lower.is_none() && upper.is_none() {
        return None;
    }
    Some(VersionConstraint::Interval { lower, upper })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> LenientVersion {
        parse_version(s).unwrap()
    }

    #[test]
    fn parse_two_part_version() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("6"), v("6.0.0"));
    }

    #[test]
    fn parse_four_part_nuget_version() {
        assert!(v("1.2.3.4") > v("1.2.3"));
        assert!(v("1.2.3.4") < v("1.2.4"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_version("latest").is_none());
        assert!(parse_version("1..2").is_none());
        assert!(parse_version("1.2.3.4.5").is_none());
        assert!(parse_version("").is_none());
    }

    #[test]
    fn prerelease_orders_before_release() {
        assert!(v("1.0.3-alpha") < v("1.0.3"));
        assert!(v("1.0.3-alpha") < v("1.0.3-beta"));
    }

    #[test]
    fn build_metadata_is_ignored() {
        assert_eq!(v("1.0.0+abc"), v("1.0.0"));
        assert_eq!(v("v2.1.0"), v("2.1.0"));
    }

    #[test]
    fn bare_version_is_minimum() {
        let c = VersionConstraint::parse("6.0.0").unwrap();
        assert!(c.matches("6.0.0"));
        assert!(c.matches("7.0.0"));
        assert!(!c.matches("5.9.9"));
        assert!(c.is_pinned_to("6.0.0"));
        assert!(!c.is_pinned_to("7.0.0"));
    }

    #[test]
    fn exact_equals_constraint() {
        let c = VersionConstraint::parse("=1.2.3").unwrap();
        assert!(c.matches("1.2.3"));
        assert!(!c.matches("1.2.4"));
    }

    #[test]
    fn nuget_interval_half_open() {
        let c = VersionConstraint::parse("[1.0,2.0)").unwrap();
        assert!(c.matches("1.0"));
        assert!(c.matches("1.9.9"));
        assert!(!c.matches("2.0"));
        assert!(!c.matches("0.9"));
    }

    #[test]
    fn nuget_interval_open_lower() {
        let c = VersionConstraint::parse("(,3.0]").unwrap();
        assert!(c.matches("0.1"));
        assert!(c.matches("3.0.0"));
        assert!(!c.matches("3.0.1"));
    }

    #[test]
    fn nuget_interval_exclusive_lower() {
        let c = VersionConstraint::parse("(1.0, )").unwrap();
        assert!(!c.matches("1.0"));
        assert!(c.matches("1.0.1"));
    }

    #[test]
    fn nuget_interval_single_version() {
        let c = VersionConstraint::parse("[6.0.0]").unwrap();
        assert_eq!(c, VersionConstraint::Exact(v("6.0.0")));
        assert!(c.is_pinned_to("6.0.0"));
    }

    #[test]
    fn malformed_intervals_are_rejected() {
        assert!(VersionConstraint::parse("(6.0.0)").is_none());
        assert!(VersionConstraint::parse("[,]").is_none());
        assert!(VersionConstraint::parse("[1.0,2.0").is_none());
        assert!(VersionConstraint::parse("[x,2.0]").is_none());
    }

    #[test]
    fn semver_caret_and_tilde() {
        let caret = VersionConstraint::parse("^1.2").unwrap();
        assert!(caret.matches("1.9.0"));
        assert!(!caret.matches("2.0.0"));

        let tilde = VersionConstraint::parse("~1.3.8").unwrap();
        assert!(tilde.matches("1.3.9"));
        assert!(!tilde.matches("1.4.0"));
    }

    #[test]
    fn semver_compound_requirement() {
        let c = VersionConstraint::parse(">=1, <2").unwrap();
        assert!(c.matches("1.5.0"));
        assert!(!c.matches("2.0.0"));
    }

    #[test]
    fn unparseable_constraint_is_none() {
        assert!(VersionConstraint::parse("").is_none());
        assert!(VersionConstraint::parse("latest").is_none());
        assert!(VersionConstraint::parse("github:user/repo").is_none());
    }

    #[test]
    fn unparseable_version_never_matches() {
        let c = VersionConstraint::parse("^1").unwrap();
        assert!(!c.matches("not-a-version"));
    }
}
