//! SBOM 생성 유틸리티 -- 해시 정규화와 타임스탬프

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::package::Package;
use crate::types::PackageType;

/// 다이제스트 알고리즘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// 다이제스트 바이트 길이로 알고리즘을 추정합니다.
    fn from_len(len: usize) -> Option<Self> {
        match len {
            20 => Some(Self::Sha1),
            32 => Some(Self::Sha256),
            48 => Some(Self::Sha384),
            64 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// SRI 접두사 (`sha512` 등)
    fn from_sri(prefix: &str) -> Option<Self> {
        match prefix {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// CycloneDX 표기 (`SHA-512`)
    pub fn cyclonedx_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// SPDX 표기 (`SHA512`)
    pub fn spdx_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }
}

/// hex로 정규화된 다이제스트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub algorithm: HashAlgorithm,
    /// 소문자 hex
    pub value: String,
}

/// 패키지 메타데이터의 체크섬을 hex 다이제스트로 정규화합니다.
///
/// - NuGet `contentHash`: base64 (보통 SHA-512)
/// - npm `integrity`: SRI (`sha512-<base64>`), 공백으로 여러 개가 오면 첫 번째만 사용
/// - Cargo `checksum`: hex SHA-256
///
/// 형식을 알 수 없으면 `None`을 반환하며, 문서에서 해시가 생략됩니다.
pub fn package_digest(package: &Package) -> Option<Digest> {
    let raw = package.checksum()?.trim();
    match package.package_type() {
        PackageType::Nuget => digest_from_base64(raw, None),
        PackageType::Npm => {
            let first = raw.split_whitespace().next()?;
            let (prefix, encoded) = first.split_once('-')?;
            digest_from_base64(encoded, Some(HashAlgorithm::from_sri(prefix)?))
        }
        PackageType::Cargo => {
            let bytes = hex::decode(raw).ok()?;
            Some(Digest {
                algorithm: HashAlgorithm::from_len(bytes.len())?,
                value: raw.to_lowercase(),
            })
        }
    }
}

fn digest_from_base64(encoded: &str, declared: Option<HashAlgorithm>) -> Option<Digest> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let detected = HashAlgorithm::from_len(bytes.len())?;
    if let Some(declared) = declared
        && declared != detected
    {
        return None;
    }
    Some(Digest {
        algorithm: detected,
        value: hex::encode(bytes),
    })
}

/// 현재 시각을 RFC3339 (`YYYY-MM-DDTHH:MM:SSZ`) 형식으로 반환합니다.
///
/// 시스템 시간을 읽을 수 없으면 epoch을 반환합니다.
pub fn current_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_rfc3339(secs)
}

/// Unix 초를 RFC3339 UTC 문자열로 변환합니다.
pub fn format_rfc3339(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// epoch 이후 일수를 (년, 월, 일)로 변환 (proleptic Gregorian)
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
