//! 도메인 타입 -- 생태계, 패키지 타입, 출력 문서
//!
//! 패키지 식별 키의 구성 요소인 언어 생태계([`Ecosystem`])와
//! 패키지 타입([`PackageType`]), 그리고 인코더 출력 타입을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 언어 생태계 태그
///
/// 패키지가 속한 언어/런타임을 나타냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// .NET (NuGet)
    Dotnet,
    /// JavaScript/TypeScript (npm)
    JavaScript,
    /// Rust (Cargo)
    Rust,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dotnet => write!(f, "dotnet"),
            Self::JavaScript => write!(f, "javascript"),
            Self::Rust => write!(f, "rust"),
        }
    }
}

/// 패키지 타입 태그 (패키지 관리자)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// NuGet 패키지
    Nuget,
    /// npm 패키지
    Npm,
    /// Cargo 크레이트
    Cargo,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.purl_type())
    }
}

impl PackageType {
    /// Package URL 타입 문자열을 반환합니다.
    ///
    /// 예: Nuget -> "nuget", Npm -> "npm"
    pub fn purl_type(&self) -> &'static str {
        match self {
            Self::Nuget => "nuget",
            Self::Npm => "npm",
            Self::Cargo => "cargo",
        }
    }

    /// 패키지 타입이 속한 언어 생태계를 반환합니다.
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::Nuget => Ecosystem::Dotnet,
            Self::Npm => Ecosystem::JavaScript,
            Self::Cargo => Ecosystem::Rust,
        }
    }

    /// 문자열에서 패키지 타입을 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nuget" | "dotnet" | ".net" => Some(Self::Nuget),
            "npm" | "node" | "javascript" | "js" => Some(Self::Npm),
            "cargo" | "rust" | "crate" | "crates" => Some(Self::Cargo),
            _ => None,
        }
    }
}

/// 출력 문서 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// CycloneDX 1.5 JSON
    CycloneDx,
    /// SPDX 2.3 JSON
    Spdx,
    /// 카탈로그 원본 JSON
    Json,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycloneDx => write!(f, "cyclonedx"),
            Self::Spdx => write!(f, "spdx"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl DocumentFormat {
    /// 문자열에서 출력 형식을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cyclonedx" | "cdx" => Some(Self::CycloneDx),
            "spdx" => Some(Self::Spdx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 인코딩된 출력 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SbomDocument {
    /// 문서 형식
    pub format: DocumentFormat,
    /// JSON 문자열 내용
    pub content: String,
    /// 포함된 컴포넌트 수
    pub component_count: usize,
}

impl fmt::Display for SbomDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SbomDocument(format={}, components={})",
            self.format, self.component_count,
        )
    }
}
