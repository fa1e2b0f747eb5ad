//! Package URL 빌더
//!
//! `pkg:<type>/<namespace>/<name>@<version>?<qualifiers>` 형식의 표준 식별자를 생성합니다.
//! 같은 입력에 대해 항상 같은 문자열을 반환하며, 하위 소비자가 실행 간 조인/비교 키로 사용합니다.
//!
//! # 인코딩 규칙
//!
//! - 비예약 문자(`A-Z a-z 0-9 . - _ ~`)는 그대로, 나머지는 `%XX` (대문자 16진수)
//! - npm 스코프(`@scope/name`)는 네임스페이스로 분리하여 `%40scope/name`으로 출력
//! - 한정자(qualifier)는 키 이름 순으로 정렬

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::types::PackageType;

/// 그대로 두는 비예약 문자를 제외한 모든 바이트
const PURL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// Package URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUrl {
    package_type: PackageType,
    namespace: Option<String>,
    name: String,
    version: String,
    qualifiers: BTreeMap<String, String>,
}

impl PackageUrl {
    /// 새 Package URL을 생성합니다.
    ///
    /// npm 스코프 이름은 자동으로 네임스페이스로 분리됩니다.
    pub fn new(package_type: PackageType, name: &str, version: &str) -> Self {
        let (namespace, name) = split_namespace(package_type, name);
        Self {
            package_type,
            namespace,
            name,
            version: version.to_owned(),
            qualifiers: BTreeMap::new(),
        }
    }

    /// 한정자를 추가합니다 (빈 값은 무시).
    pub fn with_qualifier(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.qualifiers
                .insert(key.to_ascii_lowercase(), value.to_owned());
        }
        self
    }
}

impl fmt::Display for PackageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg:{}/", self.package_type.purl_type())?;
        if let Some(ns) = &self.namespace {
            let segments: Vec<String> = ns.split('/').map(percent_encode).collect();
            write!(f, "{}/", segments.join("/"))?;
        }
        f.write_str(&percent_encode(&self.name))?;
        if !self.version.is_empty() {
            write!(f, "@{}", percent_encode(&self.version))?;
        }
        if !self.qualifiers.is_empty() {
            let pairs: Vec<String> = self
                .qualifiers
                .iter()
                .map(|(k, v)| format!("{k}={}", percent_encode(v)))
                .collect();
            write!(f, "?{}", pairs.join("&"))?;
        }
        Ok(())
    }
}

/// 한정자 없는 Package URL 문자열을 생성합니다.
pub fn build(package_type: PackageType, name: &str, version: &str) -> String {
    PackageUrl::new(package_type, name, version).to_string()
}

fn split_namespace(package_type: PackageType, name: &str) -> (Option<String>, String) {
    if package_type == PackageType::Npm
        && name.starts_with('@')
        && let Some((scope, rest)) = name.split_once('/')
    {
        return (Some(scope.to_owned()), rest.to_owned());
    }
    (None, name.to_owned())
}

fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, PURL_COMPONENT).to_string()
}
