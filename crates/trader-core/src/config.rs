//! 설정 관리.
//!
//! 계층형 설정 로딩(기본값 → TOML 파일 → 환경 변수)과
//! 크레이트 공통 설정 섹션을 정의합니다.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 환경 변수 오버라이드 접두사 (예: `TRADER__RISK__MAX_POSITION_SIZE=15`).
pub const ENV_PREFIX: &str = "TRADER";

/// 중첩 키 구분자.
pub const ENV_SEPARATOR: &str = "__";

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 파일과 환경 변수에서 설정을 로드합니다.
///
/// 파일이 없으면 건너뛰고, 누락된 필드는 대상 타입의 serde 기본값을 사용합니다.
pub fn load_layered<T, P>(path: P) -> Result<T, config::ConfigError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
pub fn load_from_toml_str<T: DeserializeOwned>(toml: &str) -> Result<T, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize()
}
