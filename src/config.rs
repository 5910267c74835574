use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::notify::email::EmailSettings;
use crate::notify::stats::StatsSettings;
use crate::wizard::DEFAULT_MIN_NEW_THICKNESS_MM;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// auto / pl / en
    pub language: String,
    pub language_pack_dir: Option<String>,
    /// 신규 단열 두께 하한. 배포 변형에 따라 40 또는 50을 쓴다.
    pub min_new_thickness_mm: u32,
    /// 지정하면 내장 테이블 대신 이 파일의 카탈로그를 사용한다.
    pub catalog_path: Option<PathBuf>,
    pub email: EmailSettings,
    pub stats: StatsSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            min_new_thickness_mm: DEFAULT_MIN_NEW_THICKNESS_MM,
            catalog_path: None,
            email: EmailSettings::default(),
            stats: StatsSettings::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        log::debug!("설정 로드: {}", path.display());
        Ok(cfg)
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        log::info!("기본 설정 생성: {}", path.display());
        Ok(cfg)
    }
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}
