//! 단열재 두께별 튜브/기본 나사 길이 테이블과 나사 카탈로그를 제공한다.
//! 값은 제품 카탈로그 기준의 참고치이며, 실제 시공 전 고정 설계로 검증해야 한다.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommendation::RoofType;

/// 단열 테이블의 한 행.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsulationRow {
    /// 이 행이 커버하는 신규 단열재 두께 상한 [mm]
    pub insulation_mm: u32,
    /// 기존 층이 없을 때 필요한 나사 길이 [mm]
    pub screw_mm: u32,
    /// 튜브 길이 [mm]. 제품명에 그대로 쓰인다.
    pub tube_mm: u32,
}

impl InsulationRow {
    pub const fn new(insulation_mm: u32, screw_mm: u32, tube_mm: u32) -> Self {
        Self {
            insulation_mm,
            screw_mm,
            tube_mm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrewEntry {
    pub length_mm: u32,
    pub code: String,
}

/// 기판별 테이블 묶음. 모든 시퀀스는 키 기준 오름차순이어야 한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub tube_prefix: String,
    pub concrete_table: Vec<InsulationRow>,
    pub metal_table: Vec<InsulationRow>,
    pub concrete_screws: Vec<ScrewEntry>,
    pub metal_screws: Vec<ScrewEntry>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("카탈로그 파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("카탈로그 파싱 오류: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} 테이블이 비어 있습니다")]
    Empty(&'static str),
    #[error("{table} 테이블이 오름차순이 아닙니다 ({prev} mm 다음 {next} mm)")]
    NotAscending {
        table: &'static str,
        prev: u32,
        next: u32,
    },
    #[error("{table} 카탈로그에 코드가 없는 항목이 있습니다 ({length_mm} mm)")]
    MissingCode { table: &'static str, length_mm: u32 },
    #[error("튜브 접두어가 비어 있습니다")]
    MissingTubePrefix,
}

impl Catalog {
    /// 빌드에 포함된 기본 카탈로그.
    pub fn builtin() -> Self {
        Self {
            tube_prefix: TUBE_PREFIX.to_string(),
            concrete_table: CONCRETE_TABLE.to_vec(),
            metal_table: METAL_TABLE.to_vec(),
            concrete_screws: owned(WDB_63),
            metal_screws: owned(WDS_48),
        }
    }

    /// TOML 문자열에서 카탈로그를 읽고 검증한다.
    pub fn from_toml_str(src: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(src)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        log::info!(
            "카탈로그 로드: {} (콘크리트 {}행, 금속 {}행)",
            path.display(),
            catalog.concrete_table.len(),
            catalog.metal_table.len()
        );
        Ok(catalog)
    }

    /// 선형 탐색이 최소 적합 항목을 찾으려면 오름차순이 보장되어야 한다.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.tube_prefix.trim().is_empty() {
            return Err(CatalogError::MissingTubePrefix);
        }
        check_rows("concrete", &self.concrete_table)?;
        check_rows("metal", &self.metal_table)?;
        check_screws("concrete", &self.concrete_screws)?;
        check_screws("metal", &self.metal_screws)?;
        Ok(())
    }

    pub fn insulation_table(&self, roof: RoofType) -> &[InsulationRow] {
        match roof {
            RoofType::Concrete => &self.concrete_table,
            RoofType::Metal => &self.metal_table,
        }
    }

    pub fn screws(&self, roof: RoofType) -> &[ScrewEntry] {
        match roof {
            RoofType::Concrete => &self.concrete_screws,
            RoofType::Metal => &self.metal_screws,
        }
    }
}

fn check_rows(table: &'static str, rows: &[InsulationRow]) -> Result<(), CatalogError> {
    if rows.is_empty() {
        return Err(CatalogError::Empty(table));
    }
    for win in rows.windows(2) {
        if win[1].insulation_mm <= win[0].insulation_mm {
            return Err(CatalogError::NotAscending {
                table,
                prev: win[0].insulation_mm,
                next: win[1].insulation_mm,
            });
        }
    }
    Ok(())
}

fn check_screws(table: &'static str, screws: &[ScrewEntry]) -> Result<(), CatalogError> {
    if screws.is_empty() {
        return Err(CatalogError::Empty(table));
    }
    if let Some(s) = screws.iter().find(|s| s.code.trim().is_empty()) {
        return Err(CatalogError::MissingCode {
            table,
            length_mm: s.length_mm,
        });
    }
    for win in screws.windows(2) {
        if win[1].length_mm <= win[0].length_mm {
            return Err(CatalogError::NotAscending {
                table,
                prev: win[0].length_mm,
                next: win[1].length_mm,
            });
        }
    }
    Ok(())
}

fn owned(src: &[(u32, &str)]) -> Vec<ScrewEntry> {
    src.iter()
        .map(|&(length_mm, code)| ScrewEntry {
            length_mm,
            code: code.to_string(),
        })
        .collect()
}

pub const TUBE_PREFIX: &str = "LDTK";

const fn row(insulation_mm: u32, screw_mm: u32, tube_mm: u32) -> InsulationRow {
    InsulationRow::new(insulation_mm, screw_mm, tube_mm)
}

/// 콘크리트 기판: 튜브 아래 여유 + 앵커 깊이 30 mm 기준.
const CONCRETE_TABLE: &[InsulationRow] = &[
    row(60, 50, 50),
    row(80, 70, 50),
    row(100, 90, 50),
    row(120, 60, 100),
    row(140, 80, 100),
    row(160, 100, 100),
    row(180, 70, 150),
    row(200, 90, 150),
    row(220, 60, 200),
    row(240, 80, 200),
    row(260, 100, 200),
    row(280, 70, 250),
    row(300, 90, 250),
    row(320, 60, 300),
    row(340, 80, 300),
    row(360, 100, 300),
    row(380, 70, 350),
    row(400, 90, 350),
    row(420, 60, 400),
    row(440, 80, 400),
    row(460, 100, 400),
    row(480, 70, 450),
    row(500, 90, 450),
];

/// 금속(트라페즈 강판) 기판: 앵커 깊이 14 mm 기준.
const METAL_TABLE: &[InsulationRow] = &[
    row(60, 40, 50),
    row(80, 60, 50),
    row(100, 80, 50),
    row(120, 50, 100),
    row(140, 70, 100),
    row(160, 40, 150),
    row(180, 60, 150),
    row(200, 80, 150),
    row(220, 50, 200),
    row(240, 70, 200),
    row(260, 40, 250),
    row(280, 60, 250),
    row(300, 80, 250),
    row(320, 50, 300),
    row(340, 70, 300),
    row(360, 40, 350),
    row(380, 60, 350),
    row(400, 80, 350),
    row(420, 50, 400),
    row(440, 70, 400),
    row(460, 40, 450),
    row(480, 60, 450),
    row(500, 80, 450),
    row(520, 50, 500),
    row(540, 70, 500),
    row(560, 40, 550),
    row(580, 60, 550),
    row(600, 80, 550),
];

/// 콘크리트용 WDB 6.3 나사
const WDB_63: &[(u32, &str)] = &[
    (60, "WDB-6,3x60"),
    (80, "WDB-6,3x80"),
    (100, "WDB-6,3x100"),
    (120, "WDB-6,3x120"),
    (140, "WDB-6,3x140"),
    (160, "WDB-6,3x160"),
];

/// 강판용 WDS 4.8 나사
const WDS_48: &[(u32, &str)] = &[
    (40, "WDS-4,8x40"),
    (50, "WDS-4,8x50"),
    (60, "WDS-4,8x60"),
    (70, "WDS-4,8x70"),
    (80, "WDS-4,8x80"),
    (100, "WDS-4,8x100"),
];
