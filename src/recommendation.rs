//! 튜브/나사 조합 추천 계산.
//!
//! 1) 기판별 단열 테이블에서 신규 단열 두께를 수용하는 첫 행(가장 짧은 튜브)을 고르고
//! 2) 그 행의 기본 나사 길이에 기존 층 두께를 더한 값 이상인 첫 나사를 카탈로그에서 고른다.
//!
//! 테이블에 맞는 행이 없으면 `None`, 맞는 나사가 없으면 [`ScrewChoice::Unavailable`]을 돌려준다.
//! 둘 다 오류가 아니라 정상적인 결과로 취급한다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// 나사 카탈로그 범위를 넘었을 때 나사 이름 자리에 들어가는 고정 문구.
pub const SCREW_UNAVAILABLE: &str = "Brak wkrętu (wymagany dłuższy niż w ofercie)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofType {
    Concrete,
    Metal,
}

impl RoofType {
    pub const ALL: [RoofType; 2] = [RoofType::Concrete, RoofType::Metal];

    /// 기판에 요구되는 앵커 깊이 [mm]
    pub fn anchor_depth_mm(self) -> u32 {
        match self {
            RoofType::Concrete => 30,
            RoofType::Metal => 14,
        }
    }

    pub fn is_metal(self) -> bool {
        self == RoofType::Metal
    }

    pub fn as_code(self) -> &'static str {
        match self {
            RoofType::Concrete => "concrete",
            RoofType::Metal => "metal",
        }
    }

    /// 메일 템플릿과 통계 페이로드에 쓰이는 기판 명칭.
    pub fn substrate_label(self) -> &'static str {
        match self {
            RoofType::Concrete => "Betonowy",
            RoofType::Metal => "Stalowy",
        }
    }
}

impl fmt::Display for RoofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for RoofType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concrete" | "beton" | "betonowy" => Ok(RoofType::Concrete),
            "metal" | "steel" | "stal" | "stalowy" => Ok(RoofType::Metal),
            other => Err(format!("알 수 없는 지붕 종류: {other}")),
        }
    }
}

/// 사용자가 단계별로 입력한 값.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationInput {
    pub roof_type: RoofType,
    pub new_thickness_mm: u32,
    /// 금속 지붕이면 무시된다.
    pub has_old_insulation: bool,
    pub old_thickness_mm: u32,
}

impl Default for ConfigurationInput {
    fn default() -> Self {
        Self {
            roof_type: RoofType::Concrete,
            new_thickness_mm: 0,
            has_old_insulation: false,
            old_thickness_mm: 0,
        }
    }
}

impl ConfigurationInput {
    /// 나사 길이에 더해지는 기존 층 두께. 금속 지붕이거나 기존 층이 없으면 0.
    pub fn effective_old_thickness_mm(&self) -> u32 {
        if self.roof_type.is_metal() || !self.has_old_insulation {
            0
        } else {
            self.old_thickness_mm
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrewChoice {
    Catalog(String),
    Unavailable,
}

impl ScrewChoice {
    pub fn name(&self) -> &str {
        match self {
            ScrewChoice::Catalog(code) => code,
            ScrewChoice::Unavailable => SCREW_UNAVAILABLE,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ScrewChoice::Catalog(_))
    }
}

impl fmt::Display for ScrewChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tube_name: String,
    pub tube_length_mm: u32,
    pub screw: ScrewChoice,
    pub anchor_depth_mm: u32,
    /// 기본 나사 길이 + 기존 층 두께
    pub required_screw_length_mm: u32,
}

impl Recommendation {
    pub fn screw_name(&self) -> &str {
        self.screw.name()
    }
}

/// 입력에 맞는 튜브/나사 조합을 계산한다. 테이블을 벗어나면 `None`.
pub fn compute_recommendation(
    catalog: &Catalog,
    input: &ConfigurationInput,
) -> Option<Recommendation> {
    let roof = input.roof_type;
    let old_mm = input.effective_old_thickness_mm();

    let Some(row) = catalog
        .insulation_table(roof)
        .iter()
        .find(|r| r.insulation_mm >= input.new_thickness_mm)
    else {
        log::debug!(
            "{roof}: {} mm 이상을 수용하는 테이블 행 없음",
            input.new_thickness_mm
        );
        return None;
    };

    let required = row.screw_mm.saturating_add(old_mm);
    let screw = catalog
        .screws(roof)
        .iter()
        .find(|s| s.length_mm >= required)
        .map(|s| ScrewChoice::Catalog(s.code.clone()))
        .unwrap_or(ScrewChoice::Unavailable);

    log::debug!(
        "{roof}: 단열 {} mm -> 행 {} mm (튜브 {} mm), 나사 {} mm 필요 -> {}",
        input.new_thickness_mm,
        row.insulation_mm,
        row.tube_mm,
        required,
        screw
    );

    Some(Recommendation {
        tube_name: format!("{} {}", catalog.tube_prefix, row.tube_mm),
        tube_length_mm: row.tube_mm,
        screw,
        anchor_depth_mm: roof.anchor_depth_mm(),
        required_screw_length_mm: required,
    })
}
