//! 구성기 진행 상태와 리듀서.
//!
//! 상태는 불변 값으로 다루고, 사용자 동작([`Action`])마다 [`reduce`]가 새 상태와
//! 실행해야 할 부수효과([`Effect`]) 목록을 돌려준다. 부수효과 실행은 호출자 몫이다.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::notify::ResultSummary;
use crate::recommendation::{
    compute_recommendation, ConfigurationInput, Recommendation, RoofType,
};

/// 신규 단열 두께 입력 범위 [mm]
pub const NEW_THICKNESS_MAX_MM: u32 = 880;
/// 기존 층 두께 입력 범위 [mm]
pub const OLD_THICKNESS_MAX_MM: u32 = 100;
/// 신규 단열 두께 하한 기본값. 이 값 이하이면 다음 단계로 넘어갈 수 없다.
pub const DEFAULT_MIN_NEW_THICKNESS_MM: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Disclaimer,
    Email,
    RoofType,
    NewInsulation,
    OldLayers,
    Results,
}

impl Stage {
    pub const STEPS: [Stage; 4] = [
        Stage::RoofType,
        Stage::NewInsulation,
        Stage::OldLayers,
        Stage::Results,
    ];

    /// 스테퍼 상의 위치. 안내/메일 화면은 스테퍼 밖이라 `None`.
    pub fn step_index(self) -> Option<usize> {
        Self::STEPS.iter().position(|s| *s == self)
    }

    fn is_form_step(self) -> bool {
        self.step_index().is_some()
    }

    fn previous(self) -> Stage {
        match self {
            Stage::NewInsulation => Stage::RoofType,
            Stage::OldLayers => Stage::NewInsulation,
            Stage::Results => Stage::OldLayers,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Podaj poprawny adres email")]
    InvalidEmail,
    #[error("Wybierz rodzaj dachu")]
    MissingRoofType,
    #[error("Grubość izolacji musi być większa niż {floor_mm} mm")]
    ThicknessTooSmall { floor_mm: u32 },
}

/// 필드별 검증 오류. 필드를 수정하면 해당 오류는 지워진다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<ValidationError>,
    pub roof_type: Option<ValidationError>,
    pub new_thickness: Option<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.roof_type.is_none() && self.new_thickness.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculationOutcome {
    Matched(Recommendation),
    /// 테이블 범위를 벗어남. 결과 화면에서 "조합 없음"으로 표시한다.
    NoMatch,
}

impl CalculationOutcome {
    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            CalculationOutcome::Matched(rec) => Some(rec),
            CalculationOutcome::NoMatch => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub stage: Stage,
    pub email: String,
    pub roof_type: Option<RoofType>,
    pub new_thickness_mm: u32,
    pub has_old_insulation: bool,
    pub old_thickness_mm: u32,
    pub outcome: Option<CalculationOutcome>,
    pub errors: FieldErrors,
}

impl Default for WizardState {
    fn default() -> Self {
        let form = ConfigurationInput::default();
        Self {
            stage: Stage::Disclaimer,
            email: String::new(),
            roof_type: Some(form.roof_type),
            new_thickness_mm: form.new_thickness_mm,
            has_old_insulation: form.has_old_insulation,
            old_thickness_mm: form.old_thickness_mm,
            outcome: None,
            errors: FieldErrors::default(),
        }
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지붕 종류가 선택된 경우에만 계산 입력을 만든다.
    pub fn input(&self) -> Option<ConfigurationInput> {
        Some(ConfigurationInput {
            roof_type: self.roof_type?,
            new_thickness_mm: self.new_thickness_mm,
            has_old_insulation: self.has_old_insulation,
            old_thickness_mm: self.old_thickness_mm,
        })
    }

    fn reset_form(&mut self) {
        let fresh = WizardState::default();
        self.roof_type = fresh.roof_type;
        self.new_thickness_mm = fresh.new_thickness_mm;
        self.has_old_insulation = fresh.has_old_insulation;
        self.old_thickness_mm = fresh.old_thickness_mm;
        self.outcome = None;
        self.errors = FieldErrors::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AcceptDisclaimer,
    SubmitEmail(String),
    SelectRoofType(Option<RoofType>),
    SetNewThickness(u32),
    SetHasOldInsulation(bool),
    SetOldThickness(u32),
    Next,
    Back,
    Calculate,
    StartOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 계산 결과가 있을 때만 발생한다. 메일/통계 협력자에게 넘긴다.
    Notify(ResultSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WizardState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: WizardState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WizardContext<'a> {
    pub catalog: &'a Catalog,
    pub min_new_thickness_mm: u32,
}

impl<'a> WizardContext<'a> {
    pub fn new(catalog: &'a Catalog, min_new_thickness_mm: u32) -> Self {
        Self {
            catalog,
            min_new_thickness_mm,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
        .is_match(email)
}

/// 현재 상태에 동작을 적용한다. 현재 단계에서 의미 없는 동작은 무시한다.
pub fn reduce(state: &WizardState, action: Action, ctx: &WizardContext<'_>) -> Transition {
    let mut next = state.clone();
    match action {
        Action::AcceptDisclaimer => {
            if next.stage == Stage::Disclaimer {
                next.stage = Stage::Email;
            }
        }
        Action::SubmitEmail(email) => {
            if next.stage == Stage::Email {
                let email = email.trim();
                if is_valid_email(email) {
                    next.email = email.to_string();
                    next.errors.email = None;
                    next.stage = Stage::RoofType;
                } else {
                    next.errors.email = Some(ValidationError::InvalidEmail);
                }
            }
        }
        Action::SelectRoofType(roof) if next.stage.is_form_step() => {
            next.roof_type = roof;
            next.errors.roof_type = None;
        }
        Action::SetNewThickness(mm) if next.stage.is_form_step() => {
            next.new_thickness_mm = mm;
            next.errors.new_thickness = None;
        }
        Action::SetHasOldInsulation(flag) if next.stage.is_form_step() => {
            next.has_old_insulation = flag;
        }
        Action::SetOldThickness(mm) if next.stage.is_form_step() => {
            next.old_thickness_mm = mm;
        }
        Action::Next => match next.stage {
            Stage::RoofType => {
                if next.roof_type.is_some() {
                    next.errors = FieldErrors::default();
                    next.stage = Stage::NewInsulation;
                } else {
                    next.errors.roof_type = Some(ValidationError::MissingRoofType);
                }
            }
            Stage::NewInsulation => {
                if next.new_thickness_mm > ctx.min_new_thickness_mm {
                    next.errors = FieldErrors::default();
                    next.stage = Stage::OldLayers;
                } else {
                    next.errors.new_thickness = Some(ValidationError::ThicknessTooSmall {
                        floor_mm: ctx.min_new_thickness_mm,
                    });
                }
            }
            Stage::OldLayers => return reduce(&next, Action::Calculate, ctx),
            _ => {}
        },
        Action::Back => {
            next.stage = next.stage.previous();
        }
        Action::Calculate => {
            if next.stage == Stage::OldLayers {
                return calculate(next, ctx);
            }
        }
        Action::StartOver => {
            if next.stage.is_form_step() {
                next.reset_form();
                next.stage = Stage::RoofType;
            }
        }
        other => log::debug!("{:?} 단계에서 무시된 동작: {other:?}", state.stage),
    }
    Transition::quiet(next)
}

fn calculate(mut state: WizardState, ctx: &WizardContext<'_>) -> Transition {
    let Some(input) = state.input() else {
        state.errors.roof_type = Some(ValidationError::MissingRoofType);
        state.stage = Stage::RoofType;
        return Transition::quiet(state);
    };

    let mut effects = Vec::new();
    state.outcome = Some(match compute_recommendation(ctx.catalog, &input) {
        Some(rec) => {
            effects.push(Effect::Notify(ResultSummary::new(
                &state.email,
                input,
                rec.clone(),
            )));
            CalculationOutcome::Matched(rec)
        }
        None => CalculationOutcome::NoMatch,
    });
    state.stage = Stage::Results;
    Transition { state, effects }
}
