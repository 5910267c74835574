use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::config::{Config, ConfigError};
use crate::i18n::{self, Translator};
use crate::notify::email::SENDER_NAME as EMAIL_SENDER;
use crate::notify::{Dispatcher, EmailJsSender, NotifyError, ResultSummary, StatsChannel};
use crate::recommendation::{compute_recommendation, ConfigurationInput};
use crate::ui_cli::{self, Command};
use crate::wizard::{self, Effect, Stage, ValidationError, WizardContext, WizardState};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("입력 스트림이 닫혔습니다")]
    InputClosed,
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    #[error("카탈로그 오류: {0}")]
    Catalog(#[from] CatalogError),
    #[error("알림 설정 오류: {0}")]
    Notify(#[from] NotifyError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// 설정에 카탈로그 경로가 있으면 그 파일을, 없으면 내장 테이블을 쓴다.
pub fn load_catalog(config: &Config) -> Result<Catalog, AppError> {
    match &config.catalog_path {
        Some(path) => Ok(Catalog::load(path)?),
        None => Ok(Catalog::builtin()),
    }
}

/// 활성화된 협력자만 등록한다. 개별 협력자 구성 실패는 경고만 남긴다.
pub fn build_dispatcher(config: &Config) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    if config.email.enabled {
        match EmailJsSender::new(config.email.clone()) {
            Ok(sender) => dispatcher = dispatcher.with_sender(Arc::new(sender)),
            Err(e) => log::warn!("메일 발송 비활성화: {e}"),
        }
    }
    if config.stats.enabled {
        match StatsChannel::from_settings(&config.stats) {
            Ok(channel) => dispatcher = dispatcher.with_sender(Arc::new(channel)),
            Err(e) => log::warn!("통계 채널 비활성화: {e}"),
        }
    }
    dispatcher
}

/// 메일 협력자가 실제로 등록된 경우에만 결과 화면에 표시할 수신 주소를 돌려준다.
pub fn sent_to<'a>(dispatcher: &Dispatcher, email: &'a str) -> Option<&'a str> {
    (!email.is_empty() && dispatcher.has_sender(EMAIL_SENDER)).then_some(email)
}

/// 리듀서를 한 번 적용하고 나온 부수효과를 실행한다.
pub fn step(
    state: &WizardState,
    action: wizard::Action,
    ctx: &WizardContext<'_>,
    dispatcher: &Dispatcher,
) -> WizardState {
    let transition = wizard::reduce(state, action, ctx);
    for effect in &transition.effects {
        match effect {
            Effect::Notify(summary) => dispatcher.dispatch(summary),
        }
    }
    transition.state
}

/// 대화형 구성기 루프를 실행한다.
pub fn run(config: &Config, tr: &Translator) -> Result<(), AppError> {
    let catalog = load_catalog(config)?;
    let dispatcher = build_dispatcher(config);
    let ctx = WizardContext::new(&catalog, config.min_new_thickness_mm);
    let mut state = WizardState::new();

    println!("{}", tr.t(i18n::keys::APP_TITLE));
    loop {
        let recipient = sent_to(&dispatcher, &state.email);
        let command = match ui_cli::prompt(&state, &ctx, recipient, tr) {
            Ok(cmd) => cmd,
            Err(AppError::InputClosed) => Command::Quit,
            Err(e) => return Err(e),
        };
        match command {
            Command::Apply(actions) => {
                for action in actions {
                    state = step(&state, action, &ctx, &dispatcher);
                }
            }
            Command::Print => {
                if state.stage == Stage::Results {
                    println!("{}", ui_cli::printable_summary(&state, recipient, tr));
                }
            }
            Command::Quit => break,
        }
    }
    let in_flight = dispatcher.in_flight();
    if in_flight > 0 {
        log::info!("남은 알림 전송 {in_flight}건 대기");
    }
    dispatcher.wait();
    println!("{}", tr.t(i18n::keys::APP_EXIT));
    Ok(())
}

/// 비대화형 1회 계산. `email`이 있으면 결과를 협력자에게도 보낸다.
pub fn run_calc(
    config: &Config,
    tr: &Translator,
    input: ConfigurationInput,
    email: Option<&str>,
    json: bool,
) -> Result<(), AppError> {
    if input.new_thickness_mm <= config.min_new_thickness_mm {
        return Err(ValidationError::ThicknessTooSmall {
            floor_mm: config.min_new_thickness_mm,
        }
        .into());
    }
    if let Some(email) = email {
        if !wizard::is_valid_email(email) {
            return Err(ValidationError::InvalidEmail.into());
        }
    }

    let catalog = load_catalog(config)?;
    let recommendation = compute_recommendation(&catalog, &input);
    let dispatcher = match (email, &recommendation) {
        (Some(_), Some(_)) => build_dispatcher(config),
        _ => Dispatcher::new(),
    };
    let recipient = email.and_then(|e| sent_to(&dispatcher, e));

    if json {
        let out = serde_json::to_string_pretty(&recommendation).map_err(NotifyError::from)?;
        println!("{out}");
    } else {
        println!(
            "{}",
            ui_cli::format_result(&input, recommendation.as_ref(), recipient, tr)
        );
    }

    if let (Some(email), Some(rec)) = (email, recommendation) {
        dispatcher.dispatch(&ResultSummary::new(email, input, rec));
        dispatcher.wait();
    }
    Ok(())
}

/// 현재 카탈로그를 표 형태로 출력한다.
pub fn run_tables(config: &Config, tr: &Translator) -> Result<(), AppError> {
    let catalog = load_catalog(config)?;
    println!("{}", ui_cli::format_catalog(&catalog, tr));
    Ok(())
}
