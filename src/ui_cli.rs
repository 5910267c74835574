use std::fmt::Write as _;
use std::io::{self, Write};

use crate::app::AppError;
use crate::catalog::Catalog;
use crate::i18n::{keys, Translator};
use crate::notify::email::local_timestamp;
use crate::recommendation::{ConfigurationInput, Recommendation, RoofType, ScrewChoice};
use crate::wizard::{
    Action, Stage, ValidationError, WizardContext, WizardState, NEW_THICKNESS_MAX_MM,
    OLD_THICKNESS_MAX_MM,
};

/// 한 화면에서 사용자가 고른 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 순서대로 리듀서에 넘길 동작들. 비어 있으면 같은 화면을 다시 그린다.
    Apply(Vec<Action>),
    Print,
    Quit,
}

/// 현재 단계의 화면을 그리고 입력을 받는다.
/// `sent_to`는 메일이 실제로 발송되는 경우의 수신 주소다.
pub fn prompt(
    state: &WizardState,
    ctx: &WizardContext<'_>,
    sent_to: Option<&str>,
    tr: &Translator,
) -> Result<Command, AppError> {
    match state.stage {
        Stage::Disclaimer => disclaimer_screen(tr),
        Stage::Email => email_screen(state, tr),
        Stage::RoofType => roof_type_screen(state, tr),
        Stage::NewInsulation => new_insulation_screen(state, ctx, tr),
        Stage::OldLayers => old_layers_screen(state, tr),
        Stage::Results => results_screen(state, sent_to, tr),
    }
}

fn disclaimer_screen(tr: &Translator) -> Result<Command, AppError> {
    println!("{}", tr.t(keys::DISCLAIMER_TITLE));
    println!("{}\n", tr.t(keys::DISCLAIMER_BODY));
    let answer = read_line(tr.t(keys::DISCLAIMER_PROMPT))?;
    if parse_yes_no(&answer) == Some(true) {
        Ok(Command::Apply(vec![Action::AcceptDisclaimer]))
    } else {
        println!("{}", tr.t(keys::DISCLAIMER_REQUIRED));
        Ok(Command::Apply(Vec::new()))
    }
}

fn email_screen(state: &WizardState, tr: &Translator) -> Result<Command, AppError> {
    println!("{}", tr.t(keys::EMAIL_HEADING));
    println!("{}", tr.t(keys::EMAIL_NOTE));
    print_error(state.errors.email.as_ref(), tr);
    let email = read_line(tr.t(keys::EMAIL_PROMPT))?;
    Ok(Command::Apply(vec![Action::SubmitEmail(email)]))
}

fn roof_type_screen(state: &WizardState, tr: &Translator) -> Result<Command, AppError> {
    print_stepper(state.stage, tr);
    println!("{}", tr.t(keys::ROOF_HEADING));
    for (i, roof) in RoofType::ALL.iter().enumerate() {
        let mark = if state.roof_type == Some(*roof) { "*" } else { " " };
        println!("{mark} {}) {}", i + 1, roof_label(*roof, tr));
    }
    print_error(state.errors.roof_type.as_ref(), tr);
    let sel = read_line(tr.t(keys::ROOF_PROMPT))?;
    let actions = match sel.trim() {
        "" => vec![Action::Next],
        "1" => vec![Action::SelectRoofType(Some(RoofType::Concrete)), Action::Next],
        "2" => vec![Action::SelectRoofType(Some(RoofType::Metal)), Action::Next],
        _ => {
            println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
            Vec::new()
        }
    };
    Ok(Command::Apply(actions))
}

fn new_insulation_screen(
    state: &WizardState,
    ctx: &WizardContext<'_>,
    tr: &Translator,
) -> Result<Command, AppError> {
    print_stepper(state.stage, tr);
    println!("{} {}", tr.t(keys::NEW_HEADING), tr.t(keys::NAV_HINT));
    println!("  {} mm", state.new_thickness_mm);
    print_error(state.errors.new_thickness.as_ref(), tr);
    let raw = read_line(tr.t(keys::NEW_PROMPT))?;
    if is_back(&raw) {
        return Ok(Command::Apply(vec![Action::Back]));
    }
    if raw.trim().is_empty() {
        return Ok(Command::Apply(vec![Action::Next]));
    }
    match parse_thickness(&raw, NEW_THICKNESS_MAX_MM, tr) {
        Some(mm) => {
            log::debug!("신규 단열 {mm} mm (하한 {} mm)", ctx.min_new_thickness_mm);
            Ok(Command::Apply(vec![Action::SetNewThickness(mm), Action::Next]))
        }
        None => Ok(Command::Apply(Vec::new())),
    }
}

fn old_layers_screen(state: &WizardState, tr: &Translator) -> Result<Command, AppError> {
    print_stepper(state.stage, tr);
    if state.roof_type.is_some_and(RoofType::is_metal) {
        println!("{}", tr.t(keys::OLD_METAL_INFO));
        let raw = read_line(tr.t(keys::OLD_PROMPT_CALCULATE))?;
        if is_back(&raw) {
            return Ok(Command::Apply(vec![Action::Back]));
        }
        return Ok(Command::Apply(vec![Action::Calculate]));
    }

    println!("{} {}", tr.t(keys::OLD_HEADING), tr.t(keys::NAV_HINT));
    let raw = read_line(tr.t(keys::OLD_PROMPT_HAS))?;
    if is_back(&raw) {
        return Ok(Command::Apply(vec![Action::Back]));
    }
    let Some(has_old) = parse_yes_no(&raw) else {
        println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
        return Ok(Command::Apply(Vec::new()));
    };
    if !has_old {
        return Ok(Command::Apply(vec![
            Action::SetHasOldInsulation(false),
            Action::Calculate,
        ]));
    }
    loop {
        let raw = read_line(tr.t(keys::OLD_PROMPT_THICKNESS))?;
        if let Some(mm) = parse_thickness(&raw, OLD_THICKNESS_MAX_MM, tr) {
            return Ok(Command::Apply(vec![
                Action::SetHasOldInsulation(true),
                Action::SetOldThickness(mm),
                Action::Calculate,
            ]));
        }
    }
}

fn results_screen(
    state: &WizardState,
    sent_to: Option<&str>,
    tr: &Translator,
) -> Result<Command, AppError> {
    print_stepper(state.stage, tr);
    if let Some(input) = state.input() {
        let rec = state.outcome.as_ref().and_then(|o| o.recommendation());
        println!("{}", format_result(&input, rec, sent_to, tr));
    }
    println!("\n{}", tr.t(keys::RESULT_MENU));
    let sel = read_line("> ")?;
    let cmd = match sel.trim() {
        "1" => Command::Print,
        "2" => Command::Apply(vec![Action::Back]),
        "3" => Command::Apply(vec![Action::StartOver]),
        "0" => Command::Quit,
        _ => {
            println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
            Command::Apply(Vec::new())
        }
    };
    Ok(cmd)
}

/// 입력 요약과 추천 결과를 사람이 읽을 수 있는 블록으로 만든다.
pub fn format_result(
    input: &ConfigurationInput,
    recommendation: Option<&Recommendation>,
    email: Option<&str>,
    tr: &Translator,
) -> String {
    let old = input.effective_old_thickness_mm();
    let old_text = if old > 0 {
        format!("{old} mm")
    } else {
        "-".to_string()
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16}{}",
        label(tr, keys::RESULT_ROOF),
        roof_label(input.roof_type, tr)
    );
    let _ = writeln!(out, "{:<16}{} mm", label(tr, keys::RESULT_NEW), input.new_thickness_mm);
    let _ = writeln!(out, "{:<16}{}", label(tr, keys::RESULT_OLD), old_text);
    let _ = writeln!(
        out,
        "{:<16}{} mm",
        label(tr, keys::RESULT_ANCHOR),
        input.roof_type.anchor_depth_mm()
    );
    match recommendation {
        Some(rec) => {
            let _ = writeln!(out, "\n{}", tr.t(keys::RESULT_CONFIG_TITLE));
            let _ = writeln!(out, "  {} + {}", rec.tube_name, screw_label(&rec.screw, tr));
            if let Some(email) = email.filter(|e| !e.is_empty()) {
                let _ = write!(out, "{} {email}", tr.t(keys::RESULT_SENT_TO));
            }
        }
        None => {
            let _ = write!(out, "\n{}", tr.t(keys::RESULT_NO_MATCH));
        }
    }
    out.trim_end().to_string()
}

/// 결과 화면의 인쇄용 텍스트.
pub fn printable_summary(state: &WizardState, sent_to: Option<&str>, tr: &Translator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tr.t(keys::PRINT_HEADING));
    let _ = writeln!(out, "{}\n", local_timestamp());
    if let Some(input) = state.input() {
        let rec = state.outcome.as_ref().and_then(|o| o.recommendation());
        out.push_str(&format_result(&input, rec, sent_to, tr));
    }
    out
}

pub fn format_catalog(catalog: &Catalog, tr: &Translator) -> String {
    let mut out = String::new();
    for roof in RoofType::ALL {
        let _ = writeln!(
            out,
            "\n== {} — {} ({} {} mm) ==",
            tr.t(keys::TABLES_HEADING),
            roof_label(roof, tr),
            tr.t(keys::RESULT_ANCHOR),
            roof.anchor_depth_mm()
        );
        let _ = writeln!(out, "{}", tr.t(keys::TABLES_COLUMNS));
        for row in catalog.insulation_table(roof) {
            let _ = writeln!(
                out,
                "{:>6} | {:>6} | {} {}",
                row.insulation_mm, row.screw_mm, catalog.tube_prefix, row.tube_mm
            );
        }
        let _ = writeln!(out, "{}:", tr.t(keys::TABLES_SCREWS));
        for screw in catalog.screws(roof) {
            let _ = writeln!(out, "{:>6} | {}", screw.length_mm, screw.code);
        }
    }
    out
}

pub fn validation_message(err: &ValidationError, tr: &Translator) -> String {
    match err {
        ValidationError::InvalidEmail => tr.t(keys::ERROR_INVALID_EMAIL).to_string(),
        ValidationError::MissingRoofType => tr.t(keys::ERROR_MISSING_ROOF).to_string(),
        ValidationError::ThicknessTooSmall { floor_mm } => tr.tf(
            keys::ERROR_THICKNESS_TOO_SMALL,
            &[("floor", floor_mm.to_string().as_str())],
        ),
    }
}

/// t/tak/y/yes → true, n/nie/no → false.
pub fn parse_yes_no(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "t" | "tak" | "y" | "yes" => Some(true),
        "n" | "nie" | "no" => Some(false),
        _ => None,
    }
}

fn is_back(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "w" | "b")
}

fn parse_thickness(raw: &str, max_mm: u32, tr: &Translator) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(v) if v <= max_mm => Some(v),
        Ok(_) => {
            println!(
                "{}",
                tr.tf(
                    keys::ERROR_OUT_OF_RANGE,
                    &[("min", "0"), ("max", max_mm.to_string().as_str())]
                )
            );
            None
        }
        Err(_) => {
            println!("{}", tr.t(keys::ERROR_INVALID_NUMBER));
            None
        }
    }
}

fn print_stepper(stage: Stage, tr: &Translator) {
    let labels = [
        keys::STEP_ROOF_TYPE,
        keys::STEP_NEW_INSULATION,
        keys::STEP_OLD_LAYERS,
        keys::STEP_RESULTS,
    ];
    let active = stage.step_index();
    let line = labels
        .iter()
        .enumerate()
        .map(|(i, key)| {
            if Some(i) == active {
                format!("[{} {}]", i + 1, tr.t(key))
            } else {
                format!("{} {}", i + 1, tr.t(key))
            }
        })
        .collect::<Vec<_>>()
        .join(" > ");
    println!("\n{line}");
}

fn print_error(err: Option<&ValidationError>, tr: &Translator) {
    if let Some(err) = err {
        println!("{}: {}", tr.t(keys::ERROR_PREFIX), validation_message(err, tr));
    }
}

fn label(tr: &Translator, key: &str) -> String {
    format!("{}:", tr.t(key))
}

fn roof_label(roof: RoofType, tr: &Translator) -> &str {
    match roof {
        RoofType::Concrete => tr.t(keys::ROOF_CONCRETE),
        RoofType::Metal => tr.t(keys::ROOF_METAL),
    }
}

fn screw_label<'a>(screw: &'a ScrewChoice, tr: &'a Translator) -> &'a str {
    match screw {
        ScrewChoice::Catalog(code) => code.as_str(),
        ScrewChoice::Unavailable => tr.t(keys::RESULT_NO_SCREW),
    }
}

/// 입력 스트림이 닫히면 [`AppError::InputClosed`]를 돌려준다.
fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    if io::stdin().read_line(&mut buf)? == 0 {
        return Err(AppError::InputClosed);
    }
    Ok(buf)
}
