use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use roof_fastener_configurator::app::{self, AppError};
use roof_fastener_configurator::config;
use roof_fastener_configurator::i18n::{self, Translator};
use roof_fastener_configurator::recommendation::{ConfigurationInput, RoofType};

#[derive(Parser)]
#[command(name = "roof_fastener_configurator", version, about = "LDTK 지붕 고정재 구성기")]
struct Cli {
    /// 설정 파일 경로
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// auto / pl / en
    #[arg(short = 'L', long, default_value = "auto")]
    lang: String,
    /// 디버그 로그 출력 (RUST_LOG 가 우선)
    #[arg(long)]
    debug: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// 대화형 구성기 (기본)
    Wizard,
    /// 입력값으로 한 번 계산한다
    Calc {
        /// concrete / metal
        #[arg(long)]
        roof: RoofType,
        /// 신규 단열 두께 [mm]
        #[arg(long = "new")]
        new_thickness: u32,
        /// 기존 층 두께 [mm]. 지정하면 기존 층이 있는 것으로 본다.
        #[arg(long = "old")]
        old_thickness: Option<u32>,
        /// 결과를 이 주소로도 보낸다
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// 현재 카탈로그 테이블 출력
    Tables,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 선택한 명령을 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("오류: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let cfg = config::load_or_default(&cli.config)?;
    let lang_code = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = Translator::new_with_pack(&lang_code, cfg.language_pack_dir.as_deref());

    match cli.command.unwrap_or(Command::Wizard) {
        Command::Wizard => app::run(&cfg, &tr),
        Command::Calc {
            roof,
            new_thickness,
            old_thickness,
            email,
            json,
        } => {
            let input = ConfigurationInput {
                roof_type: roof,
                new_thickness_mm: new_thickness,
                has_old_insulation: old_thickness.is_some(),
                old_thickness_mm: old_thickness.unwrap_or(0),
            };
            app::run_calc(&cfg, &tr, input, email.as_deref(), json)
        }
        Command::Tables => app::run_tables(&cfg, &tr),
    }
}
