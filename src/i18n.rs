use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_TITLE: &str = "general.app_title";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";
    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";
    pub const ERROR_OUT_OF_RANGE: &str = "error.out_of_range";

    pub const DISCLAIMER_TITLE: &str = "disclaimer.title";
    pub const DISCLAIMER_BODY: &str = "disclaimer.body";
    pub const DISCLAIMER_PROMPT: &str = "disclaimer.prompt";
    pub const DISCLAIMER_REQUIRED: &str = "disclaimer.required";

    pub const EMAIL_HEADING: &str = "email.heading";
    pub const EMAIL_NOTE: &str = "email.note";
    pub const EMAIL_PROMPT: &str = "email.prompt";
    pub const ERROR_INVALID_EMAIL: &str = "error.invalid_email";

    pub const STEP_ROOF_TYPE: &str = "step.roof_type";
    pub const STEP_NEW_INSULATION: &str = "step.new_insulation";
    pub const STEP_OLD_LAYERS: &str = "step.old_layers";
    pub const STEP_RESULTS: &str = "step.results";
    pub const NAV_HINT: &str = "nav.hint";

    pub const ROOF_HEADING: &str = "roof.heading";
    pub const ROOF_CONCRETE: &str = "roof.concrete";
    pub const ROOF_METAL: &str = "roof.metal";
    pub const ROOF_PROMPT: &str = "roof.prompt";
    pub const ERROR_MISSING_ROOF: &str = "error.missing_roof";

    pub const NEW_HEADING: &str = "new_insulation.heading";
    pub const NEW_PROMPT: &str = "new_insulation.prompt";
    pub const ERROR_THICKNESS_TOO_SMALL: &str = "error.thickness_too_small";

    pub const OLD_HEADING: &str = "old_layers.heading";
    pub const OLD_METAL_INFO: &str = "old_layers.metal_info";
    pub const OLD_PROMPT_HAS: &str = "old_layers.prompt_has";
    pub const OLD_PROMPT_THICKNESS: &str = "old_layers.prompt_thickness";
    pub const OLD_PROMPT_CALCULATE: &str = "old_layers.prompt_calculate";

    pub const RESULT_ROOF: &str = "result.roof";
    pub const RESULT_NEW: &str = "result.new_insulation";
    pub const RESULT_OLD: &str = "result.old_layers";
    pub const RESULT_ANCHOR: &str = "result.anchor";
    pub const RESULT_CONFIG_TITLE: &str = "result.config_title";
    pub const RESULT_SENT_TO: &str = "result.sent_to";
    pub const RESULT_NO_MATCH: &str = "result.no_match";
    pub const RESULT_NO_SCREW: &str = "result.no_screw";
    pub const RESULT_MENU: &str = "result.menu";
    pub const PRINT_HEADING: &str = "print.heading";

    pub const TABLES_HEADING: &str = "tables.heading";
    pub const TABLES_COLUMNS: &str = "tables.columns";
    pub const TABLES_SCREWS: &str = "tables.screws";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Pl,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("en") {
            Language::En
        } else {
            Language::Pl
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(pl/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 pl로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        if overrides.is_some() {
            log::debug!("언어팩 적용: {lang_code}");
        }
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// 번역을 가져온다. 영어 번역이 없으면 폴란드어 문자열을 폴백한다.
    pub fn t(&self, key: &str) -> &str {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return v;
        }
        match self.lang {
            Language::En => en(key).unwrap_or_else(|| pl(key)),
            Language::Pl => pl(key),
        }
    }

    /// `{name}` 자리표시자를 채운 번역을 돌려준다.
    pub fn tf(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.t(key).to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "pl".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("pl") => Some("pl".into()),
        other if other.starts_with("en") => Some("en".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "pl" => Some("pl".into()),
        "en" => Some("en".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LANG", "LC_ALL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 로 구성된 플랫 맵.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let path = Path::new(dir).join(format!("{lang}.toml"));
    let content = fs::read_to_string(path).ok()?;
    parse_toml_to_map(&content)
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn pl(key: &str) -> &'static str {
    use keys::*;
    match key {
        ERROR_PREFIX => "Błąd",
        APP_TITLE => "\n=== LDTK • Konfigurator 2025 ===",
        APP_EXIT => "Zamykanie programu.",
        INVALID_SELECTION_RETRY => "Nieprawidłowy wybór. Spróbuj ponownie.",
        ERROR_INVALID_NUMBER => "Podaj liczbę całkowitą.",
        ERROR_OUT_OF_RANGE => "Wartość musi mieścić się w zakresie {min}–{max} mm.",
        DISCLAIMER_TITLE => "\n-- Ważna informacja --",
        DISCLAIMER_BODY => {
            "Niniejszy konfigurator określa długość połączenia dla dachu, na którym zastosowana ma być określona grubość docieplenia.\n\
             W celu doboru łączników na dachu ze spadkami niezbędne jest wykonanie projektu zakotwienia.\n\n\
             W celu określenia dokładnej grubości istniejących warstw nienośnych na dachu podlegającym renowacji\n\
             niezbędne jest wykonanie odkrywki istniejącej warstwy nienośnej.\n\n\
             Wynik jest wyłącznie rekomendacją i nie zastępuje projektu technicznego oraz wymagań KOT i ETA.\n\
             Rekomendacje dotyczą wyłącznie łączników marki STARFIX."
        }
        DISCLAIMER_PROMPT => "Akceptuję warunki korzystania (t/n): ",
        DISCLAIMER_REQUIRED => "Aby przejść dalej, należy zaakceptować warunki.",
        EMAIL_HEADING => "\n-- Wprowadź email --",
        EMAIL_NOTE => "Prześlemy wyniki konfiguracji na Twój adres.",
        EMAIL_PROMPT => "Adres email: ",
        ERROR_INVALID_EMAIL => "Podaj poprawny adres email",
        STEP_ROOF_TYPE => "Rodzaj dachu",
        STEP_NEW_INSULATION => "Nowa izolacja",
        STEP_OLD_LAYERS => "Stare warstwy",
        STEP_RESULTS => "Wynik",
        NAV_HINT => "(w = wstecz)",
        ROOF_HEADING => "Wybierz rodzaj dachu",
        ROOF_CONCRETE => "Betonowy",
        ROOF_METAL => "Stalowy",
        ROOF_PROMPT => "Rodzaj dachu [1-2]: ",
        ERROR_MISSING_ROOF => "Wybierz rodzaj dachu",
        NEW_HEADING => "Grubość nowej izolacji",
        NEW_PROMPT => "Grubość [mm]: ",
        ERROR_THICKNESS_TOO_SMALL => "Grubość izolacji musi być większa niż {floor} mm",
        OLD_HEADING => "Stare warstwy (ocieplenie / papa)",
        OLD_METAL_INFO => "Dla dachu stalowego nie uwzględniamy starych warstw.",
        OLD_PROMPT_HAS => "Czy są stare warstwy? (t/n): ",
        OLD_PROMPT_THICKNESS => "Grubość starych warstw [mm]: ",
        OLD_PROMPT_CALCULATE => "Enter = Oblicz: ",
        RESULT_ROOF => "Rodzaj dachu",
        RESULT_NEW => "Nowa izolacja",
        RESULT_OLD => "Stare warstwy",
        RESULT_ANCHOR => "Kotwienie",
        RESULT_CONFIG_TITLE => "Twoja konfiguracja",
        RESULT_SENT_TO => "Wysłano na:",
        RESULT_NO_MATCH => "Brak zestawu dla podanych parametrów.",
        RESULT_NO_SCREW => "Brak wkrętu (wymagany dłuższy niż w ofercie)",
        RESULT_MENU => "1) Drukuj  2) Wstecz  3) Nowa konfiguracja  0) Zakończ",
        PRINT_HEADING => "LDTK • Zestawienie konfiguracji",
        TABLES_HEADING => "Tabela doboru",
        TABLES_COLUMNS => "izolacja ≤ [mm] | wkręt bazowy [mm] | tuleja",
        TABLES_SCREWS => "Wkręty",
        _ => "",
    }
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_TITLE => "\n=== LDTK • Configurator 2025 ===",
        APP_EXIT => "Exiting.",
        INVALID_SELECTION_RETRY => "Invalid selection. Try again.",
        ERROR_INVALID_NUMBER => "Please enter a whole number.",
        ERROR_OUT_OF_RANGE => "Value must be within {min}–{max} mm.",
        DISCLAIMER_TITLE => "\n-- Important information --",
        DISCLAIMER_BODY => {
            "This configurator determines the fastener length for a roof receiving a given insulation thickness.\n\
             Fasteners for pitched roofs require a dedicated anchoring design.\n\n\
             On renovation roofs the exact thickness of existing non-structural layers must be measured on site.\n\n\
             The result is a recommendation only and does not replace a technical design or KOT/ETA requirements.\n\
             Recommendations apply to STARFIX fasteners only."
        }
        DISCLAIMER_PROMPT => "I accept the terms of use (y/n): ",
        DISCLAIMER_REQUIRED => "You must accept the terms to continue.",
        EMAIL_HEADING => "\n-- Enter email --",
        EMAIL_NOTE => "We will send the configuration result to this address.",
        EMAIL_PROMPT => "Email address: ",
        ERROR_INVALID_EMAIL => "Enter a valid email address",
        STEP_ROOF_TYPE => "Roof type",
        STEP_NEW_INSULATION => "New insulation",
        STEP_OLD_LAYERS => "Old layers",
        STEP_RESULTS => "Result",
        NAV_HINT => "(b = back)",
        ROOF_HEADING => "Select the roof type",
        ROOF_CONCRETE => "Concrete",
        ROOF_METAL => "Steel",
        ROOF_PROMPT => "Roof type [1-2]: ",
        ERROR_MISSING_ROOF => "Select the roof type",
        NEW_HEADING => "New insulation thickness",
        NEW_PROMPT => "Thickness [mm]: ",
        ERROR_THICKNESS_TOO_SMALL => "Insulation thickness must be greater than {floor} mm",
        OLD_HEADING => "Old layers (insulation / felt)",
        OLD_METAL_INFO => "Old layers are not considered for steel roofs.",
        OLD_PROMPT_HAS => "Are there old layers? (y/n): ",
        OLD_PROMPT_THICKNESS => "Old layer thickness [mm]: ",
        OLD_PROMPT_CALCULATE => "Enter = Calculate: ",
        RESULT_ROOF => "Roof type",
        RESULT_NEW => "New insulation",
        RESULT_OLD => "Old layers",
        RESULT_ANCHOR => "Anchoring",
        RESULT_CONFIG_TITLE => "Your configuration",
        RESULT_SENT_TO => "Sent to:",
        RESULT_NO_MATCH => "No fastener set for the given parameters.",
        RESULT_NO_SCREW => "No screw available (longer than the catalog offers)",
        RESULT_MENU => "1) Print  2) Back  3) New configuration  0) Quit",
        PRINT_HEADING => "LDTK • Configuration summary",
        TABLES_HEADING => "Selection table",
        TABLES_COLUMNS => "insulation ≤ [mm] | base screw [mm] | tube",
        TABLES_SCREWS => "Screws",
        _ => return None,
    })
}
