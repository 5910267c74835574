//! 추천 결과 메일 발송 (EmailJS REST API).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tera::Tera;

use super::{NotificationSender, NotifyError, ResultSummary};
use crate::recommendation::Recommendation;

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// 디스패처에 등록되는 메일 협력자 이름.
pub const SENDER_NAME: &str = "email";

const RECOMMENDATIONS_TEMPLATE: &str = "recommendations.html.tera";
const DISCLAIMER_TEMPLATE: &str = "disclaimer.html.tera";

/// 기존 층이 없거나 금속 지붕일 때 `oldLayers` 필드에 들어가는 문구.
pub const NO_OLD_LAYERS: &str = "Brak / Nie dotyczy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    /// EmailJS 공개 키(user_id)
    pub public_key: String,
    pub timeout_secs: u64,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// 메일 템플릿에 넘기는 평면 필드 묶음.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailTemplateParams {
    pub to_email: String,
    pub client_email: String,
    #[serde(rename = "roofType")]
    pub roof_type: String,
    #[serde(rename = "newThickness")]
    pub new_thickness: u32,
    #[serde(rename = "oldLayers")]
    pub old_layers: String,
    pub recommendations_html: String,
    pub disclaimer_html: String,
    pub timestamp: String,
}

impl EmailTemplateParams {
    pub fn from_summary(
        summary: &ResultSummary,
        timestamp: &str,
        renderer: &EmailRenderer,
    ) -> Result<Self, NotifyError> {
        let old = summary.effective_old_thickness_mm;
        Ok(Self {
            to_email: summary.email.clone(),
            client_email: summary.email.clone(),
            roof_type: summary.input.roof_type.substrate_label().to_string(),
            new_thickness: summary.input.new_thickness_mm,
            old_layers: if old > 0 {
                format!("{old} mm")
            } else {
                NO_OLD_LAYERS.to_string()
            },
            recommendations_html: renderer.recommendations(&summary.recommendation)?,
            disclaimer_html: renderer.disclaimer()?,
            timestamp: timestamp.to_string(),
        })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a EmailTemplateParams,
}

pub struct EmailJsSender {
    settings: EmailSettings,
    client: Client,
    renderer: EmailRenderer,
}

impl EmailJsSender {
    pub fn new(settings: EmailSettings) -> Result<Self, NotifyError> {
        if settings.service_id.is_empty() {
            return Err(NotifyError::NotConfigured("email.service_id"));
        }
        if settings.template_id.is_empty() {
            return Err(NotifyError::NotConfigured("email.template_id"));
        }
        if settings.public_key.is_empty() {
            return Err(NotifyError::NotConfigured("email.public_key"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            settings,
            client,
            renderer: EmailRenderer::new()?,
        })
    }
}

impl NotificationSender for EmailJsSender {
    fn name(&self) -> &str {
        SENDER_NAME
    }

    fn send(&self, summary: &ResultSummary) -> Result<(), NotifyError> {
        let timestamp = local_timestamp();
        let params = EmailTemplateParams::from_summary(summary, &timestamp, &self.renderer)?;
        let body = SendRequest {
            service_id: &self.settings.service_id,
            template_id: &self.settings.template_id,
            user_id: &self.settings.public_key,
            template_params: &params,
        };
        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&body)
            .send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }
        Ok(())
    }
}

/// `dd.mm.yyyy, HH:MM` 형식의 현지 시각.
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%d.%m.%Y, %H:%M").to_string()
}

/// 메일 본문에 들어가는 HTML 조각 렌더러. 템플릿은 바이너리에 포함된다.
pub struct EmailRenderer {
    tera: Tera,
}

impl EmailRenderer {
    pub fn new() -> Result<Self, NotifyError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera"]);
        tera.add_raw_template(
            RECOMMENDATIONS_TEMPLATE,
            include_str!("../../templates/recommendations.html.tera"),
        )?;
        tera.add_raw_template(
            DISCLAIMER_TEMPLATE,
            include_str!("../../templates/disclaimer.html.tera"),
        )?;
        Ok(Self { tera })
    }

    /// 튜브/나사/앵커 깊이 표. 값은 자동 이스케이프된다.
    pub fn recommendations(&self, rec: &Recommendation) -> Result<String, NotifyError> {
        let mut context = tera::Context::new();
        context.insert("tube", &rec.tube_name);
        context.insert("screw", rec.screw_name());
        context.insert("depth", &rec.anchor_depth_mm);
        Ok(self.tera.render(RECOMMENDATIONS_TEMPLATE, &context)?)
    }

    pub fn disclaimer(&self) -> Result<String, NotifyError> {
        Ok(self.tera.render(DISCLAIMER_TEMPLATE, &tera::Context::new())?)
    }
}
