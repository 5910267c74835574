//! 임베딩 페이지로 보내는 통계 메시지. CLI에서는 JSON 한 줄로 기록한다.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{NotificationSender, NotifyError, ResultSummary};

pub const MESSAGE_TYPE: &str = "SF_STATS";
pub const SOURCE_TAG: &str = "ldtk";
pub const INSULATION_TYPE: &str = "Dach";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    pub enabled: bool,
    /// 비어 있으면 stderr 로 보낸다.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecommendation {
    pub name: String,
    pub screw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsPayload {
    pub source: String,
    pub substrate: String,
    pub insulation_type: String,
    #[serde(rename = "hD")]
    pub h_d: u32,
    pub adhesive_thickness: u32,
    pub recessed_depth: u32,
    pub recommendations: Vec<StatsRecommendation>,
    pub email: String,
}

impl StatsPayload {
    pub fn from_summary(summary: &ResultSummary) -> Self {
        let rec = &summary.recommendation;
        Self {
            source: SOURCE_TAG.to_string(),
            substrate: summary.input.roof_type.substrate_label().to_string(),
            insulation_type: INSULATION_TYPE.to_string(),
            h_d: summary.input.new_thickness_mm,
            adhesive_thickness: summary.effective_old_thickness_mm,
            recessed_depth: 0,
            recommendations: vec![StatsRecommendation {
                name: rec.tube_name.clone(),
                screw: rec.screw_name().to_string(),
            }],
            email: summary.email.clone(),
        }
    }
}

#[derive(Serialize)]
struct StatsMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: &'a StatsPayload,
}

/// 태그된 통계 메시지를 JSON Lines 로 기록한다.
pub struct StatsChannel {
    out: Mutex<Box<dyn Write + Send>>,
}

impl StatsChannel {
    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn from_settings(settings: &StatsSettings) -> Result<Self, NotifyError> {
        let out: Box<dyn Write + Send> = match &settings.output {
            Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
            None => Box::new(io::stderr()),
        };
        Ok(Self::to_writer(out))
    }

    pub fn message_line(payload: &StatsPayload) -> Result<String, NotifyError> {
        let msg = StatsMessage {
            kind: MESSAGE_TYPE,
            payload,
        };
        Ok(serde_json::to_string(&msg)?)
    }
}

impl NotificationSender for StatsChannel {
    fn name(&self) -> &str {
        "stats"
    }

    fn send(&self, summary: &ResultSummary) -> Result<(), NotifyError> {
        let line = Self::message_line(&StatsPayload::from_summary(summary))?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("stats writer poisoned"))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}
