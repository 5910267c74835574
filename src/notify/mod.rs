//! 계산 결과를 외부로 알리는 협력자들(메일, 통계 채널).
//!
//! 모든 전송은 결과 표시와 독립적인 fire-and-forget 이다. 실패는 로그로만 남기고
//! 사용자에게 보여준 추천 결과에는 영향을 주지 않는다.

pub mod email;
pub mod stats;

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use thiserror::Error;

use crate::recommendation::{ConfigurationInput, Recommendation};

pub use email::{EmailJsSender, EmailRenderer, EmailSettings, EmailTemplateParams};
pub use stats::{StatsChannel, StatsPayload, StatsSettings};

/// 외부 협력자에게 넘기는 결과 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub email: String,
    pub input: ConfigurationInput,
    pub effective_old_thickness_mm: u32,
    pub recommendation: Recommendation,
}

impl ResultSummary {
    pub fn new(email: &str, input: ConfigurationInput, recommendation: Recommendation) -> Self {
        Self {
            email: email.to_string(),
            effective_old_thickness_mm: input.effective_old_thickness_mm(),
            input,
            recommendation,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP 전송 오류: {0}")]
    Http(#[from] reqwest::Error),
    #[error("메일 서비스 거부 ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("통계 채널 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("직렬화 오류: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("메일 템플릿 렌더링 오류: {0}")]
    Render(#[from] tera::Error),
    #[error("설정 누락: {0}")]
    NotConfigured(&'static str),
}

/// 결과 요약을 받아 한 번 전달하는 외부 협력자.
pub trait NotificationSender: Send + Sync {
    fn name(&self) -> &str;
    fn send(&self, summary: &ResultSummary) -> Result<(), NotifyError>;
}

/// 등록된 협력자에게 결과를 비동기로 뿌린다.
#[derive(Default)]
pub struct Dispatcher {
    senders: Vec<Arc<dyn NotificationSender>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender(mut self, sender: Arc<dyn NotificationSender>) -> Self {
        self.senders.push(sender);
        self
    }

    pub fn has_sender(&self, name: &str) -> bool {
        self.senders.iter().any(|s| s.name() == name)
    }

    /// 아직 진행 중인 전송 수. 끝난 핸들은 이때 정리된다.
    pub fn in_flight(&self) -> usize {
        match self.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|h| !h.is_finished());
                pending.len()
            }
            Err(_) => 0,
        }
    }

    /// 협력자마다 스레드를 하나씩 띄우고 바로 반환한다.
    pub fn dispatch(&self, summary: &ResultSummary) {
        let summary = Arc::new(summary.clone());
        let mut handles = Vec::with_capacity(self.senders.len());
        for sender in &self.senders {
            let sender = Arc::clone(sender);
            let summary = Arc::clone(&summary);
            let spawned = thread::Builder::new()
                .name(format!("notify-{}", sender.name()))
                .spawn(move || match sender.send(&summary) {
                    Ok(()) => log::info!("{} 전송 완료", sender.name()),
                    Err(e) => log::warn!("{} 전송 실패: {e}", sender.name()),
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::warn!("알림 스레드 생성 실패: {e}"),
            }
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.extend(handles);
        }
    }

    /// 아직 끝나지 않은 전송을 기다린다. 프로세스 종료 직전에 호출한다.
    pub fn wait(&self) {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        for handle in handles {
            if handle.join().is_err() {
                log::warn!("알림 스레드가 비정상 종료되었습니다");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.wait();
    }
}
