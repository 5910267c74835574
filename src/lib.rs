//! 계산 로직을 라이브러리로 분리하여 CLI 뿐 아니라 추후 다른 프런트엔드도 쉽게 붙인다.

pub mod app;
pub mod catalog;
pub mod config;
pub mod i18n;
pub mod notify;
pub mod recommendation;
pub mod ui_cli;
pub mod wizard;
