use std::path::Path;
use thiserror::Error;

use crate::chart::ChartError;
use crate::config::{Config, ConfigError};
use crate::pump::CurveError;
use crate::transmission::DesignError;
use crate::ui_cli::{self, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    #[error("벨트 전동 설계 오류: {0}")]
    Design(#[from] DesignError),
    #[error("펌프 곡선 계산 오류: {0}")]
    Curve(#[from] CurveError),
    #[error("차트 오류: {0}")]
    Chart(#[from] ChartError),
    #[error("JSON 출력 오류: {0}")]
    Json(#[from] serde_json::Error),
}

/// 대화형 CLI의 메인 루프를 실행한다. 설정을 바꾸면 `config_path`에 저장한다.
pub fn run(config: &mut Config, config_path: &Path) -> Result<(), AppError> {
    loop {
        match ui_cli::main_menu()? {
            MenuChoice::Transmission => ui_cli::handle_transmission(config)?,
            MenuChoice::PumpCurve => ui_cli::handle_pump_curve(config)?,
            MenuChoice::Chart => ui_cli::handle_chart(config)?,
            MenuChoice::Settings => {
                if ui_cli::handle_settings(config)? {
                    config.save(config_path)?;
                }
            }
            MenuChoice::Exit => {
                println!("종료합니다.");
                break;
            }
        }
    }
    Ok(())
}
