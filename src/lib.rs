//! 모터-펌프 벨트 전동 설계와 펌프 성능곡선 환산을 라이브러리로 분리하여
//! CLI와 GUI가 같은 계산 로직을 쓰도록 한다.

pub mod app;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod logging;
pub mod pump;
pub mod transmission;
pub mod ui_cli;
