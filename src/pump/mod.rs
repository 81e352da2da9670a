//! 펌프 성능곡선 환산 모듈 모음.
//! 상사법칙 곡선 환산과 시스템 저항곡선으로 구성한다.

use thiserror::Error;

pub mod affinity;
pub mod system_curve;

pub use affinity::*;
pub use system_curve::system_curve;

/// 곡선 계산 오류.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("invalid input ({field}): {reason}")]
    InvalidInput { field: &'static str, reason: String },
}
