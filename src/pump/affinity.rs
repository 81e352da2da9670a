//! 상사법칙(affinity laws)에 의한 펌프 양정-유량 곡선 환산.
//!
//! 유량은 회전수비에 비례하고 양정은 회전수비의 제곱에 비례한다:
//! `Q(n) = Q_ref·(n/n_ref)`, `H(n) = H_ref·(n/n_ref)²`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CurveError;
use crate::catalog::nearest;
use crate::config::Config;

/// 곡선 최소 샘플 수.
pub const MIN_SAMPLES: usize = 100;
/// 곡선 최대 샘플 수.
pub const MAX_SAMPLES: usize = 10_000;

/// 펌프 명판 곡선의 교정점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpCurveSpec {
    pub speed_rpm: f64,
    /// 유량(m³/h)
    pub flow_m3h: f64,
    /// 양정(m)
    pub head_m: f64,
}

/// 유량(m³/h)-양정(m) 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub flow: f64,
    pub head: f64,
}

/// 특정 회전수에서 측정한 곡선.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredCurve {
    pub speed_rpm: f64,
    pub points: Vec<CurvePoint>,
}

/// 기준 곡선 형상.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseCurve {
    /// `H = H_max - k·Q²`, 체절 유량 `Q_max = shutoff_ratio·Q₀`에서 양정 0이 되도록 교정점에 맞춘다.
    ShutoffFit { shutoff_ratio: f64 },
    /// `H = H₀(1 - ((Q-Q₀)/Q₀)²)`
    SymmetricParabola,
    /// 측정 곡선 묶음. 목표 회전수에 가장 가까운 측정 곡선만 환산한다.
    Piecewise { curves: Vec<MeasuredCurve> },
}

/// 목표 회전수로 환산된 곡선과 운전점.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledCurve {
    pub speed_rpm: f64,
    /// 유량 오름차순
    pub points: Vec<CurvePoint>,
    pub operating_point: CurvePoint,
}

/// 교정점과 기준 곡선으로 임의 회전수의 곡선을 만든다.
#[derive(Debug, Clone, Copy)]
pub struct CurveScaler<'a> {
    reference: &'a PumpCurveSpec,
    base: &'a BaseCurve,
    samples: usize,
}

impl<'a> CurveScaler<'a> {
    pub fn new(reference: &'a PumpCurveSpec, base: &'a BaseCurve, samples: usize) -> Self {
        Self {
            reference,
            base,
            samples: samples.clamp(MIN_SAMPLES, MAX_SAMPLES),
        }
    }

    pub fn from_config(cfg: &'a Config) -> Self {
        Self::new(&cfg.pump.reference, &cfg.pump.base_curve, cfg.pump.samples)
    }

    pub fn reference(&self) -> &PumpCurveSpec {
        self.reference
    }

    /// 목표 회전수에서의 운전점.
    pub fn operating_point(&self, target_speed_rpm: f64) -> Result<CurvePoint, CurveError> {
        let ratio = self.speed_ratio(target_speed_rpm)?;
        Ok(CurvePoint {
            flow: self.reference.flow_m3h * ratio,
            head: self.reference.head_m * ratio * ratio,
        })
    }

    /// 목표 회전수의 곡선과 운전점을 만든다.
    pub fn scale(&self, target_speed_rpm: f64) -> Result<ScaledCurve, CurveError> {
        let operating_point = self.operating_point(target_speed_rpm)?;
        let (base_speed, base_points) = self.base_points(target_speed_rpm)?;
        let ratio = target_speed_rpm / base_speed;
        let mut points: Vec<CurvePoint> = base_points
            .iter()
            .map(|p| CurvePoint {
                flow: p.flow * ratio,
                head: p.head * ratio * ratio,
            })
            .collect();
        points.sort_by(|a, b| a.flow.total_cmp(&b.flow));
        debug!(
            target_speed_rpm,
            base_speed,
            samples = points.len(),
            "pump curve scaled"
        );
        Ok(ScaledCurve {
            speed_rpm: target_speed_rpm,
            points,
            operating_point,
        })
    }

    /// 여러 회전수의 곡선을 요청 순서대로 만든다.
    pub fn family(&self, speeds_rpm: &[f64]) -> Result<Vec<ScaledCurve>, CurveError> {
        speeds_rpm.iter().map(|&n| self.scale(n)).collect()
    }

    fn speed_ratio(&self, target_speed_rpm: f64) -> Result<f64, CurveError> {
        if !target_speed_rpm.is_finite() || target_speed_rpm <= 0.0 {
            return Err(CurveError::InvalidInput {
                field: "target_speed_rpm",
                reason: format!("must be a positive number, got {target_speed_rpm}"),
            });
        }
        if !self.reference.speed_rpm.is_finite() || self.reference.speed_rpm <= 0.0 {
            return Err(CurveError::InvalidInput {
                field: "reference.speed_rpm",
                reason: "reference speed must be positive".into(),
            });
        }
        Ok(target_speed_rpm / self.reference.speed_rpm)
    }

    /// 환산 기준이 되는 (회전수, 점들)을 만든다.
    fn base_points(&self, target_speed_rpm: f64) -> Result<(f64, Vec<CurvePoint>), CurveError> {
        let q0 = self.reference.flow_m3h;
        let h0 = self.reference.head_m;
        if !(q0 > 0.0 && h0 > 0.0) {
            return Err(CurveError::InvalidInput {
                field: "reference",
                reason: "reference flow and head must be positive".into(),
            });
        }
        match self.base {
            BaseCurve::ShutoffFit { shutoff_ratio } => {
                if !(*shutoff_ratio > 1.0) {
                    return Err(CurveError::InvalidInput {
                        field: "shutoff_ratio",
                        reason: format!("must be greater than 1, got {shutoff_ratio}"),
                    });
                }
                let q_max = q0 * shutoff_ratio;
                let h_max = h0 / (1.0 - (q0 / q_max).powi(2));
                let k = h_max / (q_max * q_max);
                let points = linspace(0.0, q_max, self.samples)
                    .map(|q| CurvePoint {
                        flow: q,
                        head: h_max - k * q * q,
                    })
                    .collect();
                Ok((self.reference.speed_rpm, points))
            }
            BaseCurve::SymmetricParabola => {
                let points = linspace(0.0, 2.0 * q0, self.samples)
                    .map(|q| CurvePoint {
                        flow: q,
                        head: h0 * (1.0 - ((q - q0) / q0).powi(2)),
                    })
                    .collect();
                Ok((self.reference.speed_rpm, points))
            }
            BaseCurve::Piecewise { curves } => {
                let speeds: Vec<f64> = curves.iter().map(|c| c.speed_rpm).collect();
                let chosen = nearest(&speeds, target_speed_rpm)
                    .and_then(|s| curves.iter().find(|c| c.speed_rpm == s))
                    .ok_or_else(|| CurveError::InvalidInput {
                        field: "base_curve.curves",
                        reason: "no measured curves configured".into(),
                    })?;
                if !(chosen.speed_rpm > 0.0) {
                    return Err(CurveError::InvalidInput {
                        field: "base_curve.curves.speed_rpm",
                        reason: "measured speed must be positive".into(),
                    });
                }
                Ok((chosen.speed_rpm, chosen.points.clone()))
            }
        }
    }
}

/// `[start, end]`을 `n`개 점으로 균등 분할한다.
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| start + step * i as f64)
}
