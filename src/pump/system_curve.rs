use super::affinity::{linspace, CurvePoint, MAX_SAMPLES, MIN_SAMPLES};
use super::CurveError;

/// 운전점을 지나는 시스템 저항곡선 `H = k·Q²`를 `[0, max_flow]` 구간에서 만든다.
pub fn system_curve(
    operating_point: CurvePoint,
    max_flow: f64,
    samples: usize,
) -> Result<Vec<CurvePoint>, CurveError> {
    if !(operating_point.flow > 0.0) || !operating_point.head.is_finite() {
        return Err(CurveError::InvalidInput {
            field: "operating_point",
            reason: "operating flow must be positive".into(),
        });
    }
    if !(max_flow > 0.0) || !max_flow.is_finite() {
        return Err(CurveError::InvalidInput {
            field: "max_flow",
            reason: format!("must be a positive number, got {max_flow}"),
        });
    }
    let k = operating_point.head / (operating_point.flow * operating_point.flow);
    Ok(linspace(0.0, max_flow, samples.clamp(MIN_SAMPLES, MAX_SAMPLES))
        .map(|q| CurvePoint {
            flow: q,
            head: k * q * q,
        })
        .collect())
}
