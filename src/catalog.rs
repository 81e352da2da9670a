//! 카탈로그 규격값 선택과 구간 조회에 쓰는 공용 도구.
//!
//! 풀리 직경 스냅, 벨트 길이 스냅, 보정계수 구간표, 속도별 벨트 용량 보간이
//! 모두 이 모듈의 함수를 거친다.

use serde::{Deserialize, Serialize};

/// 목표값에 가장 가까운 후보를 찾는다. 거리가 같으면 먼저 나온 후보를 유지한다.
pub fn nearest(candidates: &[f64], target: f64) -> Option<f64> {
    let mut iter = candidates.iter().copied();
    let mut best = iter.next()?;
    for c in iter {
        if (c - target).abs() < (best - target).abs() {
            best = c;
        }
    }
    Some(best)
}

/// 가장 가까운 후보가 허용오차 안(`< tolerance`)이면 후보를, 아니면 목표값을 그대로 돌려준다.
pub fn nearest_within_tolerance(candidates: &[f64], target: f64, tolerance: f64) -> f64 {
    match nearest(candidates, target) {
        Some(c) if (c - target).abs() < tolerance => c,
        _ => target,
    }
}

/// 구간표의 한 줄. `threshold` 초과일 때 `value`가 선택된다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub threshold: f64,
    pub value: f64,
}

/// 임계값 내림차순으로 정렬된 구간표.
///
/// 하한은 배타적이다: `lookup(x)`는 `x > threshold`를 만족하는 첫 구간의 값을,
/// 어느 구간에도 속하지 않으면 `fallback`을 돌려준다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<Band>,
    pub fallback: f64,
}

impl BandTable {
    pub fn new(bands: &[(f64, f64)], fallback: f64) -> Self {
        Self {
            bands: bands
                .iter()
                .map(|&(threshold, value)| Band { threshold, value })
                .collect(),
            fallback,
        }
    }

    pub fn lookup(&self, x: f64) -> f64 {
        self.bands
            .iter()
            .find(|b| x > b.threshold)
            .map(|b| b.value)
            .unwrap_or(self.fallback)
    }

    /// 임계값이 엄격한 내림차순인지 확인한다.
    pub fn is_ordered(&self) -> bool {
        self.bands.windows(2).all(|w| w[0].threshold > w[1].threshold)
    }
}

/// 속도-용량처럼 키로 정렬된 표의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TablePoint {
    pub key: f64,
    pub value: f64,
}

/// 키 오름차순 표를 선형 보간한다. 범위 밖은 가장 가까운 끝점 값으로 고정한다(외삽 없음).
pub fn interpolate_clamped(table: &[TablePoint], x: f64) -> Option<f64> {
    let first = table.first()?;
    let last = table.last()?;
    if x <= first.key {
        return Some(first.value);
    }
    if x >= last.key {
        return Some(last.value);
    }
    for w in table.windows(2) {
        let (a, b) = (w[0], w[1]);
        if x >= a.key && x <= b.key {
            let span = b.key - a.key;
            if span.abs() < f64::EPSILON {
                return Some(a.value);
            }
            return Some(a.value + (b.value - a.value) * (x - a.key) / span);
        }
    }
    Some(last.value)
}

/// 소수점 아래 `places` 자리로 반올림한다.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}
