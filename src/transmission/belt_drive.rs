//! 모터-펌프 간 5V 벨트 전동 설계.
//!
//! Mott의 벨트 설계 절차를 따른다: 속도비로 피동 풀리 직경을 구해 규격에 맞추고,
//! 벨트 길이와 실제 축간거리, 접촉각을 계산한 뒤 보정된 벨트 용량으로 본수와
//! 안전율을 정한다.

use serde::Serialize;
use std::f64::consts::PI;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{interpolate_clamped, nearest, nearest_within_tolerance, round_to};
use crate::config::{CapacityModel, Config, DesignSettings, ReferenceTables};

/// mm → in
pub const MM_PER_INCH: f64 = 25.4;

/// 벨트 설계 계산 오류.
#[derive(Debug, Error, PartialEq)]
pub enum DesignError {
    #[error("invalid input ({field}): {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

/// 벨트 설계 입력.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransmissionInput {
    /// 모터 회전수(rpm)
    pub motor_speed_rpm: f64,
    /// 목표 펌프 회전수(rpm)
    pub pump_speed_rpm: f64,
    /// 모터 출력(HP)
    pub motor_power_hp: f64,
    /// 구동(모터) 풀리 직경(in)
    pub motor_pulley_in: f64,
    /// 축간거리(mm)
    pub center_distance_mm: f64,
    /// 구동 풀리 홈 수
    pub channel_count: u32,
}

impl Default for TransmissionInput {
    fn default() -> Self {
        Self {
            motor_speed_rpm: 1800.0,
            pump_speed_rpm: 1600.0,
            motor_power_hp: 75.0,
            motor_pulley_in: 8.95,
            center_distance_mm: 620.0,
            channel_count: 4,
        }
    }
}

impl TransmissionInput {
    fn validate(&self) -> Result<(), DesignError> {
        let fields = [
            ("motor_speed_rpm", self.motor_speed_rpm),
            ("pump_speed_rpm", self.pump_speed_rpm),
            ("motor_power_hp", self.motor_power_hp),
            ("motor_pulley_in", self.motor_pulley_in),
            ("center_distance_mm", self.center_distance_mm),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(DesignError::InvalidInput {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if self.channel_count == 0 {
            return Err(DesignError::InvalidInput {
                field: "channel_count",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// 형상 보정 중 근사값으로 대체한 항목.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Approximations {
    /// 축간거리 역산의 판별식이 음수여서 초기 축간거리를 사용함
    pub center_distance_fallback: bool,
    /// arcsin 인자가 [-1, 1]을 벗어나 접촉각을 180°로 둠
    pub contact_angle_fallback: bool,
}

impl Approximations {
    pub fn any(&self) -> bool {
        self.center_distance_fallback || self.contact_angle_fallback
    }
}

/// 벨트 설계 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransmissionResult {
    pub speed_ratio: f64,
    /// 속도비로 계산한 피동 풀리 직경(in, 소수 둘째 자리)
    pub driven_pulley_raw_in: f64,
    /// 규격 스냅을 거친 피동 풀리 직경(in)
    pub driven_pulley_in: f64,
    pub design_power_hp: f64,
    /// 초기 축간거리(in)
    pub center_distance_in: f64,
    /// 계산 벨트 길이(in, 소수 둘째 자리)
    pub raw_belt_length_in: f64,
    /// 선정 규격 벨트 길이(in)
    pub belt_length_in: f64,
    /// 규격 벨트 기준 실제 축간거리(in)
    pub corrected_center_distance_in: f64,
    /// 소풀리 접촉각(°)
    pub contact_angle_deg: f64,
    pub angle_factor: f64,
    pub length_factor: f64,
    /// 보정 전 벨트 1본 용량(HP)
    pub base_capacity_per_belt_hp: f64,
    /// 보정 후 벨트 1본 용량(HP)
    pub capacity_per_belt_hp: f64,
    pub belt_count: u32,
    /// 선정 본수의 총 용량(HP)
    pub total_capacity_hp: f64,
    pub safety_factor: f64,
    pub channel_count: u32,
    /// 필요 본수가 구동 풀리 홈 수 이내인지 여부
    pub fits_driver_pulley: bool,
    pub approximations: Approximations,
}

/// 참조표와 설계 상수를 빌려 벨트 전동을 설계한다.
#[derive(Debug, Clone, Copy)]
pub struct TransmissionDesigner<'a> {
    settings: &'a DesignSettings,
    tables: &'a ReferenceTables,
}

impl<'a> TransmissionDesigner<'a> {
    pub fn new(settings: &'a DesignSettings, tables: &'a ReferenceTables) -> Self {
        Self { settings, tables }
    }

    pub fn from_config(cfg: &'a Config) -> Self {
        Self::new(&cfg.design, &cfg.tables)
    }

    pub fn service_factor(&self) -> f64 {
        self.settings.service_factor
    }

    /// 입력으로부터 풀리, 벨트, 본수, 안전율을 계산한다.
    pub fn design(&self, input: &TransmissionInput) -> Result<TransmissionResult, DesignError> {
        input.validate()?;
        let standard = self
            .tables
            .pulley_diameters(input.channel_count)
            .ok_or_else(|| DesignError::InvalidInput {
                field: "channel_count",
                reason: format!("no standard pulley table for {} channels", input.channel_count),
            })?;

        let d_driver = input.motor_pulley_in;
        let speed_ratio = input.motor_speed_rpm / input.pump_speed_rpm;
        let driven_raw = round_to(d_driver * speed_ratio, 2);
        let d_driven =
            nearest_within_tolerance(standard, driven_raw, self.settings.diameter_tolerance_in);
        debug!(speed_ratio, driven_raw, d_driven, "driven pulley selected");

        // 벨트 길이 (Mott 근사식)
        let c = input.center_distance_mm / MM_PER_INCH;
        let raw_length = round_to(belt_length(c, d_driver, d_driven), 2);
        let belt_length_in =
            nearest(&self.tables.belt_lengths_in, raw_length).ok_or_else(|| {
                DesignError::InvalidInput {
                    field: "belt_lengths_in",
                    reason: "standard belt length table is empty".into(),
                }
            })?;
        debug!(raw_length, belt_length_in, "belt length selected");

        let mut approximations = Approximations::default();
        let corrected_c = match corrected_center_distance(belt_length_in, d_driver, d_driven) {
            Some(c_real) => c_real,
            None => {
                warn!(belt_length_in, d_driver, d_driven, "negative discriminant, keeping initial center distance");
                approximations.center_distance_fallback = true;
                c
            }
        };
        let contact_angle_deg = match contact_angle_deg(d_driver, d_driven, corrected_c) {
            Some(theta) => theta,
            None => {
                warn!(corrected_c, d_driver, d_driven, "arcsine out of range, assuming 180 degree wrap");
                approximations.contact_angle_fallback = true;
                180.0
            }
        };

        let angle_factor = self.tables.angle_factors.lookup(contact_angle_deg);
        let length_factor = self.tables.length_factors.lookup(belt_length_in);
        let design_power_hp = input.motor_power_hp * self.service_factor_checked()?;

        let base_capacity = self.base_capacity(input.motor_speed_rpm)?;
        let capacity_per_belt = base_capacity * angle_factor * length_factor;
        if !(capacity_per_belt.is_finite() && capacity_per_belt > 0.0) {
            return Err(DesignError::InvalidInput {
                field: "capacity_per_belt_hp",
                reason: format!("corrected belt capacity must be > 0, got {capacity_per_belt}"),
            });
        }
        let belts = (design_power_hp / capacity_per_belt).ceil().max(1.0);
        if !(belts <= f64::from(u32::MAX)) {
            return Err(DesignError::InvalidInput {
                field: "motor_power_hp",
                reason: format!("{belts:e} belts required, power is out of range"),
            });
        }
        let belt_count = belts as u32;
        let total_capacity = f64::from(belt_count) * capacity_per_belt;
        let safety_factor = round_to(total_capacity / design_power_hp, 2);

        info!(
            belt_count,
            safety_factor,
            fallback = approximations.any(),
            "transmission designed"
        );
        Ok(TransmissionResult {
            speed_ratio,
            driven_pulley_raw_in: driven_raw,
            driven_pulley_in: d_driven,
            design_power_hp,
            center_distance_in: c,
            raw_belt_length_in: raw_length,
            belt_length_in,
            corrected_center_distance_in: corrected_c,
            contact_angle_deg,
            angle_factor,
            length_factor,
            base_capacity_per_belt_hp: base_capacity,
            capacity_per_belt_hp: capacity_per_belt,
            belt_count,
            total_capacity_hp: total_capacity,
            safety_factor,
            channel_count: input.channel_count,
            fits_driver_pulley: belt_count <= input.channel_count,
            approximations,
        })
    }

    fn service_factor_checked(&self) -> Result<f64, DesignError> {
        let sf = self.settings.service_factor;
        if sf.is_finite() && sf > 0.0 {
            Ok(sf)
        } else {
            Err(DesignError::InvalidInput {
                field: "service_factor",
                reason: format!("must be finite and > 0, got {sf}"),
            })
        }
    }

    fn base_capacity(&self, motor_speed_rpm: f64) -> Result<f64, DesignError> {
        match self.settings.capacity_model {
            CapacityModel::InterpolatedTable => {
                interpolate_clamped(&self.tables.belt_capacity, motor_speed_rpm).ok_or_else(|| {
                    DesignError::InvalidInput {
                        field: "belt_capacity",
                        reason: "belt capacity table is empty".into(),
                    }
                })
            }
            CapacityModel::BaseWithAdjustment => {
                Ok(self.settings.base_capacity_hp + self.settings.speed_ratio_adjustment_hp)
            }
        }
    }
}

/// L = 2C + (π/2)(D + d) + (D - d)² / 4C
pub fn belt_length(center_in: f64, d_driver: f64, d_driven: f64) -> f64 {
    2.0 * center_in
        + (PI / 2.0) * (d_driver + d_driven)
        + (d_driver - d_driven).powi(2) / (4.0 * center_in)
}

/// 규격 벨트 길이로부터 실제 축간거리를 역산한다. 판별식이 음수면 `None`.
pub fn corrected_center_distance(belt_length_in: f64, d_driver: f64, d_driven: f64) -> Option<f64> {
    let b = 4.0 * belt_length_in - 6.28 * (d_driven + d_driver);
    let disc = b * b - 32.0 * (d_driven - d_driver).powi(2);
    if disc < 0.0 {
        return None;
    }
    Some((b + disc.sqrt()) / 16.0)
}

/// 구동 풀리 접촉각(°). 증속이면 180°를 넘는다. arcsin 인자가 정의역을 벗어나면 `None`.
pub fn contact_angle_deg(d_driver: f64, d_driven: f64, center_in: f64) -> Option<f64> {
    let arg = (d_driven - d_driver) / (2.0 * center_in);
    if !(-1.0..=1.0).contains(&arg) {
        return None;
    }
    Some((PI - 2.0 * arg.asin()).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_pulleys_wrap_half_turn() {
        assert_eq!(contact_angle_deg(8.95, 8.95, 30.0), Some(180.0));
        assert!(corrected_center_distance(90.0, 8.95, 8.95).is_some());
    }

    #[test]
    fn arcsine_domain_guard() {
        assert_eq!(contact_angle_deg(8.0, 20.0, 5.0), None);
        assert_eq!(contact_angle_deg(20.0, 8.0, 5.0), None);
        assert!(contact_angle_deg(8.0, 20.0, 6.0).is_some());
    }

    #[test]
    fn speed_up_wraps_more_than_half_turn() {
        let down = contact_angle_deg(8.0, 12.0, 30.0).unwrap();
        let up = contact_angle_deg(12.0, 8.0, 30.0).unwrap();
        assert!(down < 180.0 && up > 180.0);
        assert!((down + up - 360.0).abs() < 1e-9);
    }

    #[test]
    fn reference_belt_length() {
        let c = 620.0 / MM_PER_INCH;
        assert_eq!(round_to(belt_length(c, 8.95, 9.75), 2), 78.2);
    }

    #[test]
    fn zero_channel_rejected() {
        let cfg = Config::default();
        let input = TransmissionInput {
            channel_count: 0,
            ..TransmissionInput::default()
        };
        let err = TransmissionDesigner::from_config(&cfg).design(&input).unwrap_err();
        assert!(matches!(err, DesignError::InvalidInput { field: "channel_count", .. }));
    }
}
