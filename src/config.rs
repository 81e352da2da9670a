use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::catalog::{BandTable, TablePoint};
use crate::pump::{BaseCurve, CurvePoint, MeasuredCurve, PumpCurveSpec, MAX_SAMPLES};

/// 벨트 1본당 용량을 구하는 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityModel {
    /// 모터 회전수로 속도-용량 표를 선형 보간한다.
    InterpolatedTable,
    /// 고정 기본 용량에 속도비 가산분을 더한다.
    BaseWithAdjustment,
}

/// 설계 계산 상수.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSettings {
    /// 원심 펌프 운전용 사용계수. 기본 1.6, 보수적 대안값 1.4.
    pub service_factor: f64,
    pub capacity_model: CapacityModel,
    /// 피동 풀리 규격 스냅 허용오차(in)
    pub diameter_tolerance_in: f64,
    /// `BaseWithAdjustment` 모델의 기본 용량(HP/벨트)
    pub base_capacity_hp: f64,
    /// `BaseWithAdjustment` 모델의 속도비 가산 용량(HP/벨트)
    pub speed_ratio_adjustment_hp: f64,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            service_factor: 1.6,
            capacity_model: CapacityModel::InterpolatedTable,
            diameter_tolerance_in: 1.0,
            base_capacity_hp: 28.5,
            speed_ratio_adjustment_hp: 0.85,
        }
    }
}

/// 홈 수별 규격 풀리 직경(in).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardPulleys {
    pub channels: u32,
    pub diameters_in: Vec<f64>,
}

/// 설계에 쓰이는 고정 참조표. 프로세스 시작 시 한 번 읽고 이후 변경하지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub standard_pulleys: Vec<StandardPulleys>,
    /// 5V 벨트 용량표. key=모터 rpm, value=HP/벨트
    pub belt_capacity: Vec<TablePoint>,
    /// 규격 벨트 길이(in), 오름차순
    pub belt_lengths_in: Vec<f64>,
    /// 접촉각(°) 보정계수 구간표
    pub angle_factors: BandTable,
    /// 벨트 길이(in) 보정계수 구간표
    pub length_factors: BandTable,
}

impl ReferenceTables {
    /// 홈 수에 해당하는 규격 직경 목록을 찾는다.
    pub fn pulley_diameters(&self, channels: u32) -> Option<&[f64]> {
        self.standard_pulleys
            .iter()
            .find(|p| p.channels == channels)
            .map(|p| p.diameters_in.as_slice())
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        let capacity = [
            (1000.0, 14.0),
            (1200.0, 16.5),
            (1400.0, 19.0),
            (1600.0, 21.5),
            (1750.0, 23.5),
            (1800.0, 24.2),
            (2000.0, 26.5),
        ];
        Self {
            standard_pulleys: vec![StandardPulleys {
                channels: 4,
                diameters_in: vec![7.35, 7.75, 8.35, 8.95, 9.75, 11.35, 12.75],
            }],
            belt_capacity: capacity
                .iter()
                .map(|&(key, value)| TablePoint { key, value })
                .collect(),
            belt_lengths_in: vec![
                90.0, 95.0, 100.0, 106.0, 112.0, 118.0, 125.0, 132.0, 140.0, 150.0,
            ],
            angle_factors: BandTable::new(
                &[(175.0, 1.00), (165.0, 0.98), (154.0, 0.95), (140.0, 0.92)],
                0.88,
            ),
            length_factors: BandTable::new(&[(132.0, 1.05), (106.0, 1.00)], 0.95),
        }
    }
}

/// 펌프 곡선 관련 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpSettings {
    /// 명판 곡선의 교정점
    pub reference: PumpCurveSpec,
    pub base_curve: BaseCurve,
    /// 포물선 곡선 샘플 수(최소 100)
    pub samples: usize,
    /// 차트에 시스템 저항곡선을 함께 그릴지 여부
    pub system_curve: bool,
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self {
            reference: PumpCurveSpec {
                speed_rpm: 2020.0,
                flow_m3h: 88.0,
                head_m: 43.8,
            },
            base_curve: BaseCurve::ShutoffFit { shutoff_ratio: 1.8 },
            samples: 100,
            system_curve: true,
        }
    }
}

/// Warman 4/3 AH 측정 곡선(1600, 2000 rpm). 구간 모드 기본 데이터로 쓴다.
pub fn warman_measured_curves() -> Vec<MeasuredCurve> {
    let pts = |raw: &[(f64, f64)]| {
        raw.iter()
            .map(|&(flow, head)| CurvePoint { flow, head })
            .collect::<Vec<_>>()
    };
    vec![
        MeasuredCurve {
            speed_rpm: 1600.0,
            points: pts(&[
                (0.0, 31.0),
                (50.0, 29.0),
                (100.0, 25.0),
                (150.0, 18.0),
                (200.0, 8.0),
            ]),
        },
        MeasuredCurve {
            speed_rpm: 2000.0,
            points: pts(&[
                (0.0, 51.0),
                (50.0, 49.0),
                (100.0, 45.0),
                (150.0, 38.0),
                (200.0, 29.0),
                (250.0, 18.0),
            ]),
        },
    ]
}

/// 차트 출력 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSettings {
    pub width_px: u32,
    pub height_px: u32,
    /// 운전 속도와 함께 비교용으로 그릴 속도들(rpm)
    pub reference_speeds: Vec<f64>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width_px: 1000,
            height_px: 600,
            reference_speeds: vec![2000.0, 1600.0],
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub design: DesignSettings,
    pub tables: ReferenceTables,
    pub pump: PumpSettings,
    pub chart: ChartSettings,
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("잘못된 설정: {0}")]
    Invalid(String),
}

impl Config {
    /// 참조표와 상수가 계산에 쓸 수 있는 상태인지 확인한다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.design;
        if !(d.service_factor > 0.0) {
            return Err(ConfigError::Invalid("service_factor must be > 0".into()));
        }
        if !(d.diameter_tolerance_in >= 0.0) {
            return Err(ConfigError::Invalid(
                "diameter_tolerance_in must be >= 0".into(),
            ));
        }
        if d.capacity_model == CapacityModel::BaseWithAdjustment
            && !(d.base_capacity_hp + d.speed_ratio_adjustment_hp > 0.0)
        {
            return Err(ConfigError::Invalid(
                "base belt capacity must be > 0".into(),
            ));
        }

        let t = &self.tables;
        if t.standard_pulleys.iter().any(|p| p.diameters_in.is_empty()) {
            return Err(ConfigError::Invalid(
                "standard pulley list must not be empty".into(),
            ));
        }
        if t.belt_lengths_in.is_empty() {
            return Err(ConfigError::Invalid("belt_lengths_in is empty".into()));
        }
        if t.belt_capacity.is_empty() {
            return Err(ConfigError::Invalid("belt_capacity is empty".into()));
        }
        if !t.belt_capacity.windows(2).all(|w| w[0].key < w[1].key) {
            return Err(ConfigError::Invalid(
                "belt_capacity keys must be strictly ascending".into(),
            ));
        }
        if t.belt_capacity.iter().any(|p| !(p.value > 0.0)) {
            return Err(ConfigError::Invalid(
                "belt_capacity values must be > 0".into(),
            ));
        }
        if !t.angle_factors.is_ordered() || !t.length_factors.is_ordered() {
            return Err(ConfigError::Invalid(
                "factor bands must be in descending threshold order".into(),
            ));
        }

        let r = &self.pump.reference;
        if !(r.speed_rpm > 0.0 && r.flow_m3h > 0.0 && r.head_m > 0.0) {
            return Err(ConfigError::Invalid(
                "pump reference point must be positive".into(),
            ));
        }
        if self.pump.samples > MAX_SAMPLES {
            return Err(ConfigError::Invalid(format!(
                "pump.samples must be <= {MAX_SAMPLES}, got {}",
                self.pump.samples
            )));
        }
        if self.chart.width_px < 64 || self.chart.height_px < 64 {
            return Err(ConfigError::Invalid("chart is too small".into()));
        }
        Ok(())
    }

    /// 설정을 지정한 경로에 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        info!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save(path)?;
        info!(path = %path.display(), "wrote default configuration");
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().expect("defaults");
    }

    #[test]
    fn four_channel_pulleys_present() {
        let t = ReferenceTables::default();
        assert_eq!(t.pulley_diameters(4).map(|d| d.len()), Some(7));
        assert!(t.pulley_diameters(3).is_none());
    }

    #[test]
    fn oversized_sample_count_rejected() {
        let mut cfg = Config::default();
        cfg.pump.samples = MAX_SAMPLES;
        assert!(cfg.validate().is_ok());
        cfg.pump.samples = MAX_SAMPLES + 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_bands_bucket_exact_boundaries() {
        let t = ReferenceTables::default();
        let angle = |deg: f64| t.angle_factors.lookup(deg);
        assert_eq!(angle(180.0), 1.0);
        assert_eq!(angle(175.0), 0.98);
        assert_eq!(angle(165.0), 0.95);
        assert_eq!(angle(154.0), 0.92);
        assert_eq!(angle(140.0), 0.88);
        assert_eq!(angle(175.01), 1.0);
        assert_eq!(angle(140.01), 0.92);

        let length = |inches: f64| t.length_factors.lookup(inches);
        assert_eq!(length(140.0), 1.05);
        assert_eq!(length(132.0), 1.0);
        assert_eq!(length(106.0), 0.95);
        assert_eq!(length(106.5), 1.0);
    }

    #[test]
    fn invalid_config_message() {
        let err = ConfigError::Invalid("belt_lengths_in is empty".into());
        assert_eq!(err.to_string(), "잘못된 설정: belt_lengths_in is empty");
    }

    #[test]
    fn unsorted_capacity_rejected() {
        let mut cfg = Config::default();
        cfg.tables.belt_capacity.swap(0, 1);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
