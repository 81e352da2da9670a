//! 벨트 전동 설계 회귀 테스트.
use proptest::prelude::*;
use pump_drive_toolbox::catalog::nearest_within_tolerance;
use pump_drive_toolbox::config::{CapacityModel, Config};
use pump_drive_toolbox::transmission::{DesignError, TransmissionDesigner, TransmissionInput};

fn design(cfg: &Config, input: TransmissionInput) -> pump_drive_toolbox::transmission::TransmissionResult {
    TransmissionDesigner::from_config(cfg)
        .design(&input)
        .expect("design")
}

#[test]
fn reference_motor_pump_pair() {
    let cfg = Config::default();
    let r = design(&cfg, TransmissionInput::default());

    assert_eq!(r.driven_pulley_raw_in, 10.07);
    // 9.75는 10.07에서 1 in 이내
    assert_eq!(r.driven_pulley_in, 9.75);
    assert!((r.design_power_hp - 75.0 * cfg.design.service_factor).abs() < 1e-9);
    assert_eq!(r.raw_belt_length_in, 78.2);
    assert_eq!(r.belt_length_in, 90.0);
    assert!((r.corrected_center_distance_in - 30.3179).abs() < 1e-3);
    assert!((r.contact_angle_deg - 178.488).abs() < 1e-2);
    assert_eq!(r.angle_factor, 1.0);
    assert_eq!(r.length_factor, 0.95);
    assert!((r.base_capacity_per_belt_hp - 24.2).abs() < 1e-9);
    assert!((r.capacity_per_belt_hp - 22.99).abs() < 1e-9);
    assert_eq!(r.belt_count, 6);
    assert_eq!(r.safety_factor, 1.15);
    assert!(!r.fits_driver_pulley);
    assert!(!r.approximations.any());
}

#[test]
fn alternate_service_factor_changes_design_power() {
    let mut cfg = Config::default();
    cfg.design.service_factor = 1.4;
    let r = design(&cfg, TransmissionInput::default());
    assert!((r.design_power_hp - 75.0 * 1.4).abs() < 1e-9);
    assert_eq!(r.belt_count, 5);
    assert_eq!(r.safety_factor, 1.09);
}

#[test]
fn base_with_adjustment_capacity_model() {
    let mut cfg = Config::default();
    cfg.design.capacity_model = CapacityModel::BaseWithAdjustment;
    let r = design(&cfg, TransmissionInput::default());
    assert!((r.base_capacity_per_belt_hp - 29.35).abs() < 1e-9);
    assert_eq!(r.belt_count, 5);
    assert_eq!(r.safety_factor, 1.16);
}

#[test]
fn capacity_clamps_above_table() {
    let cfg = Config::default();
    let r = design(
        &cfg,
        TransmissionInput {
            motor_speed_rpm: 3600.0,
            pump_speed_rpm: 3200.0,
            ..TransmissionInput::default()
        },
    );
    assert_eq!(r.base_capacity_per_belt_hp, 26.5);
}

#[test]
fn large_ratio_keeps_initial_center_distance() {
    let cfg = Config::default();
    let r = design(
        &cfg,
        TransmissionInput {
            motor_speed_rpm: 3000.0,
            pump_speed_rpm: 500.0,
            ..TransmissionInput::default()
        },
    );
    // 규격표에서 1 in 이상 떨어져 계산값 유지
    assert_eq!(r.driven_pulley_in, 53.7);
    assert_eq!(r.belt_length_in, 150.0);
    assert!(r.approximations.center_distance_fallback);
    assert!(!r.approximations.contact_angle_fallback);
    assert_eq!(r.corrected_center_distance_in, r.center_distance_in);
    assert!((r.contact_angle_deg - 47.117).abs() < 1e-2);
    assert_eq!(r.angle_factor, 0.88);
}

#[test]
fn short_center_distance_falls_back_to_half_turn() {
    let cfg = Config::default();
    let r = design(
        &cfg,
        TransmissionInput {
            motor_speed_rpm: 3000.0,
            pump_speed_rpm: 500.0,
            center_distance_mm: 100.0,
            ..TransmissionInput::default()
        },
    );
    assert!(r.approximations.center_distance_fallback);
    assert!(r.approximations.contact_angle_fallback);
    assert_eq!(r.contact_angle_deg, 180.0);
    assert_eq!(r.angle_factor, 1.0);
}

#[test]
fn equal_pulleys_wrap_180_without_fallback() {
    let cfg = Config::default();
    let r = design(
        &cfg,
        TransmissionInput {
            motor_speed_rpm: 1750.0,
            pump_speed_rpm: 1750.0,
            motor_power_hp: 10.0,
            ..TransmissionInput::default()
        },
    );
    assert_eq!(r.driven_pulley_in, r.driven_pulley_raw_in);
    assert_eq!(r.contact_angle_deg, 180.0);
    assert!(!r.approximations.any());
    assert_eq!(r.belt_count, 1);
}

#[test]
fn speed_up_drive_wraps_over_half_turn() {
    let cfg = Config::default();
    let r = design(
        &cfg,
        TransmissionInput {
            motor_speed_rpm: 1200.0,
            pump_speed_rpm: 1800.0,
            ..TransmissionInput::default()
        },
    );
    // 5.97 in은 규격표에서 1 in 이상 떨어져 계산값 유지
    assert_eq!(r.driven_pulley_in, 5.97);
    assert!(!r.approximations.any());
    assert!((r.contact_angle_deg - 185.136).abs() < 1e-2, "θ={}", r.contact_angle_deg);
    assert_eq!(r.angle_factor, 1.0);
    assert_eq!(r.length_factor, 0.95);
    assert_eq!(r.belt_count, 8);
    assert!((r.safety_factor - 1.045).abs() < 0.006, "SF={}", r.safety_factor);
}

#[test]
fn non_positive_service_factor_rejected() {
    for sf in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut cfg = Config::default();
        cfg.design.service_factor = sf;
        let err = TransmissionDesigner::from_config(&cfg)
            .design(&TransmissionInput::default())
            .unwrap_err();
        assert!(
            matches!(err, DesignError::InvalidInput { field: "service_factor", .. }),
            "sf={sf}: {err:?}"
        );
    }
}

#[test]
fn non_positive_belt_capacity_rejected() {
    let mut cfg = Config::default();
    cfg.design.capacity_model = CapacityModel::BaseWithAdjustment;
    cfg.design.base_capacity_hp = -0.85;
    let err = TransmissionDesigner::from_config(&cfg)
        .design(&TransmissionInput::default())
        .unwrap_err();
    assert!(matches!(err, DesignError::InvalidInput { field: "capacity_per_belt_hp", .. }));
}

#[test]
fn belt_count_overflow_rejected() {
    let cfg = Config::default();
    let err = TransmissionDesigner::from_config(&cfg)
        .design(&TransmissionInput {
            motor_power_hp: 1e12,
            ..TransmissionInput::default()
        })
        .unwrap_err();
    assert!(matches!(err, DesignError::InvalidInput { field: "motor_power_hp", .. }));

    // 경계 직전까지는 정상 설계
    let r = design(
        &cfg,
        TransmissionInput {
            motor_power_hp: 1e9,
            ..TransmissionInput::default()
        },
    );
    assert!(r.safety_factor >= 1.0);
}

#[test]
fn non_positive_inputs_rejected() {
    let cfg = Config::default();
    let designer = TransmissionDesigner::from_config(&cfg);
    let cases = [
        ("motor_speed_rpm", TransmissionInput { motor_speed_rpm: 0.0, ..TransmissionInput::default() }),
        ("pump_speed_rpm", TransmissionInput { pump_speed_rpm: -1.0, ..TransmissionInput::default() }),
        ("motor_power_hp", TransmissionInput { motor_power_hp: f64::NAN, ..TransmissionInput::default() }),
        ("motor_pulley_in", TransmissionInput { motor_pulley_in: 0.0, ..TransmissionInput::default() }),
        ("center_distance_mm", TransmissionInput { center_distance_mm: 0.0, ..TransmissionInput::default() }),
    ];
    for (field, input) in cases {
        match designer.design(&input) {
            Err(DesignError::InvalidInput { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected {field} rejection, got {other:?}"),
        }
    }
}

#[test]
fn unknown_channel_count_rejected() {
    let cfg = Config::default();
    let err = TransmissionDesigner::from_config(&cfg)
        .design(&TransmissionInput {
            channel_count: 3,
            ..TransmissionInput::default()
        })
        .unwrap_err();
    assert!(matches!(err, DesignError::InvalidInput { field: "channel_count", .. }));
}

proptest! {
    #[test]
    fn belt_count_and_safety_invariants(
        motor in 900.0_f64..2200.0,
        ratio in 0.5_f64..3.0,
        hp in 1.0_f64..150.0,
        pulley in 4.0_f64..12.0,
        center in 300.0_f64..1500.0,
    ) {
        let cfg = Config::default();
        let input = TransmissionInput {
            motor_speed_rpm: motor,
            pump_speed_rpm: motor / ratio,
            motor_power_hp: hp,
            motor_pulley_in: pulley,
            center_distance_mm: center,
            channel_count: 4,
        };
        let r = TransmissionDesigner::from_config(&cfg).design(&input).unwrap();
        prop_assert!(r.belt_count >= 1);
        prop_assert!(r.safety_factor >= 1.0);
        prop_assert!(cfg.tables.belt_lengths_in.contains(&r.belt_length_in));
        let standard = cfg.tables.pulley_diameters(4).unwrap();
        prop_assert!(standard.contains(&r.driven_pulley_in) || r.driven_pulley_in == r.driven_pulley_raw_in);
    }

    #[test]
    fn snapping_is_idempotent(target in 0.0_f64..20.0, tol in 0.0_f64..3.0) {
        let cfg = Config::default();
        let standard = cfg.tables.pulley_diameters(4).unwrap();
        let once = nearest_within_tolerance(standard, target, tol);
        let twice = nearest_within_tolerance(standard, once, tol);
        prop_assert_eq!(once, twice);
    }
}
