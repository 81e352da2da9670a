//! 상사법칙 곡선 환산 테스트.
use proptest::prelude::*;
use pump_drive_toolbox::config::{warman_measured_curves, Config};
use pump_drive_toolbox::pump::{system_curve, BaseCurve, CurveError, CurveScaler, PumpCurveSpec};

fn reference() -> PumpCurveSpec {
    Config::default().pump.reference
}

#[test]
fn scaling_to_reference_speed_is_identity() {
    let r = reference();
    let base = BaseCurve::ShutoffFit { shutoff_ratio: 1.8 };
    let curve = CurveScaler::new(&r, &base, 100).scale(r.speed_rpm).unwrap();
    assert_eq!(curve.operating_point.flow, r.flow_m3h);
    assert_eq!(curve.operating_point.head, r.head_m);
}

#[test]
fn operating_point_at_1600_rpm() {
    let cfg = Config::default();
    let op = CurveScaler::from_config(&cfg).operating_point(1600.0).unwrap();
    assert!((op.flow - 69.703).abs() < 1e-3, "Q={}", op.flow);
    assert!((op.head - 27.480).abs() < 1e-3, "H={}", op.head);
}

#[test]
fn parabolic_curve_is_sorted_and_dense() {
    let cfg = Config::default();
    let curve = CurveScaler::from_config(&cfg).scale(1600.0).unwrap();
    assert!(curve.points.len() >= 100);
    assert!(curve.points.windows(2).all(|w| w[0].flow < w[1].flow));
    // 체절점에서 최고 양정
    let shutoff = curve.points[0];
    assert_eq!(shutoff.flow, 0.0);
    assert!(curve.points.iter().all(|p| p.head <= shutoff.head));
}

#[test]
fn piecewise_uses_nearest_measured_speed() {
    let r = reference();
    let base = BaseCurve::Piecewise {
        curves: warman_measured_curves(),
    };
    let scaler = CurveScaler::new(&r, &base, 100);

    // 1600 rpm 측정 곡선 그대로
    let at_1600 = scaler.scale(1600.0).unwrap();
    assert_eq!(at_1600.points.len(), 5);
    assert_eq!(at_1600.points[0].head, 31.0);

    // 1900 rpm은 2000 rpm 곡선 기준으로 환산
    let at_1900 = scaler.scale(1900.0).unwrap();
    assert_eq!(at_1900.points.len(), 6);
    let k = 1900.0 / 2000.0;
    assert!((at_1900.points[1].flow - 50.0 * k).abs() < 1e-9);
    assert!((at_1900.points[1].head - 49.0 * k * k).abs() < 1e-9);

    // 운전점은 교정점 기준
    let op = scaler.operating_point(1900.0).unwrap();
    assert_eq!(at_1900.operating_point, op);
}

#[test]
fn empty_piecewise_rejected() {
    let r = reference();
    let base = BaseCurve::Piecewise { curves: vec![] };
    assert!(CurveScaler::new(&r, &base, 100).scale(1600.0).is_err());
}

#[test]
fn invalid_speeds_rejected() {
    let r = reference();
    let base = BaseCurve::SymmetricParabola;
    let scaler = CurveScaler::new(&r, &base, 100);
    for n in [0.0, -1600.0, f64::NAN] {
        assert!(matches!(
            scaler.scale(n),
            Err(CurveError::InvalidInput { field: "target_speed_rpm", .. })
        ));
    }

    let zero_ref = PumpCurveSpec {
        speed_rpm: 0.0,
        ..r
    };
    assert!(matches!(
        CurveScaler::new(&zero_ref, &base, 100).scale(1600.0),
        Err(CurveError::InvalidInput { field: "reference.speed_rpm", .. })
    ));
}

#[test]
fn family_keeps_request_order() {
    let cfg = Config::default();
    let family = CurveScaler::from_config(&cfg)
        .family(&[2000.0, 1600.0, 1800.0])
        .unwrap();
    let speeds: Vec<f64> = family.iter().map(|c| c.speed_rpm).collect();
    assert_eq!(speeds, vec![2000.0, 1600.0, 1800.0]);
}

#[test]
fn system_curve_crosses_operating_point() {
    let cfg = Config::default();
    let op = CurveScaler::from_config(&cfg).operating_point(1600.0).unwrap();
    let pts = system_curve(op, 2.0 * op.flow, 101).unwrap();
    let mid = pts[50];
    assert!((mid.flow - op.flow).abs() < 1e-9);
    assert!((mid.head - op.head).abs() < 1e-9);
}

proptest! {
    #[test]
    fn operating_point_grows_with_speed(a in 100.0_f64..4000.0, delta in 1.0_f64..1000.0) {
        let cfg = Config::default();
        let scaler = CurveScaler::from_config(&cfg);
        let lo = scaler.operating_point(a).unwrap();
        let hi = scaler.operating_point(a + delta).unwrap();
        prop_assert!(hi.flow > lo.flow);
        prop_assert!(hi.head > lo.head);
    }
}
