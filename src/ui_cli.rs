use std::fmt::Display;
use std::io::{self, Write};
use std::str::FromStr;
use std::path::PathBuf;

use crate::app::AppError;
use crate::chart::PumpChart;
use crate::config::{self, CapacityModel, Config};
use crate::pump::{BaseCurve, CurveScaler, ScaledCurve};
use crate::transmission::{TransmissionDesigner, TransmissionInput, TransmissionResult};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Transmission,
    PumpCurve,
    Chart,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu() -> Result<MenuChoice, AppError> {
    println!("\n=== Pump Drive Toolbox ===");
    println!("1) 벨트 전동 설계 (5V)");
    println!("2) 회전수별 펌프 곡선");
    println!("3) 펌프 곡선 차트 저장 (PNG)");
    println!("4) 설정");
    println!("0) 종료");
    loop {
        let sel = read_line("선택: ")?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::Transmission),
            "2" => return Ok(MenuChoice::PumpCurve),
            "3" => return Ok(MenuChoice::Chart),
            "4" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("잘못된 입력입니다. 다시 선택하세요."),
        }
    }
}

/// 벨트 설계 메뉴를 처리한다. 빈 입력은 기본값을 쓴다.
pub fn handle_transmission(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- 벨트 전동 설계 --");
    let d = TransmissionInput::default();
    let input = TransmissionInput {
        motor_speed_rpm: read_f64_or("모터 회전수 [rpm]", d.motor_speed_rpm)?,
        pump_speed_rpm: read_f64_or("펌프 회전수 [rpm]", d.pump_speed_rpm)?,
        motor_power_hp: read_f64_or("모터 출력 [HP]", d.motor_power_hp)?,
        motor_pulley_in: read_f64_or("모터 풀리 직경 [in]", d.motor_pulley_in)?,
        center_distance_mm: read_f64_or("축간거리 [mm]", d.center_distance_mm)?,
        channel_count: read_u32_or("모터 풀리 홈 수", d.channel_count)?,
    };
    match TransmissionDesigner::from_config(cfg).design(&input) {
        Ok(result) => print_transmission(&result),
        Err(e) => println!("오류: {e}"),
    }
    Ok(())
}

/// 펌프 곡선 메뉴를 처리한다.
pub fn handle_pump_curve(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- 펌프 곡선 --");
    let speed = read_f64_or("펌프 회전수 [rpm]", 1600.0)?;
    match CurveScaler::from_config(cfg).scale(speed) {
        Ok(curve) => print_curve_summary(&curve),
        Err(e) => println!("오류: {e}"),
    }
    Ok(())
}

/// 차트 PNG 저장 메뉴를 처리한다.
pub fn handle_chart(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- 펌프 곡선 차트 --");
    let speed = read_f64_or("운전 회전수 [rpm]", 1600.0)?;
    let path = read_line("저장 파일 [pump_curve.png]: ")?;
    let path = match path.trim() {
        "" => PathBuf::from("pump_curve.png"),
        p => PathBuf::from(p),
    };
    let scaler = CurveScaler::from_config(cfg);
    let chart = PumpChart::build(
        &scaler,
        &cfg.chart.reference_speeds,
        speed,
        cfg.pump.system_curve,
    )?;
    chart.save_png(&path, cfg.chart.width_px, cfg.chart.height_px)?;
    println!("차트 저장 완료: {}", path.display());
    Ok(())
}

/// 설정 메뉴를 처리한다. 설정이 바뀌었으면 `true`.
pub fn handle_settings(cfg: &mut Config) -> Result<bool, AppError> {
    println!("\n-- 설정 --");
    println!("사용계수: {}", cfg.design.service_factor);
    println!("벨트 용량 모델: {:?}", cfg.design.capacity_model);
    println!("기준 곡선: {}", base_curve_name(&cfg.pump.base_curve));
    println!("1) 사용계수  2) 벨트 용량 모델  3) 기준 곡선");
    let sel = read_line("변경할 항목 (엔터: 취소): ")?;
    match sel.trim() {
        "" => return Ok(false),
        "1" => {
            let sf = read_f64_or("사용계수 (1.4 / 1.6)", cfg.design.service_factor)?;
            if sf <= 0.0 {
                println!("사용계수는 0보다 커야 합니다. 변경하지 않습니다.");
                return Ok(false);
            }
            cfg.design.service_factor = sf;
        }
        "2" => {
            println!("1) 5V 용량표 보간  2) 기본 용량 + 속비 보정");
            cfg.design.capacity_model = match read_line("선택: ")?.trim() {
                "1" => CapacityModel::InterpolatedTable,
                "2" => CapacityModel::BaseWithAdjustment,
                _ => {
                    println!("잘못된 선택입니다. 변경하지 않습니다.");
                    return Ok(false);
                }
            };
        }
        "3" => {
            println!("1) 체절양정 맞춤  2) 대칭 포물선  3) 측정 곡선 (Warman 4/3 AH)");
            cfg.pump.base_curve = match read_line("선택: ")?.trim() {
                "1" => BaseCurve::ShutoffFit { shutoff_ratio: 1.8 },
                "2" => BaseCurve::SymmetricParabola,
                "3" => BaseCurve::Piecewise {
                    curves: config::warman_measured_curves(),
                },
                _ => {
                    println!("잘못된 선택입니다. 변경하지 않습니다.");
                    return Ok(false);
                }
            };
        }
        _ => {
            println!("잘못된 선택입니다. 변경하지 않습니다.");
            return Ok(false);
        }
    }
    println!("설정이 변경되었습니다.");
    Ok(true)
}

pub fn base_curve_name(curve: &BaseCurve) -> &'static str {
    match curve {
        BaseCurve::ShutoffFit { .. } => "shutoff fit",
        BaseCurve::SymmetricParabola => "symmetric parabola",
        BaseCurve::Piecewise { .. } => "measured curves",
    }
}

/// 설계 결과를 표 형태로 출력한다.
pub fn print_transmission(r: &TransmissionResult) {
    println!("속비:              {:.3}", r.speed_ratio);
    println!(
        "펌프 풀리:         {:.2} in (계산값 {:.2} in)",
        r.driven_pulley_in, r.driven_pulley_raw_in
    );
    println!("설계 동력:         {:.1} HP", r.design_power_hp);
    println!(
        "벨트 길이 (5V):    {:.0} in (계산값 {:.2} in)",
        r.belt_length_in, r.raw_belt_length_in
    );
    println!(
        "축간거리:          {:.2} in (초기값 {:.2} in)",
        r.corrected_center_distance_in, r.center_distance_in
    );
    println!("접촉각:            {:.1}°", r.contact_angle_deg);
    println!(
        "보정계수:          Cθ={:.2}  CL={:.2}",
        r.angle_factor, r.length_factor
    );
    println!(
        "벨트당 용량:       {:.2} HP (기본 {:.2} HP)",
        r.capacity_per_belt_hp, r.base_capacity_per_belt_hp
    );
    println!("필요 벨트 수:      {}", r.belt_count);
    println!("총 전달 용량:      {:.1} HP", r.total_capacity_hp);
    println!("안전율:            {:.2}", r.safety_factor);
    if !r.fits_driver_pulley {
        println!(
            "경고: 벨트 {}본이 모터 풀리 홈 수 {}를 초과합니다.",
            r.belt_count, r.channel_count
        );
    }
    if r.approximations.center_distance_fallback {
        println!("참고: 축간거리 보정 불가, 초기값을 사용합니다.");
    }
    if r.approximations.contact_angle_fallback {
        println!("참고: 접촉각 계산 범위 초과, 180°로 가정합니다.");
    }
}

pub fn print_curve_summary(curve: &ScaledCurve) {
    let op = curve.operating_point;
    println!(
        "{:.0} rpm 운전점: Q={:.1} m³/h, H={:.1} m",
        curve.speed_rpm, op.flow, op.head
    );
    if let (Some(first), Some(last)) = (curve.points.first(), curve.points.last()) {
        println!(
            "곡선: {}점, Q {:.1}..{:.1} m³/h, H {:.1}..{:.1} m",
            curve.points.len(),
            first.flow,
            last.flow,
            first.head,
            last.head
        );
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

fn read_f64_or(prompt: &str, default: f64) -> Result<f64, AppError> {
    read_parsed_or(prompt, default, "숫자를 입력하세요.")
}

fn read_u32_or(prompt: &str, default: u32) -> Result<u32, AppError> {
    read_parsed_or(prompt, default, "0 이상의 정수를 입력하세요.")
}

/// 빈 입력이면 기본값, 해석할 수 없으면 다시 묻는다.
fn read_parsed_or<T: FromStr + Display + Copy>(
    prompt: &str,
    default: T,
    retry_hint: &str,
) -> Result<T, AppError> {
    loop {
        let s = read_line(&format!("{prompt} [{default}]: "))?;
        match parse_or(&s, default) {
            Some(v) => return Ok(v),
            None => println!("{retry_hint}"),
        }
    }
}

fn parse_or<T: FromStr>(input: &str, default: T) -> Option<T> {
    let s = input.trim();
    if s.is_empty() {
        return Some(default);
    }
    s.parse().ok()
}
