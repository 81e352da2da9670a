//! 펌프 곡선 차트. 좌표 변환(`PlotFrame`)은 PNG 렌더러와 GUI가 함께 쓴다.

use image::{ImageBuffer, ImageError, Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::pump::{system_curve, CurveError, CurvePoint, CurveScaler};

/// 차트 생성 오류.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("curve error: {0}")]
    Curve(#[from] CurveError),
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    #[error("nothing to plot")]
    Empty,
}

/// 선 스타일.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// 한 개의 곡선.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub points: Vec<CurvePoint>,
    pub color: [u8; 3],
    pub style: LineStyle,
}

/// 차트 전체 데이터.
#[derive(Debug, Clone)]
pub struct PumpChart {
    pub series: Vec<Series>,
    pub operating_point: CurvePoint,
    pub operating_speed_rpm: f64,
}

const PALETTE: [[u8; 3]; 4] = [[31, 119, 180], [214, 39, 40], [148, 103, 189], [140, 86, 75]];
const OPERATING_COLOR: [u8; 3] = [44, 160, 44];
const SYSTEM_COLOR: [u8; 3] = [90, 90, 90];

impl PumpChart {
    /// 비교 회전수 곡선들과 운전 회전수 곡선, 선택적으로 시스템 곡선을 묶는다.
    pub fn build(
        scaler: &CurveScaler<'_>,
        reference_speeds: &[f64],
        operating_speed_rpm: f64,
        with_system_curve: bool,
    ) -> Result<Self, ChartError> {
        let mut series = Vec::new();
        for (i, curve) in scaler.family(reference_speeds)?.into_iter().enumerate() {
            series.push(Series {
                label: format!("{:.0} RPM", curve.speed_rpm),
                points: curve.points,
                color: PALETTE[i % PALETTE.len()],
                style: LineStyle::Solid,
            });
        }
        let operating = scaler.scale(operating_speed_rpm)?;
        let max_flow = operating
            .points
            .iter()
            .chain(series.iter().flat_map(|s| s.points.iter()))
            .map(|p| p.flow)
            .fold(0.0_f64, f64::max);
        if with_system_curve {
            series.push(Series {
                label: "System".into(),
                points: system_curve(operating.operating_point, max_flow, operating.points.len())?,
                color: SYSTEM_COLOR,
                style: LineStyle::Dotted,
            });
        }
        series.push(Series {
            label: format!("{:.0} RPM (operating)", operating_speed_rpm),
            points: operating.points,
            color: OPERATING_COLOR,
            style: LineStyle::Dashed,
        });
        Ok(Self {
            series,
            operating_point: operating.operating_point,
            operating_speed_rpm,
        })
    }

    pub fn frame(&self, width: f32, height: f32) -> Result<PlotFrame, ChartError> {
        let pts = self
            .series
            .iter()
            .flat_map(|s| s.points.iter())
            .chain(std::iter::once(&self.operating_point));
        PlotFrame::fit(pts, width, height).ok_or(ChartError::Empty)
    }

    /// RGB 이미지로 그린다. 글자는 그리지 않는다.
    pub fn render(&self, width: u32, height: u32) -> Result<RgbImage, ChartError> {
        let frame = self.frame(width as f32, height as f32)?;
        let mut img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([255, 255, 255]));

        let (left, top, right, bottom) = frame.plot_rect();
        for x in frame.x_ticks() {
            let (sx, _) = frame.to_screen(x, 0.0);
            draw_line(&mut img, (sx, top), (sx, bottom), [225, 225, 225], LineStyle::Dashed, 1);
        }
        for y in frame.y_ticks() {
            let (_, sy) = frame.to_screen(0.0, y);
            draw_line(&mut img, (left, sy), (right, sy), [225, 225, 225], LineStyle::Dashed, 1);
        }
        draw_line(&mut img, (left, bottom), (right, bottom), [0, 0, 0], LineStyle::Solid, 1);
        draw_line(&mut img, (left, top), (left, bottom), [0, 0, 0], LineStyle::Solid, 1);

        for s in &self.series {
            let screen: Vec<(f32, f32)> = s
                .points
                .iter()
                .filter(|p| p.head >= 0.0)
                .map(|p| frame.to_screen(p.flow, p.head))
                .collect();
            for w in screen.windows(2) {
                draw_line(&mut img, w[0], w[1], s.color, s.style, 2);
            }
        }
        let (ox, oy) = frame.to_screen(self.operating_point.flow, self.operating_point.head);
        fill_circle(&mut img, ox, oy, 6.0, OPERATING_COLOR);
        Ok(img)
    }

    /// PNG 파일로 저장한다.
    pub fn save_png(&self, path: &Path, width: u32, height: u32) -> Result<(), ChartError> {
        let img = self.render(width, height)?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        info!(path = %path.display(), width, height, "chart written");
        Ok(())
    }
}

/// 데이터 좌표(유량, 양정)를 화면 좌표로 옮긴다. 원점은 항상 포함한다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub x_max: f64,
    pub y_max: f64,
    pub x_step: f64,
    pub y_step: f64,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PlotFrame {
    pub fn fit<'p>(
        points: impl IntoIterator<Item = &'p CurvePoint>,
        width: f32,
        height: f32,
    ) -> Option<Self> {
        let (mut x_max, mut y_max) = (0.0_f64, 0.0_f64);
        let mut any = false;
        for p in points {
            if p.flow.is_finite() && p.head.is_finite() {
                x_max = x_max.max(p.flow);
                y_max = y_max.max(p.head);
                any = true;
            }
        }
        if !any || x_max <= 0.0 || y_max <= 0.0 {
            return None;
        }
        let x_step = nice_step(x_max);
        let y_step = nice_step(y_max);
        Some(Self {
            x_max: (x_max / x_step).ceil() * x_step,
            y_max: (y_max * 1.05 / y_step).ceil() * y_step,
            x_step,
            y_step,
            width,
            height,
            margin: (width.min(height) * 0.08).max(8.0),
        })
    }

    /// (left, top, right, bottom)
    pub fn plot_rect(&self) -> (f32, f32, f32, f32) {
        (
            self.margin,
            self.margin,
            self.width - self.margin,
            self.height - self.margin,
        )
    }

    pub fn to_screen(&self, flow: f64, head: f64) -> (f32, f32) {
        let (left, top, right, bottom) = self.plot_rect();
        let x = left + (flow / self.x_max) as f32 * (right - left);
        let y = bottom - (head / self.y_max) as f32 * (bottom - top);
        (x, y)
    }

    pub fn x_ticks(&self) -> Vec<f64> {
        ticks(self.x_max, self.x_step)
    }

    pub fn y_ticks(&self) -> Vec<f64> {
        ticks(self.y_max, self.y_step)
    }
}

/// 1·2·5 계열의 눈금 간격. 대략 5~10칸이 되도록 고른다.
fn nice_step(max: f64) -> f64 {
    let raw = max / 5.0;
    let mag = 10_f64.powi(raw.log10().floor() as i32);
    let norm = raw / mag;
    let factor = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * mag
}

fn ticks(max: f64, step: f64) -> Vec<f64> {
    let n = (max / step).round() as usize;
    (0..=n).map(|i| i as f64 * step).collect()
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn draw_line(
    img: &mut RgbImage,
    from: (f32, f32),
    to: (f32, f32),
    color: [u8; 3],
    style: LineStyle,
    thickness: i64,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let visible = match style {
            LineStyle::Solid => true,
            LineStyle::Dashed => (i / 8) % 2 == 0,
            LineStyle::Dotted => (i / 3) % 2 == 0,
        };
        if !visible {
            continue;
        }
        let t = i as f32 / steps as f32;
        let x = (from.0 + dx * t).round() as i64;
        let y = (from.1 + dy * t).round() as i64;
        for ox in 0..thickness {
            for oy in 0..thickness {
                put(img, x + ox, y + oy, color);
            }
        }
    }
}

fn fill_circle(img: &mut RgbImage, cx: f32, cy: f32, r: f32, color: [u8; 3]) {
    let r_i = r.ceil() as i64;
    let (cx_i, cy_i) = (cx.round() as i64, cy.round() as i64);
    for y in -r_i..=r_i {
        for x in -r_i..=r_i {
            if ((x * x + y * y) as f32) <= r * r {
                put(img, cx_i + x, cy_i + y, color);
            }
        }
    }
}
