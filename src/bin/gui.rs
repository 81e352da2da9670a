#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use pump_drive_toolbox::{
    chart::{LineStyle, PumpChart},
    config::{self, CapacityModel},
    logging,
    pump::{BaseCurve, CurveScaler},
    transmission::{TransmissionDesigner, TransmissionInput, TransmissionResult},
    ui_cli::base_curve_name,
};
use tracing::{error, warn};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<(), eframe::Error> {
    logging::init(false);
    let app_cfg = config::load_or_default(Path::new(CONFIG_PATH)).unwrap_or_else(|e| {
        warn!("config load failed, using defaults: {e}");
        config::Config::default()
    });
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Pump Drive Toolbox",
        options,
        Box::new(move |_cc| Box::new(GuiApp::new(app_cfg))),
    )
}

struct GuiApp {
    config: config::Config,
    input: TransmissionInput,
    design: Result<TransmissionResult, String>,
    chart: Result<PumpChart, String>,
    status: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let mut s = Self {
            config,
            input: TransmissionInput::default(),
            design: Err(String::new()),
            chart: Err(String::new()),
            status: None,
        };
        s.recompute();
        s
    }

    fn recompute(&mut self) {
        self.design = TransmissionDesigner::from_config(&self.config)
            .design(&self.input)
            .map_err(|e| e.to_string());
        let scaler = CurveScaler::from_config(&self.config);
        self.chart = PumpChart::build(
            &scaler,
            &self.config.chart.reference_speeds,
            self.input.pump_speed_rpm,
            self.config.pump.system_curve,
        )
        .map_err(|e| e.to_string());
    }

    fn ui_inputs(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        ui.heading("Input");
        egui::Grid::new("input_grid")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                let mut row = |ui: &mut egui::Ui, label: &str, value: &mut f64, speed: f64, suffix: &str| {
                    ui.label(label);
                    changed |= ui
                        .add(egui::DragValue::new(value).speed(speed).suffix(suffix))
                        .changed();
                    ui.end_row();
                };
                row(ui, "Motor speed", &mut self.input.motor_speed_rpm, 5.0, " rpm");
                row(ui, "Pump speed", &mut self.input.pump_speed_rpm, 5.0, " rpm");
                row(ui, "Motor power", &mut self.input.motor_power_hp, 0.5, " HP");
                row(ui, "Motor pulley", &mut self.input.motor_pulley_in, 0.01, " in");
                row(ui, "Center distance", &mut self.input.center_distance_mm, 1.0, " mm");
                ui.label("Driver grooves");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut self.input.channel_count)
                            .speed(0.1)
                            .clamp_range(1..=16),
                    )
                    .changed();
                ui.end_row();
            });

        ui.separator();
        ui.heading("Settings");
        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Service factor");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut self.config.design.service_factor)
                            .speed(0.05)
                            .clamp_range(0.1..=5.0),
                    )
                    .changed();
                ui.end_row();

                ui.label("Capacity model");
                let model = &mut self.config.design.capacity_model;
                let before = *model;
                egui::ComboBox::from_id_source("capacity_model")
                    .selected_text(match model {
                        CapacityModel::InterpolatedTable => "5V table",
                        CapacityModel::BaseWithAdjustment => "Base + ratio",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(model, CapacityModel::InterpolatedTable, "5V table");
                        ui.selectable_value(model, CapacityModel::BaseWithAdjustment, "Base + ratio");
                    });
                changed |= before != *model;
                ui.end_row();

                ui.label("Base curve");
                let current = base_curve_name(&self.config.pump.base_curve);
                let mut picked: Option<BaseCurve> = None;
                egui::ComboBox::from_id_source("base_curve")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(current == "shutoff fit", "shutoff fit").clicked() {
                            picked = Some(BaseCurve::ShutoffFit { shutoff_ratio: 1.8 });
                        }
                        if ui
                            .selectable_label(current == "symmetric parabola", "symmetric parabola")
                            .clicked()
                        {
                            picked = Some(BaseCurve::SymmetricParabola);
                        }
                        if ui
                            .selectable_label(current == "measured curves", "measured curves")
                            .clicked()
                        {
                            picked = Some(BaseCurve::Piecewise {
                                curves: config::warman_measured_curves(),
                            });
                        }
                    });
                if let Some(curve) = picked {
                    self.config.pump.base_curve = curve;
                    changed = true;
                }
                ui.end_row();

                ui.label("System curve");
                changed |= ui.checkbox(&mut self.config.pump.system_curve, "").changed();
                ui.end_row();
            });
        if ui.button("Save settings").clicked() {
            self.status = Some(match self.config.validate().and_then(|_| self.config.save(Path::new(CONFIG_PATH))) {
                Ok(()) => format!("Saved {CONFIG_PATH}"),
                Err(e) => {
                    error!("settings save failed: {e}");
                    format!("Save failed: {e}")
                }
            });
        }
        changed
    }

    fn ui_results(&self, ui: &mut egui::Ui) {
        ui.heading("Transmission");
        let r = match &self.design {
            Ok(r) => r,
            Err(e) => {
                ui.colored_label(egui::Color32::RED, e.as_str());
                return;
            }
        };
        egui::Grid::new("result_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .striped(true)
            .show(ui, |ui| {
                let mut row = |k: &str, v: String| {
                    ui.label(k);
                    ui.monospace(v);
                    ui.end_row();
                };
                row("Driven pulley", format!("{:.2} in (calc {:.2})", r.driven_pulley_in, r.driven_pulley_raw_in));
                row("Design power", format!("{:.1} HP", r.design_power_hp));
                row("Belt length", format!("5V-{:.0} (calc {:.2} in)", r.belt_length_in, r.raw_belt_length_in));
                row("Center distance", format!("{:.2} in", r.corrected_center_distance_in));
                row("Contact angle", format!("{:.1}°", r.contact_angle_deg));
                row("Cθ / CL", format!("{:.2} / {:.2}", r.angle_factor, r.length_factor));
                row("Capacity / belt", format!("{:.2} HP", r.capacity_per_belt_hp));
                row("Belts", format!("{}", r.belt_count));
                row("Total capacity", format!("{:.1} HP", r.total_capacity_hp));
                row("Safety factor", format!("{:.2}", r.safety_factor));
            });
        if !r.fits_driver_pulley {
            ui.colored_label(
                egui::Color32::from_rgb(200, 120, 0),
                format!("{} belts exceed {} grooves", r.belt_count, r.channel_count),
            );
        }
        if r.approximations.center_distance_fallback {
            ui.small("Center distance correction not solvable; initial value kept.");
        }
        if r.approximations.contact_angle_fallback {
            ui.small("Contact angle out of range; 180° assumed.");
        }
    }

    fn ui_chart(&mut self, ui: &mut egui::Ui) {
        let chart = match &self.chart {
            Ok(c) => c,
            Err(e) => {
                ui.colored_label(egui::Color32::RED, e.as_str());
                return;
            }
        };
        ui.horizontal(|ui| {
            ui.heading("Pump curves");
            let op = chart.operating_point;
            ui.label(format!(
                "operating point {:.1} m³/h, {:.1} m @ {:.0} rpm",
                op.flow, op.head, chart.operating_speed_rpm
            ));
        });
        let mut save_to: Option<PathBuf> = None;
        if ui.button("Save PNG…").clicked() {
            save_to = FileDialog::new()
                .add_filter("PNG", &["png"])
                .set_file_name("pump_curve.png")
                .save_file();
        }
        if let Some(path) = save_to {
            let (w, h) = (self.config.chart.width_px, self.config.chart.height_px);
            self.status = Some(match chart.save_png(&path, w, h) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => format!("Save failed: {e}"),
            });
        }

        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let rect = response.rect;
        let frame = match chart.frame(rect.width(), rect.height()) {
            Ok(f) => f,
            Err(_) => return,
        };
        let to_pos = |flow: f64, head: f64| {
            let (x, y) = frame.to_screen(flow, head);
            rect.min + egui::vec2(x, y)
        };
        let grid = egui::Stroke::new(1.0, egui::Color32::from_gray(70));
        let axis = egui::Stroke::new(1.0, egui::Color32::GRAY);
        let font = egui::FontId::proportional(11.0);
        for x in frame.x_ticks() {
            painter.line_segment([to_pos(x, 0.0), to_pos(x, frame.y_max)], grid);
            painter.text(to_pos(x, 0.0), egui::Align2::CENTER_TOP, format!("{x:.0}"), font.clone(), egui::Color32::GRAY);
        }
        for y in frame.y_ticks() {
            painter.line_segment([to_pos(0.0, y), to_pos(frame.x_max, y)], grid);
            painter.text(to_pos(0.0, y), egui::Align2::RIGHT_CENTER, format!("{y:.0} "), font.clone(), egui::Color32::GRAY);
        }
        painter.line_segment([to_pos(0.0, 0.0), to_pos(frame.x_max, 0.0)], axis);
        painter.line_segment([to_pos(0.0, 0.0), to_pos(0.0, frame.y_max)], axis);

        for (i, s) in chart.series.iter().enumerate() {
            let color = egui::Color32::from_rgb(s.color[0], s.color[1], s.color[2]);
            let stroke = egui::Stroke::new(2.0, color);
            let pts: Vec<egui::Pos2> = s
                .points
                .iter()
                .filter(|p| p.head >= 0.0)
                .map(|p| to_pos(p.flow, p.head))
                .collect();
            match s.style {
                LineStyle::Solid => {
                    painter.add(egui::Shape::line(pts, stroke));
                }
                LineStyle::Dashed => painter.extend(egui::Shape::dashed_line(&pts, stroke, 10.0, 6.0)),
                LineStyle::Dotted => painter.extend(egui::Shape::dashed_line(&pts, stroke, 3.0, 4.0)),
            }
            let legend = rect.right_top() + egui::vec2(-180.0, 10.0 + 16.0 * i as f32);
            painter.text(legend, egui::Align2::LEFT_TOP, &s.label, font.clone(), color);
        }
        let op = chart.operating_point;
        painter.circle_filled(to_pos(op.flow, op.head), 6.0, egui::Color32::from_rgb(44, 160, 44));
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Pump Drive Toolbox");
                ui.label(" | 5V belt drive & pump curves");
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });
        let mut changed = false;
        egui::SidePanel::left("inputs")
            .resizable(false)
            .min_width(300.0)
            .show(ctx, |ui| {
                changed = self.ui_inputs(ui);
                ui.separator();
                self.ui_results(ui);
            });
        if changed {
            self.recompute();
        }
        egui::CentralPanel::default().show(ctx, |ui| self.ui_chart(ui));
    }
}
