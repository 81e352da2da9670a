use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pump_drive_toolbox::{
    app::{self, AppError},
    chart::PumpChart,
    config,
    logging,
    pump::CurveScaler,
    transmission::{TransmissionDesigner, TransmissionInput},
    ui_cli,
};

#[derive(Parser)]
#[command(name = "pump_drive_toolbox_cli")]
#[command(about = "Belt transmission sizing and pump curve scaling", long_about = None)]
struct Cli {
    /// Configuration file (created with defaults when missing)
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Size pulleys and 5V belts between motor and pump
    Design(DesignArgs),
    /// Print the pump curve scaled to a speed
    Curve {
        /// Pump speed [rpm]
        #[arg(long, default_value_t = 1600.0)]
        speed: f64,
        /// Print every point as CSV (flow,head)
        #[arg(long)]
        csv: bool,
    },
    /// Render the pump chart to a PNG file
    Chart {
        /// Operating pump speed [rpm]
        #[arg(long, default_value_t = 1600.0)]
        pump_rpm: f64,
        /// Output PNG path
        #[arg(short, long, default_value = "pump_curve.png")]
        output: PathBuf,
    },
    /// Menu-driven interactive session
    Interactive,
}

#[derive(Args)]
struct DesignArgs {
    /// Motor speed [rpm]
    #[arg(long, default_value_t = 1800.0)]
    motor_rpm: f64,
    /// Desired pump speed [rpm]
    #[arg(long, default_value_t = 1600.0)]
    pump_rpm: f64,
    /// Motor power [HP]
    #[arg(long, default_value_t = 75.0)]
    motor_hp: f64,
    /// Motor pulley diameter [in]
    #[arg(long, default_value_t = 8.95)]
    motor_pulley: f64,
    /// Center distance [mm]
    #[arg(long, default_value_t = 620.0)]
    center_mm: f64,
    /// Grooves on the driver pulley
    #[arg(long, default_value_t = 4)]
    channels: u32,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 요청된 명령을 실행한다.
fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = try_run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = config::load_or_default(&cli.config)?;
    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Design(args) => {
            let input = TransmissionInput {
                motor_speed_rpm: args.motor_rpm,
                pump_speed_rpm: args.pump_rpm,
                motor_power_hp: args.motor_hp,
                motor_pulley_in: args.motor_pulley,
                center_distance_mm: args.center_mm,
                channel_count: args.channels,
            };
            let result = TransmissionDesigner::from_config(&cfg).design(&input)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                ui_cli::print_transmission(&result);
            }
        }
        Commands::Curve { speed, csv } => {
            let curve = CurveScaler::from_config(&cfg).scale(speed)?;
            if csv {
                println!("flow_m3h,head_m");
                for p in &curve.points {
                    println!("{:.3},{:.3}", p.flow, p.head);
                }
            } else {
                ui_cli::print_curve_summary(&curve);
            }
        }
        Commands::Chart { pump_rpm, output } => {
            let scaler = CurveScaler::from_config(&cfg);
            let chart = PumpChart::build(
                &scaler,
                &cfg.chart.reference_speeds,
                pump_rpm,
                cfg.pump.system_curve,
            )?;
            chart.save_png(&output, cfg.chart.width_px, cfg.chart.height_px)?;
            println!("Chart saved to {}", output.display());
        }
        Commands::Interactive => app::run(&mut cfg, &cli.config)?,
    }
    Ok(())
}
