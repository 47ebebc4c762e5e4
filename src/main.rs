//! CLI entry point for F1 Insights.
//!
//! Loads the race, pit-stop and weather tables once and renders charts,
//! dropdown options, aggregate tables or a full report of every page.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use f1_insights::analyzers::grid_finish::{GridFinishMatrix, GridFinishOptions};
use f1_insights::bindings::{Dashboard, IncidentParams};
use f1_insights::charts::retirements::IncidentMode;
use f1_insights::config::DashboardConfig;
use f1_insights::loader::Dataset;
use f1_insights::output::{print_json, write_json, write_report, write_table};
use f1_insights::pages::build_pages;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "f1_insights")]
#[command(
    about = "Charts and tables about Formula 1 grid positions, retirements and pit stops",
    long_about = None
)]
struct Cli {
    /// JSON config file; every field is optional
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the source CSVs (overrides config and F1_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every page with its default widget values into a directory
    Report {
        #[arg(short, long, default_value = "report")]
        out_dir: PathBuf,
    },
    /// Grid/finish heatmap of one circuit
    Heatmap {
        /// Circuit id, e.g. "monza"
        #[arg(short, long)]
        circuit: Option<String>,

        /// Minimum race slider value (multiplied by the configured step)
        #[arg(short, long)]
        slider: Option<u32>,

        /// Write the chart JSON here instead of logging it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Average placement per driver and per grid position
    Placement {
        #[arg(short, long)]
        min_races: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Incidents per circuit over a range of seasons
    Incidents {
        #[arg(long)]
        start_year: Option<i32>,

        #[arg(long)]
        end_year: Option<i32>,

        #[arg(short, long)]
        min_races: Option<usize>,

        /// "per-race" or "rate"
        #[arg(long, default_value = "per-race")]
        mode: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pit-stop charts for one race and season, or for one driver
    Pitstops {
        #[arg(short, long, conflicts_with = "driver")]
        race: Option<String>,

        #[arg(short, long, requires = "race")]
        year: Option<i32>,

        #[arg(short, long)]
        driver: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List dropdown options
    Options {
        #[arg(value_enum)]
        kind: OptionKind,

        /// Minimum race count for circuits and drivers
        #[arg(short, long)]
        min_races: Option<usize>,
    },
    /// Write the grid/finish counts of a circuit (or all circuits) as CSV
    ExportMatrix {
        #[arg(short, long)]
        circuit: Option<String>,

        #[arg(long, default_value_t = false)]
        completed_only: bool,

        #[arg(short, long, default_value = "grid_finish.csv")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OptionKind {
    Circuits,
    Drivers,
    PitRaces,
    PitDrivers,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/f1_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("f1_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::resolve(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let data = Dataset::load(&config)?;
    let dashboard = Dashboard::new(&data, &config);

    match cli.command {
        Commands::Report { out_dir } => {
            let pages = build_pages(&dashboard);
            let index = write_report(&out_dir, &pages)?;
            info!(index = %index.display(), "Report ready");
        }
        Commands::Heatmap {
            circuit,
            slider,
            output,
        } => {
            let slider = slider.unwrap_or(config.default_circuit_slider);
            let circuit = circuit.unwrap_or_else(|| config.default_circuit.clone());
            let view = dashboard.circuit_heatmap(slider, Some(&circuit));
            if view.selected.as_deref() != Some(circuit.as_str()) {
                warn!(
                    requested = %circuit,
                    selected = ?view.selected,
                    "Circuit below the race threshold, showing fallback"
                );
            }
            emit(&view.chart, output.as_deref())?;
        }
        Commands::Placement { min_races, output } => {
            let min_races = min_races.unwrap_or(config.default_min_races);
            let charts = vec![
                dashboard.driver_placements(min_races),
                dashboard.placement_by_grid(),
            ];
            emit(&charts, output.as_deref())?;
        }
        Commands::Incidents {
            start_year,
            end_year,
            min_races,
            mode,
            output,
        } => {
            let mode: IncidentMode = mode.parse()?;
            let (first, last) = dashboard.year_bounds().unwrap_or((1994, 2024));
            let params = IncidentParams {
                start_year: start_year.unwrap_or(first),
                end_year: end_year.unwrap_or(last),
                min_race_count: min_races.unwrap_or(config.default_incident_min_races),
                mode,
            };
            if params.start_year > params.end_year {
                bail!(
                    "start year {} is after end year {}",
                    params.start_year,
                    params.end_year
                );
            }
            emit(&dashboard.incidents(params), output.as_deref())?;
        }
        Commands::Pitstops {
            race,
            year,
            driver,
            output,
        } => {
            let view = match (race, driver) {
                (Some(race), _) => {
                    let year = match year {
                        Some(year) => Some(year),
                        None => dashboard.pit_year_options(&race).1,
                    };
                    dashboard.pit_race(Some(&race), year)
                }
                (None, Some(driver)) => dashboard.pit_driver(&driver),
                (None, None) => bail!("either --race or --driver is required"),
            };
            for line in &view.info {
                info!("{line}");
            }
            emit(&view.charts, output.as_deref())?;
        }
        Commands::Options { kind, min_races } => {
            let min_races = min_races.unwrap_or(config.default_min_races);
            let options = match kind {
                OptionKind::Circuits => dashboard.circuit_options(min_races),
                OptionKind::Drivers => dashboard.driver_options(min_races),
                OptionKind::PitRaces => dashboard.pit_race_options(),
                OptionKind::PitDrivers => dashboard.pit_driver_options(),
            };
            info!(total = options.len(), "Options listed");
            print_json(&options)?;
        }
        Commands::ExportMatrix {
            circuit,
            completed_only,
            output,
        } => {
            let options = GridFinishOptions {
                ceiling: config.grid_ceiling,
                finish_ceiling: config.finish_ceiling,
                completed_only,
            };
            let rows = data
                .results
                .iter()
                .filter(|r| circuit.as_deref().is_none_or(|c| r.circuit_id == c));
            let matrix = GridFinishMatrix::build(rows, &options);
            write_table(&output, &matrix.cells)?;
            info!(
                cells = matrix.cells.len(),
                output = %output.display(),
                "Grid/finish counts exported"
            );
        }
    }

    Ok(())
}

/// Writes `value` to `output` when given, otherwise logs it.
fn emit<T: serde::Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, value)?;
            info!(path = %path.display(), "Chart written");
            Ok(())
        }
        None => print_json(value),
    }
}
