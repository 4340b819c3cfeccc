//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{build_backtest_config, report_charts};
use crate::domain::error::StraddleError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "straddle", about = "Intraday straddle backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Price CSV; overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Directory for tables and charts; overrides [report] output_dir
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        no_charts: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the extent of a price file
    Info {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            output_dir,
            no_charts,
            dry_run,
        } => run_backtest(
            config.as_deref(),
            data.as_deref(),
            output_dir.as_deref(),
            no_charts,
            dry_run,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data, config } => run_info(data.as_deref(), config.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Load the INI file when given, otherwise an empty config that yields the
/// defaults everywhere.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, StraddleError> {
    match path {
        Some(p) => {
            info!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn resolve_data_path(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, StraddleError> {
    if let Some(p) = data_override {
        return Ok(p.to_path_buf());
    }
    config
        .get_string("data", "path")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| StraddleError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })
}

pub fn resolve_output_dir(output_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_backtest(
    config_path: Option<&Path>,
    data_override: Option<&Path>,
    output_override: Option<&Path>,
    no_charts: bool,
    dry_run: bool,
) -> Result<(), StraddleError> {
    // Stage 1: configuration
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter)?;
    let data_path = resolve_data_path(data_override, &adapter)?;
    let output_dir = resolve_output_dir(output_override, &adapter);
    let charts = !no_charts && report_charts(&adapter)?;

    if dry_run {
        println!("{}", format_config(&bt_config, &data_path, &output_dir, charts));
        println!("Dry run complete: configuration is valid");
        return Ok(());
    }

    // Stages 2-4: load, simulate, report
    let data_port = CsvAdapter::new(data_path);
    let report_port = CsvReportAdapter::new(charts);
    let result = run_backtest_pipeline(&data_port, &report_port, &bt_config, &output_dir)?;

    // Stage 5: console summary
    print!("{}", format_summary(&result, bt_config.initial_capital));
    Ok(())
}

/// Load bars, run the simulation and persist the results.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    config: &BacktestConfig,
    output_dir: &Path,
) -> Result<BacktestResult, StraddleError> {
    let bars = data_port.fetch_bars(config.start_date, config.end_date)?;
    if bars.is_empty() {
        return Err(StraddleError::NoData {
            path: data_port.source_name(),
        });
    }
    info!("Loaded {} bars from {}", bars.len(), data_port.source_name());

    let result = backtest_engine::run_backtest(&bars, config);
    report_port.write(&result, output_dir)?;
    Ok(result)
}

pub fn format_config(config: &BacktestConfig, data: &Path, output_dir: &Path, charts: bool) -> String {
    let mut lines = vec![
        format!("Data:              {}", data.display()),
        format!("Output dir:        {}", output_dir.display()),
        format!("Charts:            {}", if charts { "yes" } else { "no" }),
        format!("Initial capital:   {:.2}", config.initial_capital),
        format!("Lot size:          {}", config.costs.lot_size),
        format!("Charges per trade: {:.2}", config.costs.charges_per_trade),
        format!("Slippage:          {:.4}%", config.costs.slippage * 100.0),
        format!("Entry time:        {}", config.strategy.entry_time.format("%H:%M:%S")),
        format!("Stop offset:       {}", config.strategy.stop_offset),
        format!("Session close:     {}", config.strategy.session_close.format("%H:%M:%S")),
        format!("End of data:       {}", config.strategy.end_of_data),
    ];
    if let Some(d) = config.start_date {
        lines.push(format!("Start date:        {d}"));
    }
    if let Some(d) = config.end_date {
        lines.push(format!("End date:          {d}"));
    }
    lines.join("\n")
}

pub fn format_summary(result: &BacktestResult, initial_capital: f64) -> String {
    let s = &result.summary;
    let mut out = String::new();

    out.push_str("Overall Strategy Performance:\n");
    out.push_str(&format!("Total Trades: {}\n", s.total_trades));
    out.push_str(&format!("Total P&L: {:.2}\n", s.total_pnl));
    out.push_str(&format!("Final Balance: {:.2}\n", s.final_balance));
    out.push_str(&format!("Overall Return %: {:.2}%\n", s.overall_return_pct));
    out.push_str(&format!(
        "Win Rate: {:.1}% ({} won, {} lost, {} flat)\n",
        s.win_rate * 100.0,
        s.winning_trades,
        s.losing_trades,
        s.breakeven_trades
    ));
    out.push_str(&format!(
        "Average Trade: {:.2} (largest win {:.2}, largest loss {:.2})\n",
        s.average_trade_pnl, s.largest_win, s.largest_loss
    ));
    out.push_str(&format!(
        "Exits: {} stop-loss, {} session close, {} end of data\n",
        s.stop_loss_exits, s.session_close_exits, s.end_of_data_exits
    ));
    out.push_str(&format!(
        "Trading Days: {} ({} without an entry bar)\n",
        s.trading_days, s.skipped_days
    ));

    out.push_str("\nMonthly Returns:\n");
    out.push_str(&format!(
        "{:>8} {:>12} {:>16} {:>9} {:>20}\n",
        "Month", "Trade_PnL", "Account_Balance", "Return_%", "Cumulative_Return_%"
    ));
    for m in &result.monthly {
        out.push_str(&format!(
            "{:>8} {:>12.2} {:>16.2} {:>9.2} {:>20.2}\n",
            m.month.to_string(),
            m.trade_pnl,
            m.account_balance,
            m.return_pct,
            m.cumulative_return_pct
        ));
    }

    out.push_str(&format!("\nMax Drawdown: {:.2}%\n", s.max_drawdown_pct));
    out.push_str(&format!("Initial Capital: {:.2}\n", initial_capital));
    out
}

fn run_validate(config_path: &Path) -> Result<(), StraddleError> {
    let adapter = load_config(Some(config_path))?;
    let bt_config = build_backtest_config(&adapter)?;
    let data = resolve_data_path(None, &adapter).unwrap_or_else(|_| PathBuf::from("<unset>"));
    let output_dir = resolve_output_dir(None, &adapter);
    let charts = report_charts(&adapter)?;

    println!("{}", format_config(&bt_config, &data, &output_dir, charts));
    println!("Configuration is valid.");
    Ok(())
}

fn run_info(data_override: Option<&Path>, config_path: Option<&Path>) -> Result<(), StraddleError> {
    let adapter = load_config(config_path)?;
    let data_path = resolve_data_path(data_override, &adapter)?;
    let data_port = CsvAdapter::new(data_path);

    match data_port.get_data_range()? {
        Some(range) => {
            println!(
                "{}: {} bars over {} trading days, {} to {}",
                data_port.path().display(),
                range.bars,
                range.trading_days,
                range.first,
                range.last
            );
            Ok(())
        }
        None => Err(StraddleError::NoData {
            path: data_port.source_name(),
        }),
    }
}
