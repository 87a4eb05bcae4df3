// leadmerge - merge per-category lead CSVs into one deduplicated sheet

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use leadmerge_cli::exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_SHEETS_CHECK, EXIT_SUCCESS, EXIT_USAGE};
use leadmerge_cli::pipeline::{self, RunReport, RunStatus};
use leadmerge_cli::verify::{self, VerifyReport};
use leadmerge_config::{Mode, RunConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leadmerge")]
#[command(about = "Merge lead CSV exports into one deduplicated Excel file or Google Sheet")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    merge: MergeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every data/<category>/*.csv into the output (default)
    #[command(after_help = "\
Examples:
  leadmerge
  leadmerge --mode excel --output ./Leads.xlsx
  leadmerge merge --mode sheets --spreadsheet-id 1AbC... --credentials ./key.json
  leadmerge --json | jq .new_records")]
    Merge(MergeArgs),

    /// Check the data folder, credentials and configuration
    Verify {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Authenticate and read the spreadsheet's title and worksheets
    CheckSheets {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Clone, Default)]
struct MergeArgs {
    /// Output mode (excel, sheets or auto)
    #[arg(long, env = "LEADMERGE_MODE")]
    mode: Option<Mode>,

    /// Excel output file (overrides excel.output_dir and excel.file_name)
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Clone, Default)]
struct CommonArgs {
    /// Config file (default: ./leadmerge.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Root folder holding one subfolder per lead category
    #[arg(long, value_name = "DIR")]
    data: Option<PathBuf>,

    /// Google Sheets spreadsheet id
    #[arg(long, value_name = "ID")]
    spreadsheet_id: Option<String>,

    /// Service account key file
    #[arg(long, value_name = "PATH")]
    credentials: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => cmd_merge(cli.merge),
        Some(Commands::Merge(args)) => cmd_merge(args),
        Some(Commands::Verify { json, common }) => cmd_verify(common, json),
        Some(Commands::CheckSheets { common }) => cmd_check_sheets(common),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Also installs the log -> tracing bridge for the library crates
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(common: &CommonArgs) -> Result<(RunConfig, Option<PathBuf>), CliError> {
    let (mut config, source) = RunConfig::discover(common.config.as_deref())
        .map_err(|e| CliError::usage(e.to_string()))?;

    if let Some(data) = &common.data {
        config.csv.data_folder = data.clone();
    }
    if let Some(id) = &common.spreadsheet_id {
        config.sheets.spreadsheet_id = id.clone();
    }
    if let Some(path) = &common.credentials {
        config.sheets.credentials_path = path.clone();
    }

    if let Some(path) = &source {
        log::info!("using config {}", path.display());
    }
    Ok((config, source))
}

fn apply_output_override(config: &mut RunConfig, output: &std::path::Path) -> Result<(), CliError> {
    let file_name = output
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::usage(format!("--output must name a file, got '{}'", output.display())))?;
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.display().to_string(),
        _ => ".".to_string(),
    };
    config.excel.output_dir = dir;
    config.excel.file_name = file_name.to_string();
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    init_logging(args.common.quiet);

    let (mut config, _) = load_config(&args.common)?;
    if let Some(output) = &args.output {
        apply_output_override(&mut config, output)?;
    }
    config.validate().map_err(|e| CliError::usage(e.to_string()))?;

    let requested = args.mode.unwrap_or(config.mode);
    let report = pipeline::run(&config, requested).map_err(|e| {
        let hint = match &e {
            pipeline::PipelineError::Input(_) => {
                Some("create the data folder with one subfolder per lead category, or pass --data")
            }
            pipeline::PipelineError::Export(_) => None,
        };
        CliError { code: e.exit_code(), message: e.to_string(), hint: hint.map(String::from) }
    })?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", json);
    } else {
        print_run_report(&report, &config);
    }
    Ok(())
}

fn print_run_report(report: &RunReport, config: &RunConfig) {
    println!("mode:       {} ({})", report.mode, report.mode_reason);
    if let Some(reason) = &report.fallback {
        println!("fallback:   excel ({})", reason);
    }

    match report.status {
        RunStatus::NoCsvFiles => {
            println!("No CSV files found in {}", config.csv.data_folder.display());
            return;
        }
        RunStatus::NothingToDo => {
            println!("files:      {} read", report.files_read);
            println!("Nothing to export");
            return;
        }
        RunStatus::Created | RunStatus::Updated => {}
    }

    if report.skipped_files.is_empty() {
        println!("files:      {} read", report.files_read);
    } else {
        println!("files:      {} read, {} skipped", report.files_read, report.skipped_files.len());
        for skipped in &report.skipped_files {
            println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
        }
    }
    println!(
        "records:    {} total ({} new, {} existing)",
        report.total, report.new_records, report.existing
    );
    if let Some(location) = &report.location {
        let verb = if report.created { "created" } else { "updated" };
        println!("output:     {} {}", verb, location);
    }
}

fn cmd_verify(common: CommonArgs, json: bool) -> Result<(), CliError> {
    init_logging(common.quiet);

    let (config, source) = load_config(&common)?;
    let report = verify::run_verify(&config, source.as_deref());

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", out);
    } else {
        print_verify_report(&report);
    }

    if !report.data_folder_ok {
        return Err(CliError {
            code: EXIT_INPUT,
            message: format!("data folder {} is missing", config.csv.data_folder.display()),
            hint: None,
        }
        .with_hint("create it with one subfolder per lead category"));
    }
    Ok(())
}

fn print_verify_report(report: &VerifyReport) {
    println!("Setup Verification");
    println!("------------------");
    for check in &report.checks {
        println!("[{:<4}] {:<20} {}", check.status.as_str(), check.name, check.detail);
    }
    println!();
    println!(
        "{} ok, {} warning(s), {} failure(s)",
        report.count(verify::CheckStatus::Ok),
        report.count(verify::CheckStatus::Warn),
        report.count(verify::CheckStatus::Fail)
    );
}

fn cmd_check_sheets(common: CommonArgs) -> Result<(), CliError> {
    init_logging(common.quiet);

    let (config, _) = load_config(&common)?;
    let info = verify::check_sheets(&config).map_err(|e| {
        CliError { code: EXIT_SHEETS_CHECK, message: format!("Google Sheets connectivity error: {}", e), hint: None }
            .with_hint("run `leadmerge verify` to check credentials and spreadsheet id")
    })?;

    println!("Google Sheets API connected successfully.");
    println!("spreadsheet: {}", info.title);
    println!("worksheets:  {}", info.sheets.join(", "));
    if !info.sheets.iter().any(|s| s == &config.sheets.worksheet_name) {
        println!("note:        worksheet '{}' will be created on first merge", config.sheets.worksheet_name);
    }
    Ok(())
}
