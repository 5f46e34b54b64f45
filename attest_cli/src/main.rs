//! # Attest CLI
//!
//! Evaluates the built-in controls against a target directory and prints the
//! report. Ctrl-C / SIGTERM cancels the run; changes already applied are
//! reverted before the process exits.

use attest_cli::controls::{self, filesystem, FsTarget};
use attest_cli::output;
use attest_engine::logging::{self, codes, FacadeLogger, LogLevel, LoggingService};
use attest_engine::{
    log_error, log_info, log_warning, CancellationToken, EvaluationConfig, EvaluationOutcome,
    EvaluationReport, HostContext, ResultGenerator, RevertPolicy,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "attest",
    version,
    about = "Evaluate security controls against a directory"
)]
struct Cli {
    /// Directory the controls are evaluated against.
    #[arg(long, default_value = ".")]
    target: PathBuf,

    /// Applicability tags; assessments sharing any tag are run.
    #[arg(long, value_delimiter = ',')]
    applicability: Vec<String>,

    /// Let assessments apply (and later revert) changes to the target.
    #[arg(long)]
    allow_changes: bool,

    /// Path to an evaluation config TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the revert policy (revert-all|stop-on-corruption).
    #[arg(long)]
    revert_policy: Option<RevertPolicy>,

    /// Print the report as JSON instead of a summary.
    #[arg(long)]
    json: bool,

    /// Minimum log level (error|warn|info|debug).
    #[arg(long, value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    /// List the built-in controls and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            log_error!(codes::system::INTERNAL_ERROR, err.to_string());
            eprintln!("error: {}", err);
            ExitCode::from(output::EXIT_USAGE)
        }
    }
}

fn run(cli: Cli) -> Result<u8, Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    init_logging(&config);

    if cli.list {
        print_catalog();
        return Ok(output::EXIT_OK);
    }

    log_info!("Attest starting",
        "target" => cli.target.display(),
        "applicability" => config.applicability.join(","),
        "changes_allowed" => config.changes_allowed
    );

    let token = CancellationToken::new();
    install_interrupt_handler(&token);

    let report = EvaluationReport::new(HostContext::from_system());
    let target = FsTarget::new(&cli.target);
    let mut evaluated = controls::builtin_controls();
    let mut outcome = EvaluationOutcome::Completed;
    for control in evaluated.iter_mut() {
        if control
            .evaluate_with_config(&target, &config, &token)
            .is_interrupted()
        {
            outcome = EvaluationOutcome::Interrupted;
            break;
        }
    }

    let report = ResultGenerator::build_report(report, evaluated, outcome);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", output::render_summary(&report));
    }

    Ok(output::exit_code(&report, token.is_cancelled()))
}

/// Config file (or environment defaults) overlaid with command-line flags
fn load_config(cli: &Cli) -> Result<EvaluationConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EvaluationConfig::from_toml_file(path)?,
        None => EvaluationConfig::default(),
    };

    if cli.allow_changes {
        config = config.with_changes_allowed(true);
    }
    if !cli.applicability.is_empty() {
        config = config.with_applicability(cli.applicability.iter().cloned());
    }
    if let Some(policy) = cli.revert_policy {
        config = config.with_revert_policy(policy);
    }
    if let Some(level) = cli.log_level {
        config = config.with_log_level(level);
    }
    if config.applicability.is_empty() {
        config = config.with_applicability(controls::default_applicability());
    }

    config.validate()?;
    Ok(config)
}

/// Engine events go to stderr: JSON lines when structured logging is on,
/// otherwise through `env_logger` via the `log` facade.
fn init_logging(config: &EvaluationConfig) {
    let preferences = &config.logging;

    if preferences.use_structured_logging {
        if let Err(err) = logging::init_global_logging(preferences) {
            eprintln!("warning: {}", err);
        }
        return;
    }

    if let Err(err) = env_logger::Builder::new()
        .filter_level(level_filter(preferences.min_log_level))
        .parse_default_env()
        .try_init()
    {
        eprintln!("warning: {}", err);
    }

    let service = LoggingService::new(Arc::new(FacadeLogger), preferences.min_log_level);
    if let Err(err) = logging::init_global_logging_with_service(Arc::new(service)) {
        eprintln!("warning: {}", err);
    }
}

fn install_interrupt_handler(token: &CancellationToken) {
    let handler_token = token.clone();
    let installed = ctrlc::set_handler(move || {
        log_warning!(
            codes::evaluation::EVALUATION_INTERRUPTED,
            "Interrupt received. Reverting applied changes; do not interrupt this process"
        );
        handler_token.cancel();
    });

    if let Err(err) = installed {
        log_warning!(
            codes::system::INITIALIZATION_FAILURE,
            "Interrupt handler not installed; changes are only reverted on normal completion",
            "error" => err
        );
    }
}

fn print_catalog() {
    for control in controls::builtin_controls() {
        println!("{} ({})", control.control_id, control.name);
        for (requirement_id, applicability) in filesystem::describe(&control) {
            println!("  {} [{}]", requirement_id, applicability.join(", "));
        }
    }
}

fn level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    }
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{}'", value))
}
