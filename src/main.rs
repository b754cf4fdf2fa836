//! Lectern - lesson sessions and learning analytics
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use lectern::classify::ClassifierSet;
use lectern::cli::{
    ClassifyCommand, ClassifyOptions, SessionsCommand, SessionsOptions, ValidateCommand,
    ValidateOptions,
};
use lectern::config::{lectern_home, ClassifierStrategy, Config};
use lectern::error::exit_codes;
use lectern::generation::{build_generator, call_timeout};
use lectern::http::{create_router, AppState};
use lectern::storage::open_store;

// =============================================================================
// CLI Definition
// =============================================================================

/// Lectern - lesson sessions and learning analytics
#[derive(Parser)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Classify text on Bloom's taxonomy
    Classify {
        /// Text to classify
        text: String,
        /// Classifier strategy (defaults to config)
        #[arg(long, short, value_enum)]
        strategy: Option<StrategyArg>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Validate an authored lesson file
    Validate {
        /// Path to the lesson JSON file
        file: PathBuf,
        /// Grade whose required vocabulary is enforced
        #[arg(long, short)]
        grade: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// List a student's lesson sessions
    Sessions {
        /// Student ID
        #[arg(long, short)]
        student: String,
        /// Maximum number of sessions
        #[arg(long, short, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Heuristic,
    Delegated,
    DelegatedWithFallback,
}

impl From<StrategyArg> for ClassifierStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Heuristic => ClassifierStrategy::Heuristic,
            StrategyArg::Delegated => ClassifierStrategy::Delegated,
            StrategyArg::DelegatedWithFallback => ClassifierStrategy::DelegatedWithFallback,
        }
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("lectern error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, appends to ~/.lectern/crash.log and exits with the error code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("lectern panic: {}", info);

        if let Some(home) = lectern_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::ERROR);
    }));
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();
    init_tracing(&config);

    match cli.command {
        Commands::Serve { bind, port } => run_serve(config, bind, port),
        Commands::Classify {
            text,
            strategy,
            json,
        } => run_classify(config, &text, strategy, json),
        Commands::Validate { file, grade, json } => run_validate(config, file, grade, json),
        Commands::Sessions {
            student,
            limit,
            json,
        } => run_sessions(config, &student, limit, json),
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

/// Convert success boolean to exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_output<T: serde::Serialize>(
    output: &T,
    json: bool,
    text: impl FnOnce() -> String,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn run_serve(
    mut config: Config,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = config.bind_address();
    let state = Arc::new(AppState::from_config(config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("lectern listening on {}", addr);
        axum::serve(listener, create_router(state)).await
    })?;

    Ok(ExitCode::from(exit_codes::SUCCESS as u8))
}

fn run_classify(
    config: Config,
    text: &str,
    strategy: Option<StrategyArg>,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let classifiers = ClassifierSet::new(
        config.classifier.strategy,
        Arc::new(config.catalog),
        build_generator(&config.generation),
        call_timeout(&config.generation),
    );
    let cmd = ClassifyCommand::new(classifiers);
    let options = ClassifyOptions {
        json,
        strategy: strategy.map(Into::into),
    };

    let output = cmd.run(text, &options);
    print_output(&output, json, || output.format_text())?;
    Ok(success_to_exit_code(output.success))
}

fn run_validate(
    config: Config,
    file: PathBuf,
    grade: Option<String>,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ValidateCommand::new(Arc::new(config.catalog));
    let options = ValidateOptions { json, grade };

    let output = cmd.run_file(&file, &options);
    print_output(&output, json, || output.format_text())?;
    Ok(success_to_exit_code(output.success && output.valid))
}

fn run_sessions(
    config: Config,
    student: &str,
    limit: usize,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = open_store(&config.store)?;
    let cmd = SessionsCommand::new(store);
    let options = SessionsOptions { json, limit };

    let output = cmd.run(student, &options);
    print_output(&output, json, || output.format_text())?;
    Ok(success_to_exit_code(output.success))
}
