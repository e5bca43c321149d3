//! Augur CLI - Compile analytics questions to GA4 report specifications
//!
//! Usage:
//!   augur parse <question> [--today <date>] [--output <format>]
//!   augur catalog
//!   augur check
//!
//! Examples:
//!   augur parse "top 5 pages le mois dernier"
//!   augur parse "sessions in June vs July" --output request
//!   augur parse "et par pays ?" --prior-metrics totalUsers
//!   augur --rules ./rules.toml check

use augur::catalog::{self, Catalog};
use augur::compile::{CompileOutput, QueryCompiler};
use augur::config::Settings;
use augur::model::ConversationContext;
use augur::report::{check_date_range, ReportRequest};
use augur::rules::{self, RuleBook};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "augur")]
#[command(about = "Augur - Compiles analytics questions into GA4 report specifications")]
#[command(version)]
struct Cli {
    /// Settings file (defaults: $AUGUR_CONFIG, ./augur.toml, user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog JSON document, overriding the settings
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Rule book TOML file, overriding the settings
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a question into a report specification
    Parse {
        /// The question, in French or English
        question: String,

        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Metrics of the previous turn, comma separated
        #[arg(long, value_delimiter = ',')]
        prior_metrics: Vec<String>,

        /// Dimensions of the previous turn, comma separated
        #[arg(long, value_delimiter = ',')]
        prior_dimensions: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        output: OutputFormat,
    },

    /// List the metrics and dimensions of the active catalog
    Catalog,

    /// Validate the rule book against the catalog
    Check,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Full compile output as JSON
    Json,
    /// One-line summary with diagnostics
    Summary,
    /// runReport request body(ies)
    Request,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings);

    match cli.command {
        Commands::Parse {
            question,
            today,
            prior_metrics,
            prior_dimensions,
            output,
        } => {
            let context = ConversationContext::new(prior_metrics, prior_dimensions);
            cmd_parse(&settings, &question, today, &context, output)
        }
        Commands::Catalog => cmd_catalog(&settings),
        Commands::Check => cmd_check(&settings),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, augur::config::SettingsError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if let Some(path) = &cli.catalog {
        settings.catalog.path = Some(path.display().to_string());
    }
    if let Some(path) = &cli.rules {
        settings.rules.path = Some(path.display().to_string());
    }
    Ok(settings)
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_parse(
    settings: &Settings,
    question: &str,
    today: Option<NaiveDate>,
    context: &ConversationContext,
    output: OutputFormat,
) -> ExitCode {
    let compiler = match QueryCompiler::from_settings(settings) {
        Ok(compiler) => compiler,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let context = (!context.is_empty()).then_some(context);
    let compiled = compiler.compile_on(question, context, today);

    match output {
        OutputFormat::Json => print_json(&compiled),
        OutputFormat::Summary => {
            println!("{}", compiled.spec);
            println!("strategy: {}", compiled.strategy);
            if let Some(suggestion) = &compiled.spec.suggestion {
                println!("suggestion: {}", suggestion);
            }
            for diagnostic in &compiled.diagnostics {
                println!("  {}", diagnostic);
            }
            ExitCode::SUCCESS
        }
        OutputFormat::Request => print_requests(settings, &compiled, today),
    }
}

fn print_json(compiled: &CompileOutput) -> ExitCode {
    match serde_json::to_string_pretty(compiled) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_requests(settings: &Settings, compiled: &CompileOutput, today: NaiveDate) -> ExitCode {
    let spec = &compiled.spec;
    let default_limit = settings.report.default_limit;

    let mut requests = match ReportRequest::comparative_pair(spec, default_limit) {
        Some((first, second)) => vec![first, second],
        None => {
            let request = ReportRequest::from_spec(spec, default_limit);
            let total = request.total_request();
            std::iter::once(request).chain(total).collect()
        }
    };

    for request in &mut requests {
        match check_date_range(request.date_range, today) {
            Ok(range) => request.date_range = range,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let bodies: Vec<_> = requests.iter().map(ReportRequest::to_run_report_body).collect();
    match serde_json::to_string_pretty(&bodies) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing requests: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_catalog(settings: &Settings) -> Result<Catalog, String> {
    let provider = catalog::provider_for(&settings.catalog).map_err(|e| e.to_string())?;
    provider.load().map_err(|e| e.to_string())
}

fn cmd_catalog(settings: &Settings) -> ExitCode {
    let catalog = match load_catalog(settings) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Metrics:");
    for (name, info) in catalog.metrics() {
        let restricted = match catalog.allowed_dimensions(name) {
            Some(allowed) => format!(" ({} compatible dimensions)", allowed.len()),
            None => String::new(),
        };
        println!("  - {} [{}] {}{}", name, info.group, info.description, restricted);
    }
    println!();

    println!("Dimensions:");
    for (name, info) in catalog.dimensions() {
        println!("  - {} [{}] {}", name, info.group, info.description);
    }
    ExitCode::SUCCESS
}

fn cmd_check(settings: &Settings) -> ExitCode {
    let catalog = match load_catalog(settings) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rules = match settings
        .rules
        .resolved_path()
        .map_err(|e| e.to_string())
        .and_then(|path| RuleBook::load(path.as_deref()).map_err(|e| e.to_string()))
    {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Error loading rule book: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    if !catalog.is_metric(&settings.compiler.default_metric) {
        eprintln!(
            "Default metric '{}' is not in the catalog",
            settings.compiler.default_metric
        );
        failed = true;
    }

    if let Err(issues) = rules::validate(&rules, &catalog) {
        eprintln!("Validation errors:");
        for issue in &issues {
            eprintln!("  {}", issue);
        }
        failed = true;
    }

    if failed {
        return ExitCode::FAILURE;
    }

    println!(
        "OK: rule book v{} is valid ({} smart rules, {} intents, {} synonyms)",
        rules.version,
        rules.smart_rules.len(),
        rules.intents.len(),
        rules.synonyms.len()
    );
    ExitCode::SUCCESS
}
