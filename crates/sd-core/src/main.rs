//! strapdown core - configuration front end
//!
//! The main entry point for sd-core, handling:
//! - Validation of estimator configuration documents
//! - Rendering of fully resolved parameter sets
//! - Inspection of prior defaults and where they were found

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sd_common::debug_timer;
use sd_config::document::read_text;
use sd_config::resolve::{system_config_dir, xdg_config_dir, ENV_CONFIG_DIR, ENV_PRIORS_PATH};
use sd_config::{
    load_priors, resolve_priors, ConfigError, ConfigSnapshot, ParameterSetBuilder, PriorConfig,
    PriorPaths, Resolved,
};
use sd_core::exit_codes::ExitCode;
use sd_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use sd_core::output::{document_to_json, render, OutputFormat};
use sd_core::SCHEMA_VERSION;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

/// strapdown core - resolve and validate estimator configuration
#[derive(Parser)]
#[command(name = "sd-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Prior defaults file (YAML or JSON); overrides discovery
    #[arg(long, global = true)]
    priors: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log output format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl GlobalOpts {
    /// Level requested on the command line, if any.
    fn log_level(&self) -> Option<LogLevel> {
        if self.verbose == 0 && !self.quiet {
            None
        } else {
            Some(LogLevel::from_verbosity(self.verbose, self.quiet))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a configuration document and report success or the first error
    Check(DocumentArgs),

    /// Print the fully resolved parameter set
    Show(ShowArgs),

    /// Print the prior defaults in effect
    Defaults,

    /// Show where prior defaults are looked up
    Paths,

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// YAML configuration document
    config: PathBuf,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// YAML configuration document
    config: PathBuf,

    /// Include where each value came from (document or prior)
    #[arg(long)]
    provenance: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level(), cli.global.log_format);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let exit_code = match &cli.command {
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Show(args) => run_show(&cli.global, args),
        Commands::Defaults => run_defaults(&cli.global),
        Commands::Paths => run_paths(&cli.global),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    debug!(exit_code = %exit_code, "done");
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

/// A resolved document together with everything needed to describe it.
struct Resolution {
    text: String,
    priors: PriorConfig,
    paths: PriorPaths,
    resolved: Resolved,
}

fn resolve_document(global: &GlobalOpts, config: &Path) -> Result<Resolution, ConfigError> {
    let _timer = debug_timer!("resolve document");

    let (priors, paths) = load_priors(global.priors.as_deref())?;
    let text = read_text(config)?;
    info!(config = %config.display(), priors = %paths.source, "resolving configuration");
    let resolved = ParameterSetBuilder::new(&priors).build_str(&text)?;

    Ok(Resolution {
        text,
        priors,
        paths,
        resolved,
    })
}

fn run_check(global: &GlobalOpts, args: &DocumentArgs) -> ExitCode {
    let resolution = match resolve_document(global, &args.config) {
        Ok(r) => r,
        Err(e) => return output_config_error(global, "check", &e),
    };

    let document = args.config.display().to_string();
    let report = &resolution.resolved.report;
    let snapshot = ConfigSnapshot::new(
        Some(&document),
        &resolution.text,
        &resolution.priors,
        &resolution.paths,
        report,
    );

    let response = json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": "check",
        "status": "ok",
        "document": document,
        "snapshot": snapshot,
        "unrecognized_keys": report.unrecognized_keys,
    });
    let summary = format!(
        "ok {} [{}] document={} prior={} ignored={}",
        document,
        snapshot.short_id(),
        snapshot.from_document,
        snapshot.from_prior,
        report.unrecognized_keys.len()
    );
    emit(global, &response, &summary);
    ExitCode::Clean
}

fn run_show(global: &GlobalOpts, args: &ShowArgs) -> ExitCode {
    let resolution = match resolve_document(global, &args.config) {
        Ok(r) => r,
        Err(e) => return output_config_error(global, "show", &e),
    };

    let mut payload = resolution.resolved.params.to_document();
    if args.provenance {
        let provenance: serde_yaml::Mapping = resolution
            .resolved
            .report
            .outcomes
            .iter()
            .map(|o| {
                (
                    serde_yaml::Value::from(o.path),
                    serde_yaml::Value::from(o.origin.to_string()),
                )
            })
            .collect();
        let mut wrapped = serde_yaml::Mapping::new();
        wrapped.insert("parameters".into(), payload);
        wrapped.insert("provenance".into(), provenance.into());
        payload = wrapped.into();
    }

    let summary = format!(
        "{}: {} parameters resolved",
        args.config.display(),
        resolution.resolved.report.outcomes.len()
    );
    match global.format {
        // YAML keeps .inf/.nan so the output resolves again.
        OutputFormat::Yaml => emit(global, &payload, &summary),
        _ => emit(global, &document_to_json(&payload), &summary),
    }
    ExitCode::Clean
}

fn run_defaults(global: &GlobalOpts) -> ExitCode {
    let (priors, paths) = match load_priors(global.priors.as_deref()) {
        Ok(p) => p,
        Err(e) => return output_config_error(global, "defaults", &e),
    };

    let payload = match global.format {
        // YAML output is a prior file that can be edited and passed back.
        OutputFormat::Yaml => json!(priors),
        _ => json!({
            "schema_version": SCHEMA_VERSION,
            "source": paths.source.to_string(),
            "path": paths.priors.as_ref().map(|p| p.display().to_string()),
            "priors": priors,
        }),
    };
    let summary = format!(
        "priors from {}{}",
        paths.source,
        paths
            .priors
            .as_ref()
            .map(|p| format!(" ({})", p.display()))
            .unwrap_or_default()
    );
    emit(global, &payload, &summary);
    ExitCode::Clean
}

fn run_paths(global: &GlobalOpts) -> ExitCode {
    let paths = resolve_priors(global.priors.as_deref());
    let payload = json!({
        "schema_version": SCHEMA_VERSION,
        "priors": {
            "path": paths.priors.as_ref().map(|p| p.display().to_string()),
            "source": paths.source.to_string(),
        },
        "search": {
            "cli": global.priors.as_ref().map(|p| p.display().to_string()),
            ENV_PRIORS_PATH: std::env::var(ENV_PRIORS_PATH).ok(),
            ENV_CONFIG_DIR: std::env::var(ENV_CONFIG_DIR).ok(),
            "xdg_config_dir": xdg_config_dir().map(|p| p.display().to_string()),
            "system_config_dir": system_config_dir().display().to_string(),
        },
    });
    let summary = match &paths.priors {
        Some(p) => format!("{} ({})", p.display(), paths.source),
        None => paths.source.to_string(),
    };
    emit(global, &payload, &summary);
    ExitCode::Clean
}

fn print_version(global: &GlobalOpts) {
    let version_info = json!({
        "schema_version": SCHEMA_VERSION,
        "sd_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => emit(global, &version_info, ""),
        OutputFormat::Exitcode => {}
        OutputFormat::Summary => {
            println!("sd-core {}", env!("CARGO_PKG_VERSION"));
        }
    }
}

fn emit<T: Serialize + ?Sized>(global: &GlobalOpts, payload: &T, summary: &str) {
    if let Some(text) = render(global.format, payload, summary) {
        println!("{}", text.trim_end());
    }
}

fn output_config_error(global: &GlobalOpts, command: &str, error: &ConfigError) -> ExitCode {
    let exit_code = ExitCode::from(error);

    let response = json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command,
        "status": "error",
        "error": {
            "code": error.code(),
            "kind": exit_code.code_name(),
            "path": error.path(),
            "resource": error.resource(),
            "message": error.to_string(),
        }
    });

    match global.format {
        OutputFormat::Json => {
            eprintln!("{:#}", response);
        }
        OutputFormat::Summary => {
            eprintln!("[{}] {}: {}", exit_code.code_name(), command, error);
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Yaml => {
            eprintln!("# Configuration Error");
            eprintln!();
            eprintln!("Error: {}", error);
        }
    }

    exit_code
}
