use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use umbraco_audit::config::{Config, CONFIG_FILE_NAME};
use umbraco_audit::error::AuditError;
use umbraco_audit::output::OutputFormat;
use umbraco_audit::AuditOptions;

#[derive(Parser)]
#[command(
    name = "umbraco-audit",
    about = "Estimate the effort of upgrading an Umbraco 13 project to Umbraco 17",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit an Umbraco project and estimate upgrade hours
    Audit {
        /// Path to the project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format (console, json, html)
        #[arg(long, short = 'o', default_value = "console")]
        output: String,

        /// Show every finding with code context
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Enable debug logging on stderr
        #[arg(long)]
        debug: bool,

        /// Skip NuGet registry lookups
        #[arg(long, env = "UMBRACO_AUDIT_OFFLINE")]
        offline: bool,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        out_file: Option<PathBuf>,
    },

    /// List all built-in rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .umbraco-audit.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Audit { debug: true, .. });
    init_tracing(debug);

    let result = match cli.command {
        Commands::Audit {
            path,
            output,
            verbose,
            debug,
            offline,
            config,
            out_file,
        } => cmd_audit(
            path,
            &output,
            AuditOptions {
                config_path: config,
                verbose,
                debug,
                offline,
            },
            out_file,
        ),
        Commands::ListRules { format } => cmd_list_rules(&format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so reports on stdout stay parseable. `RUST_LOG` wins
/// over `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "umbraco_audit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(debug))
        .with(filter)
        .init();
}

fn cmd_audit(
    path: PathBuf,
    format_str: &str,
    options: AuditOptions,
    out_file: Option<PathBuf>,
) -> Result<i32, AuditError> {
    let format = OutputFormat::from_str_lenient(format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let report = umbraco_audit::audit(&path, &options)?;
    let rendered = umbraco_audit::render_report(&report, format, options.verbose)?;

    match out_file {
        Some(out) => {
            std::fs::write(&out, &rendered)?;
            eprintln!("Report written to {}", out.display());
        }
        None => print!("{}", rendered),
    }

    Ok(0)
}

fn cmd_list_rules(format_str: &str) -> Result<i32, AuditError> {
    let rules = umbraco_audit::list_rules();

    match format_str {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<40} {:<34} {:<16} {:>6}",
                "ID", "NAME", "CATEGORY", "HOURS"
            );
            println!("{}", "-".repeat(99));
            for rule in &rules {
                println!(
                    "{:<40} {:<34} {:<16} {:>6}",
                    rule.id,
                    rule.name,
                    rule.category.to_string(),
                    rule.default_hours,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, AuditError> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {CONFIG_FILE_NAME}");

    Ok(0)
}
