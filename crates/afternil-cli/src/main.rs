use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use afternil_core::config::{self, OutputFormat, CONFIG_FILE_NAME};
use afternil_core::orchestrator::{self, CheckOutput};
use afternil_diagnostics::{human, plain, rules};

/// Status for usage errors, I/O failures and internal faults.
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "afternil")]
#[command(about = "Find references to Go variables already proven nil by an early-return check")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Go files for references after a nil check
    Check {
        /// Files, directories, or `dir/...` patterns (default: .)
        paths: Vec<String>,
        /// Output format: text, machine, json, pretty
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Source lines shown under each text finding
        #[arg(long)]
        context: Option<usize>,
        /// Rewrite flagged references to nil in place
        #[arg(long)]
        fix: bool,
        /// Exit status when findings remain
        #[arg(long)]
        exit_code: Option<u8>,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
        /// Log each file as it is checked
        #[arg(long, short)]
        verbose: bool,
    },
    /// Explain a rule in detail
    Explain {
        /// Rule code (e.g., REF001)
        rule: String,
    },
    /// Write a default afternil.toml in the current directory
    Init,
}

struct CheckArgs {
    paths: Vec<String>,
    format: Option<OutputFormat>,
    context: Option<usize>,
    fix: bool,
    exit_code: Option<u8>,
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Check { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Check {
            paths,
            format,
            context,
            fix,
            exit_code,
            no_color,
            verbose: _,
        } => run_check(CheckArgs {
            paths,
            format,
            context,
            fix,
            exit_code,
            no_color,
        }),
        Commands::Explain { rule } => run_explain(&rule),
        Commands::Init => run_init(),
    }
}

/// Log to stderr so stdout carries only findings. `RUST_LOG` wins over
/// the verbosity flag.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_check(args: CheckArgs) -> ExitCode {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = config::load_config(&cwd);

    if let Some(format) = args.format {
        config.afternil.format = format;
    }
    if let Some(context) = args.context {
        config.afternil.context_lines = context;
    }
    if let Some(code) = args.exit_code {
        config.afternil.exit_code = code;
    }
    tracing::debug!(
        cwd = %cwd.display(),
        format = ?config.afternil.format,
        context_lines = config.afternil.context_lines,
        exit_code = config.afternil.exit_code,
        "resolved configuration"
    );

    let paths = if args.paths.is_empty() {
        vec![".".to_string()]
    } else {
        args.paths
    };

    let result = if args.fix {
        orchestrator::fix_paths(&paths, &config)
    } else {
        orchestrator::check_paths(&paths, &config)
    };

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match render(&output, config.afternil.format, config.afternil.context_lines, !args.no_color) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if args.fix {
        if !output.fixed.is_empty() {
            eprintln!(
                "Fixed {} reference(s) in {} file(s)",
                output.fixed_total(),
                output.fixed.len()
            );
        }
        return ExitCode::SUCCESS;
    }

    if output.diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(config.afternil.exit_code)
    }
}

fn render(
    output: &CheckOutput,
    format: OutputFormat,
    context_lines: usize,
    use_color: bool,
) -> anyhow::Result<String> {
    let diags = &output.diagnostics;
    Ok(match format {
        OutputFormat::Text => plain::format_text(diags, &output.sources, context_lines),
        OutputFormat::Machine => plain::format_machine(diags),
        OutputFormat::Json => plain::format_json(diags).context("serializing diagnostics")?,
        OutputFormat::Pretty => human::format_pretty(diags, &output.sources, use_color),
    })
}

fn run_explain(rule: &str) -> ExitCode {
    let Some(info) = rules::get_rule(rule) else {
        let known: Vec<String> = rules::get_all_rules().into_iter().map(|r| r.code).collect();
        eprintln!("Unknown rule: {rule}. Known rules: {}", known.join(", "));
        return ExitCode::from(EXIT_ERROR);
    };

    println!("{}: {}\n", info.code, info.name);
    println!("{}", info.description);
    if let Some(bad) = &info.example_bad {
        println!("\nExample:\n{}", indent(bad));
    }
    if let Some(good) = &info.example_good {
        println!("\nFix:\n{}", indent(good));
    }
    if let Some(idiom) = &info.go_idiom {
        println!("\n{idiom}");
    }
    ExitCode::SUCCESS
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn run_init() -> ExitCode {
    match write_default_config(Path::new(CONFIG_FILE_NAME)) {
        Ok(()) => {
            println!("Created {CONFIG_FILE_NAME}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn write_default_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    std::fs::write(path, config::DEFAULT_CONFIG_TOML)
        .with_context(|| format!("writing {}", path.display()))
}
