use crate::config::{Config, ENV_PROVIDER};
use crate::pipeline::{Pipeline, PipelineResult};
use crate::providers::Provider;
use crate::types::{format_content, format_verdict};
use crate::{log_debug, ui};
use anyhow::Context;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "assessment-gen-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    author,
    version = crate_version!(),
    about = "assessment-gen: grade-appropriate explanations and quizzes from an LLM",
    long_about = "assessment-gen drafts an explanation plus multiple-choice questions for a grade and topic, has a second pass review it, and refines the draft once when the review fails.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, waiting messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Let HTTP client and server internals into the log
    #[arg(
        long = "verbose",
        global = true,
        help = "Include HTTP client and server internals in the log"
    )]
    pub verbose: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,

    /// Read settings from this file instead of the per-user config
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        help = "Path to a TOML config file"
    )]
    pub config: Option<PathBuf>,

    /// Override the configured LLM provider
    #[arg(
        short = 'p',
        long = "provider",
        global = true,
        help = "Override the LLM provider (google, openai)"
    )]
    pub provider: Option<String>,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Run the HTTP service and serve the front-end
    #[command(
        about = "Start the HTTP service",
        long_about = "Start the HTTP service exposing POST /generate and GET /health, and serve the front-end from the static directory."
    )]
    Serve {
        /// Address to bind
        #[arg(long, help = "Address to bind (default 127.0.0.1)")]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, help = "Port to listen on (default 8000)")]
        port: Option<u16>,

        /// Directory with index.html and static assets
        #[arg(long = "static-dir", help = "Directory holding index.html and static assets")]
        static_dir: Option<PathBuf>,
    },

    /// Run one pipeline and print the result
    #[command(
        about = "Generate, review and refine content once",
        long_about = "Generate an explanation with three multiple-choice questions for the given grade and topic, review it, and refine it once if the review fails."
    )]
    Generate {
        /// Target grade level
        #[arg(short, long, help = "Target grade level (1-12)")]
        grade: u32,

        /// Subject of the content
        #[arg(short, long, help = "Topic to explain and quiz on")]
        topic: String,

        /// Print the raw pipeline result as JSON
        #[arg(long, help = "Print the pipeline result as JSON")]
        json: bool,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Generate dynamic help including available LLM providers
fn get_dynamic_help() -> String {
    let providers_list = Provider::all_names()
        .iter()
        .map(|p| format!("{}", p.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable LLM Providers: {providers_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    let Some(command) = cli.command else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["assessment-gen", "--help"]);
        return Ok(());
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(name) = cli.provider.as_deref() {
        apply_provider_override(&mut config, name)?;
    }
    if cli.verbose {
        config.verbose_logging = true;
    }

    setup_logging(&command, &config, cli.log, cli.log_file.as_deref())?;

    handle_command(command, config).await
}

/// Switch provider and pick up that provider's key and model from the environment
fn apply_provider_override(config: &mut Config, name: &str) -> anyhow::Result<()> {
    let provider: Provider = name.parse()?;
    config.set_provider(provider);
    config.apply_env(|key| {
        if key == ENV_PROVIDER {
            None
        } else {
            std::env::var(key).ok()
        }
    })?;
    Ok(())
}

/// `serve` logs to stdout; `generate` keeps stdout for its output and logs only to a file
fn setup_logging(
    command: &Commands,
    config: &Config,
    log: bool,
    log_file: Option<&str>,
) -> anyhow::Result<()> {
    crate::logger::init().map_err(|e| anyhow::anyhow!("{e}"))?;
    crate::logger::set_verbose_logging(config.verbose_logging);

    match command {
        Commands::Serve { .. } => {
            crate::logger::enable_logging();
            crate::logger::set_log_to_stdout(true);
            if log {
                crate::logger::set_log_file(log_file.unwrap_or(LOG_FILE))?;
            }
        }
        Commands::Generate { .. } => {
            crate::logger::set_log_to_stdout(false);
            if log {
                crate::logger::enable_logging();
                crate::logger::set_log_file(log_file.unwrap_or(LOG_FILE))?;
            } else {
                crate::logger::disable_logging();
            }
        }
    }

    if config.verbose_logging {
        log_debug!("Verbose logging enabled - will show HTTP client and server internals");
    }
    Ok(())
}

/// Dispatch a parsed subcommand
pub async fn handle_command(command: Commands, mut config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = static_dir {
                config.server.static_dir = dir;
            }
            handle_serve(&config).await
        }
        Commands::Generate { grade, topic, json } => {
            handle_generate(&config, grade, &topic, json).await
        }
    }
}

async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    ui::print_info(&format!(
        "Starting server on http://{}:{}",
        config.server.host, config.server.port
    ));
    crate::server::serve(config).await
}

async fn handle_generate(
    config: &Config,
    grade: u32,
    topic: &str,
    json: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(grade > 0, "Grade must be at least 1");
    anyhow::ensure!(!topic.trim().is_empty(), "Topic must not be empty");

    let pipeline = Pipeline::from_config(config)?;

    let spinner = if json {
        None
    } else {
        Some(ui::create_spinner(&format!(
            "Writing Grade {grade} material on {topic}..."
        )))
    };

    let result = pipeline.run(grade, topic).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{rendered}");
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &PipelineResult) {
    if let Some(error) = result.initial_output.error() {
        ui::print_warning(&format!("Generation failed: {error}"));
    }
    ui::print_bordered_content(&format_content("Initial draft", result.initial_output.value()));
    ui::print_bordered_content(&format_verdict(result.review_output.value()));

    if let Some(refined) = &result.refined_output {
        if let Some(error) = refined.error() {
            ui::print_warning(&format!("Refinement failed: {error}"));
        }
        ui::print_bordered_content(&format_content("Refined draft", refined.value()));
    }

    if result.final_content().is_well_formed() {
        ui::print_success("Done.");
    } else {
        ui::print_warning("Done, but the final content does not have the expected shape.");
    }
}
