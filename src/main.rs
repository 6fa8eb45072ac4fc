//! hookrail - lifecycle hooks for Claude Code sessions
//!
//! One binary, one subcommand per hook event:
//! - `nudge`: UserPromptSubmit, suggests an agent and surfaces commit/docs rules
//! - `context`: UserPromptSubmit/PreCompact, re-injects reminders and LOCAL.md
//! - `redirect`: PreToolUse, rewrites Bash test/build/lint commands to the
//!   project's canonical toolchain command
//! - `stop`: Stop, nudges towards a commit when the tree is dirty
//!
//! # Input (via stdin)
//! JSON object with optional fields: prompt, cwd, hook_event/hook_event_name,
//! session_id, tool_name, tool_input.command, stop_hook_active
//!
//! # Output (via stdout)
//! At most one JSON object. No output means no action. The exit code is
//! always 0: these hooks advise, they never gate.

mod config;
mod context;
mod error;
mod input;
mod marker;
mod nudge;
mod output;
mod redirect;
mod stop;
mod toolchain;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::HooksConfig;
use context::ContextInjector;
use error::Result;
use input::HookInput;
use nudge::Classifier;
use output::HookOutput;
use redirect::Redirector;
use std::path::PathBuf;
use stop::{ProcessRunner, StopNudge};
use toolchain::Intent;
use tracing::{debug, error, warn};

#[derive(Parser)]
#[command(name = "hookrail", version, about = "Lifecycle hooks for Claude Code")]
struct Cli {
    /// Pattern table overrides (JSON)
    #[arg(long, global = true, env = "HOOKRAIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest an agent for the submitted prompt (UserPromptSubmit)
    Nudge,

    /// Re-inject reminders on continue/recap and compaction (UserPromptSubmit, PreCompact)
    Context,

    /// Rewrite Bash commands to the canonical toolchain command (PreToolUse)
    Redirect,

    /// Block stopping while there are uncommitted changes (Stop)
    Stop,

    /// Show the toolchain resolved for a directory
    Toolchain {
        /// Project directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Only resolve this intent
        #[arg(value_enum)]
        intent: Option<Intent>,
    },
}

fn main() {
    // Initialize tracing if RUST_LOG is set; stdout belongs to the hook protocol
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(Some(output)) => match output.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize output: {}", e),
        },
        Ok(None) => {}
        Err(e) => error!("Error: {}", e),
    }
    // Exit 0 regardless, so the session is never blocked by a hook fault
}

/// Compile a component from the loaded config, falling back to the
/// compiled-in tables if a user pattern does not compile.
fn build<T>(config: &HooksConfig, from_config: impl Fn(&HooksConfig) -> Result<T>) -> Result<T> {
    from_config(config).or_else(|e| {
        warn!("{}, using default patterns", e);
        from_config(&HooksConfig::default())
    })
}

fn run(cli: &Cli) -> Result<Option<HookOutput>> {
    if let Commands::Toolchain { dir, intent } = &cli.command {
        show_toolchain(dir.clone(), *intent);
        return Ok(None);
    }

    let input = match HookInput::from_stdin() {
        Ok(input) => input,
        Err(e) => {
            debug!("Ignoring hook input: {}", e);
            return Ok(None);
        }
    };

    let config = HooksConfig::load(cli.config.as_deref());

    let output = match cli.command {
        Commands::Nudge => build(&config, Classifier::from_config)?.run(&input),
        Commands::Context => build(&config, ContextInjector::from_config)?.run(&input),
        Commands::Redirect => build(&config, Redirector::from_config)?.run(&input),
        Commands::Stop => StopNudge::new(ProcessRunner::default()).run(&input),
        Commands::Toolchain { .. } => None,
    };
    Ok(output)
}

fn show_toolchain(dir: Option<PathBuf>, only: Option<Intent>) {
    let dir = dir.unwrap_or_else(|| toolchain::project_dir(None));
    let detected = toolchain::detect(&dir);

    if detected.is_empty() {
        println!("{} {}", "no toolchain detected in".red(), dir.display());
        return;
    }

    let names: Vec<String> = detected.iter().map(|t| t.name()).collect();
    println!("{} {}", dir.display().to_string().bold(), names.join(" > ").cyan());

    let intents: Vec<Intent> = match only {
        Some(intent) => vec![intent],
        None => Intent::ALL.to_vec(),
    };
    for intent in intents {
        match toolchain::resolve(&dir, intent) {
            Some(cmd) => println!("  {:<6} {}", intent.as_str().green(), cmd),
            None => println!("  {:<6} {}", intent.as_str().yellow(), "-".dimmed()),
        }
    }
}
