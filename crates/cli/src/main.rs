mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_list, cmd_plan, cmd_platforms, cmd_run};
use output::{OutputFormat, print_error};

/// Build openssl, sqlcipher and sqlite4java for desktop, Android and iOS
#[derive(Parser)]
#[command(name = "libforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the configuration file
  #[arg(long, global = true, env = "LIBFORGE_CONFIG", default_value = "libforge.toml")]
  config: PathBuf,

  /// Enable debug logging (RUST_LOG overrides)
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a task and everything it depends on
  ///
  /// Build steps skip platforms whose artifact already exists, so rerunning
  /// after a failure only redoes missing work. Do not run two invocations
  /// against the same root directory at the same time; nothing locks it.
  Run {
    /// Task to run
    #[arg(default_value = "all")]
    task: String,
  },

  /// Print the order tasks would run in, without running them
  Plan {
    /// Task to resolve
    #[arg(default_value = "all")]
    task: String,
  },

  /// List registered tasks and their dependencies
  List,

  /// Show configured platforms and where their libraries end up
  Platforms,
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match &cli.command {
    Commands::Run { task } => cmd_run(task, &cli.config, cli.output),
    Commands::Plan { task } => cmd_plan(task, cli.output),
    Commands::List => cmd_list(cli.output),
    Commands::Platforms => cmd_platforms(&cli.config, cli.output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      match e.chain().find_map(|cause| cause.downcast_ref::<libforge_lib::Error>()) {
        Some(err) => print_error(&format!("{} error: {e:#}", err.kind())),
        None => print_error(&format!("{e:#}")),
      }
      ExitCode::FAILURE
    }
  }
}
