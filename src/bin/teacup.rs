//! The `teacup` command line interface: run a script file, evaluate an
//! inline expression, or drop into a line-at-a-time REPL.

use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use teacup::Definition;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "teacup", about = "A tiny expression-oriented language")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v, -vv, -vvv); overridden by RUST_LOG.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Teacup script file.
    Run { file: PathBuf },
    /// Evaluate a single expression passed on the command line.
    Eval { expr: String },
    /// Start an interactive read-eval-print loop.
    Repl,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let definition = Definition::teacup();

    let result = match cli.command {
        Command::Run { file } => run_file(&definition, &file),
        Command::Eval { expr } => run_source(&definition, &expr),
        Command::Repl => run_repl(&definition),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_file(definition: &Definition, path: &PathBuf) -> Result<(), String> {
    let src = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    run_source(definition, &src)
}

fn run_source(definition: &Definition, src: &str) -> Result<(), String> {
    tracing::debug!(len = src.len(), "evaluating source");
    match definition.evaluate(src) {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn run_repl(definition: &Definition) -> Result<(), String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("teacup> ");
        stdout.flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let bytes_read = stdin.lock().read_line(&mut line).map_err(|e| e.to_string())?;
        if bytes_read == 0 {
            println!();
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match definition.evaluate(&line) {
            Ok(value) => println!("{}", value),
            Err(err) => eprintln!("error: {}", err),
        }
    }
}
