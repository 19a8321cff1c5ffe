//! tapevm CLI - run, check, compile and describe tape programs

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tapevm::parser::{self, render_violations};
use tapevm::{
    CellPolicy, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_STEPS, Machine, PointerPolicy, VmConfig,
};

#[derive(Parser)]
#[command(name = "tapevm")]
#[command(about = "Tape VM interpreter and tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program and print its output
    Run {
        /// Path to the program file
        file: PathBuf,

        /// Execution engine
        #[arg(long, value_enum, default_value_t = Mode::Fast)]
        mode: Mode,

        /// Preloaded input text
        #[arg(long, default_value = "")]
        input: String,

        /// Step budget
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
        max_steps: usize,

        /// Instructions per chunk in chunked mode
        #[arg(
            long,
            default_value_t = DEFAULT_CHUNK_SIZE,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        chunk: usize,

        /// Path to a TOML machine configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pointer policy: clamp, wrap or error
        #[arg(long)]
        pointer: Option<PointerPolicy>,

        /// Cell policy: wrap, unlimited or error
        #[arg(long)]
        cell: Option<CellPolicy>,

        /// Number of memory cells
        #[arg(long)]
        capacity: Option<usize>,

        /// Read more input from stdin when the preloaded input runs out
        #[arg(long)]
        interactive: bool,
    },

    /// Report every illegal character in a program
    Check {
        /// Path to the program file
        file: PathBuf,
    },

    /// Print compile statistics and the instruction listing
    Compile {
        /// Path to the program file
        file: PathBuf,
    },

    /// Print a pseudocode description of a program
    Describe {
        /// Path to the program file
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Single-step over the raw text
    Step,
    /// Compiled, to completion
    Fast,
    /// Compiled, in resumable chunks
    Chunked,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            file,
            mode,
            input,
            max_steps,
            chunk,
            config,
            pointer,
            cell,
            capacity,
            interactive,
        } => {
            let mut config = match config {
                Some(path) => VmConfig::load(&path)?,
                None => VmConfig::default(),
            };
            if let Some(pointer) = pointer {
                config.pointer_policy = pointer;
            }
            if let Some(cell) = cell {
                config.cell_policy = cell;
            }
            if let Some(capacity) = capacity {
                config.capacity = capacity;
            }

            let source = read_program(&file)?;
            let mut machine = Machine::from_config(&config)?;
            if interactive {
                machine.set_input_source(read_stdin_line);
            }
            machine.load(&source, &input);

            run(&mut machine, mode, max_steps, chunk)?;
        }

        Commands::Check { file } => {
            let source = read_program(&file)?;
            let violations = parser::check_syntax(&source);
            if violations.is_empty() {
                info!("{}: no syntax errors", file.display());
            } else {
                eprint!(
                    "{}",
                    render_violations(&violations, &source, &file.display().to_string())
                );
                eprintln!("{} illegal character(s)", violations.len());
                process::exit(1);
            }
        }

        Commands::Compile { file } => {
            let source = read_program(&file)?;
            let program = parser::compile(&source)?;
            println!("{}", program.stats(&source));
            println!();
            print!("{}", program.listing());
        }

        Commands::Describe { file } => {
            let source = read_program(&file)?;
            let mut machine = Machine::from_config(&VmConfig::default())?;
            machine.load(&source, "");
            print!("{}", machine.describe());
        }
    }

    Ok(())
}

fn read_program(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Input callback for `--interactive`: one line of stdin, newline included
fn read_stdin_line() -> String {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => line,
        Err(_) => String::new(),
    }
}

fn run(machine: &mut Machine, mode: Mode, max_steps: usize, chunk: usize) -> Result<()> {
    let mut stdout = io::stdout().lock();

    match mode {
        Mode::Step => {
            let result = machine.run_until_end(max_steps);
            stdout.write_all(machine.output())?;
            stdout.flush()?;
            let steps = result?;
            debug!(steps, "single-step run finished");
        }
        Mode::Fast => {
            let result = machine.run_fast(max_steps);
            stdout.write_all(machine.output())?;
            stdout.flush()?;
            result?;
        }
        Mode::Chunked => {
            // Flush whatever each chunk emitted before handing control back
            let mut flushed = 0;
            loop {
                let more = machine.run_chunk(chunk, max_steps);
                let output = machine.output();
                stdout.write_all(&output[flushed..])?;
                stdout.flush()?;
                flushed = output.len();
                if !more? {
                    break;
                }
            }
        }
    }

    stdout.flush()?;
    Ok(())
}
