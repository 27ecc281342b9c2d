use bumpalo::Bump;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use pila::{Code, Diagnostics, Error, ExecutionOptions, render_error};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// Pila - compile and run programs on a small stack machine
#[derive(Parser, Debug)]
#[command(name = "pila")]
#[command(about = "Compile and run Pila programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a source file and execute it
    Run {
        file: PathBuf,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Type check a source file without running it
    Check { file: PathBuf },

    /// Compile a source file and save the bytecode
    Build {
        file: PathBuf,

        /// Output path (defaults to the source path with a .pbc or .pbin extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact binary bytecode instead of the text listing
        #[arg(long)]
        binary: bool,
    },

    /// Execute saved bytecode
    Exec {
        file: PathBuf,

        /// The file holds binary bytecode
        #[arg(long)]
        binary: bool,

        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Print saved bytecode with addresses and resolved jump targets
    Disasm {
        file: PathBuf,

        /// The file holds binary bytecode
        #[arg(long)]
        binary: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ExecArgs {
    /// Print an "Input <type>:" prompt before every read
    #[arg(long)]
    prompt: bool,

    /// Stop after executing this many instructions
    #[arg(long)]
    max_steps: Option<usize>,

    /// Maximum operand stack depth
    #[arg(long, default_value_t = 1024)]
    max_stack: usize,
}

impl From<&ExecArgs> for ExecutionOptions {
    fn from(args: &ExecArgs) -> Self {
        ExecutionOptions {
            prompt_on_read: args.prompt,
            max_stack_depth: args.max_stack,
            max_steps: args.max_steps,
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", path.display()))
}

fn load_code(path: &Path, binary: bool) -> Result<Code> {
    let code = if binary {
        let bytes = fs::read(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot read {}", path.display()))?;
        Code::from_bytes(&bytes)
    } else {
        Code::from_text(&read_source(path)?)
    };
    let code = code
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid bytecode in {}", path.display()))?;
    debug!(path = %path.display(), instructions = code.len(), "Loaded bytecode");
    Ok(code)
}

/// Run `code` against the process's stdin and stdout.
fn execute(code: &Code, options: &ExecutionOptions) -> Result<ExitCode> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    match pila::run(code, options, stdin.lock(), stdout.lock()) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            io::stdout().flush().into_diagnostic()?;
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Run { file, exec } => {
            let source = read_source(&file)?;
            let arena = Bump::new();
            match pila::compile(&arena, &source) {
                Ok(code) => execute(&code, &(&exec).into()),
                Err(e) => {
                    render_error(&e, &file.display().to_string(), &source);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Check { file } => {
            let source = read_source(&file)?;
            let name = file.display().to_string();
            let arena = Bump::new();
            let program = match pila::parse(&arena, &source) {
                Ok(program) => program,
                Err(e) => {
                    render_error(&e.into(), &name, &source);
                    return Ok(ExitCode::FAILURE);
                }
            };

            let mut diagnostics = Diagnostics::new();
            pila::compile_program(&program, &mut diagnostics);
            if diagnostics.is_empty() {
                println!("{name}: ok");
                return Ok(ExitCode::SUCCESS);
            }
            let error = Error::Compilation {
                diagnostics: diagnostics.into_vec(),
            };
            render_error(&error, &name, &source);
            Ok(ExitCode::FAILURE)
        }

        Command::Build {
            file,
            output,
            binary,
        } => {
            let source = read_source(&file)?;
            let arena = Bump::new();
            let code = match pila::compile(&arena, &source) {
                Ok(code) => code,
                Err(e) => {
                    render_error(&e, &file.display().to_string(), &source);
                    return Ok(ExitCode::FAILURE);
                }
            };

            let output = output
                .unwrap_or_else(|| file.with_extension(if binary { "pbin" } else { "pbc" }));
            let bytes = if binary {
                code.to_bytes().into_diagnostic()?
            } else {
                code.to_text().into_bytes()
            };
            fs::write(&output, bytes)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot write {}", output.display()))?;
            debug!(path = %output.display(), instructions = code.len(), "Wrote bytecode");
            Ok(ExitCode::SUCCESS)
        }

        Command::Exec { file, binary, exec } => {
            let code = load_code(&file, binary)?;
            execute(&code, &(&exec).into())
        }

        Command::Disasm { file, binary } => {
            let code = load_code(&file, binary)?;
            print!("{code:?}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level, default WARN
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run(cli.command)
}
