use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use trampoline::{
    CancellationToken, Generator, GeneratorOptions, load_snapshot, render_declarations,
    render_diagnostics,
};

/// Trampoline - native callable wrapper generator
#[derive(Parser, Debug)]
#[command(name = "trampoline")]
#[command(about = "Generate native callable wrappers from host snapshots", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a generation pass over a JSON compilation snapshot
    Generate {
        /// Snapshot written by the host compiler
        snapshot: PathBuf,

        /// Write the generated source here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write the declaration surface to this file
        #[arg(long)]
        declarations: Option<PathBuf>,

        /// Namespace of the generated classes
        #[arg(long = "namespace")]
        generated_namespace: Option<String>,

        /// Namespace declaring the contract interfaces
        #[arg(long)]
        contract_namespace: Option<String>,

        /// Do not emit the InterceptsLocationAttribute declaration
        #[arg(long)]
        no_attribute: bool,
    },

    /// Write the declaration surface only
    Declarations {
        /// Namespace declaring the contract interfaces
        #[arg(long)]
        contract_namespace: Option<String>,

        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn options(contract_namespace: Option<String>) -> GeneratorOptions {
    let mut options = GeneratorOptions::default();
    if let Some(namespace) = contract_namespace {
        options.contract_namespace = namespace;
    }
    options
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Generate {
            snapshot,
            out,
            declarations,
            generated_namespace,
            contract_namespace,
            no_attribute,
        } => {
            let mut options = options(contract_namespace);
            if let Some(namespace) = generated_namespace {
                options.generated_namespace = namespace;
            }
            options.emit_intercepts_attribute = !no_attribute;

            let compilation = load_snapshot(&snapshot).into_diagnostic()?;
            let generator = Generator::new(options);
            let output = generator
                .generate(&compilation, &CancellationToken::new())
                .into_diagnostic()?;
            tracing::info!(
                call_sites = output.stats.call_sites,
                implementations = output.stats.implementations,
                "Generated {}",
                output.hint_name
            );

            render_diagnostics(&output.diagnostics, &compilation);
            write_output(out.as_deref(), &output.source)?;
            if let Some(path) = declarations {
                write_output(Some(&path), &generator.declarations())?;
            }

            Ok(if output.has_errors() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Declarations {
            contract_namespace,
            out,
        } => {
            write_output(out.as_deref(), &render_declarations(&options(contract_namespace)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run(args.command)
}
