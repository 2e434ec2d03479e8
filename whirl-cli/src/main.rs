use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{self, Command, Stdio};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use whirl_core::{FsLoader, transpile_c};

/// Transpile a Whirl program to C and run it with a C toolchain.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Root Whirl source file; imports resolve relative to its directory.
    file: PathBuf,

    #[arg(short = 'c', long, help = "Keep the generated C file after running it")]
    keep: bool,

    #[arg(
        short,
        long,
        value_name = "PATH",
        default_value = "out.c",
        help = "Where to write the generated C file"
    )]
    output: PathBuf,

    #[arg(
        long,
        value_name = "CMD",
        env = "WHIRL_CC",
        default_value = "tcc",
        help = "C toolchain, invoked as `<CMD> -run <FILE>`"
    )]
    cc: String,

    #[arg(long, help = "Only write the C file; do not run it")]
    no_run: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let status = execute(cli)?;
    if status != 0 {
        process::exit(status);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("WHIRL_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns the exit status the process should end with.
fn execute(cli: Cli) -> Result<i32> {
    let source = fs::read(&cli.file)
        .with_context(|| format!("failed to read input file {}", cli.file.display()))?;
    let dir = cli.file.parent().unwrap_or(Path::new(""));

    let c = transpile_c(&source, dir, &FsLoader)
        .with_context(|| format!("failed to transpile {}", cli.file.display()))?;
    write_output(&cli.output, c.as_bytes())?;
    info!(output = %cli.output.display(), "wrote C source");

    if cli.no_run {
        return Ok(0);
    }

    let status = run_c(&cli.cc, &cli.output);
    if !cli.keep {
        fs::remove_file(&cli.output)
            .with_context(|| format!("failed to remove {}", cli.output.display()))?;
    }
    status
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

/// Run `<cc> -run <file>` and echo its combined output. Both streams
/// share one pipe so interleaved writes keep their order.
fn run_c(cc: &str, file: &Path) -> Result<i32> {
    debug!(cc, file = %file.display(), "running C toolchain");
    let (mut reader, writer) = io::pipe().context("failed to create output pipe")?;
    let mut child = Command::new(cc)
        .arg("-run")
        .arg(file)
        .stdin(Stdio::null())
        .stdout(writer.try_clone().context("failed to share output pipe")?)
        .stderr(writer)
        .spawn()
        .with_context(|| format!("failed to run `{cc} -run {}`", file.display()))?;

    // The builder holding our copies of the write end is gone, so the read
    // ends when the child exits.
    let mut output = Vec::new();
    reader
        .read_to_end(&mut output)
        .context("failed to read program output")?;
    let status = child.wait().context("failed to wait for the C toolchain")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;

    // A program killed by a signal has no exit code.
    Ok(status.code().unwrap_or(1))
}
