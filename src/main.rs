use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wish::Interpreter;
use wish::error::ERROR_MESSAGE;

#[derive(FromArgs)]
/// A small shell. Runs the lines of SCRIPT, or prompts for lines when none is given.
struct Args {
    #[argh(positional)]
    /// file of commands to run without prompting, one line at a time.
    script: Option<String>,
}

/// Logging stays off unless `WISH_LOG` holds a filter, so stderr only carries
/// the fixed error message.
fn init_logging() {
    let filter = EnvFilter::try_from_env("WISH_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn failure() -> ExitCode {
    let _ = io::stderr().write_all(ERROR_MESSAGE.as_bytes());
    ExitCode::FAILURE
}

fn parse_args() -> Result<Args, ExitCode> {
    let strings: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let name = strings.first().map(String::as_str).unwrap_or("wish");
    let rest: Vec<&str> = strings.iter().skip(1).map(String::as_str).collect();

    Args::from_args(&[name], &rest).map_err(|EarlyExit { output, status }| match status {
        Ok(()) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(()) => {
            tracing::debug!(%output, "invalid invocation");
            failure()
        }
    })
}

fn run(args: Args) -> Result<()> {
    let mut sh = Interpreter::default();
    match args.script {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("can't open script {}", path))?;
            sh.run_batch(BufReader::new(file))
                .with_context(|| format!("can't read script {}", path))?;
        }
        None => sh.repl().context("interactive session failed")?,
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            failure()
        }
    }
}
