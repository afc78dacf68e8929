//! Purpose: `ramify` CLI entry point: parse, verify, and pretty-print JSON.
//! Role: Binary crate root; reads files or stdin, streams concatenated
//! documents through one parser, renders each to stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: `--verify` suppresses stdout, never stderr diagnostics.
#![allow(clippy::result_large_err)]
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{CommandFactory, Parser as ArgParser, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use tracing_subscriber::EnvFilter;

use ramify::api::{Error, ErrorKind, Parser, build, render, to_exit_code};

#[derive(ArgParser, Debug)]
#[command(
    name = "ramify",
    version,
    about = "Parse, verify, and pretty-print JSON documents"
)]
struct Cli {
    /// Input files; stdin is read when none are given
    #[arg(value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,

    /// Exit status only: parse everything, print nothing on stdout
    #[arg(long)]
    verify: bool,

    /// Print a completion script for the given shell and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err(Error::new(ErrorKind::InvalidArgument)
                    .with_message(err.to_string())
                    .with_hint("Run `ramify --help` for usage."));
            }
        },
    };

    init_tracing();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "ramify", &mut io::stdout());
        return Ok(RunOutcome::ok());
    }

    if cli.files.is_empty() {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(|io_err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to read stdin")
                .with_source(io_err)
        })?;
        process_stream("<stdin>", &text, cli.verify)?;
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path).map_err(|io_err| {
                Error::new(ErrorKind::InvalidArgument)
                    .with_message(format!("unable to read {}", path.display()))
                    .with_source(io_err)
            })?;
            process_stream(&path.display().to_string(), &text, cli.verify)?;
        }
    }

    Ok(RunOutcome::ok())
}

/// Runs every concatenated document in `text` through one parser,
/// advancing by `next_offset` exactly as the library reports it.
fn process_stream(source: &str, text: &str, verify: bool) -> Result<(), Error> {
    let mut parser = Parser::new();
    let mut base = 0usize;
    loop {
        let parsed = match parser.parse(&text[base..]) {
            Ok(parsed) => parsed,
            Err(err) => {
                let trace = parser
                    .last_trace()
                    .map_or_else(|| err.to_string(), str::to_string);
                return Err(err.with_hint(format!("{source}: {trace}")));
            }
        };
        tracing::debug!(source, offset = base, total = parser.messages_parsed());
        if !verify {
            let rendered = render::to_string(&parsed.document)?;
            print!("{rendered}");
        }
        match parsed.next_offset {
            Some(next) => base += next,
            None => break,
        }
    }
    Ok(())
}

fn emit_error(err: &Error) {
    match error_json(err) {
        Ok(text) => eprint!("{text}"),
        Err(_) => eprintln!("error: {err}"),
    }
}

// The diagnostic object is built and rendered with the library's own
// tree, so stderr output stays parseable by the same tooling.
fn error_json(err: &Error) -> Result<String, Error> {
    let kind_label = format!("{:?}", err.kind());
    let mut body = build::object(build::with_key(build::string(&kind_label), "error"))?;
    if let Some(message) = err.message() {
        build::append_pair(&mut body, build::with_key(build::string(message), "message"))?;
    }
    if let Some(hint) = err.hint() {
        build::append_pair(&mut body, build::with_key(build::string(hint), "hint"))?;
    }
    if let Some(line) = err.line() {
        build::append_pair(
            &mut body,
            build::with_key(build::number(f64::from(line)), "line"),
        )?;
    }
    if let Some(offset) = err.offset() {
        build::append_pair(
            &mut body,
            build::with_key(build::number(offset as f64), "offset"),
        )?;
    }
    render::to_string(&body)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
