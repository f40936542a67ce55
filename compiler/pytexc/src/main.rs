//! Pytex CLI
//!
//! Runs the code blocks of a hybrid LaTeX document and writes the result.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use pytexc::{driver, Input, Mode, Options, Output};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Replace every code block of a LaTeX document with what it prints.
#[derive(Parser, Debug)]
#[command(name = "pytex", version, about)]
struct Cli {
    /// Document to convert; `-` reads stdin.
    input: PathBuf,

    /// Output path; `-` writes stdout. Defaults to the input with a `.tex`
    /// extension, or stdout when reading stdin.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// List the document's segments instead of converting it.
    #[arg(long)]
    segments: bool,

    /// More log output on stderr; repeat for more.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> Options {
        let mut options = Options::new(Input::from_arg(&self.input));
        if let Some(output) = &self.output {
            options = options.with_output(Output::from_arg(output));
        }
        if self.segments {
            options = options.with_mode(Mode::Segments);
        }
        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match driver::run(&cli.options()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "pytex failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. `PYTEX_LOG` or `RUST_LOG` override the level picked by
/// `-v`/`-q`.
fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let directives = std::env::var("PYTEX_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_owned());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}
