//! Executing [`Options`]: read the document, process it, write the result.
//!
//! The output file is written only after processing succeeded, through a
//! temporary file in the same directory that is renamed over the target.
//! A failing document therefore never creates or truncates its output.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use pytex_segment::segments;

use crate::error::CliError;
use crate::options::{Input, Mode, Options, Output};
use crate::Converter;

/// Carry out one invocation.
#[tracing::instrument(level = "info", skip_all, fields(input = %options.input.display_path().display()))]
pub fn run(options: &Options) -> Result<(), CliError> {
    if let (Input::File(input), Output::File(output)) = (&options.input, &options.output) {
        if same_file(input, output) {
            return Err(CliError::OutputIsInput {
                path: output.clone(),
            });
        }
    }

    let document = read_input(&options.input)?;
    let text = match options.mode {
        Mode::Convert => Converter::new().convert(&document)?,
        Mode::Segments => describe_segments(&document),
    };
    write_output(&options.output, &text)?;
    tracing::info!(bytes = text.len(), "wrote output");
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn read_input(input: &Input) -> Result<String, CliError> {
    let path = input.display_path();
    let bytes = match input {
        Input::Stdin => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|err| CliError::io("read", path, err))?;
            bytes
        }
        Input::File(file) => fs::read(file).map_err(|err| CliError::io("read", path, err))?,
    };
    String::from_utf8(bytes).map_err(|source| CliError::Utf8 {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(output: &Output, text: &str) -> Result<(), CliError> {
    match output {
        Output::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|err| CliError::io("write", "<stdout>", err))
        }
        Output::File(path) => write_atomically(path, text),
    }
}

fn write_atomically(path: &Path, text: &str) -> Result<(), CliError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file =
        tempfile::NamedTempFile::new_in(dir).map_err(|err| CliError::io("write", path, err))?;
    file.write_all(text.as_bytes())
        .map_err(|err| CliError::io("write", path, err))?;
    file.persist(path)
        .map_err(|err| CliError::io("write", path, err.error))?;
    Ok(())
}

/// One line per segment: index, kind, byte range and the quoted text.
pub fn describe_segments(document: &str) -> String {
    let mut out = String::new();
    for (index, segment) in segments(document).enumerate() {
        let range = segment.span().to_range();
        let _ = write!(
            out,
            "{index}\t{}\t{}..{}\t{:?}",
            segment.kind(),
            range.start,
            range.end,
            segment.text()
        );
        if !segment.is_terminated() {
            out.push_str("\t(unterminated)");
        }
        out.push('\n');
    }
    out
}
