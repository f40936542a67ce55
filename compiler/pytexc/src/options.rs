//! What a `pytex` invocation should do, independent of how it was parsed.

use std::path::{Path, PathBuf};

/// Where the document comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// `-` means stdin.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            Input::Stdin
        } else {
            Input::File(arg.to_path_buf())
        }
    }

    /// Name used in messages.
    pub fn display_path(&self) -> &Path {
        match self {
            Input::Stdin => Path::new("<stdin>"),
            Input::File(path) => path,
        }
    }
}

/// Where the converted text goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// `-` means stdout.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            Output::Stdout
        } else {
            Output::File(arg.to_path_buf())
        }
    }

    /// Default output for `input`: the same path with a `.tex` extension,
    /// or stdout when reading stdin.
    pub fn default_for(input: &Input) -> Self {
        match input {
            Input::Stdin => Output::Stdout,
            Input::File(path) => Output::File(path.with_extension("tex")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Run the code blocks and write the converted document.
    #[default]
    Convert,
    /// List the segments without running anything.
    Segments,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub input: Input,
    pub output: Output,
    pub mode: Mode,
}

impl Options {
    /// Options for converting `input` to its default output.
    pub fn new(input: Input) -> Self {
        let output = Output::default_for(&input);
        Options {
            input,
            output,
            mode: Mode::Convert,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}
