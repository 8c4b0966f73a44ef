//! Command line interface for the bzip2 decompressor.
use clap::Parser;
use log::LevelFilter;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}
impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Unzip,
    Test,
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}

/// bunzip, a block-sorting file decompressor.
#[derive(Parser, Debug, Default)]
#[clap(name = "bunzip", version)]
pub struct BzOpts {
    /// Decompress (the default, accepted for bzip2 compatibility)
    #[clap(short = 'd', long)]
    pub decompress: bool,
    /// Test compressed file integrity without writing any output
    #[clap(short = 't', long)]
    pub test: bool,
    /// Write output to standard out
    #[clap(short = 'c', long)]
    pub stdout: bool,
    /// Don't remove input files after processing
    #[clap(short = 'k', long)]
    pub keep: bool,
    /// Silently overwrite existing files with the same name
    #[clap(short = 'f', long)]
    pub force: bool,
    /// Stop after the first bzip2 stream instead of decoding concatenated streams
    #[clap(short = 's', long)]
    pub single_stream: bool,
    /// More detail on stderr (repeat up to four times)
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Suppress all messages
    #[clap(short = 'q', long)]
    pub quiet: bool,
    /// Files to decompress (standard in when none are given)
    #[clap(value_parser)]
    pub files: Vec<String>,
}

impl BzOpts {
    pub fn op_mode(&self) -> Mode {
        if self.test {
            Mode::Test
        } else {
            Mode::Unzip
        }
    }

    pub fn output(&self) -> Output {
        if self.stdout || self.files.is_empty() {
            Output::Stdout
        } else {
            Output::File
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Errors,
            1 => Verbosity::Warnings,
            2 => Verbosity::Info,
            3 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    /// Decode streams appended back to back as one.
    pub fn concatenated(&self) -> bool {
        !self.single_stream
    }
}

/// Parse the command line.
pub fn bzopts_init() -> BzOpts {
    BzOpts::parse()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_test() {
        let opts = BzOpts::parse_from(["bunzip", "a.bz2"]);
        assert_eq!(opts.op_mode(), Mode::Unzip);
        assert_eq!(opts.output(), Output::File);
        assert_eq!(opts.verbosity(), Verbosity::Errors);
        assert!(opts.concatenated());
        assert_eq!(opts.files, vec!["a.bz2".to_string()]);
    }

    #[test]
    fn flags_test() {
        let opts = BzOpts::parse_from(["bunzip", "-tkfs", "-vvv", "a.bz2", "b.bz2"]);
        assert_eq!(opts.op_mode(), Mode::Test);
        assert!(opts.keep);
        assert!(opts.force);
        assert!(!opts.concatenated());
        assert_eq!(opts.verbosity(), Verbosity::Debug);
        assert_eq!(opts.files.len(), 2);
    }

    #[test]
    fn stdin_and_quiet_test() {
        let opts = BzOpts::parse_from(["bunzip", "-q", "-vv"]);
        assert_eq!(opts.output(), Output::Stdout);
        assert_eq!(opts.verbosity(), Verbosity::Quiet);
        assert_eq!(opts.verbosity().level_filter(), LevelFilter::Off);
    }
}
