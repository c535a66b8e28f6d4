use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{info, LevelFilter};

use crate::decompression::decoder::DecoderOptions;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level_filter(&self) -> LevelFilter {
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
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    name = "bunzip2",
    version,
    about = "A Rust implementation of bunzip2",
    long_about = "
    Decompresses files in the bzip2 format. Every block CRC and the stream CRC are checked,
    and an output file is only kept (and the input only removed) when they all match.

    If no file names are given, bunzip2 decompresses from standard input to standard output."
)]
pub struct Args {
    /// Files to decompress
    #[clap()]
    files: Vec<String>,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Keep input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Force overwriting output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Suppress everything but the exit status
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Be verbose (a 2nd -v gives more)
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u64,

    /// Decode every bzip2 stream concatenated in a file, not just the first
    #[clap(long = "multi-stream")]
    multi_stream: bool,
}

/// Everything the binary needs to know to process its files.
#[derive(Debug, Clone)]
pub struct BzOpts {
    /// Vec of names of files to read for input
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Verbosity of user information
    pub verbose: Verbosity,
    /// Continue into concatenated streams
    pub multi_stream: bool,
}

impl BzOpts {
    pub fn new() -> Self {
        Self {
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Unzip,
            output: Output::File,
            verbose: Verbosity::Errors,
            multi_stream: false,
        }
    }

    /// Put command line information from CLAP into our internal structure.
    pub fn from_args(args: Args) -> Self {
        let verbose = if args.quiet {
            Verbosity::Quiet
        } else {
            match args.verbose {
                0 => Verbosity::Errors,
                1 => Verbosity::Warnings,
                2 => Verbosity::Info,
                3 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        };
        Self {
            // Reading standard input always writes standard output.
            output: if args.stdout || args.files.is_empty() {
                Output::Stdout
            } else {
                Output::File
            },
            files: args.files,
            force_overwrite: args.force,
            keep_input_files: args.keep,
            op_mode: if args.test { Mode::Test } else { Mode::Unzip },
            verbose,
            multi_stream: args.multi_stream,
        }
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions::new().multi_stream(self.multi_stream)
    }

    /// True when a successfully decoded input file should be deleted.
    pub fn remove_input(&self) -> bool {
        self.op_mode == Mode::Unzip && self.output == Output::File && !self.keep_input_files
    }
}

impl Default for BzOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the command line. Exits with status 2 on a usage error.
pub fn bzopts_init() -> BzOpts {
    BzOpts::from_args(Args::parse())
}

/// Report the settings in effect. Call once logging is set up.
pub fn report(opts: &BzOpts) {
    info!("---- Bunzip2 Initialization Start ----",);
    info!("Verbosity set to {}", opts.verbose.level_filter());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Sending output to {}", opts.output);
    if opts.files.is_empty() {
        info!("Getting input from stdin");
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    if opts.multi_stream {
        info!("Decoding concatenated streams")
    };
    info!("---- Bunzip2 Initialization End ----\n");
}

/// Name of the file a compressed file decompresses into.
pub fn output_name(input: &str) -> String {
    for (suffix, replacement) in [(".bz2", ""), (".bz", ""), (".tbz2", ".tar"), (".tbz", ".tar")] {
        if let Some(stem) = input.strip_suffix(suffix) {
            if !stem.is_empty() && !stem.ends_with('/') {
                return format!("{}{}", stem, replacement);
            }
        }
    }
    format!("{}.out", input)
}
