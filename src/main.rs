//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::Path,
    process::exit,
};

use bzip2_reader::tools::cli::{bzopts_init, output_name, report, BzOpts, Mode, Output};
use bzip2_reader::BzDecoder;

use log::{error, info, warn};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let options = bzopts_init();

    // Log to stderr so decompressed data on stdout stays clean.
    TermLogger::init(
        options.verbose.level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("Can't start the logger");
    report(&options);

    let failures = if options.files.is_empty() {
        let stdin = io::stdin();
        let result = decode_stream(&options, stdin.lock(), "(stdin)");
        usize::from(result.is_err())
    } else {
        options
            .files
            .iter()
            .filter(|name| decode_file(&options, name).is_err())
            .count()
    };

    info!("Done.\n");
    exit(if failures == 0 { 0 } else { 1 });
}

/// Decompress (or test) one named file. Errors are reported here.
fn decode_file(opts: &BzOpts, name: &str) -> io::Result<()> {
    let result = match (opts.op_mode, opts.output) {
        (Mode::Unzip, Output::File) => unzip_to_file(opts, name),
        _ => File::open(name).and_then(|f| decode_stream(opts, f, name)),
    };
    match &result {
        Ok(()) if opts.remove_input() => {
            if let Err(e) = fs::remove_file(name) {
                warn!("{}: can't remove input file: {}", name, e);
            }
        }
        Ok(()) => {}
        Err(e) => error!("{}: {}", name, e),
    }
    result
}

/// Decompress to stdout, or just check the data in test mode.
fn decode_stream<R: Read>(opts: &BzOpts, source: R, name: &str) -> io::Result<()> {
    let mut decoder = BzDecoder::with_options(source, opts.decoder_options());
    match opts.op_mode {
        Mode::Test => {
            io::copy(&mut decoder, &mut io::sink())?;
            info!("{}: ok", name);
        }
        Mode::Unzip => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            io::copy(&mut decoder, &mut out)?;
            out.flush()?;
        }
    }
    info!(
        "{}: {} bytes in, {} bytes out.",
        name,
        decoder.total_in(),
        decoder.total_out()
    );
    Ok(())
}

/// Decompress name into the file given by output_name(). A partial output file is removed on error.
fn unzip_to_file(opts: &BzOpts, name: &str) -> io::Result<()> {
    let target = output_name(name);
    if Path::new(&target).exists() && !opts.force_overwrite {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("output file {} already exists (use --force to overwrite)", target),
        ));
    }
    let mut decoder = BzDecoder::with_options(File::open(name)?, opts.decoder_options());
    let result = write_all_to(&mut decoder, &target);
    if result.is_err() {
        if let Err(e) = fs::remove_file(&target) {
            warn!("{}: can't remove partial output: {}", target, e);
        }
    }
    let written = result?;
    info!(
        "{}: {} bytes in, {} bytes out to {}.",
        name,
        decoder.total_in(),
        written,
        target
    );
    Ok(())
}

fn write_all_to<R: Read>(decoder: &mut BzDecoder<R>, target: &str) -> io::Result<u64> {
    let mut out = BufWriter::new(File::create(target)?);
    let written = io::copy(decoder, &mut out)?;
    out.flush()?;
    Ok(written)
}
