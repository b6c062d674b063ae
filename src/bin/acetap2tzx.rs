extern crate acetap;
extern crate clap;

use clap::{App, Arg};
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use acetap::tape::{Image, TapeError};
use acetap::{convert, Strictness};
use tracing::Level;

// Possible exit codes
static _EXIT_SUCCESS: i32 = 0;
static EXIT_FAILURE: i32 = 1;

/// Appended to the input filename to name the output.
static OUTPUT_SUFFIX: &str = ".tzx";

fn main() {
    // Parse command-line arguments
    let matches = App::new("Jupiter Ace TAP to TZX converter")
        .version("0.1.0")
        .about("Convert a Jupiter Ace TAP tape image into a TZX tape image.")
        .arg(
            Arg::with_name("tapfile")
                .required(true)
                .help("TAP image to convert"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("TZX file to create (default: the TAP filename plus \".tzx\")"),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Fail on a truncated final block instead of ignoring it"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log more detail"),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));

    let input = Path::new(matches.value_of_os("tapfile").unwrap_or_default());
    let output = match matches.value_of_os("output") {
        Some(output) => PathBuf::from(output),
        None => output_path(input),
    };
    let strictness = if matches.is_present("strict") {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };

    if let Err(e) = cmd_convert(input, &output, strictness) {
        eprintln!("Error: {}", e);
        process::exit(EXIT_FAILURE);
    }
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

/// The output path is the input path with the TZX suffix appended, so
/// "game.tap" becomes "game.tap.tzx".
fn output_path(input: &Path) -> PathBuf {
    let mut output = OsString::from(input.as_os_str());
    output.push(OUTPUT_SUFFIX);
    PathBuf::from(output)
}

/// Wrap an error with the path and action it arose from, keeping its kind.
fn annotate(e: io::Error, action: &str, path: &Path) -> io::Error {
    io::Error::new(
        e.kind(),
        format!("cannot {} '{}': {}", action, path.display(), e),
    )
}

/// True if both paths name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn cmd_convert(input: &Path, output: &Path, strictness: Strictness) -> io::Result<()> {
    let image = Image::open(input).map_err(|e| annotate(e, "open", input))?;
    // Creating the output would truncate the input while it is still mapped.
    if same_file(input, output) {
        let e = io::Error::new(
            io::ErrorKind::InvalidInput,
            "output would overwrite the input",
        );
        return Err(annotate(e, "create", output));
    }
    let file = fs::File::create(output).map_err(|e| annotate(e, "create", output))?;
    let summary = match convert(image.reader(), BufWriter::new(file), strictness) {
        Ok(summary) => summary,
        Err(e) => match TapeError::from_io_error(&e) {
            // Conversion errors are about the input, not the output file.
            Some(_) => return Err(annotate(e, "convert", input)),
            None => return Err(annotate(e, "write", output)),
        },
    };
    if summary.truncated {
        eprintln!(
            "Warning: '{}' ends part way through a block, which was dropped.",
            input.display()
        );
    }
    println!(
        "{} blocks ({} bytes) written to '{}'.",
        summary.blocks,
        summary.payload_bytes,
        output.display()
    );
    Ok(())
}
