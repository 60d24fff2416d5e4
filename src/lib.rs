// Copyright (C) 2020 Guillaume Valadon <guillaume@valadon.net>

use std::fs::File;
use std::io::prelude::*; // used to get the BufRead trait
use std::io::BufReader;
use std::path::Path;

extern crate err_derive;
use err_derive::Error;

extern crate hex;

/// First line of every converted block.
pub const HEADER: &str =
    "// Paste this output into the hexcode field of your image_t structure.";

/// Records starting with this prefix carry an address, not payload bytes.
const EXTENDED_LINEAR_ADDRESS: &[u8] = b":04";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(display = "'{}' is not a valid file!", filename)]
    InvalidFile { filename: String },
    #[error(display = "cannot read '{}': {}", filename, source)]
    ReadFileError {
        filename: String,
        #[error(source)]
        source: std::io::Error,
    },
    #[error(display = "cannot write output: {}", source)]
    WriteError {
        #[error(source)]
        source: std::io::Error,
    },
    #[error(display = "invalid octet '{}' at line {}", pair, line)]
    InvalidOctet { line: usize, pair: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// Reject pairs that are not two hexadecimal digits.
    pub strict: bool,
}

fn write_error(source: std::io::Error) -> ConvertError {
    ConvertError::WriteError { source }
}

/// Strip leading and trailing ASCII whitespace.
pub fn trim(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !is_space(*b))
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !is_space(*b))
        .map_or(start, |p| p + 1);
    &line[start..end]
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Only the first three characters are compared, so `:04` followed by
/// anything (or nothing) matches.
pub fn is_extended_linear_address(line: &[u8]) -> bool {
    line.starts_with(EXTENDED_LINEAR_ADDRESS)
}

/// Two-character windows of `line`, starting after the record mark.
///
/// A lone trailing character is dropped: a line of length `n` always yields
/// `(n - 1) / 2` pairs. The characters are not checked.
pub fn octet_pairs(line: &[u8]) -> Vec<&[u8]> {
    if line.is_empty() {
        return vec![];
    }
    line[1..].chunks_exact(2).collect()
}

/// Write the output line for a single input line, terminator included.
pub fn convert_line<W: Write>(
    line: &[u8],
    line_number: usize,
    options: &Options,
    out: &mut W,
) -> Result<(), ConvertError> {
    let line = trim(line);

    if !is_extended_linear_address(line) {
        for pair in octet_pairs(line) {
            if options.strict && hex::decode(pair).is_err() {
                return Err(ConvertError::InvalidOctet {
                    line: line_number,
                    pair: String::from_utf8_lossy(pair).into_owned(),
                });
            }
            out.write_all(b"0x").map_err(write_error)?;
            out.write_all(pair).map_err(write_error)?;
            out.write_all(b", ").map_err(write_error)?;
        }
    }

    out.write_all(b"\n").map_err(write_error)
}

/// Convert every line of `reader`, framed by the header, braces and a
/// comment naming `filename`.
pub fn convert<R: BufRead, W: Write>(
    filename: &str,
    reader: R,
    out: &mut W,
    options: &Options,
) -> Result<(), ConvertError> {
    writeln!(out, "{}", HEADER).map_err(write_error)?;
    writeln!(out, "{{").map_err(write_error)?;
    writeln!(out, "  // octet representation of {}.", filename).map_err(write_error)?;

    for (line_number, line) in reader.split(b'\n').enumerate().map(|(ln, l)| (ln + 1, l)) {
        let line = line.map_err(|source| ConvertError::ReadFileError {
            filename: filename.to_string(),
            source,
        })?;
        convert_line(&line, line_number, options, out)?;
    }

    writeln!(out, "}}").map_err(write_error)?;
    out.flush().map_err(write_error)
}

/// Open `path` read-only and convert it. Nothing is written to `out` when the
/// file cannot be opened.
pub fn convert_file<P: AsRef<Path>, W: Write>(
    path: P,
    out: &mut W,
    options: &Options,
) -> Result<(), ConvertError> {
    let path = path.as_ref();
    let filename = path.to_string_lossy();

    let file = File::open(path).map_err(|source| ConvertError::ReadFileError {
        filename: filename.to_string(),
        source,
    })?;

    // Directories open fine on UNIX, the read would fail later
    let metadata = file
        .metadata()
        .map_err(|source| ConvertError::ReadFileError {
            filename: filename.to_string(),
            source,
        })?;
    if !metadata.is_file() {
        return Err(ConvertError::InvalidFile {
            filename: filename.to_string(),
        });
    }

    convert(&filename, BufReader::new(file), out, options)
}
