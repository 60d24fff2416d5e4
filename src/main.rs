// Copyright (C) 2020 Guillaume Valadon <guillaume@valadon.net>

use std::io;
use std::io::prelude::*;
use std::io::BufWriter;
use std::process;

extern crate clap;
use clap::{crate_version, App, Arg, ErrorKind};

use hexocts::{convert_file, Options};

const USAGE: &str = "Usage: convert filename.hex";

// -1 in the original tool
const USAGE_EXIT_CODE: i32 = 255;

fn usage() -> ! {
    println!("{}", USAGE);
    process::exit(USAGE_EXIT_CODE);
}

fn main() {
    let matches = App::new("convert")
        .version(crate_version!())
        .about("Convert an Intel HEX file into a C octet array initializer")
        .arg(
            Arg::with_name("FILENAME")
                .help("Intel HEX file to convert")
                .required(true)
                .allow_hyphen_values(true)
                .index(1),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Reject pairs that are not two hexadecimal digits"),
        )
        .get_matches_safe();

    let matches = match matches {
        Ok(m) => m,
        Err(e) => match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
            _ => usage(),
        },
    };

    let filename = match matches.value_of_os("FILENAME") {
        Some(f) => f,
        None => usage(),
    };

    let options = Options {
        strict: matches.is_present("strict"),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Err(e) = convert_file(filename, &mut out, &options) {
        // Lines converted before the error are kept
        let _ = out.flush();
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
