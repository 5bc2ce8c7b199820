// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

use crate::{
    convert::Converter,
    poscar::{PoscarWriter, DEFAULT_PRECISION},
    species::SpeciesMap,
};
use anyhow::Result;
use clap::Parser;
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Convert a CONQUEST coordinate file to VASP POSCAR
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// CONQUEST coordinate file, e.g. coords_next.dat
    pub input: PathBuf,

    /// Species index and element label pairs, e.g. `1 Fe 2 O`
    #[clap(value_name = "IDX LABEL", allow_negative_numbers = true)]
    pub species: Vec<String>,

    /// Output POSCAR file. Asked for on stdin if omitted
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Species map in YAML format instead of index/label pairs
    #[clap(long, short = 's', conflicts_with = "species")]
    pub species_file: Option<PathBuf>,

    /// Minimum number of decimals in written numbers
    #[clap(long, short = 'p', default_value_t = DEFAULT_PRECISION)]
    pub precision: usize,

    /// Also write the VASP 5 element symbols line
    #[clap(long, action)]
    pub symbols_line: bool,

    /// Reject labels that are not chemical element symbols
    #[clap(long, action)]
    pub check_elements: bool,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
}

pub fn do_main() -> Result<()> {
    let args = Args::parse();
    if std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(
            DEFAULT_FILTER_ENV,
            if args.verbose { "Debug" } else { "Info" },
        );
    }
    pretty_env_logger::init();
    run(args)
}

/// Build the species map, convert, then ask for a destination if needed and write.
pub fn run(args: Args) -> Result<()> {
    let species = match &args.species_file {
        Some(path) => SpeciesMap::from_file(path)?,
        None => SpeciesMap::from_args(&args.species)?,
    };
    if args.check_elements {
        species.check_elements()?;
    }
    log::info!("Species: {}", species);

    let writer = PoscarWriter::default()
        .precision(args.precision)
        .symbols_line(args.symbols_line);
    let converter = Converter::new(species).with_writer(writer);
    let poscar = converter.convert_file(&args.input)?;

    let output = match args.output {
        Some(output) => output,
        None => prompt_output_path(&mut std::io::stdin().lock(), &mut std::io::stdout())?,
    };
    converter.write_file(&poscar, output)?;
    Ok(())
}

/// Ask for the destination path on `output` and read one line from `input`.
pub fn prompt_output_path(input: &mut impl BufRead, output: &mut impl Write) -> Result<PathBuf> {
    writeln!(output, "Please enter path to destination of output file.")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let path = line.trim();
    if path.is_empty() {
        anyhow::bail!("No output file given");
    }
    Ok(PathBuf::from(path))
}
