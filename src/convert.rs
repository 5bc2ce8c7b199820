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

//! CONQUEST to POSCAR conversion pipeline.
//!
//! All parsing and validation completes in memory before anything is
//! written, so a failed conversion never leaves a partial output file.

use crate::coords::CoordinateReader;
use crate::error::{Error, Result};
use crate::group;
use crate::poscar::{Poscar, PoscarWriter};
use crate::species::SpeciesMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Converter {
    species: SpeciesMap,
    writer: PoscarWriter,
}

impl Converter {
    pub fn new(species: SpeciesMap) -> Self {
        Self {
            species,
            writer: PoscarWriter::default(),
        }
    }

    /// Use a custom writer configuration
    pub fn with_writer(mut self, writer: PoscarWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn species(&self) -> &SpeciesMap {
        &self.species
    }

    /// Parse and group a coordinate source.
    ///
    /// The atom region is scanned twice: a counting pass that resolves every
    /// species index and checks the declared atom count, then an extraction
    /// pass into buckets sized by the first.
    pub fn convert<R: BufRead + Seek>(&self, source: R) -> Result<Poscar> {
        let mut reader = CoordinateReader::new(source)?;
        let natoms = reader.header().natoms;
        let counts = group::tally(reader.atoms()?, &self.species, natoms)?;
        let buckets = group::group_counted(reader.atoms()?, &self.species, &counts)?;
        log::info!("Grouped {} atoms into {} species", natoms, self.species.len());
        Ok(Poscar::new(reader.header().lattice, buckets))
    }

    /// Parse and group a coordinate file.
    pub fn convert_file(&self, input: impl AsRef<Path>) -> Result<Poscar> {
        let input = input.as_ref();
        let file = File::open(input).map_err(|source| Error::InputOpenFailed {
            path: input.to_path_buf(),
            source,
        })?;
        log::info!("Reading CONQUEST coordinates from {}", input.display());
        self.convert(BufReader::new(file))
    }

    /// Render the converted structure
    pub fn render(&self, poscar: &Poscar) -> String {
        self.writer.render(poscar)
    }

    /// Create `output` and write the structure to it.
    pub fn write_file(&self, poscar: &Poscar, output: impl AsRef<Path>) -> Result<()> {
        let output = output.as_ref();
        let file = File::create(output).map_err(|source| Error::OutputOpenFailed {
            path: output.to_path_buf(),
            source,
        })?;
        self.writer.write(file, poscar, Some(output.to_path_buf()))?;
        log::info!("Wrote {} atoms to {}", poscar.natoms(), output.display());
        Ok(())
    }

    /// Convert `input` and write the result to `output`.
    ///
    /// The output file is only created once the input has been fully validated.
    pub fn run(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<Poscar> {
        let poscar = self.convert_file(input)?;
        self.write_file(&poscar, output)?;
        Ok(poscar)
    }
}
