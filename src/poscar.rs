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

//! VASP POSCAR output.
//!
//! ```text
//! Fe O            labels (comment line)
//! 1.0             scale factor
//! ax ay az        lattice
//! bx by bz
//! cx cy cz
//! 1 1             atoms per species
//! Direct
//! x y z           fractional coordinates, grouped by species
//! ```

use crate::error::{Error, Result};
use crate::group::SpeciesBucket;
use crate::{Lattice, Point};
use derive_getters::Getters;
use itertools::Itertools;
use std::io::Write;
use std::path::PathBuf;

/// Decimals used when nothing else is requested
pub const DEFAULT_PRECISION: usize = 6;

/// Most decimals tried before falling back to the shortest exact representation
const MAX_PRECISION: usize = 17;

/// A fully assembled structure, ready to be written.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Poscar {
    lattice: Lattice,
    /// One bucket per declared species, in declaration order
    buckets: Vec<SpeciesBucket>,
}

impl Poscar {
    pub fn new(lattice: Lattice, buckets: Vec<SpeciesBucket>) -> Self {
        Self { lattice, buckets }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.iter().map(|b| b.label().as_str())
    }

    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(SpeciesBucket::len)
    }

    /// Total number of atoms
    pub fn natoms(&self) -> usize {
        self.counts().sum()
    }
}

/// Serializes a [`Poscar`]. Performs no validation.
#[derive(Debug, Clone, Copy)]
pub struct PoscarWriter {
    precision: usize,
    symbols_line: bool,
}

impl Default for PoscarWriter {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            symbols_line: false,
        }
    }
}

impl PoscarWriter {
    /// Minimum number of decimals for lattice and coordinate values
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Also write the VASP 5 element symbols line above the counts
    pub fn symbols_line(mut self, enable: bool) -> Self {
        self.symbols_line = enable;
        self
    }

    /// Render the complete document.
    pub fn render(&self, poscar: &Poscar) -> String {
        let labels = poscar.labels().join(" ");
        let mut lines = Vec::with_capacity(poscar.natoms() + 8);
        lines.push(labels.clone());
        lines.push("1.0".to_string());
        lines.extend(poscar.lattice.iter().map(|v| self.vector(v)));
        if self.symbols_line {
            lines.push(labels);
        }
        lines.push(poscar.counts().join(" "));
        lines.push("Direct".to_string());
        lines.extend(
            poscar
                .buckets
                .iter()
                .flat_map(|b| b.positions().iter())
                .map(|p| self.vector(p)),
        );
        lines.into_iter().map(|line| line + "\n").collect()
    }

    /// Write the rendered document to `sink` in one pass.
    ///
    /// `path` is only used for error reporting.
    pub fn write<W: Write>(
        &self,
        mut sink: W,
        poscar: &Poscar,
        path: Option<PathBuf>,
    ) -> Result<()> {
        sink.write_all(self.render(poscar).as_bytes())
            .and_then(|_| sink.flush())
            .map_err(|e| Error::from_write(e, path))
    }

    fn vector(&self, v: &Point) -> String {
        v.iter().map(|x| format_float(*x, self.precision)).join(" ")
    }
}

/// Fixed-point rendering with at least `precision` decimals that parses back
/// to exactly `value`.
pub fn format_float(value: f64, precision: usize) -> String {
    (precision..=MAX_PRECISION.max(precision))
        .map(|decimals| format!("{:.*}", decimals, value))
        .find(|s| s.parse::<f64>().ok() == Some(value))
        .unwrap_or_else(|| value.to_string())
}
