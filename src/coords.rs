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

//! Reader for CONQUEST coordinate files (`coords_next.dat` and friends).
//!
//! ```text
//! v1x v1y v1z
//! v2x v2y v2z
//! v3x v3y v3z
//! natoms
//! x y z species_index move_x move_y move_z
//! ...
//! ```
//!
//! The header is parsed once on construction. The atom region can then be
//! scanned any number of times; each call to [`CoordinateReader::atoms`] seeks
//! back to the first atom line.

use crate::error::{Error, Result};
use crate::{Lattice, Point, SpeciesIndex};
use std::io::{BufRead, Seek, SeekFrom};

/// Number of header lines preceding the first atom record
const HEADER_LINES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Lattice vectors, one per row, in file order
    pub lattice: Lattice,
    /// Declared number of atoms
    pub natoms: usize,
}

/// One atom line of the coordinate section.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// Fractional position
    pub position: Point,
    pub species: SpeciesIndex,
    /// Per-axis mobility flags (`T`/`F` in CONQUEST). Not interpreted.
    pub mobility: [char; 3],
    /// 1-based line number in the source
    pub line: usize,
}

/// Seekable reader over a CONQUEST coordinate source.
#[derive(Debug)]
pub struct CoordinateReader<R> {
    source: R,
    header: Header,
    /// Byte offset of the first atom line
    atoms_offset: u64,
}

impl<R: BufRead + Seek> CoordinateReader<R> {
    /// Parse the header and remember where the atom region starts.
    pub fn new(mut source: R) -> Result<Self> {
        let header = parse_header(&mut source)?;
        let atoms_offset = source.stream_position().map_err(Error::from_read)?;
        log::debug!(
            "Header: {} atoms, atom records start at byte {}",
            header.natoms,
            atoms_offset
        );
        Ok(Self {
            source,
            header,
            atoms_offset,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Lazily scan the atom region from its first line.
    ///
    /// Scanning runs to end-of-data so that surplus records are seen by the
    /// caller. Blank lines are skipped.
    pub fn atoms(&mut self) -> Result<AtomRecords<'_, R>> {
        self.source
            .seek(SeekFrom::Start(self.atoms_offset))
            .map_err(Error::from_read)?;
        Ok(AtomRecords {
            source: &mut self.source,
            line: HEADER_LINES,
            buffer: String::new(),
            finished: false,
        })
    }
}

/// Iterator over the atom records of one scan.
#[derive(Debug)]
pub struct AtomRecords<'a, R> {
    source: &'a mut R,
    /// Line number of the most recently read line
    line: usize,
    buffer: String,
    finished: bool,
}

impl<R: BufRead> Iterator for AtomRecords<'_, R> {
    type Item = Result<AtomRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            match self.source.read_line(&mut self.buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line += 1;
                    if self.buffer.trim().is_empty() {
                        continue;
                    }
                    let record = parse_atom(&self.buffer, self.line);
                    self.finished = record.is_err();
                    return Some(record);
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::from_read(e)));
                }
            }
        }
        None
    }
}

/// Read the three lattice lines and the atom count line.
pub fn parse_header(source: &mut impl BufRead) -> Result<Header> {
    let mut lattice = [Point::zeros(); 3];
    for (row, vector) in lattice.iter_mut().enumerate() {
        let line = row + 1;
        let content = next_line(source)?.ok_or_else(|| Error::MalformedLattice {
            line,
            content: String::new(),
        })?;
        *vector = parse_vector(&content).ok_or(Error::MalformedLattice {
            line,
            content: content.trim().to_string(),
        })?;
    }

    let line = HEADER_LINES;
    let content = next_line(source)?.unwrap_or_default();
    let natoms = content
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::MalformedAtomCount {
            line,
            content: content.trim().to_string(),
        })?;

    Ok(Header { lattice, natoms })
}

fn next_line(source: &mut impl BufRead) -> Result<Option<String>> {
    let mut buffer = String::new();
    match source.read_line(&mut buffer).map_err(Error::from_read)? {
        0 => Ok(None),
        _ => Ok(Some(buffer)),
    }
}

/// Exactly three whitespace-separated floats
fn parse_vector(content: &str) -> Option<Point> {
    let mut values = content.split_whitespace().map(|s| s.parse::<f64>());
    let vector = Point::new(
        values.next()?.ok()?,
        values.next()?.ok()?,
        values.next()?.ok()?,
    );
    values.next().is_none().then_some(vector)
}

fn parse_atom(content: &str, line: usize) -> Result<AtomRecord> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() != 7 {
        return Err(Error::malformed_record(
            line,
            format!(
                "expected 7 fields (x y z species move_x move_y move_z), found {}",
                parts.len()
            ),
        ));
    }
    let coordinate = |i: usize, axis: &str| {
        parts[i].parse::<f64>().map_err(|_| {
            Error::malformed_record(line, format!("invalid {} coordinate '{}'", axis, parts[i]))
        })
    };
    let position = Point::new(coordinate(0, "x")?, coordinate(1, "y")?, coordinate(2, "z")?);
    let species = parts[3].parse::<SpeciesIndex>().map_err(|_| {
        Error::malformed_record(line, format!("invalid species index '{}'", parts[3]))
    })?;
    let flag = |i: usize| parts[i].chars().next().unwrap_or_default();

    Ok(AtomRecord {
        position,
        species,
        mobility: [flag(4), flag(5), flag(6)],
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::io::Cursor;

    const TWO_ATOMS: &str = "\
1.0 0.0 0.0
0.0 1.0 0.0
0.0 0.0 1.0
2
0.1 0.2 0.3 1 T T T
0.4 0.5 0.6 2 F F F
";

    #[test]
    fn header() {
        let reader = CoordinateReader::new(Cursor::new(TWO_ATOMS)).unwrap();
        let header = reader.header();
        assert_eq!(header.natoms, 2);
        assert_eq!(header.lattice[0], Point::new(1.0, 0.0, 0.0));
        assert_eq!(header.lattice[2], Point::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn records() {
        let mut reader = CoordinateReader::new(Cursor::new(TWO_ATOMS)).unwrap();
        let atoms: Vec<AtomRecord> = reader.atoms().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(atoms.len(), 2);
        assert_approx_eq!(f64, atoms[0].position.x, 0.1);
        assert_approx_eq!(f64, atoms[1].position.z, 0.6);
        assert_eq!(atoms[0].species, 1);
        assert_eq!(atoms[1].species, 2);
        assert_eq!(atoms[0].mobility, ['T', 'T', 'T']);
        assert_eq!(atoms[1].mobility, ['F', 'F', 'F']);
        assert_eq!(atoms[0].line, 5);
        assert_eq!(atoms[1].line, 6);
    }

    #[test]
    fn second_scan_restarts() {
        let mut reader = CoordinateReader::new(Cursor::new(TWO_ATOMS)).unwrap();
        let first = reader.atoms().unwrap().count();
        let second: Vec<AtomRecord> = reader.atoms().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(first, 2);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].line, 5);
    }

    #[test]
    fn scan_through_bufreader() {
        let source = std::io::BufReader::with_capacity(8, Cursor::new(TWO_ATOMS));
        let mut reader = CoordinateReader::new(source).unwrap();
        assert_eq!(reader.atoms().unwrap().count(), 2);
        assert_eq!(reader.atoms().unwrap().count(), 2);
    }

    #[test]
    fn skips_blank_lines_and_reads_surplus() {
        let text = "1 0 0\n0 1 0\n0 0 1\n1\n\n0.1 0.1 0.1 1 T T T\n\n0.2 0.2 0.2 1 T T T\n";
        let mut reader = CoordinateReader::new(Cursor::new(text)).unwrap();
        let atoms: Vec<AtomRecord> = reader.atoms().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].line, 6);
        assert_eq!(atoms[1].line, 8);
    }

    #[test]
    fn lattice_precision_is_kept() {
        let text = "10.263112345678912 0 0\n0 1 0\n0 0 1\n0\n";
        let reader = CoordinateReader::new(Cursor::new(text)).unwrap();
        assert_eq!(reader.header().lattice[0].x, 10.263112345678912);
    }

    #[test]
    fn malformed_lattice() {
        for text in ["1 0\n0 1 0\n0 0 1\n1\n", "1 0 0\n0 1 x\n0 0 1\n1\n", "1 0 0 0\n", ""] {
            let err = CoordinateReader::new(Cursor::new(text)).unwrap_err();
            assert!(matches!(err, Error::MalformedLattice { .. }), "{text:?}: {err}");
        }
        let err = CoordinateReader::new(Cursor::new("1 0 0\n0 1 0\n0 0 1 x\n")).unwrap_err();
        assert!(matches!(err, Error::MalformedLattice { line: 3, .. }));
    }

    #[test]
    fn malformed_atom_count() {
        for count in ["-2", "two", "2.5", "", "2 3"] {
            let text = format!("1 0 0\n0 1 0\n0 0 1\n{count}\n");
            let err = CoordinateReader::new(Cursor::new(text)).unwrap_err();
            assert!(matches!(err, Error::MalformedAtomCount { line: 4, .. }));
        }
    }

    #[test]
    fn malformed_record() {
        let text = "1 0 0\n0 1 0\n0 0 1\n2\n0.1 0.2 0.3 1 T T T\n0.4 0.5 2 F F F\n";
        let mut reader = CoordinateReader::new(Cursor::new(text)).unwrap();
        let mut atoms = reader.atoms().unwrap();
        assert!(atoms.next().unwrap().is_ok());
        let err = atoms.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::MalformedAtomRecord { line: 6, .. }));
        assert!(atoms.next().is_none());
    }

    #[test]
    fn bad_species_and_coordinate() {
        let text = "1 0 0\n0 1 0\n0 0 1\n1\n0.1 0.2 0.3 -1 T T T\n";
        let mut reader = CoordinateReader::new(Cursor::new(text)).unwrap();
        let err = reader.atoms().unwrap().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("species index '-1'"));

        let text = "1 0 0\n0 1 0\n0 0 1\n1\n0.1 abc 0.3 1 T T T\n";
        let mut reader = CoordinateReader::new(Cursor::new(text)).unwrap();
        let err = reader.atoms().unwrap().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("invalid y coordinate"));
    }
}
