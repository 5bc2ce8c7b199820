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

//! Error kinds for every stage of a conversion.

use crate::SpeciesIndex;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("species arguments must come in index/label pairs, got {count} argument(s)")]
    InvalidArgumentCount { count: usize },

    #[error("species index at argument {position} ('{token}') {reason}")]
    InvalidSpeciesIndex {
        /// 1-based position within the species argument list
        position: usize,
        token: String,
        reason: &'static str,
    },

    #[error("label '{label}' of species declaration {entry} {reason}")]
    InvalidSpeciesLabel {
        /// 1-based declaration number
        entry: usize,
        label: String,
        reason: &'static str,
    },

    #[error("malformed lattice vector on line {line}: expected 3 numbers, found '{content}'")]
    MalformedLattice { line: usize, content: String },

    #[error("malformed atom count on line {line}: expected a non-negative integer, found '{content}'")]
    MalformedAtomCount { line: usize, content: String },

    #[error("malformed atom record on line {line}: {details}")]
    MalformedAtomRecord { line: usize, details: String },

    #[error("atom on line {line} references species index {index}, which has no label")]
    UnknownSpeciesIndex { index: SpeciesIndex, line: usize },

    #[error("atom count mismatch: header declares {expected} atom(s) but {observed} were read")]
    AtomCountMismatch { expected: usize, observed: usize },

    #[error("failed to read coordinate data: {source}")]
    InputReadFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("unable to open input file '{}': {source}", .path.display())]
    InputOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to create output file '{}': {source}", .path.display())]
    OutputOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing output to {}: {source}", SinkDisplay(.path))]
    OutputWriteFailed {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid species file '{}': {details}", .path.display())]
    SpeciesFileInvalid { path: PathBuf, details: String },
}

impl Error {
    pub(crate) fn malformed_record(line: usize, details: impl Into<String>) -> Self {
        Self::MalformedAtomRecord {
            line,
            details: details.into(),
        }
    }

    pub(crate) fn from_read(source: std::io::Error) -> Self {
        Self::InputReadFailed { source }
    }

    pub(crate) fn from_write(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::OutputWriteFailed { path, source }
    }
}

struct SinkDisplay<'a>(&'a Option<PathBuf>);

impl fmt::Display for SinkDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "'{}'", p.display()),
            None => write!(f, "output stream"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_data() {
        let err = Error::UnknownSpeciesIndex { index: 7, line: 9 };
        assert_eq!(
            err.to_string(),
            "atom on line 9 references species index 7, which has no label"
        );
        let err = Error::AtomCountMismatch {
            expected: 3,
            observed: 2,
        };
        assert!(err.to_string().contains("declares 3"));
        assert!(err.to_string().contains("2 were read"));
    }

    #[test]
    fn write_failure_without_path() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = Error::from_write(io, None);
        assert!(err.to_string().contains("output stream"));
    }
}
