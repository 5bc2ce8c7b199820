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

//! Mapping from CONQUEST species indices to element labels.
//!
//! The map is ordered: the order in which species are declared decides the
//! order of labels, counts and coordinate blocks in the written POSCAR.

use crate::error::{Error, Result};
use crate::{elements, SpeciesIndex};
use derive_getters::Getters;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single `index -> label` declaration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Getters)]
pub struct SpeciesEntry {
    /// Species index as it appears in the coordinate file
    index: SpeciesIndex,
    /// Element label written to the POSCAR
    label: String,
}

impl SpeciesEntry {
    pub fn new(index: SpeciesIndex, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

/// Layout of a YAML species file.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SpeciesFile {
    species: Vec<SpeciesEntry>,
}

/// Ordered, immutable species map with unique indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesMap {
    entries: Vec<SpeciesEntry>,
}

impl SpeciesMap {
    /// Build from alternating `index label` command-line tokens.
    ///
    /// Positions in error messages are 1-based within `args`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(Error::InvalidArgumentCount { count: args.len() });
        }
        let mut map = Self::default();
        for (pair, (index, label)) in args.iter().tuples().enumerate() {
            let position = 2 * pair + 1;
            let index = parse_index(index.as_ref(), position)?;
            let label: &str = label.as_ref();
            map.push(SpeciesEntry::new(index, label), position, pair + 1)?;
        }
        log::debug!("Species map from arguments: {}", map);
        Ok(map)
    }

    /// Load from a YAML file with a top-level `species` sequence of `{index, label}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |details: String| Error::SpeciesFileInvalid {
            path: path.to_path_buf(),
            details,
        };
        let file = std::fs::File::open(path).map_err(|e| invalid(e.to_string()))?;
        let parsed: SpeciesFile = serde_yaml::from_reader(file).map_err(|e| invalid(e.to_string()))?;
        if parsed.species.is_empty() {
            return Err(invalid("no species declared".to_string()));
        }
        let mut map = Self::default();
        for (i, entry) in parsed.species.into_iter().enumerate() {
            map.push(entry, i + 1, i + 1)?;
        }
        log::debug!("Species map from {}: {}", path.display(), map);
        Ok(map)
    }

    fn push(&mut self, entry: SpeciesEntry, position: usize, declaration: usize) -> Result<()> {
        if self.slot(entry.index).is_some() {
            return Err(Error::InvalidSpeciesIndex {
                position,
                token: entry.index.to_string(),
                reason: "is declared more than once",
            });
        }
        let reason = if entry.label.is_empty() {
            Some("must not be empty")
        } else if entry.label.contains(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(Error::InvalidSpeciesLabel {
                entry: declaration,
                label: entry.label,
                reason,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Declaration position of a species index, if it is mapped.
    pub fn slot(&self, index: SpeciesIndex) -> Option<usize> {
        self.entries.iter().position(|e| e.index == index)
    }

    /// Label for a species index, if it is mapped.
    pub fn label(&self, index: SpeciesIndex) -> Option<&str> {
        self.slot(index).map(|i| self.entries[i].label.as_str())
    }

    /// Labels in declaration order
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Require every label to be a periodic-table symbol.
    pub fn check_elements(&self) -> Result<()> {
        match self
            .entries
            .iter()
            .position(|e| !elements::is_element(&e.label))
        {
            Some(i) => Err(Error::InvalidSpeciesLabel {
                entry: i + 1,
                label: self.entries[i].label.clone(),
                reason: "is not a chemical element symbol",
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for SpeciesMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.entries
                .iter()
                .map(|e| format!("{}={}", e.index, e.label))
                .join(", ")
        )
    }
}

fn parse_index(token: &str, position: usize) -> Result<SpeciesIndex> {
    let invalid = |reason| Error::InvalidSpeciesIndex {
        position,
        token: token.to_string(),
        reason,
    };
    match token.parse::<i64>() {
        Ok(value) if value < 0 => Err(invalid("must not be negative")),
        Ok(value) => SpeciesIndex::try_from(value).map_err(|_| invalid("is out of range")),
        Err(_) => Err(invalid("is not an integer")),
    }
}
