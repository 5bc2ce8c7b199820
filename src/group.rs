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

//! Partitioning of atom records into per-species buckets.
//!
//! Buckets always follow the declaration order of the [`SpeciesMap`], one per
//! declared species, whether or not any atoms belong to it.

use crate::coords::AtomRecord;
use crate::error::{Error, Result};
use crate::species::SpeciesMap;
use crate::{Point, SpeciesIndex};
use derive_getters::Getters;

/// Fractional positions of all atoms of one species, in file order.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct SpeciesBucket {
    species: SpeciesIndex,
    label: String,
    positions: Vec<Point>,
}

impl SpeciesBucket {
    pub fn new(species: SpeciesIndex, label: impl Into<String>) -> Self {
        Self::with_capacity(species, label, 0)
    }

    fn with_capacity(species: SpeciesIndex, label: impl Into<String>, capacity: usize) -> Self {
        Self {
            species,
            label: label.into(),
            positions: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, position: Point) {
        self.positions.push(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Count atoms per declared species without storing positions.
///
/// Fails on the first record whose species is not declared, and if the
/// total differs from `natoms`.
pub fn tally<I>(records: I, species: &SpeciesMap, natoms: usize) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = Result<AtomRecord>>,
{
    let mut counts = vec![0; species.len()];
    for record in records {
        counts[resolve(&record?, species)?] += 1;
    }
    check_total(natoms, counts.iter().sum())?;
    log::debug!("Atoms per species: {:?}", counts);
    Ok(counts)
}

/// Group records into buckets, growing each bucket as atoms arrive.
pub fn group<I>(records: I, species: &SpeciesMap, natoms: usize) -> Result<Vec<SpeciesBucket>>
where
    I: IntoIterator<Item = Result<AtomRecord>>,
{
    let buckets = species
        .iter()
        .map(|e| SpeciesBucket::new(*e.index(), e.label().as_str()))
        .collect();
    fill(buckets, records, species, natoms)
}

/// Group records into buckets pre-sized from a previous [`tally`].
pub fn group_counted<I>(
    records: I,
    species: &SpeciesMap,
    counts: &[usize],
) -> Result<Vec<SpeciesBucket>>
where
    I: IntoIterator<Item = Result<AtomRecord>>,
{
    assert_eq!(counts.len(), species.len(), "one count per declared species");
    let buckets = species
        .iter()
        .zip(counts)
        .map(|(e, &n)| SpeciesBucket::with_capacity(*e.index(), e.label().as_str(), n))
        .collect();
    fill(buckets, records, species, counts.iter().sum())
}

fn fill<I>(
    mut buckets: Vec<SpeciesBucket>,
    records: I,
    species: &SpeciesMap,
    natoms: usize,
) -> Result<Vec<SpeciesBucket>>
where
    I: IntoIterator<Item = Result<AtomRecord>>,
{
    for record in records {
        let record = record?;
        buckets[resolve(&record, species)?].push(record.position);
    }
    check_total(natoms, buckets.iter().map(SpeciesBucket::len).sum())?;
    Ok(buckets)
}

fn resolve(record: &AtomRecord, species: &SpeciesMap) -> Result<usize> {
    species
        .slot(record.species)
        .ok_or(Error::UnknownSpeciesIndex {
            index: record.species,
            line: record.line,
        })
}

fn check_total(expected: usize, observed: usize) -> Result<()> {
    if expected != observed {
        return Err(Error::AtomCountMismatch { expected, observed });
    }
    Ok(())
}
