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

//! Conversion of CONQUEST coordinate files to VASP POSCAR.
//!
//! ```no_run
//! use c2v::{Converter, SpeciesMap};
//!
//! let species = SpeciesMap::from_args(&["1", "Fe", "2", "O"])?;
//! Converter::new(species).run("coords_next.dat", "POSCAR")?;
//! # Ok::<(), c2v::Error>(())
//! ```

use nalgebra::Vector3;

pub type Point = Vector3<f64>;
/// Lattice vectors, one per row
pub type Lattice = [Point; 3];
/// Species index as used in CONQUEST coordinate files
pub type SpeciesIndex = usize;

pub mod cli;
pub mod convert;
pub mod coords;
pub mod elements;
mod error;
pub mod group;
pub mod poscar;
pub mod species;

pub use convert::Converter;
pub use error::{Error, Result};
pub use species::SpeciesMap;
