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

//! Chemical element symbols, ordered by atomic number.

const SYMBOLS: [&str; 118] = [
    "H", "He", // period 1
    "Li", "Be", "B", "C", "N", "O", "F", "Ne", // period 2
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", // period 3
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se",
    "Br", "Kr", // period 4
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te",
    "I", "Xe", // period 5
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At",
    "Rn", // period 6
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts",
    "Og", // period 7
];

/// Atomic number for an element symbol (case-sensitive), or `None` if unknown.
pub fn atomic_number(symbol: &str) -> Option<usize> {
    SYMBOLS.iter().position(|s| *s == symbol).map(|i| i + 1)
}

pub fn is_element(symbol: &str) -> bool {
    atomic_number(symbol).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("Fe"), Some(26));
        assert_eq!(atomic_number("Bi"), Some(83));
        assert_eq!(atomic_number("Og"), Some(118));
    }

    #[test]
    fn rejects_unknown_and_miscased() {
        assert!(!is_element("Xx"));
        assert!(!is_element("fe"));
        assert!(!is_element("Fe1"));
        assert!(!is_element(""));
    }
}
