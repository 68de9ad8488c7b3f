use serde::{Deserialize, Serialize};

use crate::mass::{residue_masses, H2O, PROTON};
use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    B,
    Y,
}

/// Theoretical B/Y ion
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ion {
    /// B or Y ion
    pub kind: Kind,
    /// Singly protonated fragment mass
    pub mass: f64,
}

/// Generate the B or Y ion ladder for a peptide.
///
/// B ions are yielded as b1, b2, ... bn (prefixes, shortest first), and Y ions
/// as y1, y2, ... yn (suffixes, shortest first). Both series include the ion
/// spanning the complete peptide.
pub struct IonSeries {
    pub kind: Kind,
    cumulative_mass: f64,
    residues: Vec<f64>,
    idx: usize,
}

impl IonSeries {
    /// Create a new [`IonSeries`] iterator for a specified peptide sequence
    pub fn new(peptide: &str, kind: Kind) -> Result<Self, Error> {
        let mut residues = residue_masses(peptide)?;
        let cumulative_mass = match kind {
            Kind::B => PROTON,
            Kind::Y => {
                // Walk the sequence from the C-terminus
                residues.reverse();
                H2O + PROTON
            }
        };
        Ok(Self {
            kind,
            cumulative_mass,
            residues,
            idx: 0,
        })
    }
}

impl Iterator for IonSeries {
    type Item = Ion;

    // Keep a running sum, rather than re-summing each prefix/suffix
    fn next(&mut self) -> Option<Self::Item> {
        let residue = self.residues.get(self.idx)?;
        self.cumulative_mass += residue;
        self.idx += 1;
        Some(Ion {
            kind: self.kind,
            mass: self.cumulative_mass,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.residues.len() - self.idx;
        (n, Some(n))
    }
}

/// Turns a peptide into its theoretical fragment masses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ionizer {
    pub kinds: Vec<Kind>,
}

impl Default for Ionizer {
    fn default() -> Self {
        Ionizer {
            kinds: vec![Kind::B, Kind::Y],
        }
    }
}

impl Ionizer {
    pub fn new(kinds: Vec<Kind>) -> Self {
        Ionizer { kinds }
    }

    /// All ions, series by series in the order of `self.kinds`
    pub fn ions(&self, peptide: &str) -> Result<Vec<Ion>, Error> {
        let mut ions = Vec::with_capacity(peptide.len() * self.kinds.len());
        for kind in &self.kinds {
            ions.extend(IonSeries::new(peptide, *kind)?);
        }
        Ok(ions)
    }

    /// Fragment masses, sorted ascending. Equal masses keep series order
    pub fn fragments(&self, peptide: &str) -> Result<Vec<f64>, Error> {
        let mut masses = self
            .ions(peptide)?
            .into_iter()
            .map(|ion| ion.mass)
            .collect::<Vec<_>>();
        masses.sort_by(|a, b| a.total_cmp(b));
        Ok(masses)
    }
}
