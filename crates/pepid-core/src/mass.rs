use crate::Error;

pub const H2O: f64 = 18.011;
pub const PROTON: f64 = 1.007;

/// Bumped whenever a residue mass (or H2O/PROTON) changes, so that stored
/// database snapshots built with older masses are rejected on load
pub const RESIDUE_TABLE_VERSION: u32 = 1;

/// Every residue code with an entry in the mass table. `U` is carried with
/// an explicit zero mass.
pub const VALID_AA: [char; 21] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'Y', 'U',
];

pub trait Mass {
    /// Summed residue mass, without any terminal groups
    fn residue_mass(&self) -> Result<f64, Error>;

    /// Mass of a peptide: residues + one water + one proton
    fn monoisotopic(&self) -> Result<f64, Error> {
        Ok(self.residue_mass()? + H2O + PROTON)
    }
}

impl Mass for char {
    fn residue_mass(&self) -> Result<f64, Error> {
        match self {
            'A' => Ok(71.037),
            'R' => Ok(156.101),
            'N' => Ok(114.043),
            'D' => Ok(115.027),
            'C' => Ok(103.009),
            'E' => Ok(129.043),
            'Q' => Ok(128.059),
            'G' => Ok(57.021),
            'H' => Ok(137.059),
            'I' => Ok(113.084),
            'L' => Ok(113.084),
            'K' => Ok(128.095),
            'M' => Ok(131.040),
            'F' => Ok(147.068),
            'P' => Ok(97.053),
            'S' => Ok(87.032),
            'T' => Ok(101.048),
            'W' => Ok(186.079),
            'Y' => Ok(163.063),
            'V' => Ok(99.068),
            'U' => Ok(0.0),
            _ => Err(Error::MissingResidue(*self)),
        }
    }
}

impl Mass for str {
    fn residue_mass(&self) -> Result<f64, Error> {
        self.chars().try_fold(0.0, |acc, c| Ok(acc + c.residue_mass()?))
    }
}

/// Per-residue masses of a sequence, in sequence order
pub fn residue_masses(sequence: &str) -> Result<Vec<f64>, Error> {
    sequence.chars().map(|c| c.residue_mass()).collect()
}
