//! Versioned, serializable form of a [`TandemDatabase`]
//!
//! A snapshot holds everything needed to restore a database: the digestion
//! and ionization parameters and the digested proteins. Theoretical spectra
//! are derived data, and are regenerated when the snapshot is restored.

use serde::{Deserialize, Serialize};

use crate::database::{EnzymeBuilder, Parameters, ProteinDatabase, ProteinRecord, TandemDatabase};
use crate::ion_series::Kind;
use crate::mass::RESIDUE_TABLE_VERSION;
use crate::Error;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub residue_table_version: u32,
    pub enzyme: EnzymeBuilder,
    pub ion_kinds: Vec<Kind>,
    pub peptide_tolerance: f64,
    pub targets: Vec<ProteinRecord>,
    pub decoys: Vec<ProteinRecord>,
}

impl Snapshot {
    /// Check that this snapshot was written with the current format and
    /// residue masses
    pub fn validate(&self) -> Result<(), Error> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::IncompatibleSnapshot(format!(
                "snapshot version {}, expected {}",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if self.residue_table_version != RESIDUE_TABLE_VERSION {
            return Err(Error::IncompatibleSnapshot(format!(
                "residue table version {}, expected {}",
                self.residue_table_version, RESIDUE_TABLE_VERSION
            )));
        }
        Ok(())
    }
}

impl TandemDatabase {
    pub fn snapshot(&self) -> Snapshot {
        let parameters = self.parameters().clone();
        Snapshot {
            version: SNAPSHOT_VERSION,
            residue_table_version: RESIDUE_TABLE_VERSION,
            enzyme: parameters.enzyme,
            ion_kinds: parameters.ion_kinds,
            peptide_tolerance: parameters.peptide_tolerance,
            targets: self.targets().proteins().to_vec(),
            decoys: self.decoys().proteins().to_vec(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, Error> {
        snapshot.validate()?;
        // Fail early on a snapshot carrying an unusable enzyme
        snapshot.enzyme.enzyme()?;

        let parameters = Parameters {
            enzyme: snapshot.enzyme,
            ion_kinds: snapshot.ion_kinds,
            peptide_tolerance: snapshot.peptide_tolerance,
        };
        TandemDatabase::assemble(
            ProteinDatabase::from_proteins(snapshot.targets, false),
            ProteinDatabase::from_proteins(snapshot.decoys, true),
            parameters,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::{Builder, SequenceRecord};

    fn database() -> TandemDatabase {
        Builder::default()
            .make_parameters()
            .build(&[
                SequenceRecord::new("P1", "GARFIELDDEKARPER"),
                SequenceRecord::new("P2", "PEPTIDEK"),
            ])
            .unwrap()
    }

    #[test]
    fn restore() {
        let db = database();
        let snapshot = db.snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.targets.len(), 2);
        assert_eq!(snapshot.decoys[1].sequence, "KEDITPEP");

        let restored = TandemDatabase::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(restored.parameters(), db.parameters());
        assert_eq!(restored.targets(), db.targets());
        assert_eq!(restored.decoys(), db.decoys());
        assert_eq!(restored.peptides().as_slice(), db.peptides().as_slice());
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn version_mismatch() {
        let mut snapshot = database().snapshot();
        snapshot.version += 1;
        assert!(matches!(
            TandemDatabase::from_snapshot(snapshot),
            Err(Error::IncompatibleSnapshot(_))
        ));

        let mut snapshot = database().snapshot();
        snapshot.residue_table_version = 0;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn invalid_enzyme() {
        let mut snapshot = database().snapshot();
        snapshot.enzyme.cleave_at = Some("".into());
        assert!(matches!(
            TandemDatabase::from_snapshot(snapshot),
            Err(Error::InvalidEnzyme(_))
        ));
    }
}
