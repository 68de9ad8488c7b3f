//! Save and load [`TandemDatabase`] snapshots as JSON

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use pepid_core::database::TandemDatabase;
use pepid_core::snapshot::{Snapshot, SNAPSHOT_VERSION};

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("snapshot has version {found}, but version {expected} is required")]
    Version { found: u32, expected: u32 },
    #[error(transparent)]
    Core(#[from] pepid_core::Error),
}

pub fn save<P: AsRef<Path>>(database: &TandemDatabase, path: P) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let mut wtr = BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer(&mut wtr, &database.snapshot())?;
    wtr.flush()?;
    log::info!("saved database snapshot to {}", path.display());
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<TandemDatabase, SnapshotError> {
    let path = path.as_ref();
    let rdr = BufReader::new(std::fs::File::open(path)?);
    let snapshot: Snapshot = serde_json::from_reader(rdr)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Version {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let database = TandemDatabase::from_snapshot(snapshot)?;
    log::info!(
        "loaded {} peptides from {}",
        database.peptides().len(),
        path.display()
    );
    Ok(database)
}

#[cfg(test)]
mod test {
    use super::*;
    use pepid_core::database::{Builder, SequenceRecord};

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pepid-{}-{}.json", name, std::process::id()))
    }

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
    fn save_and_load() {
        let path = scratch("roundtrip");
        let db = database();
        save(&db, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.parameters(), db.parameters());
        assert_eq!(loaded.peptides().as_slice(), db.peptides().as_slice());
    }

    #[test]
    fn reject_other_versions() {
        let path = scratch("version");
        let mut snapshot = database().snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let result = load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(SnapshotError::Version { found, .. }) if found == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn garbage() {
        let path = scratch("garbage");
        std::fs::write(&path, "{\"version\": 1").unwrap();
        let result = load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(SnapshotError::Json(_))));
        assert!(matches!(load(scratch("missing")), Err(SnapshotError::IO(_))));
    }
}
