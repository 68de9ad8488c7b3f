use std::path::Path;

use pepid_core::database::SequenceRecord;
use pepid_core::spectrum::ExperimentalSpectrum;

pub mod fasta;
pub mod mgf;
pub mod peaks;
pub mod snapshot;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("peak list error: {0}")]
    PeakList(#[from] peaks::PeakListError),
    #[error("MGF error: {0}")]
    MGF(#[from] mgf::MgfError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] snapshot::SnapshotError),
}

/// Read the (identifier, sequence) records of a FASTA file
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(fasta::parse(&contents))
}

/// Read an MS1 sample: one peak mass per line, returned sorted ascending
pub fn read_peaks<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(peaks::parse(&contents)?)
}

/// Read at most `max_spectra` spectra (all, if `None`) from an MGF file
pub fn read_mgf<P: AsRef<Path>>(
    path: P,
    max_spectra: Option<usize>,
) -> Result<Vec<ExperimentalSpectrum>, Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(mgf::MgfReader::default()
        .max_spectra(max_spectra)
        .parse(&contents)?)
}

pub fn read_json<P, T>(path: P) -> Result<T, Error>
where
    P: AsRef<Path>,
    T: for<'de> serde::Deserialize<'de>,
{
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
