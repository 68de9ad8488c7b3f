pub mod database;
pub mod enzyme;
pub mod heap;
pub mod index;
pub mod ion_series;
pub mod mass;
pub mod report;
pub mod scoring;
pub mod snapshot;
pub mod spectrum;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("no mass is known for residue `{0}`")]
    MissingResidue(char),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("no item with key {0}")]
    KeyNotFound(f64),
    #[error("invalid enzyme: {0}")]
    InvalidEnzyme(String),
    #[error("incompatible snapshot: {0}")]
    IncompatibleSnapshot(String),
}
