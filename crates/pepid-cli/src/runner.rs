use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::info;
use pepid_core::database::{ProteinDatabase, SequenceRecord, SpectrumMatches, TandemDatabase};
use pepid_core::report::normalize;
use pepid_core::scoring::ScoredCandidate;
use pepid_io::snapshot::SnapshotError;

use crate::input::{Level, Ms1Settings, Ms2Settings, Search};

/// Ranked candidates produced by a search
#[derive(Clone, Debug, PartialEq)]
pub enum Results {
    /// Best proteins for the MS1 sample
    Ms1(Vec<ScoredCandidate>),
    /// Best peptides, for each MS2 spectrum in input order
    Ms2(Vec<SpectrumMatches>),
}

pub struct Runner {
    pub parameters: Search,
    start: Instant,
}

impl Runner {
    pub fn new(parameters: Search) -> Self {
        Runner {
            parameters,
            start: Instant::now(),
        }
    }

    fn read_fasta(&self) -> anyhow::Result<Vec<SequenceRecord>> {
        let path = &self.parameters.fasta;
        let records =
            pepid_io::read_fasta(path).with_context(|| format!("Failed to read FASTA from `{path}`"))?;
        info!("read {} proteins from {}", records.len(), path);
        Ok(records)
    }

    fn normalize(&self, candidates: &mut [ScoredCandidate]) {
        if self.parameters.normalize && !candidates.is_empty() && !normalize(candidates) {
            log::warn!("best score is not positive, reporting raw scores");
        }
    }

    fn search_ms1(&self, settings: &Ms1Settings) -> anyhow::Result<Vec<ScoredCandidate>> {
        let path = &self.parameters.sample;
        let sample = pepid_io::read_peaks(path)
            .with_context(|| format!("Failed to read peak list from `{path}`"))?;
        info!("read {} peaks from {}", sample.len(), path);

        let records = self.read_fasta()?;
        let enzyme = self.parameters.database.enzyme.enzyme()?;
        let database = ProteinDatabase::build(
            &records,
            &enzyme,
            settings.missed_cleavages,
            settings.decoy,
        )
        .context("Failed to digest proteins")?;
        info!(
            "digested {} proteins in {:#?}",
            database.len(),
            self.start.elapsed()
        );

        let mut best =
            database.find_best_proteins(&sample, self.parameters.report, settings.tolerance);
        self.normalize(&mut best);
        Ok(best)
    }

    /// Load the database snapshot at `index` if there is one, otherwise build
    /// the database (and save it to `index`, if given). A snapshot that cannot
    /// be decoded or was written by an incompatible version is rebuilt
    pub fn load_or_build(&self, index: Option<&str>) -> anyhow::Result<TandemDatabase> {
        if let Some(path) = index {
            if Path::new(path).exists() {
                info!("loading database snapshot from {}", path);
                match pepid_io::snapshot::load(path) {
                    Ok(database) => return Ok(database),
                    Err(SnapshotError::IO(err)) => {
                        return Err(err).with_context(|| {
                            format!("Failed to load database snapshot from `{path}`")
                        })
                    }
                    Err(err) => {
                        log::warn!("rebuilding stale database snapshot `{}`: {}", path, err)
                    }
                }
            }
        }

        let records = self.read_fasta()?;
        let database = self
            .parameters
            .database
            .clone()
            .build(&records)
            .context("Failed to build peptide database")?;

        if let Some(path) = index {
            pepid_io::snapshot::save(&database, path)
                .with_context(|| format!("Failed to save database snapshot to `{path}`"))?;
        }
        Ok(database)
    }

    fn search_ms2(&self, settings: &Ms2Settings) -> anyhow::Result<Vec<SpectrumMatches>> {
        let path = &self.parameters.sample;
        let spectra = pepid_io::read_mgf(path, settings.max_spectra)
            .with_context(|| format!("Failed to read spectra from `{path}`"))?;
        info!("read {} spectra from {}", spectra.len(), path);

        let database = self.load_or_build(settings.index.as_deref())?;
        if database.parameters() != &self.parameters.database {
            log::warn!("database snapshot was built with other parameters, using the snapshot's");
        }

        let mut matches =
            database.search(&spectra, &settings.scoring, self.parameters.report);
        for spectrum in matches.iter_mut() {
            self.normalize(&mut spectrum.candidates);
        }
        Ok(matches)
    }

    pub fn search(&self) -> anyhow::Result<Results> {
        log::trace!(
            "search parameters: {}",
            serde_json::to_string(&self.parameters)?
        );
        let results = match self.parameters.level {
            Level::Ms1 => Results::Ms1(self.search_ms1(&self.parameters.ms1)?),
            Level::Ms2 => Results::Ms2(self.search_ms2(&self.parameters.ms2)?),
        };
        info!("finished search in {:#?}", self.start.elapsed());
        Ok(results)
    }

    /// Search, then write the ranked table to the configured output
    pub fn run(&self) -> anyhow::Result<()> {
        let results = self.search()?;
        let bytes = crate::output::serialize(&results)?;
        match &self.parameters.output {
            Some(path) => {
                std::fs::write(path, bytes)
                    .with_context(|| format!("Failed to write results to `{path}`"))?;
                info!("wrote results to {}", path);
            }
            None => {
                use std::io::Write;
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(&bytes)?;
                lock.flush()?;
            }
        }
        Ok(())
    }
}
