use fnv::FnvHashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::enzyme::Enzyme;
use crate::heap::top_k;
use crate::index::MassIndexedCollection;
use crate::ion_series::{Ionizer, Kind};
use crate::mass::Mass;
use crate::scoring::{shared_peak_count, ScoredCandidate, Scorer};
use crate::spectrum::{ExperimentalSpectrum, Label, TheoreticalSpectrum};
use crate::Error;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct EnzymeBuilder {
    /// How many missed cleavages to use
    pub missed_cleavages: Option<u8>,
    /// Residues after (or before) which the enzyme cuts
    pub cleave_at: Option<String>,
    /// Don't cut if the site is followed by this residue
    pub restrict: Option<char>,
    pub c_terminal: Option<bool>,
}

impl Default for EnzymeBuilder {
    fn default() -> Self {
        Self {
            missed_cleavages: Some(1),
            cleave_at: Some("KR".into()),
            restrict: Some('P'),
            c_terminal: Some(true),
        }
    }
}

impl EnzymeBuilder {
    pub fn missed_cleavages(&self) -> u8 {
        self.missed_cleavages.unwrap_or(1)
    }

    pub fn enzyme(&self) -> Result<Enzyme, Error> {
        Enzyme::new(
            self.cleave_at.as_deref().unwrap_or("KR"),
            self.restrict,
            self.c_terminal.unwrap_or(true),
        )
    }
}

#[derive(Deserialize, Serialize, Default, Clone, Debug)]
/// Parameters used for generating the peptide database
pub struct Builder {
    pub enzyme: Option<EnzymeBuilder>,
    /// Which kind of fragment ions to generate (b, y)
    pub ion_kinds: Option<Vec<Kind>>,
    /// Candidate peptides must lie within this many Da of the precursor mass
    pub peptide_tolerance: Option<f64>,
    /// Path to fasta database
    pub fasta: Option<String>,
}

impl Builder {
    pub fn make_parameters(self) -> Parameters {
        Parameters {
            enzyme: self.enzyme.unwrap_or_default(),
            ion_kinds: self.ion_kinds.unwrap_or_else(|| vec![Kind::B, Kind::Y]),
            peptide_tolerance: self.peptide_tolerance.unwrap_or(1.2),
        }
    }

    pub fn update_fasta(&mut self, fasta: String) {
        self.fasta = Some(fasta)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Parameters {
    pub enzyme: EnzymeBuilder,
    pub ion_kinds: Vec<Kind>,
    pub peptide_tolerance: f64,
}

impl Parameters {
    pub fn ionizer(&self) -> Ionizer {
        Ionizer::new(self.ion_kinds.clone())
    }

    pub fn build(self, records: &[SequenceRecord]) -> Result<TandemDatabase, Error> {
        TandemDatabase::build(records, self)
    }
}

/// An (identifier, residue sequence) pair, as read from a sequence database
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub identifier: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new<S: Into<String>, T: Into<String>>(identifier: S, sequence: T) -> Self {
        SequenceRecord {
            identifier: identifier.into(),
            sequence: sequence.into(),
        }
    }
}

/// A digested protein
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub identifier: String,
    /// Residue sequence, reversed for decoy proteins
    pub sequence: String,
    /// Digestion products, in digestion order
    pub chunks: Vec<String>,
    /// Distinct masses of `chunks`, sorted ascending
    pub fingerprint: Vec<f64>,
}

impl ProteinRecord {
    pub fn digest(
        record: &SequenceRecord,
        enzyme: &Enzyme,
        missed_cleavages: u8,
        reverse: bool,
    ) -> Result<Self, Error> {
        let sequence = match reverse {
            true => record.sequence.chars().rev().collect::<String>(),
            false => record.sequence.clone(),
        };
        let chunks = enzyme.digest(&sequence, missed_cleavages);

        let mut fingerprint = chunks
            .iter()
            .map(|chunk| chunk.monoisotopic())
            .collect::<Result<Vec<_>, _>>()?;
        fingerprint.sort_by(|a, b| a.total_cmp(b));
        fingerprint.dedup();

        Ok(ProteinRecord {
            identifier: record.identifier.clone(),
            sequence,
            chunks,
            fingerprint,
        })
    }
}

/// Digested proteins, scored against MS1 samples by mass fingerprint
#[derive(Clone, Debug, PartialEq)]
pub struct ProteinDatabase {
    proteins: Vec<ProteinRecord>,
    reverse: bool,
}

impl ProteinDatabase {
    /// Digest every record. When `reverse` is set, each protein sequence is
    /// reversed before digestion, yielding a decoy database.
    ///
    /// Any failure aborts the whole construction
    pub fn build(
        records: &[SequenceRecord],
        enzyme: &Enzyme,
        missed_cleavages: u8,
        reverse: bool,
    ) -> Result<Self, Error> {
        let proteins = records
            .par_iter()
            .map(|record| ProteinRecord::digest(record, enzyme, missed_cleavages, reverse))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProteinDatabase { proteins, reverse })
    }

    /// Wrap already digested proteins
    pub fn from_proteins(proteins: Vec<ProteinRecord>, reverse: bool) -> Self {
        ProteinDatabase { proteins, reverse }
    }

    pub fn proteins(&self) -> &[ProteinRecord] {
        &self.proteins
    }

    pub fn is_decoy(&self) -> bool {
        self.reverse
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// Score every protein by the fraction of its fingerprint found in
    /// `sample` (sorted ascending), returning the `amount` best in descending
    /// order of score
    pub fn find_best_proteins(
        &self,
        sample: &[f64],
        amount: usize,
        tolerance: f64,
    ) -> Vec<ScoredCandidate> {
        let scores = self
            .proteins
            .par_iter()
            .map(|protein| {
                let shared = shared_peak_count(sample, &protein.fingerprint, tolerance);
                let score = match protein.fingerprint.len() {
                    0 => 0.0,
                    n => shared as f64 / n as f64,
                };
                ScoredCandidate::new(protein.identifier.as_str(), score)
            })
            .collect::<Vec<_>>();
        top_k(scores, amount, |candidate| candidate.score)
    }
}

fn precursor_mass(spectrum: &TheoreticalSpectrum) -> f64 {
    spectrum.precursor_mass
}

/// Best scoring peptides for a single experimental spectrum
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpectrumMatches {
    /// Title of the experimental spectrum
    pub spectrum: String,
    pub candidates: Vec<ScoredCandidate>,
}

/// Target and decoy peptides with their theoretical fragment spectra,
/// indexed by peptide mass
pub struct TandemDatabase {
    targets: ProteinDatabase,
    decoys: ProteinDatabase,
    peptides: MassIndexedCollection<TheoreticalSpectrum>,
    parameters: Parameters,
}

impl TandemDatabase {
    pub fn build(records: &[SequenceRecord], parameters: Parameters) -> Result<Self, Error> {
        let start = Instant::now();
        let enzyme = parameters.enzyme.enzyme()?;
        let missed_cleavages = parameters.enzyme.missed_cleavages();

        let targets = ProteinDatabase::build(records, &enzyme, missed_cleavages, false)?;
        let decoys = ProteinDatabase::build(records, &enzyme, missed_cleavages, true)?;
        log::info!(
            "digested {} target and {} decoy proteins in {:?}",
            targets.len(),
            decoys.len(),
            start.elapsed()
        );

        Self::assemble(targets, decoys, parameters)
    }

    /// Generate theoretical spectra for every distinct peptide of `targets`
    /// and `decoys`
    pub(crate) fn assemble(
        targets: ProteinDatabase,
        decoys: ProteinDatabase,
        parameters: Parameters,
    ) -> Result<Self, Error> {
        let start = Instant::now();

        // A peptide produced by both a target and a decoy protein is a target
        let mut seen: FnvHashSet<&str> = FnvHashSet::default();
        let mut unique = Vec::new();
        for (label, db) in [(Label::Target, &targets), (Label::Decoy, &decoys)] {
            for chunk in db.proteins().iter().flat_map(|p| p.chunks.iter()) {
                if seen.insert(chunk.as_str()) {
                    unique.push((label, chunk.as_str()));
                }
            }
        }
        log::trace!("generating fragments for {} peptides", unique.len());

        let ionizer = parameters.ionizer();
        let spectra = unique
            .par_iter()
            .map(|(label, peptide)| {
                Ok(TheoreticalSpectrum {
                    label: *label,
                    peptide: peptide.to_string(),
                    precursor_mass: peptide.monoisotopic()?,
                    fragments: ionizer.fragments(peptide)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let peptides = MassIndexedCollection::new(
            spectra,
            precursor_mass as fn(&TheoreticalSpectrum) -> f64,
        );
        log::info!(
            "indexed {} unique peptides in {:?}",
            peptides.len(),
            start.elapsed()
        );

        Ok(TandemDatabase {
            targets,
            decoys,
            peptides,
            parameters,
        })
    }

    pub fn targets(&self) -> &ProteinDatabase {
        &self.targets
    }

    pub fn decoys(&self) -> &ProteinDatabase {
        &self.decoys
    }

    pub fn peptides(&self) -> &MassIndexedCollection<TheoreticalSpectrum> {
        &self.peptides
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Theoretical spectra with a precursor mass within the peptide tolerance
    pub fn candidates(&self, precursor_mass: f64) -> &[TheoreticalSpectrum] {
        let tolerance = self.parameters.peptide_tolerance;
        self.peptides
            .find_range(precursor_mass - tolerance, precursor_mass + tolerance)
    }

    /// Score `spectrum` against every candidate peptide, in ascending order of
    /// peptide mass
    pub fn peptide_scores<S>(
        &self,
        spectrum: &ExperimentalSpectrum,
        scorer: &S,
    ) -> Vec<ScoredCandidate>
    where
        S: Scorer + Sync + ?Sized,
    {
        let spectrum = scorer.preprocess(spectrum.clone());
        self.candidates(spectrum.precursor_mass)
            .par_iter()
            .map(|theoretical| {
                ScoredCandidate::new(theoretical.title(), scorer.score(theoretical, &spectrum))
            })
            .collect()
    }

    pub fn find_best_peptides<S>(
        &self,
        spectrum: &ExperimentalSpectrum,
        scorer: &S,
        amount: usize,
    ) -> Vec<ScoredCandidate>
    where
        S: Scorer + Sync + ?Sized,
    {
        top_k(
            self.peptide_scores(spectrum, scorer),
            amount,
            |candidate| candidate.score,
        )
    }

    /// Run [`TandemDatabase::find_best_peptides`] for every spectrum. Results
    /// are returned in the order of `spectra`
    pub fn search<S>(
        &self,
        spectra: &[ExperimentalSpectrum],
        scorer: &S,
        amount: usize,
    ) -> Vec<SpectrumMatches>
    where
        S: Scorer + Sync + ?Sized,
    {
        let start = Instant::now();
        let matches = spectra
            .par_iter()
            .map(|spectrum| SpectrumMatches {
                spectrum: spectrum.title.clone(),
                candidates: self.find_best_peptides(spectrum, scorer, amount),
            })
            .collect::<Vec<_>>();
        log::info!("scored {} spectra in {:?}", spectra.len(), start.elapsed());
        matches
    }

    /// Protein inference from peptide evidence is not supported
    pub fn find_best_proteins(
        &self,
        _sample: &[f64],
        _amount: usize,
    ) -> Result<Vec<ScoredCandidate>, Error> {
        Err(Error::UnsupportedOperation(
            "protein inference from tandem spectra",
        ))
    }
}
