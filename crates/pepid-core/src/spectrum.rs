use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single centroided peak
#[derive(PartialEq, PartialOrd, Copy, Clone, Default, Debug, Serialize, Deserialize)]
pub struct Peak {
    pub mass: f64,
    pub intensity: f64,
}

impl Peak {
    pub fn new(mass: f64, intensity: f64) -> Self {
        Peak { mass, intensity }
    }
}

/// Target/Decoy status of a theoretical peptide
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Target,
    Decoy,
}

impl Label {
    pub fn tag(&self) -> &'static str {
        match self {
            Label::Target => "TARGET",
            Label::Decoy => "DECOY",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fragment masses predicted for a peptide
#[derive(Clone, Debug, PartialEq)]
pub struct TheoreticalSpectrum {
    pub label: Label,
    pub peptide: String,
    /// Mass of the intact peptide
    pub precursor_mass: f64,
    /// Fragment masses, sorted in ascending order
    pub fragments: Vec<f64>,
}

impl TheoreticalSpectrum {
    /// Human readable identity, e.g. `TARGET GARFIELDDEK`
    pub fn title(&self) -> String {
        format!("{} {}", self.label, self.peptide)
    }
}

/// An observed MS2 spectrum
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSpectrum {
    pub title: String,
    pub precursor_mass: f64,
    /// Peaks, sorted by mass in ascending order
    pub peaks: Vec<Peak>,
    /// Derived series used for cross-correlation scoring, sorted by mass
    pub secondary: Option<Vec<Peak>>,
    /// Any other metadata of the spectrum, keyed by upper case name
    pub metadata: BTreeMap<String, String>,
}

impl ExperimentalSpectrum {
    /// Create a new spectrum, sorting `peaks` by mass
    pub fn new<S: Into<String>>(title: S, precursor_mass: f64, mut peaks: Vec<Peak>) -> Self {
        peaks.sort_by(|a, b| a.mass.total_cmp(&b.mass));
        ExperimentalSpectrum {
            title: title.into(),
            precursor_mass,
            peaks,
            secondary: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn peaks_are_sorted() {
        let spectrum = ExperimentalSpectrum::new(
            "scan=1",
            500.0,
            vec![
                Peak::new(300.0, 1.0),
                Peak::new(100.0, 5.0),
                Peak::new(200.0, 2.0),
            ],
        );
        let masses = spectrum.peaks.iter().map(|p| p.mass).collect::<Vec<_>>();
        assert_eq!(masses, vec![100.0, 200.0, 300.0]);
        assert!(spectrum.secondary.is_none());
    }

    #[test]
    fn titles() {
        let spectrum = TheoreticalSpectrum {
            label: Label::Decoy,
            peptide: "RAG".into(),
            precursor_mass: 0.0,
            fragments: vec![],
        };
        assert_eq!(spectrum.title(), "DECOY RAG");
    }
}
