use serde::{Deserialize, Serialize};

use crate::spectrum::{ExperimentalSpectrum, Peak, TheoreticalSpectrum};

/// Fragment intensity assigned to every theoretical peak during cross-correlation
const THEORETICAL_INTENSITY: f64 = 50.0;

/// A labelled score. Result lists are ordered by descending score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub label: String,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new<S: Into<String>>(label: S, score: f64) -> Self {
        ScoredCandidate {
            label: label.into(),
            score,
        }
    }
}

/// Walk two ascending sequences with one pointer each, calling `matched(i, j)`
/// whenever `|a[i] - b[j]| <= tolerance`.
///
/// Pointer `i` advances when `a[i] < b[j]` (unless it sits on the last element
/// of `a`), or when `j` sits on the last element of `b`; otherwise `j` advances.
/// Pointers are never moved back after a match, so a single element may be
/// matched against several elements of the other sequence. This looks like a
/// pre-existing defect of the metric, and is kept for score compatibility.
fn merge_scan<T, K, M>(a: &[f64], b: &[T], key: K, tolerance: f64, mut matched: M)
where
    K: Fn(&T) -> f64,
    M: FnMut(usize, usize),
{
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let mass = key(&b[j]);
        if (a[i] - mass).abs() <= tolerance {
            matched(i, j);
        }

        if (a[i] < mass && i != a.len() - 1) || j == b.len() - 1 {
            i += 1;
        } else {
            j += 1;
        }
    }
}

/// Count peaks of `a` and `b` (both sorted ascending) that lie within `tolerance`
pub fn shared_peak_count(a: &[f64], b: &[f64], tolerance: f64) -> usize {
    let mut count = 0;
    merge_scan(a, b, |mass| *mass, tolerance, |_, _| count += 1);
    count
}

/// Sum of `weight * intensity` for every `locations`/`peaks` pair matched within
/// `tolerance`. Both slices must be sorted ascending by mass
pub fn dot_product(locations: &[f64], weight: f64, peaks: &[Peak], tolerance: f64) -> f64 {
    let mut total = 0.0;
    merge_scan(
        locations,
        peaks,
        |peak| peak.mass,
        tolerance,
        |_, j| total += weight * peaks[j].intensity,
    );
    total
}

/// Scores a theoretical spectrum against an experimental one
pub trait Scorer {
    /// Prepare an experimental spectrum for scoring. Called once per spectrum,
    /// before any call to [`Scorer::score`]
    fn preprocess(&self, spectrum: ExperimentalSpectrum) -> ExperimentalSpectrum {
        spectrum
    }

    fn score(&self, theoretical: &TheoreticalSpectrum, experimental: &ExperimentalSpectrum) -> f64;
}

/// Number of theoretical fragments matching an experimental peak
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedPeakScorer {
    pub tolerance: f64,
}

impl Default for SharedPeakScorer {
    fn default() -> Self {
        SharedPeakScorer { tolerance: 1.2 }
    }
}

impl Scorer for SharedPeakScorer {
    fn score(&self, theoretical: &TheoreticalSpectrum, experimental: &ExperimentalSpectrum) -> f64 {
        let mut count = 0;
        merge_scan(
            &theoretical.fragments,
            &experimental.peaks,
            |peak| peak.mass,
            self.tolerance,
            |_, _| count += 1,
        );
        count as f64
    }
}

/// Sequest-style cross-correlation (Eng et al., 1994)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequestScorer {
    pub tolerance: f64,
    /// Number of equally wide mass windows used for intensity normalization
    pub num_windows: usize,
    /// Mass offset between two shifted copies of a peak
    pub step_size: f64,
    /// Shifted copies generated on either side of a peak
    pub steps: usize,
    /// Merge the derived series into bins of `tolerance / 10`
    pub compress: bool,
}

impl Default for SequestScorer {
    fn default() -> Self {
        SequestScorer {
            tolerance: 1.2,
            num_windows: 10,
            step_size: 1.0,
            steps: 75,
            compress: true,
        }
    }
}

impl SequestScorer {
    /// Rescale intensities so that the most intense peak of each window is 50.
    /// Windows without any intensity are left untouched
    fn normalize_windows(&self, peaks: &mut [Peak]) {
        if peaks.is_empty() {
            return;
        }
        let num_windows = self.num_windows.max(1);
        let (min, max) = peaks.iter().fold((f64::MAX, f64::MIN), |(lo, hi), peak| {
            (lo.min(peak.mass), hi.max(peak.mass))
        });
        let width = (max - min) / num_windows as f64;

        let window = |mass: f64| -> usize {
            if width > 0.0 {
                (((mass - min) / width).floor() as usize).min(num_windows - 1)
            } else {
                0
            }
        };

        let mut maxima = vec![0.0f64; num_windows];
        for peak in peaks.iter() {
            let w = window(peak.mass);
            maxima[w] = maxima[w].max(peak.intensity);
        }

        for peak in peaks.iter_mut() {
            let highest = maxima[window(peak.mass)];
            if highest > 0.0 {
                peak.intensity *= THEORETICAL_INTENSITY / highest;
            }
        }
    }

    /// Background-subtracted series: every peak, plus `2 * steps` shifted copies
    /// of it carrying a share of its intensity with opposite sign
    fn secondary_series(&self, peaks: &[Peak]) -> Vec<Peak> {
        let mut series = Vec::with_capacity(peaks.len() * (2 * self.steps + 1));
        for peak in peaks {
            series.push(*peak);
            let intensity = -peak.intensity / (2 * self.steps) as f64;
            for step in 1..=self.steps {
                let offset = step as f64 * self.step_size;
                series.push(Peak::new(peak.mass - offset, intensity));
                series.push(Peak::new(peak.mass + offset, intensity));
            }
        }
        series.sort_by(|a, b| a.mass.total_cmp(&b.mass));

        match self.compress {
            true => compress(series, self.tolerance / 10.0),
            false => series,
        }
    }
}

/// Merge consecutive peaks falling into the same `width`-wide bin: the merged
/// peak has the average mass and the summed intensity of the bin
fn compress(series: Vec<Peak>, width: f64) -> Vec<Peak> {
    if !(width > 0.0) {
        return series;
    }

    let mut compressed = Vec::new();
    // (bin, summed mass, summed intensity, count)
    let mut current: Option<(f64, f64, f64, usize)> = None;

    for peak in series {
        let bin = (peak.mass / width).floor();
        current = match current {
            Some((b, mass, intensity, n)) if b == bin => {
                Some((b, mass + peak.mass, intensity + peak.intensity, n + 1))
            }
            Some((_, mass, intensity, n)) => {
                compressed.push(Peak::new(mass / n as f64, intensity));
                Some((bin, peak.mass, peak.intensity, 1))
            }
            None => Some((bin, peak.mass, peak.intensity, 1)),
        };
    }
    if let Some((_, mass, intensity, n)) = current {
        compressed.push(Peak::new(mass / n as f64, intensity));
    }
    compressed
}

impl Scorer for SequestScorer {
    fn preprocess(&self, mut spectrum: ExperimentalSpectrum) -> ExperimentalSpectrum {
        for peak in spectrum.peaks.iter_mut() {
            peak.intensity = peak.intensity.max(0.0).sqrt();
        }
        self.normalize_windows(&mut spectrum.peaks);
        spectrum.secondary = Some(self.secondary_series(&spectrum.peaks));
        spectrum
    }

    /// Uses the derived series when the spectrum has been preprocessed, and
    /// the raw peaks otherwise
    fn score(&self, theoretical: &TheoreticalSpectrum, experimental: &ExperimentalSpectrum) -> f64 {
        let series = experimental
            .secondary
            .as_deref()
            .unwrap_or(&experimental.peaks);
        dot_product(
            &theoretical.fragments,
            THEORETICAL_INTENSITY,
            series,
            self.tolerance,
        )
    }
}

/// The scoring functions that can be selected by configuration
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ScoringStrategy {
    SharedPeaks(SharedPeakScorer),
    Sequest(SequestScorer),
}

impl Default for ScoringStrategy {
    fn default() -> Self {
        ScoringStrategy::SharedPeaks(SharedPeakScorer::default())
    }
}

impl Scorer for ScoringStrategy {
    fn preprocess(&self, spectrum: ExperimentalSpectrum) -> ExperimentalSpectrum {
        match self {
            ScoringStrategy::SharedPeaks(scorer) => scorer.preprocess(spectrum),
            ScoringStrategy::Sequest(scorer) => scorer.preprocess(spectrum),
        }
    }

    fn score(&self, theoretical: &TheoreticalSpectrum, experimental: &ExperimentalSpectrum) -> f64 {
        match self {
            ScoringStrategy::SharedPeaks(scorer) => scorer.score(theoretical, experimental),
            ScoringStrategy::Sequest(scorer) => scorer.score(theoretical, experimental),
        }
    }
}
