use regex::Regex;
use std::ops::Range;

use crate::mass::VALID_AA;
use crate::Error;

#[derive(Clone, Debug)]
pub struct Enzyme {
    // Skip cleaving if the site is followed by this AA
    pub skip_suffix: Option<char>,
    // Regex for matching cleavage sites
    regex: Regex,
    // Cleave at c-terminal?
    pub c_terminal: bool,
}

impl Default for Enzyme {
    fn default() -> Self {
        Self::trypsin()
    }
}

impl Enzyme {
    pub fn new(cleave: &str, skip_suffix: Option<char>, c_terminal: bool) -> Result<Self, Error> {
        if cleave.is_empty() || !cleave.chars().all(|x| VALID_AA.contains(&x)) {
            return Err(Error::InvalidEnzyme(format!(
                "cleavage sequence must be a non-empty set of amino acids: `{}`",
                cleave
            )));
        }
        if let Some(skip) = skip_suffix {
            if !VALID_AA.contains(&skip) {
                return Err(Error::InvalidEnzyme(format!(
                    "cleavage restriction is a non-amino acid character: `{}`",
                    skip
                )));
            }
        }

        let regex = Regex::new(&format!("[{}]", cleave))
            .map_err(|e| Error::InvalidEnzyme(e.to_string()))?;

        Ok(Enzyme {
            skip_suffix,
            regex,
            c_terminal,
        })
    }

    /// Cleaves after K or R, unless followed by P
    pub fn trypsin() -> Self {
        Enzyme {
            skip_suffix: Some('P'),
            regex: Regex::new("[KR]").expect("static regex"),
            c_terminal: true,
        }
    }

    /// Minimal fragments, as byte ranges that tile `sequence` from start to end
    fn cleavage_sites(&self, sequence: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut left = 0;
        for mat in self.regex.find_iter(sequence) {
            let right = match self.c_terminal {
                true => mat.end(),
                false => mat.start(),
            };
            // Never cut at either end of the sequence, fragments are non-empty
            if right == 0 || right >= sequence.len() {
                continue;
            }
            if let Some(skip) = self.skip_suffix {
                if sequence[right..].starts_with(skip) {
                    continue;
                }
            }
            ranges.push(left..right);
            left = right;
        }
        ranges.push(left..sequence.len());
        ranges
    }

    /// Digest a sequence into its minimal fragments, followed by every
    /// concatenation of 2, 3, ... `missed_cleavages + 1` adjacent fragments.
    ///
    /// Fragments are emitted grouped by the number of missed cleavages, and in
    /// sequence order within a group. Duplicates are kept.
    pub fn digest(&self, sequence: &str, missed_cleavages: u8) -> Vec<String> {
        let sites = self.cleavage_sites(sequence);
        let mut digests = Vec::with_capacity(sites.len() * (1 + missed_cleavages as usize));

        for cleavage in 1..=(1 + missed_cleavages as usize) {
            // Generate missed cleavages
            for win in sites.windows(cleavage) {
                let start = win[0].start;
                let end = win[cleavage - 1].end;
                digests.push(sequence[start..end].to_string());
            }
        }
        digests
    }
}
