use std::collections::BTreeMap;

use pepid_core::spectrum::{ExperimentalSpectrum, Peak};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MgfError {
    #[error("malformed spectrum block at line {line}: {reason}")]
    MalformedSpectrumBlock { line: usize, reason: String },
}

fn malformed<T, S: Into<String>>(line: usize, reason: S) -> Result<T, MgfError> {
    Err(MgfError::MalformedSpectrumBlock {
        line,
        reason: reason.into(),
    })
}

/// A `BEGIN IONS` block that has not been closed yet
#[derive(Default)]
struct QueryData {
    /// Line of the `BEGIN IONS` marker
    start: usize,
    title: Option<String>,
    pepmass: Option<f64>,
    peaks: Vec<Peak>,
    metadata: BTreeMap<String, String>,
}

impl QueryData {
    fn parse_key_value(&mut self, line_no: usize, key: &str, value: &str) -> Result<(), MgfError> {
        let key = key.trim().to_uppercase();
        let value = value.trim();
        match key.as_str() {
            "TITLE" => self.title = Some(value.to_string()),
            "PEPMASS" => {
                let mass = value
                    .split_ascii_whitespace()
                    .next()
                    .and_then(|mass| mass.parse::<f64>().ok())
                    .filter(|mass| mass.is_finite());
                match mass {
                    Some(mass) => self.pepmass = Some(mass),
                    None => return malformed(line_no, format!("invalid PEPMASS `{}`", value)),
                }
            }
            _ => {
                self.metadata.insert(key, value.to_string());
            }
        }
        Ok(())
    }

    fn parse_peak(&mut self, line_no: usize, line: &str) -> Result<(), MgfError> {
        let values = line
            .split_ascii_whitespace()
            .map(|value| value.parse::<f64>())
            .collect::<Result<Vec<_>, _>>();
        match values.as_deref() {
            Ok([mass, intensity]) if mass.is_finite() && intensity.is_finite() => {
                if *intensity < 0.0 {
                    return malformed(line_no, format!("negative intensity in `{}`", line));
                }
                self.peaks.push(Peak::new(*mass, *intensity));
                Ok(())
            }
            _ => malformed(line_no, format!("expected `mass intensity`, found `{}`", line)),
        }
    }

    fn finish(self, line_no: usize) -> Result<ExperimentalSpectrum, MgfError> {
        let title = match self.title {
            Some(title) => title,
            None => return malformed(line_no, "missing TITLE"),
        };
        let pepmass = match self.pepmass {
            Some(pepmass) => pepmass,
            None => return malformed(line_no, "missing PEPMASS"),
        };
        Ok(ExperimentalSpectrum::new(title, pepmass, self.peaks).with_metadata(self.metadata))
    }
}

/// Reader for Mascot Generic Format files.
///
/// Lines outside of `BEGIN IONS`/`END IONS` blocks (global parameters, bare
/// queries) are ignored, as are blank lines and `#` comments. Any error
/// aborts the whole read
#[derive(Default, Clone, Debug)]
pub struct MgfReader {
    max_spectra: Option<usize>,
}

impl MgfReader {
    /// Stop after reading this many complete spectra
    pub fn max_spectra(mut self, max_spectra: Option<usize>) -> Self {
        self.max_spectra = max_spectra;
        self
    }

    pub fn parse(&self, contents: &str) -> Result<Vec<ExperimentalSpectrum>, MgfError> {
        let mut spectra = Vec::new();
        let mut query: Option<QueryData> = None;

        for (idx, line) in contents.lines().enumerate() {
            if let Some(max) = self.max_spectra {
                if spectra.len() >= max {
                    return Ok(spectra);
                }
            }

            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match query.as_mut() {
                None => match line {
                    "BEGIN IONS" => {
                        query = Some(QueryData {
                            start: line_no,
                            ..Default::default()
                        })
                    }
                    "END IONS" => return malformed(line_no, "END IONS without BEGIN IONS"),
                    _ => {}
                },
                Some(data) => match line {
                    "END IONS" => {
                        if let Some(data) = query.take() {
                            spectra.push(data.finish(line_no)?);
                        }
                    }
                    "BEGIN IONS" => {
                        return malformed(
                            line_no,
                            format!("BEGIN IONS inside the block opened at line {}", data.start),
                        )
                    }
                    _ => match line.split_once('=') {
                        Some((key, value)) => data.parse_key_value(line_no, key, value)?,
                        None => data.parse_peak(line_no, line)?,
                    },
                },
            }
        }

        match query {
            Some(data) => malformed(data.start, "BEGIN IONS without END IONS"),
            None => Ok(spectra),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{MgfError, MgfReader};
    use pepid_core::spectrum::ExperimentalSpectrum;

    fn make_ions_section_spectrum_0() -> String {
        let s = r#"
        BEGIN IONS
        TITLE=spectrum 0
        RTINSECONDS=0.8963232289
        PEPMASS=367.069682741984 56700.5185546875
        CHARGE=2+ and 3+
        TOL=10
        TOLU=ppm
        1144.66272 6260.8315429688
        169.5001831 4608.2421875
        226.0483246 5335.4907226563
        228.3407898 30918.244140625
        322.5945435 5311.5737304688
        148.2041016 1.0
        END IONS
        "#;
        return String::from(s);
    }

    fn run_asserts_for_spectrum_0(s: &ExperimentalSpectrum) {
        assert_eq!(s.title, "spectrum 0");
        assert!((s.precursor_mass - 367.069682741984).abs() < 0.0001);
        assert_eq!(s.peaks.len(), 6);
        // Peaks are sorted by mass
        assert!((s.peaks[0].mass - 148.2041016).abs() < 0.0001);
        assert!((s.peaks[0].intensity - 1.0).abs() < 0.0001);
        assert!((s.peaks[3].mass - 228.3407898).abs() < 0.0001);
        assert!((s.peaks[5].mass - 1144.66272).abs() < 0.0001);
        assert_eq!(s.metadata["CHARGE"], "2+ and 3+");
        assert_eq!(s.metadata["RTINSECONDS"], "0.8963232289");
        assert!(!s.metadata.contains_key("TITLE"));
        assert!(!s.metadata.contains_key("PEPMASS"));
        assert!(s.secondary.is_none());
    }

    #[test]
    fn parse_spectrum() -> Result<(), MgfError> {
        let s = make_ions_section_spectrum_0();
        let mut spectra = MgfReader::default().parse(&s)?;

        assert_eq!(spectra.len(), 1);
        let s = spectra.pop().unwrap();

        run_asserts_for_spectrum_0(&s);
        Ok(())
    }

    #[test]
    fn parse_two_spectra() -> Result<(), MgfError> {
        let mut content = "# a comment at the beginning of the file".to_string();
        content.push_str(&make_ions_section_spectrum_0());
        content.push_str("\n\n");
        content.push_str(&make_ions_section_spectrum_0());

        let spectra = MgfReader::default().parse(&content)?;
        assert_eq!(spectra.len(), 2);
        spectra
            .iter()
            .for_each(|spec: &ExperimentalSpectrum| run_asserts_for_spectrum_0(spec));

        let spectra = MgfReader::default().max_spectra(Some(1)).parse(&content)?;
        assert_eq!(spectra.len(), 1);
        let spectra = MgfReader::default().max_spectra(Some(0)).parse(&content)?;
        assert!(spectra.is_empty());
        Ok(())
    }

    #[test]
    /// Example taken from https://www.matrixscience.com/help/data_file_help.html
    fn parse_mgf_matrixscience_example_1() -> Result<(), MgfError> {
        let s = r#"
        COM=10 pmol digest of Sample X15
        ITOL=1
        ITOLU=Da
        MODS=Carbamidomethyl (C)
        IT_MODS=Oxidation (M)
        MASS=Monoisotopic
        USERNAME=Lou Scene
        USEREMAIL=leu@altered-state.edu
        CHARGE=2+ and 3+
        BEGIN IONS
        TITLE=Spectrum 1
        PEPMASS=983.6
        846.60 73
        846.80 44
        847.60 67
        1640.10 291
        1640.60 54
        1895.50 49
        END IONS

        BEGIN IONS
        TITLE=Spectrum 2
        PEPMASS=1084.9
        SCANS=3
        RTINSECONDS=25
        345.10 237
        370.20 128
        460.20 108
        1673.30 1007
        1674.00 974
        1675.30 79
        END IONS
        "#;
        let mut spectra = MgfReader::default().parse(s)?;
        assert_eq!(spectra.len(), 2);

        let s = spectra.pop().unwrap();
        assert_eq!(s.title, "Spectrum 2");
        assert_eq!(s.precursor_mass, 1084.9);
        assert_eq!(s.metadata.len(), 2);
        assert_eq!(s.metadata["SCANS"], "3");
        // Global parameters are not attached to spectra
        assert!(!s.metadata.contains_key("CHARGE"));
        Ok(())
    }

    #[test]
    /// Example taken from https://www.matrixscience.com/help/data_file_help.html
    fn parse_mgf_matrixscience_example_2() -> Result<(), MgfError> {
        let s = r#"
        # following lines define parameters.
        # NB no spaces allowed on either side of the = symbol
        COM=My favourite protein has been eaten by an enzyme
        CLE=Trypsin
        CHARGE=2+
        # following line will be treated as a peptide mass
        1024.6
        # following line is a sequence query, which must
        # conform precisely to sequence query syntax rules
        2321 seq(n-ACTL) comp(2[C])
        # so is this
        1896 ions(345.6:24.7,347.8:45.4, ... ,1024.7:18.7)
        # An MS/MS ions query is delimited by the tags
        # BEGIN IONS and END IONS. Space(s)
        # are used to separate mass and intensity values
        BEGIN IONS
        TITLE=The first peptide - dodgy peak detection, so extra wide tolerance
        PEPMASS=896.05 25674.3
        CHARGE=3+
        TOL=3
        TOLU=Da
        SEQ=n-AC[DHK]
        COMP=2[H]0[M]3[DE]*[K]
        240.1 3
        242.1 12
        245.2 32
        1623.7 55
        1624.7 23
        END IONS
        "#;
        let mut spectra = MgfReader::default().parse(s)?;
        assert_eq!(spectra.len(), 1);

        let s = spectra.pop().unwrap();
        assert_eq!(s.precursor_mass, 896.05);
        assert_eq!(s.peaks.len(), 5);
        assert_eq!(s.metadata["CHARGE"], "3+");
        assert_eq!(s.metadata["COMP"], "2[H]0[M]3[DE]*[K]");
        Ok(())
    }

    #[test]
    fn keys_are_case_folded() -> Result<(), MgfError> {
        let s = "BEGIN IONS\ntitle=lower\nPepMass = 500.5\nscans=7\n100 1\nEND IONS\n";
        let spectra = MgfReader::default().parse(s)?;
        assert_eq!(spectra[0].title, "lower");
        assert_eq!(spectra[0].precursor_mass, 500.5);
        assert_eq!(spectra[0].metadata["SCANS"], "7");
        Ok(())
    }

    fn error_line(s: &str) -> usize {
        match MgfReader::default().parse(s) {
            Err(MgfError::MalformedSpectrumBlock { line, .. }) => line,
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn malformed_blocks() {
        // Unbalanced markers
        assert_eq!(error_line("END IONS\n"), 1);
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=1\nBEGIN IONS\nEND IONS\n"),
            4
        );
        assert_eq!(error_line("\nBEGIN IONS\nTITLE=a\nPEPMASS=1\n100 1\n"), 2);

        // Mandatory metadata
        assert_eq!(error_line("BEGIN IONS\nPEPMASS=1\nEND IONS\n"), 3);
        assert_eq!(error_line("BEGIN IONS\nTITLE=a\nEND IONS\n"), 3);
        assert_eq!(error_line("BEGIN IONS\nTITLE=a\nPEPMASS=abc\nEND IONS\n"), 3);

        // Peak lines hold exactly two numbers
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=1\n100\nEND IONS\n"),
            4
        );
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=1\n100 2 3\nEND IONS\n"),
            4
        );
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=1008.5\n200 inf\n300 10\nEND IONS\n"),
            4
        );
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=1008.5\nNaN 10\nEND IONS\n"),
            4
        );
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=NaN 100\nEND IONS\n"),
            3
        );
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=-inf\nEND IONS\n"),
            3
        );
    }

    #[test]
    fn negative_intensity() {
        assert_eq!(
            error_line("BEGIN IONS\nTITLE=a\nPEPMASS=1\n100 1\n200 -5\nEND IONS\n"),
            5
        );
        // A zero intensity is still a peak
        let spectra = MgfReader::default()
            .parse("BEGIN IONS\nTITLE=a\nPEPMASS=1\n100 0\nEND IONS\n")
            .unwrap();
        assert_eq!(spectra[0].peaks.len(), 1);
    }

    #[test]
    fn no_partial_results() {
        let s = "BEGIN IONS\nTITLE=a\nPEPMASS=1\n100 1\nEND IONS\nBEGIN IONS\nTITLE=b\n";
        assert!(MgfReader::default().parse(s).is_err());
    }
}
