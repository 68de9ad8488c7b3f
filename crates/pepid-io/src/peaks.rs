//! Flat MS1 peak lists: one decimal mass per line

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PeakListError {
    #[error("line {line}: `{text}` is not a peak mass")]
    InvalidPeak { line: usize, text: String },
}

/// Parse a peak list, ignoring blank lines. Masses are returned sorted ascending
pub fn parse(contents: &str) -> Result<Vec<f64>, PeakListError> {
    let mut masses = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let line = line.trim();
            match line.parse::<f64>() {
                Ok(mass) if mass.is_finite() => Ok(mass),
                _ => Err(PeakListError::InvalidPeak {
                    line: idx + 1,
                    text: line.to_string(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    masses.sort_by(|a, b| a.total_cmp(b));
    Ok(masses)
}
