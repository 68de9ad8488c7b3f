use csv::ByteRecord;
use pepid_core::database::SpectrumMatches;
use pepid_core::scoring::ScoredCandidate;

use crate::runner::Results;

/// Written in place of a ranked table without any rows
pub const NO_DATA: &str = "no data";

fn serialize_candidate(rank: usize, candidate: &ScoredCandidate) -> ByteRecord {
    let mut record = ByteRecord::new();
    record.push_field(itoa::Buffer::new().format(rank).as_bytes());
    record.push_field(ryu::Buffer::new().format(candidate.score).as_bytes());
    record.push_field(candidate.label.as_bytes());
    record
}

fn write_ms1(candidates: &[ScoredCandidate]) -> anyhow::Result<Vec<u8>> {
    if candidates.is_empty() {
        log::warn!("no proteins to report");
        return Ok(format!("{}\n", NO_DATA).into_bytes());
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);
    wtr.write_byte_record(&ByteRecord::from(vec!["rank", "score", "label"]))?;
    for (idx, candidate) in candidates.iter().enumerate() {
        wtr.write_byte_record(&serialize_candidate(idx + 1, candidate))?;
    }
    wtr.flush()?;
    Ok(wtr.into_inner()?)
}

fn write_ms2(matches: &[SpectrumMatches]) -> anyhow::Result<Vec<u8>> {
    if matches.is_empty() {
        log::warn!("no spectra to report");
        return Ok(format!("{}\n", NO_DATA).into_bytes());
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);
    wtr.write_byte_record(&ByteRecord::from(vec![
        "spectrum", "rank", "score", "label",
    ]))?;
    for spectrum in matches {
        if spectrum.candidates.is_empty() {
            log::warn!("no candidate peptides for spectrum `{}`", spectrum.spectrum);
            wtr.write_byte_record(&ByteRecord::from(vec![
                spectrum.spectrum.as_str(),
                "",
                "",
                NO_DATA,
            ]))?;
            continue;
        }
        for (idx, candidate) in spectrum.candidates.iter().enumerate() {
            let mut record = ByteRecord::new();
            record.push_field(spectrum.spectrum.as_bytes());
            record.extend(serialize_candidate(idx + 1, candidate).iter());
            wtr.write_byte_record(&record)?;
        }
    }
    wtr.flush()?;
    Ok(wtr.into_inner()?)
}

/// Render results as a tab separated table
pub fn serialize(results: &Results) -> anyhow::Result<Vec<u8>> {
    match results {
        Results::Ms1(candidates) => write_ms1(candidates),
        Results::Ms2(matches) => write_ms2(matches),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(results: Results) -> String {
        String::from_utf8(serialize(&results).unwrap()).unwrap()
    }

    #[test]
    fn ms1_table() {
        let results = Results::Ms1(vec![
            ScoredCandidate::new("sp|P1", 1.0),
            ScoredCandidate::new("sp|P2", 0.25),
        ]);
        assert_eq!(
            render(results),
            "rank\tscore\tlabel\n1\t1.0\tsp|P1\n2\t0.25\tsp|P2\n"
        );
    }

    #[test]
    fn ms2_table() {
        let results = Results::Ms2(vec![
            SpectrumMatches {
                spectrum: "scan=1".into(),
                candidates: vec![ScoredCandidate::new("TARGET PEPTIDEK", 16.0)],
            },
            SpectrumMatches {
                spectrum: "scan=2".into(),
                candidates: vec![],
            },
        ]);
        assert_eq!(
            render(results),
            "spectrum\trank\tscore\tlabel\n\
             scan=1\t1\t16.0\tTARGET PEPTIDEK\n\
             scan=2\t\t\tno data\n"
        );
    }

    #[test]
    fn empty_results() {
        assert_eq!(render(Results::Ms1(vec![])), "no data\n");
        assert_eq!(render(Results::Ms2(vec![])), "no data\n");
    }
}
