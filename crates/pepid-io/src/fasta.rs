use pepid_core::database::SequenceRecord;

/// Parse a FASTA database. The identifier of a record is the first
/// whitespace-separated token of its header line; sequence lines are
/// concatenated as written. Records without any sequence are skipped
pub fn parse(contents: &str) -> Vec<SequenceRecord> {
    let mut records = Vec::new();
    let mut last_id = "";
    let mut s = String::new();

    let identifier = |header: &str| {
        header
            .split_ascii_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(id) = line.strip_prefix('>') {
            if !s.is_empty() {
                records.push(SequenceRecord {
                    identifier: identifier(last_id),
                    sequence: std::mem::take(&mut s),
                });
            }
            last_id = id;
        } else {
            s.push_str(line);
        }
    }

    if !s.is_empty() {
        records.push(SequenceRecord {
            identifier: identifier(last_id),
            sequence: s,
        });
    }
    records
}
