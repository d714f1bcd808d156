// src/parsers/maf.rs

use crate::error::ParseError;
use crate::types::{AlignmentFragment, Strand};

/// One `s` line of a MAF block.
struct SequenceLine<'a> {
    name: &'a str,
    start: usize,
    seq_size: usize,
    strand: Strand,
    aligned: &'a str,
}

impl<'a> SequenceLine<'a> {
    fn parse(text: &'a str, line: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(ParseError::malformed(
                line,
                format!("expected 7 fields in alignment line, found {}", fields.len()),
            ));
        }
        if fields[0] != "s" {
            return Err(ParseError::malformed(
                line,
                format!("expected an 's' line, found '{}'", fields[0]),
            ));
        }
        let strand = Strand::from_field(fields[4])
            .ok_or_else(|| ParseError::malformed(line, format!("bad strand '{}'", fields[4])))?;

        Ok(SequenceLine {
            name: fields[1],
            start: parse_number(fields[2], "start", line)?,
            seq_size: parse_number(fields[5], "sequence size", line)?,
            strand,
            aligned: fields[6],
        })
    }
}

fn parse_number(value: &str, field: &'static str, line: usize) -> Result<usize, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
        line,
    })
}

/// Parse LAST's MAF output. Each `a score=` header is followed by the hit
/// (reference) line and then the query line.
pub fn parse_maf(text: &str) -> Result<Vec<AlignmentFragment>, ParseError> {
    let mut fragments = Vec::new();
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    while let Some((line_no, line)) = lines.next() {
        let Some(rest) = line.strip_prefix("a score=") else {
            continue;
        };
        let score_field = rest.split_whitespace().next().unwrap_or("");
        let score: i64 = score_field.parse().map_err(|_| ParseError::InvalidNumber {
            field: "score",
            value: score_field.to_string(),
            line: line_no,
        })?;

        let (hit_no, hit_text) = lines
            .next()
            .ok_or_else(|| ParseError::malformed(line_no, "block ends before hit line"))?;
        let hit = SequenceLine::parse(hit_text, hit_no)?;
        let (query_no, query_text) = lines
            .next()
            .ok_or_else(|| ParseError::malformed(hit_no, "block ends before query line"))?;
        let query = SequenceLine::parse(query_text, query_no)?;

        let fragment = AlignmentFragment {
            query_id: query.name.to_string(),
            query_seq_len: query.seq_size,
            query_start: query.start,
            query_aligned: query.aligned.to_string(),
            hit_id: hit.name.to_string(),
            hit_seq_len: hit.seq_size,
            hit_start: hit.start,
            hit_aligned: hit.aligned.to_string(),
            strand: query.strand,
            score,
        };
        if let Some(col) = fragment.first_double_gap() {
            return Err(ParseError::malformed(
                query_no,
                format!("gap on both sides at column {}", col),
            ));
        }
        fragments.push(fragment);
    }

    log::debug!("Parsed {} MAF blocks", fragments.len());
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKS: &str = "\
# LAST version 959
#
a score=120 EG2=1.2e-30 E=4e-38
s chr1  100 10 + 5000 ACGTACGTAC
s read7   3 11 - 40   ACGTA-GTACG

a score=45
s chr2    0  4 + 800 ACGT
s read7  20  4 + 40  ACGA
";

    #[test]
    fn test_parse_blocks() {
        let fragments = parse_maf(BLOCKS).unwrap();
        assert_eq!(fragments.len(), 2);

        let f = &fragments[0];
        assert_eq!(f.score, 120);
        assert_eq!(f.hit_id, "chr1");
        assert_eq!(f.hit_start, 100);
        assert_eq!(f.hit_seq_len, 5000);
        assert_eq!(f.query_id, "read7");
        assert_eq!(f.query_start, 3);
        assert_eq!(f.query_seq_len, 40);
        assert_eq!(f.strand, Strand::Reverse);
        assert_eq!(f.query_aligned, "ACGTA-GTACG");

        assert_eq!(fragments[1].hit_id, "chr2");
        assert_eq!(fragments[1].strand, Strand::Forward);
    }

    #[test]
    fn test_wrong_field_count_is_fatal() {
        let text = "a score=10\ns chr1 0 4 + 100\ns read 0 4 + 10 ACGT\n";
        assert!(matches!(
            parse_maf(text),
            Err(ParseError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_truncated_block() {
        let text = "a score=10\ns chr1 0 4 + 100 ACGT\n";
        assert!(matches!(
            parse_maf(text),
            Err(ParseError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_bad_score() {
        assert!(matches!(
            parse_maf("a score=high\n"),
            Err(ParseError::InvalidNumber { field: "score", .. })
        ));
    }

    #[test]
    fn test_double_gap_rejected() {
        let text = "a score=10\ns chr1 0 4 + 100 AC-T\ns read 0 4 + 10 AC-T\n";
        assert!(matches!(
            parse_maf(text),
            Err(ParseError::MalformedRecord { line: 3, .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_maf("# nothing aligned\n").unwrap().is_empty());
    }
}
