// src/parsers/sam.rs

use ahash::AHashMap;

use super::cigar::{self, Cigar};
use crate::config::Aligner;
use crate::error::ParseError;
use crate::references::ReferenceRegistry;
use crate::types::{AlignmentFragment, Strand};

const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_REVERSE: u16 = 0x10;

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
        line,
    })
}

/// `SN -> LN` from an `@SQ` header line.
fn parse_sq_header(text: &str, line: usize) -> Result<Option<(String, usize)>, ParseError> {
    let mut name = None;
    let mut length = None;
    for tag in text.split('\t').skip(1) {
        if let Some(v) = tag.strip_prefix("SN:") {
            name = Some(v.to_string());
        } else if let Some(v) = tag.strip_prefix("LN:") {
            length = Some(parse_number(v, "LN", line)?);
        }
    }
    Ok(name.zip(length))
}

/// Parse SAM output from any of the SAM-producing aligners.
///
/// Reference bases for the CIGAR expansion come from `references`; a record
/// against a reference that isn't loaded is an error.
pub fn parse_sam(
    text: &str,
    aligner: Aligner,
    references: &ReferenceRegistry,
) -> Result<Vec<AlignmentFragment>, ParseError> {
    let mut fragments = Vec::new();
    let mut ref_sizes: AHashMap<String, usize> = AHashMap::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.is_empty() {
            continue;
        }

        if line.starts_with('@') {
            if line.starts_with("@SQ") {
                if let Some((name, len)) = parse_sq_header(line, line_no)? {
                    if ref_sizes.insert(name.clone(), len).is_some() {
                        log::warn!("Duplicate @SQ line for {} at line {}", name, line_no);
                    }
                }
            }
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 11 {
            return Err(ParseError::malformed(
                line_no,
                format!("expected at least 11 columns, found {}", fields.len()),
            ));
        }

        let flag: u16 = parse_number(fields[1], "FLAG", line_no)?;
        if flag & FLAG_UNMAPPED != 0 {
            log::debug!("Dropping unmapped record {} at line {}", fields[0], line_no);
            continue;
        }

        let rname = fields[2];
        let pos: usize = parse_number(fields[3], "POS", line_no)?;
        let mapq: i64 = parse_number(fields[4], "MAPQ", line_no)?;
        let seq = fields[9];

        if seq == "*" || fields[5] == "*" {
            log::warn!(
                "Record {} at line {} has no SEQ or CIGAR, skipping",
                fields[0],
                line_no
            );
            continue;
        }
        if pos == 0 {
            return Err(ParseError::malformed(line_no, "mapped record with POS 0"));
        }

        let reference = references.get(rname).ok_or_else(|| ParseError::UnknownReference {
            name: rname.to_string(),
            line: line_no,
        })?;

        let cigar = Cigar::parse(fields[5], line_no)?;
        let hit_start = pos - 1;
        let hit_bases = reference
            .substring(hit_start, cigar.ref_len())
            .map_err(|e| ParseError::malformed(line_no, e.to_string()))?;
        let aln = cigar::expand(&cigar, seq, hit_bases, line_no)?;

        let strand = if flag & FLAG_REVERSE != 0 {
            Strand::Reverse
        } else {
            Strand::Forward
        };

        fragments.push(AlignmentFragment {
            query_id: aligner.query_name(fields[0]).to_string(),
            query_seq_len: cigar.read_len(),
            query_start: aln.query_start,
            query_aligned: aln.query_aligned,
            hit_id: rname.to_string(),
            hit_seq_len: ref_sizes.get(rname).copied().unwrap_or_else(|| reference.size()),
            hit_start,
            hit_aligned: aln.hit_aligned,
            strand,
            score: mapq,
        });
    }

    log::debug!("Parsed {} SAM records", fragments.len());
    Ok(fragments)
}
