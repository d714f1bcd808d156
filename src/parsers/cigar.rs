// src/parsers/cigar.rs

use crate::error::ParseError;
use crate::types::GAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Match(usize),
    Ins(usize),
    Del(usize),
    RefSkip(usize),
    SoftClip(usize),
    HardClip(usize),
    Pad(usize),
    Equal(usize),
    Diff(usize),
}

impl CigarOp {
    fn from_code(code: char, len: usize) -> Option<Self> {
        let op = match code {
            'M' => CigarOp::Match(len),
            'I' => CigarOp::Ins(len),
            'D' => CigarOp::Del(len),
            'N' => CigarOp::RefSkip(len),
            'S' => CigarOp::SoftClip(len),
            'H' => CigarOp::HardClip(len),
            'P' => CigarOp::Pad(len),
            '=' => CigarOp::Equal(len),
            'X' => CigarOp::Diff(len),
            _ => return None,
        };
        Some(op)
    }

    /// Reference bases consumed.
    pub fn get_ref_len(&self) -> usize {
        match self {
            CigarOp::Match(n)
            | CigarOp::Equal(n)
            | CigarOp::Diff(n)
            | CigarOp::Del(n)
            | CigarOp::RefSkip(n) => *n,
            CigarOp::Ins(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

    /// Bases consumed from SEQ.
    pub fn get_query_len(&self) -> usize {
        match self {
            CigarOp::Match(n)
            | CigarOp::Equal(n)
            | CigarOp::Diff(n)
            | CigarOp::Ins(n)
            | CigarOp::SoftClip(n) => *n,
            CigarOp::Del(_) | CigarOp::RefSkip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Cigar {
    pub ops: Vec<CigarOp>,
    ref_len: usize,
    read_len: usize,
}

impl Cigar {
    pub fn parse(text: &str, line: usize) -> Result<Self, ParseError> {
        let mut ops = Vec::new();
        let mut len: Option<usize> = None;
        for c in text.chars() {
            if let Some(d) = c.to_digit(10) {
                let n = len.unwrap_or(0);
                len = Some(
                    n.checked_mul(10)
                        .and_then(|n| n.checked_add(d as usize))
                        .ok_or_else(|| ParseError::InvalidNumber {
                            field: "CIGAR length",
                            value: text.to_string(),
                            line,
                        })?,
                );
                continue;
            }
            let n = len.take().ok_or_else(|| {
                ParseError::malformed(line, format!("CIGAR operation '{}' has no length", c))
            })?;
            let op = CigarOp::from_code(c, n).ok_or(ParseError::BadCigarOp { op: c, line })?;
            ops.push(op);
        }
        if len.is_some() {
            return Err(ParseError::malformed(line, "CIGAR ends with a bare length"));
        }

        // totals are checked once here so walking the ops cannot overflow
        let ref_len = checked_total(ops.iter().map(|op| op.get_ref_len()), text, line)?;
        let read_len = checked_total(
            ops.iter().map(|op| match op {
                CigarOp::HardClip(n) => *n,
                _ => op.get_query_len(),
            }),
            text,
            line,
        )?;
        Ok(Cigar { ops, ref_len, read_len })
    }

    pub fn ref_len(&self) -> usize {
        self.ref_len
    }

    /// Full read length, hard-clipped bases included.
    pub fn read_len(&self) -> usize {
        self.read_len
    }
}

fn checked_total(mut lens: impl Iterator<Item = usize>, text: &str, line: usize) -> Result<usize, ParseError> {
    lens.try_fold(0usize, |acc, n| acc.checked_add(n))
        .ok_or_else(|| ParseError::InvalidNumber {
            field: "CIGAR total length",
            value: text.to_string(),
            line,
        })
}

/// Column-paired strings produced by walking a CIGAR.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedAlignment {
    /// Clipped bases before the first aligned column
    pub query_start: usize,
    pub query_aligned: String,
    pub hit_aligned: String,
}

/// Expand `cigar` against the read's SEQ and the reference bases starting at
/// the alignment position (`hit` must hold at least `cigar.ref_len()` bases).
pub fn expand(cigar: &Cigar, seq: &str, hit: &str, line: usize) -> Result<ExpandedAlignment, ParseError> {
    let seq = seq.as_bytes();
    let hit = hit.as_bytes();
    let mut query_aligned = Vec::new();
    let mut hit_aligned = Vec::new();
    let mut query_ptr = 0;
    let mut hit_ptr = 0;
    let mut query_start = 0;
    let mut aligning = false;

    let take = |from: &[u8], ptr: usize, n: usize, what: &str| -> Result<Vec<u8>, ParseError> {
        let end = ptr.checked_add(n).ok_or_else(|| {
            ParseError::malformed(line, format!("CIGAR length overflows the {} position", what))
        })?;
        from.get(ptr..end).map(|s| s.to_vec()).ok_or_else(|| {
            ParseError::malformed(
                line,
                format!("CIGAR runs past the end of the {} ({} + {} > {})", what, ptr, n, from.len()),
            )
        })
    };

    for op in &cigar.ops {
        match *op {
            CigarOp::Match(n) | CigarOp::Equal(n) | CigarOp::Diff(n) => {
                query_aligned.extend(take(seq, query_ptr, n, "read")?);
                hit_aligned.extend(take(hit, hit_ptr, n, "reference")?);
                query_ptr += n;
                hit_ptr += n;
                aligning = true;
            }
            CigarOp::Ins(n) => {
                query_aligned.extend(take(seq, query_ptr, n, "read")?);
                hit_aligned.extend(std::iter::repeat(GAP).take(n));
                query_ptr += n;
                aligning = true;
            }
            CigarOp::Del(n) | CigarOp::RefSkip(n) => {
                if matches!(op, CigarOp::RefSkip(_)) {
                    log::warn!("Skipped region ({}N) in CIGAR at line {}", n, line);
                }
                hit_aligned.extend(take(hit, hit_ptr, n, "reference")?);
                query_aligned.extend(std::iter::repeat(GAP).take(n));
                hit_ptr += n;
                aligning = true;
            }
            CigarOp::SoftClip(n) => {
                if !aligning {
                    query_start += n;
                }
                query_ptr += n;
            }
            CigarOp::HardClip(n) => {
                if !aligning {
                    query_start += n;
                }
            }
            CigarOp::Pad(n) => {
                log::warn!("Padding ({}P) in CIGAR at line {}", n, line);
            }
        }
    }

    // both sides are copied byte for byte from str input
    Ok(ExpandedAlignment {
        query_start,
        query_aligned: String::from_utf8_lossy(&query_aligned).into_owned(),
        hit_aligned: String::from_utf8_lossy(&hit_aligned).into_owned(),
    })
}
