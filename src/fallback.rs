// This file contains the fallback aligner, which recovers an amplicon from a sequence that lacks a
// complete primer window by aligning it against the amplicons that were extracted directly.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use bio::alignment::pairwise::{Aligner, Scoring};
use bio::alignment::AlignmentOperation;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::iupac::{compatible, reverse_complement};
use crate::resolver::Strand;


/// One directly extracted amplicon, available as an alignment target.
#[derive(Clone, Debug)]
pub struct PoolAmplicon {
    pub id: String,
    pub seq: Vec<u8>,
}


#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        AlignmentScoring { match_score: 1, mismatch_score: -1, gap_open: -5, gap_extend: -1 }
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum Recovery {
    Recovered {
        amplicon: Vec<u8>,
        strand: Strand,
        aligned_to: String,
        coverage: f64,
        identity: f64,
    },
    Failed(RecoveryFailure),
}


#[derive(Clone, Debug, PartialEq)]
pub enum RecoveryFailure {
    EmptyPool,
    NoAlignment,
    LowCoverage { aligned_to: String, coverage: f64 },
}

impl fmt::Display for RecoveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryFailure::EmptyPool => write!(f, "no directly extracted amplicons to align to"),
            RecoveryFailure::NoAlignment => write!(f, "no aligned bases to any amplicon"),
            RecoveryFailure::LowCoverage { aligned_to, coverage } =>
                write!(f, "best alignment ({}) covers only {:.1}% of it", aligned_to,
                       100.0 * coverage),
        }
    }
}


/// The part of an alignment between its first and last aligned base pair.
#[derive(Debug, PartialEq)]
struct AlignedSpan {
    x_start: usize,
    x_end: usize,
    y_start: usize,
    y_end: usize,
    matches: usize,
    columns: usize,
}


struct Candidate {
    score: i32,
    pool_index: usize,
    strand: Strand,
    span: AlignedSpan,
}


/// Aligns the sequence (both orientations) to every pool amplicon and keeps the best-scoring hit.
/// Coverage is the aligned span of that pool amplicon divided by the pool amplicon's own length
/// (not the query's length), so a recovery must span at least min_coverage of a primer-delimited
/// region. Identity counts IUPAC-compatible columns between the first and last aligned pair. The
/// returned strand is relative to the pool's orientation.
pub fn recover(seq: &[u8], pool: &[PoolAmplicon], scoring: &AlignmentScoring,
               min_coverage: f64) -> Recovery {
    if pool.is_empty() {
        return Recovery::Failed(RecoveryFailure::EmptyPool);
    }
    let rc_seq = reverse_complement(seq);
    let max_len = pool.iter().map(|p| p.seq.len()).max().unwrap_or(0);
    let (match_score, mismatch_score) = (scoring.match_score, scoring.mismatch_score);
    let match_fn = move |a: u8, b: u8| if compatible(a, b) { match_score } else { mismatch_score };
    let scoring = Scoring::new(scoring.gap_open, scoring.gap_extend, match_fn).xclip(0).yclip(0);
    let mut aligner = Aligner::with_capacity_and_scoring(seq.len(), max_len, scoring);

    // Ties keep the earlier pool amplicon and then the plus orientation.
    let mut best: Option<Candidate> = None;
    for (pool_index, amplicon) in pool.iter().enumerate() {
        if amplicon.seq.is_empty() {
            continue;
        }
        for (strand, query) in [(Strand::Plus, seq), (Strand::Minus, rc_seq.as_slice())] {
            let alignment = aligner.custom(query, &amplicon.seq);
            let Some(span) = aligned_span(&alignment.operations, query, &amplicon.seq) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| alignment.score > b.score) {
                best = Some(Candidate { score: alignment.score, pool_index, strand, span });
            }
        }
    }
    let Some(best) = best else {
        return Recovery::Failed(RecoveryFailure::NoAlignment);
    };

    let target = &pool[best.pool_index];
    let coverage = (best.span.y_end - best.span.y_start) as f64 / target.seq.len() as f64;
    if coverage < min_coverage {
        return Recovery::Failed(RecoveryFailure::LowCoverage { aligned_to: target.id.clone(),
                                                               coverage });
    }

    // Map the aligned query span back onto the stored strand.
    let (start, end) = match best.strand {
        Strand::Plus => (best.span.x_start, best.span.x_end),
        Strand::Minus => (seq.len() - best.span.x_end, seq.len() - best.span.x_start),
    };
    Recovery::Recovered {
        amplicon: seq[start..end].to_vec(),
        strand: best.strand,
        aligned_to: target.id.clone(),
        coverage,
        identity: best.span.matches as f64 / best.span.columns as f64,
    }
}


fn aligned_span(operations: &[AlignmentOperation], x: &[u8], y: &[u8]) -> Option<AlignedSpan> {
    // Walks the alignment operations, noting where the first and last aligned pair sit. Gaps and
    // clips outside those pairs are ignored.
    let (mut i, mut j, mut column) = (0, 0, 0);
    let mut first: Option<(usize, usize, usize)> = None;
    let mut last = (0, 0, 0);
    let mut matches = 0;
    for op in operations {
        match *op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                if first.is_none() {
                    first = Some((i, j, column));
                }
                if compatible(x[i], y[j]) {
                    matches += 1;
                }
                i += 1;
                j += 1;
                column += 1;
                last = (i, j, column);
            }
            AlignmentOperation::Ins => { i += 1; column += 1; }
            AlignmentOperation::Del => { j += 1; column += 1; }
            AlignmentOperation::Xclip(n) => { i += n; }
            AlignmentOperation::Yclip(n) => { j += n; }
        }
    }
    let (x_start, y_start, first_column) = first?;
    let (x_end, y_end, last_column) = last;
    Some(AlignedSpan { x_start, x_end, y_start, y_end, matches,
                       columns: last_column - first_column })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{assert_almost_eq, random_seq};

    fn pool_of(seqs: &[(&str, &Vec<u8>)]) -> Vec<PoolAmplicon> {
        seqs.iter().map(|(id, seq)| PoolAmplicon { id: id.to_string(), seq: seq.to_vec() })
            .collect()
    }

    #[test]
    fn test_empty_pool() {
        assert_eq!(recover(b"ACGT", &[], &AlignmentScoring::default(), 0.9),
                   Recovery::Failed(RecoveryFailure::EmptyPool));
    }

    #[test]
    fn test_exact_containment() {
        // The amplicon sits inside the query with unrelated flanks on both sides.
        let amplicon = random_seq(200, 0);
        let mut query = random_seq(30, 1);
        query.extend_from_slice(&amplicon);
        query.extend_from_slice(&random_seq(30, 2));
        let pool = pool_of(&[("a", &amplicon)]);
        match recover(&query, &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Recovered { amplicon: recovered, strand, aligned_to, coverage, identity } => {
                assert_eq!(strand, Strand::Plus);
                assert_eq!(aligned_to, "a");
                assert_almost_eq(coverage, 1.0, 1e-8);
                assert_almost_eq(identity, 1.0, 1e-8);
                let pos = query.windows(recovered.len()).position(|w| w == recovered.as_slice());
                assert!(pos.is_some());
                assert!(recovered.len() >= 200);
            }
            other => panic!("expected recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_reverse_orientation() {
        let amplicon = random_seq(150, 3);
        let query = reverse_complement(&amplicon[10..]);
        let pool = pool_of(&[("a", &amplicon)]);
        match recover(&query, &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Recovered { amplicon: recovered, strand, coverage, .. } => {
                assert_eq!(strand, Strand::Minus);
                assert_eq!(recovered, query);
                assert_almost_eq(coverage, 140.0 / 150.0, 1e-8);
            }
            other => panic!("expected recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_coverage_boundary() {
        let amplicon = random_seq(1000, 4);
        let pool = pool_of(&[("a", &amplicon)]);
        match recover(&amplicon[..900], &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Recovered { coverage, .. } => assert_eq!(coverage, 0.9),
            other => panic!("expected recovery, got {:?}", other),
        }
        match recover(&amplicon[..899], &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Failed(RecoveryFailure::LowCoverage { aligned_to, coverage }) => {
                assert_eq!(aligned_to, "a");
                assert_almost_eq(coverage, 0.899, 1e-8);
            }
            other => panic!("expected low coverage, got {:?}", other),
        }
    }

    #[test]
    fn test_best_score_wins_and_ties_keep_pool_order() {
        let amplicon = random_seq(100, 5);
        let other = random_seq(100, 6);
        let pool = pool_of(&[("other", &other), ("first", &amplicon), ("second", &amplicon)]);
        match recover(&amplicon, &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Recovered { aligned_to, .. } => assert_eq!(aligned_to, "first"),
            other => panic!("expected recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_identity_with_mismatch() {
        let amplicon = random_seq(100, 7);
        let mut query = amplicon.clone();
        query[50] = match query[50] { b'A' => b'C', _ => b'A' };
        let pool = pool_of(&[("a", &amplicon)]);
        match recover(&query, &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Recovered { amplicon: recovered, identity, coverage, .. } => {
                assert_eq!(recovered, query);
                assert_almost_eq(identity, 0.99, 1e-8);
                assert_almost_eq(coverage, 1.0, 1e-8);
            }
            other => panic!("expected recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguity_codes_count_as_matches() {
        let amplicon = random_seq(100, 8);
        let mut query = amplicon.clone();
        query[20] = b'N';
        let pool = pool_of(&[("a", &amplicon)]);
        match recover(&query, &pool, &AlignmentScoring::default(), 0.9) {
            Recovery::Recovered { identity, .. } => assert_almost_eq(identity, 1.0, 1e-8),
            other => panic!("expected recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_aligned_span() {
        use AlignmentOperation::*;
        let ops = [Xclip(2), Match, Match, Ins, Match, Del, Subst, Xclip(1), Yclip(3)];
        let span = aligned_span(&ops, b"GGACTAGC", b"ACAGTTTT").unwrap();
        assert_eq!(span, AlignedSpan { x_start: 2, x_end: 7, y_start: 0, y_end: 5,
                                       matches: 3, columns: 6 });
        assert!(aligned_span(&[Xclip(4), Yclip(4)], b"AAAA", b"CCCC").is_none());
    }
}
