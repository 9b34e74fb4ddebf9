// This file contains the primer pattern matcher: finding every site where a primer binds a
// reference sequence, honouring IUPAC ambiguity codes on both sides.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use crate::iupac::compatible;
use crate::primer::PrimerPair;


/// Returns the zero-based start of every full-length match of `primer` in `target`, ascending.
/// Matches may overlap. An empty primer never matches.
pub fn find_matches(primer: &[u8], target: &[u8]) -> Vec<usize> {
    if primer.is_empty() || primer.len() > target.len() {
        return Vec::new();
    }
    (0..=target.len() - primer.len())
        .filter(|&start| matches_at(primer, target, start))
        .collect()
}


#[inline]
fn matches_at(primer: &[u8], target: &[u8], start: usize) -> bool {
    primer.iter().zip(&target[start..start + primer.len()]).all(|(&p, &t)| compatible(p, t))
}


/// All primer binding sites on one reference sequence, as positions on the strand the sequence
/// was stored on.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PrimerHits {
    pub forward: Vec<usize>,
    pub reverse: Vec<usize>,
    pub forward_rc: Vec<usize>,
    pub reverse_rc: Vec<usize>,
}

impl PrimerHits {
    pub fn search(pair: &PrimerPair, seq: &[u8]) -> PrimerHits {
        PrimerHits {
            forward: find_matches(pair.forward.seq.as_bytes(), seq),
            reverse: find_matches(pair.reverse.seq.as_bytes(), seq),
            forward_rc: find_matches(&pair.forward_rc, seq),
            reverse_rc: find_matches(&pair.reverse_rc, seq),
        }
    }
}
