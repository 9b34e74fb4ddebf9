// This file contains the amplicon resolver, which turns a sequence's primer binding sites into at
// most one primer-anchored amplicon window.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AmpexError, Result};
use crate::matcher::PrimerHits;
use crate::primer::PrimerPair;


/// Which strand of the stored sequence carries the amplicon in forward-primer orientation. Plus
/// means the forward primer reads left to right on the sequence as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    pub fn flipped(self) -> Strand {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}


/// A half-open interval of the stored sequence, from the first base of one primer site to the
/// last base of the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
}

impl Window {
    pub fn new(start: usize, end: usize, strand: Strand) -> Window {
        Window { start, end, strand }
    }

    fn primer_lengths(&self, pair: &PrimerPair) -> (usize, usize) {
        // (leading, trailing) primer lengths as they sit on the stored sequence.
        match self.strand {
            Strand::Plus => (pair.forward.len(), pair.reverse.len()),
            Strand::Minus => (pair.reverse.len(), pair.forward.len()),
        }
    }

    /// The amplified bases, with or without the primer sites.
    pub fn amplicon<'a>(&self, seq: &'a [u8], pair: &PrimerPair, keep_primers: bool) -> &'a [u8] {
        if keep_primers {
            return &seq[self.start..self.end];
        }
        let (leading, trailing) = self.primer_lengths(pair);
        let insert_start = self.start + leading;
        let insert_end = (self.end - trailing).max(insert_start);
        &seq[insert_start..insert_end]
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}({})", self.start + 1, self.end, self.strand.symbol())
    }
}


pub fn format_windows(windows: &[Window]) -> String {
    windows.iter().map(|w| w.to_string()).collect::<Vec<_>>().join(", ")
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectSearch {
    Window(Window),
    NoMatch,
}


pub fn resolve(id: &str, hits: &PrimerHits, pair: &PrimerPair) -> Result<DirectSearch> {
    let f_len = pair.forward.len();
    let r_len = pair.reverse.len();
    let plus = reduce(candidate_windows(&hits.forward, &hits.reverse_rc, f_len, r_len,
                                        Strand::Plus));
    let minus = reduce(candidate_windows(&hits.reverse, &hits.forward_rc, r_len, f_len,
                                         Strand::Minus));
    let mut windows: Vec<Window> = plus.into_iter().chain(minus).collect();
    windows.sort_by_key(|w| (w.start, w.end, w.strand));
    match windows.len() {
        0 => Ok(DirectSearch::NoMatch),
        1 => Ok(DirectSearch::Window(windows[0])),
        _ => Err(AmpexError::AmbiguousAmplification { id: id.to_string(), windows }),
    }
}


fn candidate_windows(leading_hits: &[usize], trailing_hits: &[usize], leading_len: usize,
                     trailing_len: usize, strand: Strand) -> Vec<Window> {
    // Each leading site pairs with the nearest trailing site downstream of it, and each trailing
    // site with the nearest leading site upstream, i.e. the shortest products PCR would give.
    // Hits are ascending.
    let mut windows = Vec::new();
    for &i in leading_hits {
        if let Some(&j) = trailing_hits.iter().find(|&&j| j >= i + leading_len) {
            windows.push(Window::new(i, j + trailing_len, strand));
        }
    }
    for &j in trailing_hits {
        if let Some(&i) = leading_hits.iter().rev().find(|&&i| i + leading_len <= j) {
            windows.push(Window::new(i, j + trailing_len, strand));
        }
    }
    windows
}


fn reduce(mut windows: Vec<Window>) -> Vec<Window> {
    // Merges overlapping or abutting windows, so nested or staggered primer sites collapse into
    // their outermost primer-anchored bounds.
    windows.sort_by_key(|w| (w.start, w.end));
    let mut reduced: Vec<Window> = Vec::new();
    for w in windows {
        match reduced.last_mut() {
            Some(last) if w.start <= last.end => { last.end = last.end.max(w.end); }
            _ => reduced.push(w),
        }
    }
    reduced
}
