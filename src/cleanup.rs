// This file contains the post-extraction cleanup: orientation fixing, deduplication and the final
// deterministic ordering of extraction records.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use fxhash::FxHashMap;

use crate::extract::{ExtractionRecord, State};
use crate::iupac::reverse_complement;
use crate::matcher::find_matches;


/// Flips retained amplicons which carry the anchor motif near the 5′ end only on their reverse
/// complement. Returns the ids of amplicons that carry it in neither orientation, which are left
/// as they are.
pub fn orient(records: &mut [ExtractionRecord], anchor: &str, anchor_window: usize) -> Vec<String> {
    let anchor = anchor.as_bytes();
    let mut outliers = Vec::new();
    for record in records.iter_mut().filter(|r| r.state == State::Retained) {
        let Some(amplicon) = &record.amplicon else { continue };
        if has_anchor(amplicon.as_bytes(), anchor, anchor_window) {
            continue;
        }
        let rc = reverse_complement(amplicon.as_bytes());
        if has_anchor(&rc, anchor, anchor_window) {
            record.amplicon = Some(String::from_utf8_lossy(&rc).into_owned());
            record.strand = record.strand.map(|s| s.flipped());
        } else {
            outliers.push(record.id.clone());
        }
    }
    outliers
}


fn has_anchor(seq: &[u8], anchor: &[u8], anchor_window: usize) -> bool {
    find_matches(anchor, seq).first().is_some_and(|&pos| pos <= anchor_window)
}


/// Marks every retained record whose (taxon, amplicon) was already seen at a lower input index as
/// a duplicate. Returns the number dropped.
pub fn deduplicate(records: &mut [ExtractionRecord]) -> usize {
    records.sort_by_key(|r| r.index);
    let mut kept: FxHashMap<(String, String), String> = FxHashMap::default();
    let mut dropped = 0;
    for record in records.iter_mut().filter(|r| r.state == State::Retained) {
        let Some(amplicon) = record.amplicon.clone() else { continue };
        let key = (record.taxon.clone(), amplicon);
        match kept.get(&key) {
            Some(first_id) => {
                record.state = State::DroppedAsDuplicate;
                record.duplicate_of = Some(first_id.clone());
                record.amplicon = None;
                dropped += 1;
            }
            None => { kept.insert(key, record.id.clone()); }
        }
    }
    dropped
}


pub fn sort_records(records: &mut [ExtractionRecord]) {
    // Ids are unique, so this order is total.
    records.sort_by(|a, b| a.taxon.cmp(&b.taxon).then_with(|| a.id.cmp(&b.id)));
}
