// This file defines a struct for storing the reference sequences and the code to load them.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use fxhash::FxHashSet;
use regex::Regex;
use seq_io::fasta::{Reader, Record};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{AmpexError, Result};
use crate::iupac::first_invalid_base;
use crate::misc::open_maybe_gzipped;


#[derive(Clone)]
pub struct ReferenceSequence {
    pub index: usize,
    pub id: String,
    pub header: String,
    pub seq: Vec<u8>,
}

impl ReferenceSequence {
    pub fn new(index: usize, header: &str, seq: &[u8]) -> Result<ReferenceSequence> {
        // Whitespace runs in the header become single spaces, and the sequence is uppercased with
        // RNA U read as T.
        let header = collapse_whitespace(header);
        let id = header.split(' ').next().unwrap_or("").to_string();
        if id.is_empty() {
            return Err(AmpexError::FastaFormat(format!("sequence {} has no name", index + 1)));
        }
        let seq: Vec<u8> = seq.iter()
            .map(|b| match b.to_ascii_uppercase() { b'U' => b'T', u => u }).collect();
        if seq.is_empty() {
            return Err(AmpexError::FastaFormat(format!("{} has an empty sequence", id)));
        }
        if let Some(position) = first_invalid_base(&seq) {
            return Err(AmpexError::InvalidSequence { name: id, character: seq[position] as char,
                                                     position: position + 1 });
        }
        Ok(ReferenceSequence { index, id, header, seq })
    }

    pub fn description(&self) -> &str {
        match self.header.split_once(' ') {
            Some((_, description)) => description,
            None => "",
        }
    }

    pub fn taxon(&self) -> String {
        // The taxonomic label, e.g. "Phytophthora infestans" or "Pythium sp. 1". Headers without a
        // description fall back to the id.
        let description = self.description();
        let label = if description.is_empty() { &self.id } else { description };
        label.replace('_', " ")
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }
}

impl fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bp)", self.id, self.seq.len())
    }
}

impl fmt::Debug for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Display::fmt(self, f) }
}


pub fn load_references(filename: &Path) -> Result<Vec<ReferenceSequence>> {
    let mut reader = Reader::new(open_maybe_gzipped(filename)?);
    let mut references = Vec::new();
    let mut ids = FxHashSet::default();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| AmpexError::FastaFormat(
            format!("{} is not correctly formatted: {}", filename.display(), e)))?;
        let header = std::str::from_utf8(record.head()).map_err(|_| AmpexError::FastaFormat(
            format!("{} has a header which is not valid UTF-8", filename.display())))?;
        let reference = ReferenceSequence::new(references.len(), header, &record.full_seq())?;
        if !ids.insert(reference.id.clone()) {
            return Err(AmpexError::FastaFormat(
                format!("{} has a duplicate name: {}", filename.display(), reference.id)));
        }
        references.push(reference);
    }
    if references.is_empty() {
        return Err(AmpexError::FastaFormat(
            format!("{} contains no sequences", filename.display())));
    }
    Ok(references)
}


fn collapse_whitespace(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(text.trim(), " ").to_string()
}
