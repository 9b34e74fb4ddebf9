// This file contains the primer types and the code for loading them from a primer table.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AmpexError, Result};
use crate::iupac::{first_invalid_base, reverse_complement};


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "f" | "fwd" => Ok(Direction::Forward),
            "reverse" | "r" | "rev" => Ok(Direction::Reverse),
            _ => Err(format!("'{}' is not a primer direction (expected forward or reverse)", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}


#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primer {
    pub id: String,
    pub locus: String,
    pub direction: Direction,
    pub seq: String,
}

impl Primer {
    pub fn new(id: &str, locus: &str, direction: Direction, seq: &str) -> Result<Primer> {
        let seq = seq.trim().to_ascii_uppercase().replace('U', "T");
        if seq.is_empty() {
            return Err(AmpexError::PrimerTable(format!("primer {} has no sequence", id)));
        }
        if let Some(position) = first_invalid_base(seq.as_bytes()) {
            return Err(AmpexError::InvalidSequence {
                name: format!("primer {}", id),
                character: seq.as_bytes()[position] as char,
                position: position + 1,
            });
        }
        Ok(Primer { id: id.to_string(), locus: locus.to_string(), direction, seq })
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }
}


/// The forward and reverse primer which bound one locus's amplicon. Reverse complements are kept
/// alongside so each reference sequence doesn't have to recompute them.
#[derive(Clone, Debug)]
pub struct PrimerPair {
    pub locus: String,
    pub forward: Primer,
    pub reverse: Primer,
    pub forward_rc: Vec<u8>,
    pub reverse_rc: Vec<u8>,
}

impl PrimerPair {
    pub fn new(forward: Primer, reverse: Primer) -> Result<PrimerPair> {
        if forward.direction != Direction::Forward || reverse.direction != Direction::Reverse {
            return Err(AmpexError::PrimerPair(
                format!("{} and {} are not a forward/reverse pair", forward.id, reverse.id)));
        }
        if forward.locus != reverse.locus {
            return Err(AmpexError::PrimerPair(
                format!("{} and {} target different loci ({} and {})",
                        forward.id, reverse.id, forward.locus, reverse.locus)));
        }
        let forward_rc = reverse_complement(forward.seq.as_bytes());
        let reverse_rc = reverse_complement(reverse.seq.as_bytes());
        Ok(PrimerPair { locus: forward.locus.clone(), forward, reverse, forward_rc, reverse_rc })
    }

    pub fn from_primers(primers: &[Primer], locus: &str) -> Result<PrimerPair> {
        // Exactly one primer of each direction must exist for the locus.
        let pick = |direction: Direction| -> Result<Primer> {
            let matching: Vec<_> = primers.iter()
                .filter(|p| p.locus == locus && p.direction == direction).collect();
            match matching.len() {
                1 => Ok(matching[0].clone()),
                0 => Err(AmpexError::PrimerPair(
                    format!("no {} primer for locus {}", direction, locus))),
                n => Err(AmpexError::PrimerPair(
                    format!("{} {} primers for locus {} (expected one)", n, direction, locus))),
            }
        };
        PrimerPair::new(pick(Direction::Forward)?, pick(Direction::Reverse)?)
    }
}

impl fmt::Display for PrimerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {} / {} {}", self.locus, self.forward.id, self.forward.seq,
               self.reverse.id, self.reverse.seq)
    }
}


#[derive(Deserialize)]
struct PrimerRow {
    primer_id: String,
    locus: String,
    direction: String,
    sequence: String,
}


pub fn load_primers(filename: &Path) -> Result<Vec<Primer>> {
    // Comma-delimited if the file ends in .csv, otherwise tab-delimited.
    let delimiter = if filename.extension().unwrap_or_default() == "csv" { b',' } else { b'\t' };
    let mut reader = ReaderBuilder::new().delimiter(delimiter).trim(Trim::All)
                                         .comment(Some(b'#')).from_path(filename)?;
    let mut primers = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let row: PrimerRow = row?;
        let direction = row.direction.parse::<Direction>().map_err(|e| AmpexError::PrimerTable(
            format!("{} row {}: {}", filename.display(), i + 1, e)))?;
        let primer = Primer::new(&row.primer_id, &row.locus, direction, &row.sequence)?;
        if primers.iter().any(|p: &Primer| p.id == primer.id) {
            return Err(AmpexError::PrimerTable(
                format!("{} has a duplicate primer id: {}", filename.display(), primer.id)));
        }
        primers.push(primer);
    }
    if primers.is_empty() {
        return Err(AmpexError::PrimerTable(format!("{} contains no primers", filename.display())));
    }
    Ok(primers)
}


#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use super::*;
    use crate::tests::make_test_file;

    #[test]
    fn test_direction_from_str() {
        assert_eq!("Forward".parse::<Direction>(), Ok(Direction::Forward));
        assert_eq!(" r ".parse::<Direction>(), Ok(Direction::Reverse));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_primer_new() {
        let p = Primer::new("ITS6", "ITS1", Direction::Forward, " gaagguraaaagucguaacaagg ").unwrap();
        assert_eq!(p.seq, "GAAGGTRAAAAGTCGTAACAAGG");
        assert_eq!(p.len(), 23);
        assert!(Primer::new("x", "l", Direction::Forward, "").is_err());
        assert!(matches!(Primer::new("x", "l", Direction::Forward, "ACZT"),
                         Err(AmpexError::InvalidSequence { position: 3, .. })));
    }

    #[test]
    fn test_primer_pair() {
        let f = Primer::new("f", "rps10", Direction::Forward, "AACR").unwrap();
        let r = Primer::new("r", "rps10", Direction::Reverse, "GGTA").unwrap();
        let pair = PrimerPair::new(f.clone(), r.clone()).unwrap();
        assert_eq!(pair.forward_rc, b"YGTT");
        assert_eq!(pair.reverse_rc, b"TACC");
        assert!(PrimerPair::new(r.clone(), f.clone()).is_err());
        let other = Primer::new("r2", "ITS1", Direction::Reverse, "GGTA").unwrap();
        assert!(PrimerPair::new(f, other).is_err());
    }

    #[test]
    fn test_from_primers() {
        let primers = vec![
            Primer::new("f1", "rps10", Direction::Forward, "AACR").unwrap(),
            Primer::new("r1", "rps10", Direction::Reverse, "GGTA").unwrap(),
            Primer::new("f2", "ITS1", Direction::Forward, "ACGT").unwrap(),
            Primer::new("f3", "ITS1", Direction::Forward, "TTTT").unwrap(),
            Primer::new("r2", "ITS1", Direction::Reverse, "CCCC").unwrap(),
        ];
        let pair = PrimerPair::from_primers(&primers, "rps10").unwrap();
        assert_eq!(pair.forward.id, "f1");
        assert_eq!(pair.reverse.id, "r1");
        let e = PrimerPair::from_primers(&primers, "ITS1").unwrap_err();
        assert_eq!(e.to_string(), "2 forward primers for locus ITS1 (expected one)");
        let e = PrimerPair::from_primers(&primers, "COI").unwrap_err();
        assert_eq!(e.to_string(), "no forward primer for locus COI");
    }

    #[test]
    fn test_load_primers() {
        let dir = tempdir().unwrap();
        let tsv = dir.path().join("primers.tsv");
        let csv = dir.path().join("primers.csv");
        make_test_file(&tsv, "primer_id\tlocus\tdirection\tsequence\n\
                              rps10_F\trps10\tForward\tGTTGGTTAGAGYARAAGACT\n\
                              rps10_R\trps10\tReverse\tATGTGYTTTTCAAAACTTGGATTT\n");
        make_test_file(&csv, "primer_id,locus,direction,sequence\n\
                              # a comment line\n\
                              ITS6,ITS1,forward,GAAGGTGAAGTCGTAACAAGG\n\
                              ITS7,ITS1,reverse,AGCGTTCTTCATCGATGTGC\n");
        let primers = load_primers(&tsv).unwrap();
        assert_eq!(primers.len(), 2);
        assert_eq!(primers[0].direction, Direction::Forward);
        assert_eq!(primers[1].seq, "ATGTGYTTTTCAAAACTTGGATTT");
        let primers = load_primers(&csv).unwrap();
        assert_eq!(primers[1].id, "ITS7");
        assert_eq!(primers[1].locus, "ITS1");
    }

    #[test]
    fn test_load_primers_errors() {
        let dir = tempdir().unwrap();
        let bad_direction = dir.path().join("a.csv");
        make_test_file(&bad_direction, "primer_id,locus,direction,sequence\nx,l,up,ACGT\n");
        assert!(load_primers(&bad_direction).unwrap_err().to_string().contains("row 1"));
        let duplicate = dir.path().join("b.csv");
        make_test_file(&duplicate, "primer_id,locus,direction,sequence\n\
                                    x,l,f,ACGT\nx,l,r,ACGT\n");
        assert!(load_primers(&duplicate).unwrap_err().to_string().contains("duplicate primer"));
        let empty = dir.path().join("c.csv");
        make_test_file(&empty, "primer_id,locus,direction,sequence\n");
        assert!(load_primers(&empty).is_err());
    }
}
