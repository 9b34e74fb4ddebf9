// This file contains the IUPAC nucleotide alphabet: ambiguity-aware base comparison and
// complementing.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

const A: u8 = 1;
const C: u8 = 2;
const G: u8 = 4;
const T: u8 = 8;

// Each letter's set of possible bases, indexed by ASCII value. Anything that isn't a nucleotide
// code gets the empty set, so it is compatible with nothing.
const BASE_SETS: [u8; 256] = {
    let mut table = [0u8; 256];
    let codes: [(u8, u8); 16] = [
        (b'A', A), (b'C', C), (b'G', G), (b'T', T), (b'U', T),
        (b'R', A | G), (b'Y', C | T), (b'S', C | G), (b'W', A | T), (b'K', G | T), (b'M', A | C),
        (b'B', C | G | T), (b'D', A | G | T), (b'H', A | C | T), (b'V', A | C | G),
        (b'N', A | C | G | T),
    ];
    let mut i = 0;
    while i < codes.len() {
        let (letter, set) = codes[i];
        table[letter as usize] = set;
        table[letter.to_ascii_lowercase() as usize] = set;
        i += 1;
    }
    table
};


#[inline(always)]
pub fn base_set(base: u8) -> u8 {
    BASE_SETS[base as usize]
}


pub fn is_valid_base(base: u8) -> bool {
    base_set(base) != 0
}


/// True if the two letters share at least one possible base, e.g. `R` and `A`, or `N` and
/// anything. The relation is symmetric.
#[inline(always)]
pub fn compatible(a: u8, b: u8) -> bool {
    base_set(a) & base_set(b) != 0
}


pub fn complement_base(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'R' => b'Y',
        b'Y' => b'R',
        b'S' => b'S',
        b'W' => b'W',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        _ => b'N',
    }
}


pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement_base(b)).collect()
}


/// Returns the position of the first byte which is not a nucleotide code, if any.
pub fn first_invalid_base(seq: &[u8]) -> Option<usize> {
    seq.iter().position(|&b| !is_valid_base(b))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatible() {
        assert!(compatible(b'A', b'A'));
        assert!(!compatible(b'A', b'C'));
        assert!(compatible(b'R', b'A'));
        assert!(compatible(b'R', b'G'));
        assert!(!compatible(b'R', b'C'));
        assert!(compatible(b'N', b'T'));
        assert!(compatible(b'S', b'K'));  // share G
        assert!(!compatible(b'S', b'W'));
        assert!(compatible(b'u', b'T'));
        assert!(!compatible(b'-', b'A'));
        assert!(!compatible(b'X', b'N'));
    }

    #[test]
    fn test_compatible_is_symmetric() {
        let letters = b"ACGTURYSWKMBDHVN";
        for &a in letters {
            for &b in letters {
                assert_eq!(compatible(a, b), compatible(b, a));
            }
        }
    }

    #[test]
    fn test_complement_preserves_base_sets() {
        // The complement of a code must represent exactly the complements of its bases.
        for &code in b"ACGTRYSWKMBDHVN" {
            let set = base_set(code);
            let mut expected = 0;
            if set & A != 0 { expected |= T; }
            if set & C != 0 { expected |= G; }
            if set & G != 0 { expected |= C; }
            if set & T != 0 { expected |= A; }
            assert_eq!(base_set(complement_base(code)), expected, "{}", code as char);
        }
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"GGTATCACTCAGGAAGC"), b"GCTTCCTGAGTGATACC");
        assert_eq!(reverse_complement(b"ARYN"), b"NRYT");
        assert_eq!(reverse_complement(b"acgt"), b"ACGT");
        assert_eq!(reverse_complement(b"XZ"), b"NN");
        assert_eq!(reverse_complement(b""), b"");
    }

    #[test]
    fn test_first_invalid_base() {
        assert_eq!(first_invalid_base(b"ACGTNRY"), None);
        assert_eq!(first_invalid_base(b"ACG-T"), Some(3));
        assert_eq!(first_invalid_base(b"ACG T"), Some(3));
    }
}
