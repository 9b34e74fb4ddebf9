// This file contains the on-disk cache of extraction results, keyed by a hash of everything that
// goes into an extraction.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::extract::{ExtractConfig, Extraction};
use crate::log::warning;
use crate::metrics::save_yaml;
use crate::primer::PrimerPair;
use crate::reference::ReferenceSequence;


/// Hex SHA-1 digest over the primer pair, every reference sequence (in input order) and the
/// extraction settings. Fields are separated with a zero byte so adjacent values can't run into
/// each other.
pub fn cache_key(pair: &PrimerPair, references: &[ReferenceSequence],
                 config: &ExtractConfig) -> String {
    let mut hasher = Sha1::new();
    for part in [&pair.locus, &pair.forward.id, &pair.forward.seq, &pair.reverse.id,
                 &pair.reverse.seq] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    for reference in references {
        hasher.update(reference.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(reference.header.as_bytes());
        hasher.update([0u8]);
        hasher.update(&reference.seq);
        hasher.update([0u8]);
    }
    // ExtractConfig holds only plain values, so this can't fail.
    hasher.update(serde_json::to_string(config).unwrap_or_default().as_bytes());
    format!("{:x}", hasher.finalize())
}


pub fn cache_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("{}.yaml", key))
}


/// Returns the cached extraction for this key, if there is a usable one.
pub fn load_cached(cache_dir: &Path, key: &str) -> Option<Extraction> {
    let path = cache_path(cache_dir, key);
    if !path.is_file() {
        return None;
    }
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            warning(&format!("could not read cache entry {}: {}", path.display(), e));
            return None;
        }
    };
    match serde_yaml::from_str(&contents) {
        Ok(extraction) => Some(extraction),
        Err(e) => {
            warning(&format!("ignoring unreadable cache entry {}: {}", path.display(), e));
            None
        }
    }
}


pub fn save_cached(cache_dir: &Path, key: &str, extraction: &Extraction) -> Result<()> {
    save_yaml(&cache_path(cache_dir, key), extraction)
}
