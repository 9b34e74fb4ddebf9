// This file defines the error type shared by the extraction pipeline and its inputs/outputs.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use thiserror::Error;

use crate::resolver::{format_windows, Window};


// Only conditions that stop a run live here. The per-sequence outcomes that let a batch carry on
// (no primer window, failed alignment recovery) are ordinary values in resolver.rs/fallback.rs.
#[derive(Debug, Error)]
pub enum AmpexError {
    #[error("{id} has more than one candidate amplicon: {}", format_windows(.windows))]
    AmbiguousAmplification { id: String, windows: Vec<Window> },

    #[error("required program '{0}' not found in $PATH")]
    ToolUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    FastaFormat(String),

    #[error("{name} contains an invalid character '{character}' at position {position}")]
    InvalidSequence { name: String, character: char, position: usize },

    #[error("{0}")]
    PrimerTable(String),

    #[error("{0}")]
    PrimerPair(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, AmpexError>;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Strand;

    #[test]
    fn test_ambiguous_message() {
        let e = AmpexError::AmbiguousAmplification {
            id: "seq_3".to_string(),
            windows: vec![Window::new(0, 100, Strand::Plus), Window::new(150, 260, Strand::Minus)],
        };
        assert_eq!(e.to_string(),
                   "seq_3 has more than one candidate amplicon: 1-100(+), 151-260(-)");
    }

    #[test]
    fn test_tool_message() {
        let e = AmpexError::ToolUnavailable("vsearch".to_string());
        assert_eq!(e.to_string(), "required program 'vsearch' not found in $PATH");
    }
}
