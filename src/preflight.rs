// This file contains the code for the ampex preflight subcommand, which checks that the external
// programs of an amplicon workflow can be found.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use colored::Colorize;
use std::path::PathBuf;
use which::which;

use crate::error::{AmpexError, Result};
use crate::log::{explanation, section_header};
use crate::misc::quit_with_error;


pub const DEFAULT_TOOLS: &str = "cutadapt,vsearch,mafft,blastn";


pub fn preflight(tools: String) {
    let tools = parse_tools(&tools);
    section_header("Starting ampex preflight");
    explanation("This command checks that the external programs used alongside Ampex (primer \
                 trimming, clustering, alignment and search) are available in $PATH.");
    match check_tools(&tools) {
        Ok(found) => {
            for (tool, path) in found {
                eprintln!("{}: {}", tool, path.display().to_string().green());
            }
            eprintln!();
        }
        Err(e) => quit_with_error(&e.to_string()),
    }
}


fn parse_tools(tools: &str) -> Vec<String> {
    let tools: Vec<String> = tools.split(',').map(|t| t.trim().to_string())
                                  .filter(|t| !t.is_empty()).collect();
    if tools.is_empty() {
        quit_with_error("--tools cannot be empty");
    }
    tools
}


/// Looks up each program on $PATH, failing on the first one which is missing.
pub fn check_tools(tools: &[String]) -> Result<Vec<(String, PathBuf)>> {
    tools.iter()
        .map(|tool| which(tool).map(|path| (tool.clone(), path))
                               .map_err(|_| AmpexError::ToolUnavailable(tool.clone())))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tools() {
        assert_eq!(parse_tools(DEFAULT_TOOLS), vec!["cutadapt", "vsearch", "mafft", "blastn"]);
        assert_eq!(parse_tools(" sh , ,ls"), vec!["sh", "ls"]);
        assert!(std::panic::catch_unwind(|| { parse_tools(" , "); }).is_err());
    }

    #[test]
    fn test_check_tools() {
        let found = check_tools(&["sh".to_string()]).unwrap();
        assert_eq!(found[0].0, "sh");
        assert!(found[0].1.ends_with("sh"));
        let missing = "ampex_no_such_program_xyz".to_string();
        match check_tools(&["sh".to_string(), missing.clone()]) {
            Err(AmpexError::ToolUnavailable(name)) => assert_eq!(name, missing),
            other => panic!("expected missing tool, got {:?}", other),
        }
    }
}
