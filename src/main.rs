// This is the main file of Ampex and where execution starts. It mainly handles the CLI and then
// calls into other files to run whichever subcommand the user chose.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use std::path::PathBuf;
use clap::{Parser, Subcommand, crate_version};

use crate::extract::{AmbiguityPolicy, ExtractConfig};

mod cache;
mod cleanup;
mod error;
mod extract;
mod fallback;
mod iupac;
mod log;
mod matcher;
mod metrics;
mod misc;
mod preflight;
mod primer;
mod reference;
mod resolver;
mod table;


#[derive(Parser)]
#[clap(name = "Ampex",
       version = concat!("v", crate_version!()),
       about = "a tool for extracting PCR amplicons from reference sequence databases")]
#[command(author, version, long_about = None, disable_help_subcommand = true,
          propagate_version = true)]
#[clap(subcommand_required = true)]
#[clap(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {

    /// extract one primer pair's amplicons from reference sequences
    Extract {
        /// Reference sequences in FASTA format, optionally gzipped (required)
        #[clap(short = 'r', long = "references", required = true)]
        references: PathBuf,

        /// Primer table, CSV or TSV with primer_id, locus, direction and sequence (required)
        #[clap(short = 'p', long = "primers", required = true)]
        primers: PathBuf,

        /// Locus whose forward/reverse primers to use (required)
        #[clap(short = 'l', long = "locus", required = true)]
        locus: String,

        /// Output directory (required)
        #[clap(short = 'o', long = "out_dir", required = true)]
        out_dir: PathBuf,

        /// Minimum fraction of an amplicon an alignment recovery must cover
        #[clap(long = "min_coverage", default_value = "0.9")]
        min_coverage: f64,

        /// Keep primer sites on directly extracted amplicons
        #[clap(long = "keep_primers")]
        keep_primers: bool,

        /// What to do with sequences that have more than one amplicon (halt or flag)
        #[clap(long = "ambiguity", default_value = "halt")]
        ambiguity: AmbiguityPolicy,

        /// Motif expected at the 5' end of correctly oriented amplicons
        #[clap(long = "anchor")]
        anchor: Option<String>,

        /// How far from the 5' end the anchor motif may start
        #[clap(long = "anchor_window", default_value = "0")]
        anchor_window: usize,

        /// Keep amplicons which are exact duplicates within a taxon
        #[clap(long = "no_dedup")]
        no_dedup: bool,

        /// Alignment match score
        #[clap(long = "match", default_value = "1")]
        match_score: i32,

        /// Alignment mismatch score
        #[clap(long = "mismatch", default_value = "-1", allow_negative_numbers = true)]
        mismatch_score: i32,

        /// Alignment gap open score
        #[clap(long = "gap_open", default_value = "-5", allow_negative_numbers = true)]
        gap_open: i32,

        /// Alignment gap extend score
        #[clap(long = "gap_extend", default_value = "-1", allow_negative_numbers = true)]
        gap_extend: i32,

        /// Directory for cached extraction results
        #[clap(long = "cache_dir")]
        cache_dir: Option<PathBuf>,

        /// Number of CPU threads
        #[clap(short = 't', long = "threads", default_value = "8")]
        threads: usize,
    },

    /// check that external amplicon tools are installed
    Preflight {
        /// Comma-delimited list of programs to look for in $PATH
        #[clap(long = "tools", default_value = preflight::DEFAULT_TOOLS)]
        tools: String,
    },

    /// create TSV line from an extraction's YAML file
    Table {
        /// Extraction output directory (if absent, a header line will be output)
        #[clap(short = 'o', long = "out_dir")]
        out_dir: Option<PathBuf>,

        /// Sample name
        #[clap(short = 'n', long = "name", default_value = "", hide_default_value = true,
               help = "Sample name [default: blank]")]
        name: String,

        /// Comma-delimited list of YAML fields to include
        #[clap(short = 'f', long = "fields",
               default_value = "locus, input_sequence_count, direct_match_count, \
                                alignment_recovered_count, unrecovered_count, ambiguous_count, \
                                duplicate_count, retained_count, amplicon_length_median")]
        fields: String,

        /// Significant figures to use for floating point numbers
        #[clap(short = 's', long = "sigfigs", default_value = "3")]
        sigfigs: usize,
    },
}


fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Extract { references, primers, locus, out_dir, min_coverage, keep_primers,
                                 ambiguity, anchor, anchor_window, no_dedup, match_score,
                                 mismatch_score, gap_open, gap_extend, cache_dir, threads }) => {
            let config = ExtractConfig {
                min_coverage, keep_primers, ambiguity_policy: ambiguity,
                orientation_anchor: anchor.map(|a| a.to_ascii_uppercase()), anchor_window,
                dedup: !no_dedup, match_score, mismatch_score, gap_open, gap_extend,
            };
            extract::extract(references, primers, locus, out_dir, config, cache_dir, threads);
        },
        Some(Commands::Preflight { tools }) => {
            preflight::preflight(tools);
        },
        Some(Commands::Table { out_dir, name, fields, sigfigs }) => {
            table::table(out_dir, name, fields, sigfigs);
        },
        None => {}
    }
}
