// This file contains the code for the ampex extract subcommand and the two-phase extraction
// pipeline behind it.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use colored::Colorize;
use csv::WriterBuilder;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use crate::cache::{cache_key, load_cached, save_cached};
use crate::cleanup::{deduplicate, orient, sort_records};
use crate::error::{AmpexError, Result};
use crate::fallback::{recover, AlignmentScoring, PoolAmplicon, Recovery};
use crate::iupac::{first_invalid_base, reverse_complement};
use crate::log::{explanation, section_header, warning};
use crate::matcher::PrimerHits;
use crate::metrics::ExtractionMetrics;
use crate::misc::{check_if_dir_is_not_dir, check_if_file_exists, create_dir, create_writer,
                  format_duration, format_float, progress_bar, quit_with_error};
use crate::primer::{load_primers, PrimerPair};
use crate::reference::{load_references, ReferenceSequence};
use crate::resolver::{format_windows, resolve, DirectSearch, Strand};


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    #[default]
    Halt,
    Flag,
}

impl FromStr for AmbiguityPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "halt" => Ok(AmbiguityPolicy::Halt),
            "flag" => Ok(AmbiguityPolicy::Flag),
            _ => Err(format!("'{}' is not an ambiguity policy (expected halt or flag)", s)),
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityPolicy::Halt => write!(f, "halt"),
            AmbiguityPolicy::Flag => write!(f, "flag"),
        }
    }
}


/// Every setting that changes what an extraction produces. It is serialised into the cache key, so
/// anything added here automatically invalidates old cache entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub min_coverage: f64,
    pub keep_primers: bool,
    pub ambiguity_policy: AmbiguityPolicy,
    pub orientation_anchor: Option<String>,
    pub anchor_window: usize,
    pub dedup: bool,
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let scoring = AlignmentScoring::default();
        ExtractConfig {
            min_coverage: 0.9,
            keep_primers: false,
            ambiguity_policy: AmbiguityPolicy::Halt,
            orientation_anchor: None,
            anchor_window: 0,
            dedup: true,
            match_score: scoring.match_score,
            mismatch_score: scoring.mismatch_score,
            gap_open: scoring.gap_open,
            gap_extend: scoring.gap_extend,
        }
    }
}

impl ExtractConfig {
    pub fn scoring(&self) -> AlignmentScoring {
        AlignmentScoring { match_score: self.match_score, mismatch_score: self.mismatch_score,
                           gap_open: self.gap_open, gap_extend: self.gap_extend }
    }

    pub fn check(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err("--min_coverage must be between 0 and 1".to_string());
        }
        if let Some(anchor) = &self.orientation_anchor {
            if anchor.is_empty() {
                return Err("--anchor cannot be empty".to_string());
            }
            if first_invalid_base(anchor.as_bytes()).is_some() {
                return Err(format!("--anchor {} is not an IUPAC nucleotide sequence", anchor));
            }
        }
        if self.match_score < 1 {
            return Err("--match must be at least 1".to_string());
        }
        if self.mismatch_score > 0 {
            return Err("--mismatch cannot be greater than 0".to_string());
        }
        if self.gap_open > 0 || self.gap_extend > 0 {
            return Err("--gap_open and --gap_extend cannot be greater than 0".to_string());
        }
        Ok(())
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Retained,
    DroppedAsDuplicate,
    Unrecovered,
    Ambiguous,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Retained => write!(f, "retained"),
            State::DroppedAsDuplicate => write!(f, "dropped_as_duplicate"),
            State::Unrecovered => write!(f, "unrecovered"),
            State::Ambiguous => write!(f, "ambiguous"),
        }
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Direct,
    Alignment,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Direct => write!(f, "direct"),
            Provenance::Alignment => write!(f, "alignment"),
        }
    }
}


/// The outcome for one input sequence. Provenance, strand and amplicon are set for every sequence
/// which produced an amplicon (the amplicon itself is cleared again if it is dropped as a
/// duplicate). Coverage, identity and aligned_to only apply to alignment recoveries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub index: usize,
    pub id: String,
    pub taxon: String,
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<Strand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ExtractionRecord {
    pub fn new(index: usize, id: &str, taxon: &str, state: State) -> ExtractionRecord {
        ExtractionRecord { index, id: id.to_string(), taxon: taxon.to_string(), state,
                           provenance: None, strand: None, amplicon: None, coverage: None,
                           identity: None, aligned_to: None, duplicate_of: None, note: None }
    }

    fn for_reference(reference: &ReferenceSequence, state: State) -> ExtractionRecord {
        ExtractionRecord::new(reference.index, &reference.id, &reference.taxon(), state)
    }

    pub fn length(&self) -> Option<usize> {
        self.amplicon.as_ref().map(|a| a.len())
    }
}


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub retained: usize,
    pub dropped_as_duplicate: usize,
    pub unrecovered: usize,
    pub ambiguous: usize,
    pub direct: usize,
    pub recovered: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.retained + self.dropped_as_duplicate + self.unrecovered + self.ambiguous
    }
}


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub locus: String,
    pub forward_primer: String,
    pub reverse_primer: String,
    pub records: Vec<ExtractionRecord>,
    #[serde(default)]
    pub orientation_outliers: Vec<String>,
}

impl Extraction {
    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for record in &self.records {
            match record.state {
                State::Retained => counts.retained += 1,
                State::DroppedAsDuplicate => counts.dropped_as_duplicate += 1,
                State::Unrecovered => counts.unrecovered += 1,
                State::Ambiguous => counts.ambiguous += 1,
            }
            match record.provenance {
                Some(Provenance::Direct) => counts.direct += 1,
                Some(Provenance::Alignment) => counts.recovered += 1,
                None => {}
            }
        }
        counts
    }

    pub fn retained(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records.iter().filter(|r| r.state == State::Retained)
    }
}


pub fn extract(references: PathBuf, primers: PathBuf, locus: String, out_dir: PathBuf,
               config: ExtractConfig, cache_dir: Option<PathBuf>, threads: usize) {
    let start_time = Instant::now();
    check_settings(&references, &primers, &out_dir, &config, &cache_dir, threads);
    create_dir(&out_dir);
    starting_message();
    print_settings(&references, &primers, &locus, &out_dir, &config, &cache_dir, threads);
    let (pair, reference_seqs) = load_inputs(&references, &primers, &locus);
    let extraction = run_extraction(&pair, &reference_seqs, &config, cache_dir.as_deref());
    print_outcomes(&extraction);
    save_outputs(&extraction, &out_dir);
    finished_message(start_time, &out_dir);
}


fn check_settings(references: &Path, primers: &Path, out_dir: &Path, config: &ExtractConfig,
                  cache_dir: &Option<PathBuf>, threads: usize) {
    check_if_file_exists(references);
    check_if_file_exists(primers);
    check_if_dir_is_not_dir(out_dir);
    if let Some(cache_dir) = cache_dir {
        check_if_dir_is_not_dir(cache_dir);
    }
    if let Err(message) = config.check() {
        quit_with_error(&message);
    }
    if threads < 1   { quit_with_error("--threads cannot be less than 1"); }
    if threads > 100 { quit_with_error("--threads cannot be greater than 100"); }
    // The global pool can only be built once per process.
    ThreadPoolBuilder::new().num_threads(threads).build_global().ok();
}


fn starting_message() {
    section_header("Starting ampex extract");
    explanation("This command extracts the amplicon of one primer pair from each sequence in a \
                 reference database. Sequences without a complete primer window are aligned to \
                 the directly extracted amplicons to recover a partial amplicon.");
}


fn print_settings(references: &Path, primers: &Path, locus: &str, out_dir: &Path,
                  config: &ExtractConfig, cache_dir: &Option<PathBuf>, threads: usize) {
    eprintln!("Settings:");
    eprintln!("  --references {}", references.display());
    eprintln!("  --primers {}", primers.display());
    eprintln!("  --locus {}", locus);
    eprintln!("  --out_dir {}", out_dir.display());
    eprintln!("  --min_coverage {}", format_float(config.min_coverage));
    if config.keep_primers {
        eprintln!("  --keep_primers");
    }
    eprintln!("  --ambiguity {}", config.ambiguity_policy);
    if let Some(anchor) = &config.orientation_anchor {
        eprintln!("  --anchor {}", anchor);
        eprintln!("  --anchor_window {}", config.anchor_window);
    }
    if !config.dedup {
        eprintln!("  --no_dedup");
    }
    eprintln!("  --match {}", config.match_score);
    eprintln!("  --mismatch {}", config.mismatch_score);
    eprintln!("  --gap_open {}", config.gap_open);
    eprintln!("  --gap_extend {}", config.gap_extend);
    if let Some(cache_dir) = cache_dir {
        eprintln!("  --cache_dir {}", cache_dir.display());
    }
    eprintln!("  --threads {}", threads);
    eprintln!();
}


fn load_inputs(references: &Path, primers: &Path, locus: &str)
        -> (PrimerPair, Vec<ReferenceSequence>) {
    section_header("Loading inputs");
    explanation("The primer table and reference sequences are now loaded into memory.");
    let primers = load_primers(primers).unwrap_or_else(|e| quit_with_error(&e.to_string()));
    let pair = PrimerPair::from_primers(&primers, locus)
        .unwrap_or_else(|e| quit_with_error(&e.to_string()));
    eprintln!("Primer pair: {}", pair);
    let reference_seqs = load_references(references)
        .unwrap_or_else(|e| quit_with_error(&e.to_string()));
    let total_length: usize = reference_seqs.iter().map(|r| r.len()).sum();
    eprintln!("Reference sequences: {} ({} bp)", reference_seqs.len(), total_length);
    eprintln!();
    (pair, reference_seqs)
}


fn run_extraction(pair: &PrimerPair, references: &[ReferenceSequence], config: &ExtractConfig,
                  cache_dir: Option<&Path>) -> Extraction {
    section_header("Extracting amplicons");
    explanation("Each sequence is searched for a forward and reverse primer site on either strand. \
                 Sequences with no site pair are then aligned to the directly extracted amplicons.");
    let key = cache_key(pair, references, config);
    if let Some(cache_dir) = cache_dir {
        if let Some(extraction) = load_cached(cache_dir, &key) {
            eprintln!("Loaded cached result: {}", cache_dir.join(format!("{}.yaml", key)).display());
            eprintln!();
            return extraction;
        }
    }
    let extraction = extract_amplicons(pair, references, config)
        .unwrap_or_else(|e| quit_with_error(&e.to_string()));
    if let Some(cache_dir) = cache_dir {
        create_dir(cache_dir);
        if let Err(e) = save_cached(cache_dir, &key, &extraction) {
            warning(&format!("could not write cache entry: {}", e));
        }
    }
    extraction
}


/// Runs the whole extraction for one primer pair: direct search, alignment recovery of the
/// sequences without a window, then cleanup and sorting. Under the halt policy, the first
/// ambiguous sequence (in input order) ends the run with an error.
pub fn extract_amplicons(pair: &PrimerPair, references: &[ReferenceSequence],
                         config: &ExtractConfig) -> Result<Extraction> {
    let direct = direct_search(pair, references);

    let mut records = Vec::with_capacity(references.len());
    let mut pool = Vec::new();
    let mut unmatched = Vec::new();
    for (reference, search) in references.iter().zip(direct) {
        let mut record = ExtractionRecord::for_reference(reference, State::Retained);
        match search {
            Ok(DirectSearch::Window(window)) => {
                let amplicon = window.amplicon(&reference.seq, pair, config.keep_primers);
                record.provenance = Some(Provenance::Direct);
                record.strand = Some(window.strand);
                record.amplicon = Some(String::from_utf8_lossy(amplicon).into_owned());

                // The alignment pool holds primer-free amplicons in forward-primer orientation, so
                // a recovery's strand is relative to the forward primer.
                let insert = window.amplicon(&reference.seq, pair, false);
                if !insert.is_empty() {
                    let seq = match window.strand {
                        Strand::Plus => insert.to_vec(),
                        Strand::Minus => reverse_complement(insert),
                    };
                    pool.push(PoolAmplicon { id: reference.id.clone(), seq });
                }
            }
            Ok(DirectSearch::NoMatch) => {
                record.state = State::Unrecovered;
                unmatched.push(records.len());
            }
            Err(AmpexError::AmbiguousAmplification { windows, .. })
                    if config.ambiguity_policy == AmbiguityPolicy::Flag => {
                record.state = State::Ambiguous;
                record.note = Some(format!("candidate windows: {}", format_windows(&windows)));
            }
            Err(e) => return Err(e),
        }
        records.push(record);
    }

    // Only starts once the pool is complete.
    let recoveries = alignment_search(references, &unmatched, &pool, config);
    for (i, recovery) in unmatched.into_iter().zip(recoveries) {
        let record = &mut records[i];
        match recovery {
            Recovery::Recovered { amplicon, strand, aligned_to, coverage, identity } => {
                record.state = State::Retained;
                record.provenance = Some(Provenance::Alignment);
                record.strand = Some(strand);
                record.amplicon = Some(String::from_utf8_lossy(&amplicon).into_owned());
                record.coverage = Some(coverage);
                record.identity = Some(identity);
                record.aligned_to = Some(aligned_to);
            }
            Recovery::Failed(reason) => {
                record.note = Some(reason.to_string());
            }
        }
    }

    let mut orientation_outliers = Vec::new();
    if let Some(anchor) = &config.orientation_anchor {
        orientation_outliers = orient(&mut records, anchor, config.anchor_window);
    }
    if config.dedup {
        deduplicate(&mut records);
    }
    sort_records(&mut records);
    Ok(Extraction { locus: pair.locus.clone(), forward_primer: pair.forward.id.clone(),
                    reverse_primer: pair.reverse.id.clone(), records, orientation_outliers })
}


fn direct_search(pair: &PrimerPair, references: &[ReferenceSequence])
        -> Vec<Result<DirectSearch>> {
    let pb = progress_bar(references.len());
    let results = references.par_iter().map(|reference| {  // parallel for loop with rayon
        let hits = PrimerHits::search(pair, &reference.seq);
        let result = resolve(&reference.id, &hits, pair);
        pb.inc(1);
        result
    }).collect();
    pb.finish_and_clear();
    results
}


fn alignment_search(references: &[ReferenceSequence], unmatched: &[usize],
                    pool: &[PoolAmplicon], config: &ExtractConfig) -> Vec<Recovery> {
    let scoring = config.scoring();
    let pb = progress_bar(unmatched.len());
    let results = unmatched.par_iter().map(|&i| {  // parallel for loop with rayon
        let result = recover(&references[i].seq, pool, &scoring, config.min_coverage);
        pb.inc(1);
        result
    }).collect();
    pb.finish_and_clear();
    results
}


fn print_outcomes(extraction: &Extraction) {
    for record in &extraction.records {
        let note = record.note.as_deref().unwrap_or("");
        match record.state {
            State::Unrecovered => eprintln!("{}: {} ({})", record.id, "unrecovered".red(), note),
            State::Ambiguous => eprintln!("{}: {} ({})", record.id, "ambiguous".red(), note),
            _ => {}
        }
    }
    for id in &extraction.orientation_outliers {
        warning(&format!("{} does not carry the orientation anchor on either strand", id));
    }
    let counts = extraction.counts();
    eprintln!();
    eprintln!("Input sequences:       {}", counts.total());
    eprintln!("Direct matches:        {}", counts.direct.to_string().green());
    eprintln!("Alignment recoveries:  {}", counts.recovered.to_string().green());
    eprintln!("Unrecovered:           {}", counts.unrecovered.to_string().red());
    if counts.ambiguous > 0 {
        eprintln!("Ambiguous:             {}", counts.ambiguous.to_string().red());
    }
    eprintln!("Duplicates dropped:    {}", counts.dropped_as_duplicate);
    eprintln!("Retained amplicons:    {}", counts.retained.to_string().bold());
    eprintln!();
}


fn save_outputs(extraction: &Extraction, out_dir: &Path) {
    let amplicons_fasta = out_dir.join("amplicons.fasta");
    let provenance_tsv = out_dir.join("provenance.tsv");
    let extraction_yaml = out_dir.join("extraction.yaml");
    write_amplicons(extraction, &amplicons_fasta)
        .unwrap_or_else(|e| quit_with_error(&format!("failed to write {}\n{}",
                                                     amplicons_fasta.display(), e)));
    write_provenance(extraction, &provenance_tsv)
        .unwrap_or_else(|e| quit_with_error(&format!("failed to write {}\n{}",
                                                     provenance_tsv.display(), e)));
    ExtractionMetrics::new(extraction).save_to_yaml(&extraction_yaml)
        .unwrap_or_else(|e| quit_with_error(&format!("failed to write {}\n{}",
                                                     extraction_yaml.display(), e)));
}


pub fn write_amplicons(extraction: &Extraction, filename: &Path) -> Result<()> {
    let mut writer = create_writer(filename)?;
    for record in extraction.retained() {
        let amplicon = record.amplicon.as_deref().unwrap_or("");
        writeln!(writer, ">{} {}", record.id, record.taxon)?;
        writeln!(writer, "{}", amplicon)?;
    }
    writer.flush()?;
    Ok(())
}


pub fn write_provenance(extraction: &Extraction, filename: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(create_writer(filename)?);
    writer.write_record(["id", "taxon", "state", "provenance", "strand", "length", "coverage",
                         "identity", "aligned_to", "duplicate_of", "note"])?;
    for r in &extraction.records {
        writer.write_record([
            r.id.clone(),
            r.taxon.clone(),
            r.state.to_string(),
            r.provenance.map(|p| p.to_string()).unwrap_or_default(),
            r.strand.map(|s| s.symbol().to_string()).unwrap_or_default(),
            r.length().map(|l| l.to_string()).unwrap_or_default(),
            r.coverage.map(format_float).unwrap_or_default(),
            r.identity.map(format_float).unwrap_or_default(),
            r.aligned_to.clone().unwrap_or_default(),
            r.duplicate_of.clone().unwrap_or_default(),
            r.note.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}


fn finished_message(start_time: Instant, out_dir: &Path) {
    section_header("Finished!");
    explanation("You can now run ampex table to summarise this extraction alongside others.");
    eprintln!("Amplicons:       {}", out_dir.join("amplicons.fasta").display());
    eprintln!("Provenance:      {}", out_dir.join("provenance.tsv").display());
    eprintln!("Metrics:         {}", out_dir.join("extraction.yaml").display());
    eprintln!("Time to run: {}", format_duration(start_time.elapsed()));
    eprintln!();
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::primer::{Direction, Primer};

    fn pair() -> PrimerPair {
        let f = Primer::new("f", "l", Direction::Forward, "ACGTAC").unwrap();
        let r = Primer::new("r", "l", Direction::Reverse, "TTGCA").unwrap();
        PrimerPair::new(f, r).unwrap()
    }

    fn reference(index: usize, header: &str, seq: &str) -> ReferenceSequence {
        ReferenceSequence::new(index, header, seq.as_bytes()).unwrap()
    }

    #[test]
    fn test_ambiguity_policy_from_str() {
        assert_eq!("halt".parse::<AmbiguityPolicy>(), Ok(AmbiguityPolicy::Halt));
        assert_eq!("FLAG".parse::<AmbiguityPolicy>(), Ok(AmbiguityPolicy::Flag));
        assert!("pick".parse::<AmbiguityPolicy>().is_err());
        assert_eq!(AmbiguityPolicy::default(), AmbiguityPolicy::Halt);
    }

    #[test]
    fn test_config_check() {
        assert!(ExtractConfig::default().check().is_ok());
        let bad = ExtractConfig { min_coverage: 1.1, ..Default::default() };
        assert!(bad.check().is_err());
        let bad = ExtractConfig { orientation_anchor: Some("GAZ".to_string()),
                                  ..Default::default() };
        assert!(bad.check().is_err());
        let bad = ExtractConfig { gap_open: 2, ..Default::default() };
        assert!(bad.check().is_err());
        let good = ExtractConfig { orientation_anchor: Some("GATYC".to_string()),
                                   ..Default::default() };
        assert!(good.check().is_ok());
    }

    #[test]
    fn test_keep_primers() {
        let refs = vec![reference(0, "a Genus_one", "GGACGTACCCCCTGCAAGG")];
        let config = ExtractConfig { keep_primers: true, ..Default::default() };
        let extraction = extract_amplicons(&pair(), &refs, &config).unwrap();
        assert_eq!(extraction.records[0].amplicon.as_deref(), Some("ACGTACCCCCTGCAA"));
        let extraction = extract_amplicons(&pair(), &refs, &ExtractConfig::default()).unwrap();
        assert_eq!(extraction.records[0].amplicon.as_deref(), Some("CCCC"));
        assert_eq!(extraction.records[0].taxon, "Genus one");
    }

    #[test]
    fn test_empty_insert_is_still_direct() {
        let refs = vec![reference(0, "a", "GGACGTACTGCAAGG")];
        let extraction = extract_amplicons(&pair(), &refs, &ExtractConfig::default()).unwrap();
        let record = &extraction.records[0];
        assert_eq!(record.state, State::Retained);
        assert_eq!(record.provenance, Some(Provenance::Direct));
        assert_eq!(record.amplicon.as_deref(), Some(""));
        assert_eq!(record.length(), Some(0));
    }

    #[test]
    fn test_no_pool_means_unrecovered() {
        let refs = vec![reference(0, "a", "GGGGGGGGGGGGGGG")];
        let extraction = extract_amplicons(&pair(), &refs, &ExtractConfig::default()).unwrap();
        let record = &extraction.records[0];
        assert_eq!(record.state, State::Unrecovered);
        assert!(record.amplicon.is_none());
        assert!(record.note.as_deref().unwrap().contains("no directly extracted amplicons"));
    }

    #[test]
    fn test_dedup_and_counts() {
        let refs = vec![reference(0, "b Genus_one", "GGACGTACCCCCTGCAAGG"),
                        reference(1, "a Genus_one", "TTACGTACCCCCTGCAATT"),
                        reference(2, "c Genus_two", "TTACGTACCCCCTGCAATT")];
        let extraction = extract_amplicons(&pair(), &refs, &ExtractConfig::default()).unwrap();
        let ids: Vec<_> = extraction.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(extraction.records[0].state, State::DroppedAsDuplicate);
        assert_eq!(extraction.records[0].duplicate_of.as_deref(), Some("b"));
        let counts = extraction.counts();
        assert_eq!(counts, StateCounts { retained: 2, dropped_as_duplicate: 1, unrecovered: 0,
                                         ambiguous: 0, direct: 3, recovered: 0 });
        assert_eq!(counts.total(), 3);

        let no_dedup = ExtractConfig { dedup: false, ..Default::default() };
        let extraction = extract_amplicons(&pair(), &refs, &no_dedup).unwrap();
        assert_eq!(extraction.counts().retained, 3);
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let refs = vec![reference(0, "a Genus_one", "GGACGTACCCCCTGCAAGG"),
                        reference(1, "b Genus_two", "ATATATATATATA")];
        let extraction = extract_amplicons(&pair(), &refs, &ExtractConfig::default()).unwrap();
        let fasta = dir.path().join("amplicons.fasta");
        let tsv = dir.path().join("provenance.tsv");
        write_amplicons(&extraction, &fasta).unwrap();
        write_provenance(&extraction, &tsv).unwrap();
        assert_eq!(std::fs::read_to_string(&fasta).unwrap(), ">a Genus one\nCCCC\n");
        let tsv = std::fs::read_to_string(&tsv).unwrap();
        let lines: Vec<_> = tsv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id\ttaxon\tstate\tprovenance\tstrand\tlength"));
        assert!(lines[1].starts_with("a\tGenus one\tretained\tdirect\t+\t4\t"));
        assert!(lines[2].starts_with("b\tGenus two\tunrecovered\t\t\t\t"));
    }
}
