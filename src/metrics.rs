// This file contains the code for reading and writing Ampex's YAML files of metrics.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::extract::Extraction;
use crate::misc::median_usize;


#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ExtractionMetrics {
    pub locus: String,
    pub forward_primer: String,
    pub reverse_primer: String,
    pub input_sequence_count: usize,
    pub direct_match_count: usize,
    pub alignment_recovered_count: usize,
    pub unrecovered_count: usize,
    pub ambiguous_count: usize,
    pub retained_count: usize,
    pub duplicate_count: usize,
    pub orientation_outlier_count: usize,
    pub direct_match_fraction: f64,
    pub alignment_recovered_fraction: f64,
    pub amplicon_length_min: usize,
    pub amplicon_length_median: usize,
    pub amplicon_length_max: usize,
}

impl ExtractionMetrics {
    pub fn new(extraction: &Extraction) -> Self {
        let counts = extraction.counts();
        let lengths: Vec<usize> = extraction.retained().filter_map(|r| r.length()).collect();
        let mut metrics = ExtractionMetrics {
            locus: extraction.locus.clone(),
            forward_primer: extraction.forward_primer.clone(),
            reverse_primer: extraction.reverse_primer.clone(),
            input_sequence_count: counts.total(),
            direct_match_count: counts.direct,
            alignment_recovered_count: counts.recovered,
            unrecovered_count: counts.unrecovered,
            ambiguous_count: counts.ambiguous,
            retained_count: counts.retained,
            duplicate_count: counts.dropped_as_duplicate,
            orientation_outlier_count: extraction.orientation_outliers.len(),
            amplicon_length_min: lengths.iter().copied().min().unwrap_or(0),
            amplicon_length_median: median_usize(&lengths),
            amplicon_length_max: lengths.iter().copied().max().unwrap_or(0),
            ..Default::default()
        };
        metrics.calculate_fractions();
        metrics
    }

    pub fn calculate_fractions(&mut self) {
        if self.input_sequence_count > 0 {
            let total = self.input_sequence_count as f64;
            self.direct_match_fraction = self.direct_match_count as f64 / total;
            self.alignment_recovered_fraction = self.alignment_recovered_count as f64 / total;
        }
    }

    pub fn save_to_yaml(&self, filename: &Path) -> Result<()> { save_yaml(filename, self) }
}


pub fn save_yaml<T: Serialize>(yaml_filename: &Path, data: T) -> Result<()> {
    let yaml_string = serde_yaml::to_string(&data)?;
    let mut file = File::create(yaml_filename)?;
    file.write_all(yaml_string.as_bytes())?;
    Ok(())
}


// This macro adds get_val_by_name and get_field_names methods to the metric structs.
macro_rules! impl_metrics_helpers {
    ($struct_name:ty) => {
        impl $struct_name {
            pub fn get_val_by_name(&self, name: &str) -> Option<String> {
                serde_json::to_value(self).ok()?.get(name).map(|v| v.to_string())
            }
            pub fn get_field_names() -> Vec<String> {
                let mut field_names: Vec<String> = match serde_json::to_value(Self::default()) {
                    Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                field_names.sort();
                field_names
            }
        }
    };
}
impl_metrics_helpers!(ExtractionMetrics);
