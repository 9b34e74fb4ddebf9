// This file contains the code for the ampex table subcommand.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::metrics::ExtractionMetrics;
use crate::misc::{check_if_dir_exists, format_float_sigfigs, quit_with_error};


pub fn table(out_dir: Option<PathBuf>, name: String, fields: String, sigfigs: usize) {
    check_settings(&out_dir, sigfigs);
    let fields = parse_fields(fields);
    if let Some(out_dir) = out_dir {
        let line = values_line(&out_dir, &name, &fields, sigfigs);
        println!("{}", line);
    } else {
        print_header(&fields);
    }
}


fn check_settings(out_dir: &Option<PathBuf>, sigfigs: usize) {
    if let Some(dir) = out_dir.as_ref() {
        check_if_dir_exists(dir);
    }
    if sigfigs == 0 {
        quit_with_error("--sigfigs must be 1 or greater");
    }
}


fn parse_fields(comma_delimited_fields: String) -> Vec<String> {
    let fields: Vec<String> = comma_delimited_fields.replace(' ', "").split(',')
                                                    .filter(|s| !s.is_empty())
                                                    .map(|s| s.to_string()).collect();
    let valid_fields = ExtractionMetrics::get_field_names();
    for field in &fields {
        if !valid_fields.contains(field) {
            quit_with_error(&format!("{} is not a valid field name", field));
        }
    }
    if fields.is_empty() {
        quit_with_error("--fields cannot be empty");
    }
    fields
}


fn print_header(fields: &[String]) {
    println!("name\t{}", fields.join("\t"));
}


fn values_line(out_dir: &Path, name: &str, fields: &[String], sigfigs: usize) -> String {
    if name.contains('\t') {
        quit_with_error("--name cannot contain tab characters")
    }
    let yaml_path = out_dir.join("extraction.yaml");
    let map = if yaml_path.is_file() { load_yaml_to_map(&yaml_path) } else { HashMap::new() };
    let mut line = name.to_string();
    for field in fields {
        line.push('\t');
        if let Some(value) = map.get(field) {
            line.push_str(&format_value(value, sigfigs));
        }
    }
    line
}


fn load_yaml_to_map(yaml_path: &Path) -> HashMap<String, Value> {
    let content = fs::read_to_string(yaml_path)
        .unwrap_or_else(|_| quit_with_error(&format!("could not read {}", yaml_path.display())));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|_| quit_with_error(&format!("failed to parse {}", yaml_path.display())))
}


fn format_value(value: &Value, sigfigs: usize) -> String {
    match value {
        Value::Number(n) => format_number(n, sigfigs),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}


fn format_number(n: &serde_yaml::Number, sigfigs: usize) -> String {
    if n.is_i64() || n.is_u64()      { n.to_string() }
    else if let Some(f) = n.as_f64() { format_float_sigfigs(f, sigfigs) }
    else                             { n.to_string() }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use tempfile::tempdir;
    use crate::tests::make_test_file;

    #[test]
    fn test_parse_fields() {
        assert_eq!(parse_fields("retained_count, unrecovered_count".to_string()),
                   vec!["retained_count", "unrecovered_count"]);
        assert!(panic::catch_unwind(|| {
            parse_fields("retained_count,abc".to_string());
        }).is_err());
        assert!(panic::catch_unwind(|| {
            parse_fields(",".to_string());
        }).is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Number(serde_yaml::Number::from(12)), 2), "12");
        assert_eq!(format_value(&Value::Number(serde_yaml::Number::from(0.8333)), 2), "0.83");
        assert_eq!(format_value(&Value::Number(serde_yaml::Number::from(1.2)), 4), "1.200");
        assert_eq!(format_value(&Value::String("rps10".to_string()), 2), "rps10");
        assert_eq!(format_value(&Value::Null, 2), "");
    }

    #[test]
    fn test_values_line() {
        let dir = tempdir().unwrap();
        make_test_file(&dir.path().join("extraction.yaml"),
                       "locus: rps10\nretained_count: 7\ndirect_match_fraction: 0.875\n");
        let fields = vec!["locus".to_string(), "retained_count".to_string(),
                          "direct_match_fraction".to_string(), "ambiguous_count".to_string()];
        assert_eq!(values_line(dir.path(), "run_1", &fields, 2), "run_1\trps10\t7\t0.88\t");
    }

    #[test]
    fn test_values_line_ignores_nested_extractions() {
        // Only the directory's own extraction.yaml is read, so sibling runs below it are fine.
        let dir = tempdir().unwrap();
        for sub in ["run_a", "run_b"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            make_test_file(&dir.path().join(sub).join("extraction.yaml"), "retained_count: 99\n");
        }
        let fields = vec!["retained_count".to_string()];
        assert_eq!(values_line(dir.path(), "x", &fields, 3), "x\t");
        make_test_file(&dir.path().join("extraction.yaml"), "retained_count: 4\n");
        assert_eq!(values_line(dir.path(), "x", &fields, 3), "x\t4");
    }
}
