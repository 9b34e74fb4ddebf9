// This file contains miscellaneous functions used by various parts of Ampex.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{create_dir_all, File};
use std::io;
use std::io::{prelude::*, BufReader, BufWriter};
use std::path::Path;


pub fn create_dir(dir_path: &Path) {
    match create_dir_all(dir_path) {
        Ok(_) => {},
        Err(e) => quit_with_error(&format!("failed to create directory {}\n{}", dir_path.display(), e)),
    }
}


pub fn check_if_file_exists(filename: &Path) {
    // Quits with an error if the given path is not an existing file.
    if !filename.exists() {
        quit_with_error(&format!("file does not exist: {}", filename.display()));
    }
    if !filename.is_file() {
        quit_with_error(&format!("{} is not a file", filename.display()));
    }
}


pub fn check_if_dir_exists(dir: &Path) {
    // Quits with an error if the given path is not an existing directory.
    if !dir.exists() {
        quit_with_error(&format!("directory does not exist: {}", dir.display()));
    }
    if !dir.is_dir() {
        quit_with_error(&format!("{} is not a directory", dir.display()));
    }
}


pub fn check_if_dir_is_not_dir(dir: &Path) {
    // Quits with an error if the given path exists but is not a directory (not existing is okay).
    if dir.exists() && !dir.is_dir() {
        quit_with_error(&format!("{} exists but is not a directory", dir.display()));
    }
}


#[cfg(not(test))]
pub fn quit_with_error(text: &str) -> ! {
    // For friendly error messages, this function normally just prints the error and quits.
    eprintln!();
    eprintln!("Error: {}", text);
    std::process::exit(1);
}
#[cfg(test)]
pub fn quit_with_error(text: &str) -> ! {
    // But when running unit tests, this function instead panics so I can catch it for the test.
    panic!("{}", text);
}


pub fn open_maybe_gzipped(filename: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    // Returns a reader that works on both unzipped and gzipped files.
    let file = File::open(filename)?;
    let reader: Box<dyn Read> = if is_file_gzipped(filename)? { Box::new(MultiGzDecoder::new(file)) }
                                                         else { Box::new(file) };
    Ok(BufReader::new(reader))
}


fn is_file_gzipped(filename: &Path) -> io::Result<bool> {
    // Looks at the first two bytes for the gzip magic number. Files shorter than two bytes can't
    // be gzipped.
    let mut file = File::open(filename)?;
    let mut buf = [0u8; 2];
    let mut filled = 0;
    while filled < 2 {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 { return Ok(false); }
        filled += n;
    }
    Ok(buf[0] == 31 && buf[1] == 139)
}


pub fn create_writer(filename: &Path) -> io::Result<Box<dyn Write>> {
    // Output files ending in .gz are gzipped, all others are plain text.
    let file = File::create(filename)?;
    if filename.extension().unwrap_or_default() == "gz" {
        Ok(Box::new(BufWriter::new(GzEncoder::new(file, Compression::default()))))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}


pub fn format_float(num: f64) -> String {
    // Formats a float with up to six decimal places but then drops trailing zeros.
    let mut formatted = format!("{:.6}", num);
    if !formatted.contains('.') { return formatted }
    while formatted.ends_with('0') { formatted.pop(); }
    if formatted.ends_with('.') { formatted.pop(); }
    formatted
}


pub fn format_float_sigfigs(num: f64, sigfigs: usize) -> String {
    if num == 0.0 || !num.is_finite() {
        return format!("{:.*}", sigfigs.saturating_sub(1), num);
    }
    let magnitude = num.abs().log10().floor() as i64;
    let decimals = (sigfigs as i64 - 1 - magnitude).max(0) as usize;
    format!("{:.*}", decimals, num)
}


pub fn format_duration(duration: std::time::Duration) -> String {
    let microseconds = duration.as_micros() % 1000000;
    let seconds =      duration.as_micros() / 1000000 % 60;
    let minutes =      duration.as_micros() / 1000000 / 60 % 60;
    let hours =        duration.as_micros() / 1000000 / 60 / 60;
    format!("{}:{:02}:{:02}.{:06}", hours, minutes, seconds, microseconds)
}


pub fn median_usize(values: &[usize]) -> usize {
    if values.is_empty() { return 0; }
    let mut sorted_values = values.to_vec();
    sorted_values.sort();
    let len = sorted_values.len();
    if len % 2 == 0 { (sorted_values[len / 2 - 1] + sorted_values[len / 2]) / 2 }
               else { sorted_values[len / 2] }
}


pub fn progress_bar(count: usize) -> ProgressBar {
    if cfg!(test) {
        ProgressBar::hidden() // don't show progress during unit tests
    } else {
        let pb = ProgressBar::new(count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40} {pos}/{len} ({eta})").unwrap()
                .progress_chars("=> "),
        );
        pb
    }
}
