// This file contains functions for formatting Ampex's stderr output.

// Copyright 2026 Ampex contributors

// This file is part of Ampex. Ampex is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. Ampex is distributed in
// the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// Ampex. If not, see <http://www.gnu.org/licenses/>.

use chrono::Local;
use colored::Colorize;


const MAX_WIDTH: usize = 100;


pub fn section_header(text: &str) {
    let date = Local::now().format("(%Y-%m-%d %H:%M:%S)").to_string();
    eprintln!();
    eprintln!("{} {}", text.bold().bright_yellow().underline(), date.dimmed());
}


pub fn explanation(text: &str) {
    eprintln!("{}", textwrap::fill(text, terminal_width()).dimmed());
    eprintln!();
}


pub fn warning(text: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), text);
}


fn terminal_width() -> usize {
    match term_size::dimensions_stderr() {
        Some((w, _)) => w.clamp(40, MAX_WIDTH),
        None => MAX_WIDTH,
    }
}
