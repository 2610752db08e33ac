//! CSV to wikitable conversion.

use super::{Generated, line_list};

/// Converts a CSV file into a sortable wikitable. The first non-empty line
/// becomes the header row.
pub(crate) fn csv_to_wikitable(content: &str) -> Generated {
    let mut text = String::from("{| class=\"wikitable sortable\"\n");
    let lines = line_list(content);
    let mut lines = lines.iter().filter(|line| !line.trim().is_empty());
    if let Some(header) = lines.next() {
        text += &format!("! {}\n", cells(header).join(" !! "));
    }
    for line in lines {
        text += &format!("|-\n| {}\n", cells(line).join(" || "));
    }
    text += "|}";
    Generated {
        warnings: Vec::new(),
        text,
    }
}

/// Splits a line into trimmed cells.
fn cells(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}
