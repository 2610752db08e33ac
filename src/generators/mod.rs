//! Converters from uploaded CSV files to Wikitext.
//!
//! Fields are separated by `,` or `;`. Double quotes are removed rather than
//! interpreted, so quoted fields cannot contain separators.

use crate::php::{DateTimeParseError, strtr};
use core::fmt;

pub(crate) use motionchart::{combine_csv, wikify_csv};
pub(crate) use wikitable::csv_to_wikitable;

mod motionchart;
mod wikitable;

/// Errors that may occur when converting CSV data.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// A line has fewer than four fields.
    #[error(
        "not enough commas or semicolons on line {line}; there should be at least 3 separators: {content}"
    )]
    TooFewFields {
        /// The 1-based line number.
        line: usize,
        /// The text of the line.
        content: String,
    },

    /// The date field of a line could not be understood.
    #[error("wrong date format on line {line}: “{value}” should be a date: {content}")]
    BadDate {
        /// The 1-based line number.
        line: usize,
        /// The date field.
        value: String,
        /// The text of the line.
        content: String,
        /// The parse error.
        source: DateTimeParseError,
    },

    /// A date in the first column of a series file could not be understood.
    #[error("wrong date format on data row {row}: “{value}” should be a date")]
    BadSeriesDate {
        /// The 1-based data row number, not counting the caption line.
        row: usize,
        /// The date field.
        value: String,
        /// The parse error.
        source: DateTimeParseError,
    },

    /// A series file has no data.
    #[error("{file} needs a line of captions and at least one line of data")]
    NotEnoughLines {
        /// The file name.
        file: String,
    },
}

/// Errors that may occur when accepting an uploaded file.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub(crate) enum UploadError {
    /// No file was sent.
    #[error("no file selected")]
    NoFile,
    /// The file is not a CSV or text file.
    #[error("the file should be a *.csv or *.txt file with the MIME type text/csv; “{0}” was given")]
    Type(String),
    /// The file name contains forbidden characters.
    #[error("the file name is not valid")]
    Name,
}

/// An uploaded text file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct UploadedFile {
    /// The client file name.
    pub name: String,
    /// The file content.
    pub content: String,
}

impl UploadedFile {
    /// Accepts an uploaded file.
    ///
    /// The declared MIME type must mention `csv` or `text`, or else the file
    /// name must end with `.csv` or `.txt`. Invalid UTF-8 sequences in the
    /// content are replaced.
    pub fn new(name: &str, content_type: &str, data: &[u8]) -> Result<Self, UploadError> {
        if name.is_empty() {
            return Err(UploadError::NoFile);
        }

        let content_type = content_type.to_ascii_lowercase();
        let extension = name.to_ascii_lowercase();
        if !content_type.contains("csv")
            && !content_type.contains("text")
            && !extension.ends_with(".csv")
            && !extension.ends_with(".txt")
        {
            return Err(UploadError::Type(content_type));
        }

        if name
            .chars()
            .any(|c| matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}' | '/' | '\\'))
        {
            return Err(UploadError::Name);
        }

        Ok(Self {
            name: name.into(),
            content: String::from_utf8_lossy(data).into_owned(),
        })
    }

    /// The file name without a `.csv` or `.txt` extension.
    pub fn caption(&self) -> &str {
        let len = self.name.len();
        match self.name.get(len.saturating_sub(4)..) {
            Some(extension)
                if extension.eq_ignore_ascii_case(".csv") || extension.eq_ignore_ascii_case(".txt") =>
            {
                &self.name[..len - 4]
            }
            _ => &self.name,
        }
    }
}

/// Something suspicious found while combining files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Warning {
    /// The files have a different number of lines.
    LineCount,
    /// The files have a different number of columns.
    ColumnCount,
    /// The files have different captions for their first entity column.
    Captions,
    /// The files start at different dates.
    FirstDate,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LineCount => "the two files do not have the same number of lines",
            Self::ColumnCount => "the two files do not have the same number of columns",
            Self::Captions => "the two files have different second-column captions",
            Self::FirstDate => "the two files do not start with the same date",
        })
    }
}

/// Generated Wikitext.
#[derive(Debug, Default, Eq, PartialEq)]
pub(crate) struct Generated {
    /// Problems found in the input which did not stop generation.
    pub warnings: Vec<Warning>,
    /// The Wikitext.
    pub text: String,
}

/// Splits CSV text into lines, removing double quotes and treating
/// semicolons as commas.
fn line_list(content: &str) -> Vec<String> {
    strtr(content, &[("\"", ""), (";", ",")])
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
