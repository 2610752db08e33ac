//! CSV to `{{Motionchart}}` conversion.

use super::{Error, Generated, UploadedFile, Warning, line_list};
use crate::php::{format_ymd, strtotime};
use time::Date;

/// The start of the template for a single file, with placeholder captions.
const HEADER: &str = "{{Motionchart\n   | x = X axis caption\n   | y = Y axis caption\n   | group = Groups caption |\n";

/// Converts a CSV file with `id, date, x, y[, label]` lines into a
/// `{{Motionchart}}` invocation with one `{{dataset}}` per line.
///
/// The first line holds captions and is skipped, as are empty lines. The
/// label defaults to the id.
pub(crate) fn wikify_csv(content: &str) -> Result<Generated, Error> {
    let mut text = String::from(HEADER);
    for (index, line) in line_list(content).iter().enumerate().skip(1) {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        let [id, date, x, y, rest @ ..] = fields.as_slice() else {
            return Err(Error::TooFewFields {
                line: line_number,
                content: line.clone(),
            });
        };

        let date = strtotime(date).map_err(|source| Error::BadDate {
            line: line_number,
            value: (*date).into(),
            content: line.clone(),
            source,
        })?;
        let label = rest.first().unwrap_or(id);
        text += &format!(
            "  {{{{dataset|{id}|{}|{x}|{y}|{label}}}}}\n",
            format_ymd(date)
        );
    }
    text += "}}";
    Ok(Generated {
        warnings: Vec::new(),
        text,
    })
}

/// Combines two CSV files, one holding the horizontal axis values and one
/// holding the vertical axis values, into a `{{Motionchart}}` invocation.
///
/// Both files have dates in the first column and one column per entity, with
/// the entity ids in the first line. Differences in the shape of the two
/// files produce warnings; only the rows and columns present in both are
/// used. Of the captions, only the first entity column is compared.
pub(crate) fn combine_csv(x_file: &UploadedFile, y_file: &UploadedFile) -> Result<Generated, Error> {
    let x_rows = rows(x_file)?;
    let y_rows = rows(y_file)?;

    let mut warnings = Vec::new();
    if x_rows.len() != y_rows.len() {
        warnings.push(Warning::LineCount);
    }
    if x_rows[1].len() != y_rows[1].len() {
        warnings.push(Warning::ColumnCount);
    }
    if x_rows[0].get(1) != y_rows[0].get(1) {
        warnings.push(Warning::Captions);
    }
    if x_rows[1][0] != y_rows[1][0] {
        warnings.push(Warning::FirstDate);
    }

    let line_count = x_rows.len().min(y_rows.len());
    let dates = x_rows[1..line_count]
        .iter()
        .enumerate()
        .map(|(index, row)| {
            strtotime(&row[0]).map_err(|source| Error::BadSeriesDate {
                row: index + 1,
                value: row[0].clone(),
                source,
            })
        })
        .collect::<Result<Vec<Date>, _>>()?;

    let mut text = format!(
        "{{{{Motionchart\n   | x = {}\n   | y = {}\n   | group = Groups caption |",
        x_file.caption(),
        y_file.caption()
    );

    let column_count = x_rows[0].len().min(y_rows[0].len());
    for column in 1..column_count {
        let id = &x_rows[0][column];
        for (index, date) in dates.iter().enumerate() {
            let row = index + 1;
            text += &format!(
                "\n  {{{{dataset|{id}|{}|{}|{}|{id}}}}}",
                format_ymd(*date),
                cell(&x_rows, row, column),
                cell(&y_rows, row, column)
            );
        }
    }
    text += "\n}}";

    Ok(Generated { warnings, text })
}

/// Splits a series file into rows of trimmed cells, ignoring empty lines.
fn rows(file: &UploadedFile) -> Result<Vec<Vec<String>>, Error> {
    let rows = line_list(&file.content)
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect::<Vec<Vec<_>>>();
    if rows.len() < 2 {
        Err(Error::NotEnoughLines {
            file: file.name.clone(),
        })
    } else {
        Ok(rows)
    }
}

/// Returns a cell, or an empty string if the row is too short.
fn cell(rows: &[Vec<String>], row: usize, column: usize) -> &str {
    rows.get(row)
        .and_then(|row| row.get(column))
        .map_or("", String::as_str)
}
