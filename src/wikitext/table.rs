//! Splitting a cleaned wikitable into rows of cells.

/// The cell text of a wikitable. The first row holds the column captions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// The column captions.
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// The rows after the header.
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// The number of columns, as given by the header.
    pub fn width(&self) -> usize {
        self.header().len()
    }

    /// The text of a data cell, or an empty string if the row is too short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows()
            .get(row)
            .and_then(|row| row.get(column))
            .map_or("", String::as_str)
    }
}

/// Splits wikitable text starting at the header row into cells.
///
/// Header cells are separated by `!!`, or by `!` at the start of a line when
/// there is no `!!`. Data cells are separated the same way by `||` or `|`.
/// Anything on the same line as a row separator is a row attribute and is
/// discarded.
pub(crate) fn split_rows(text: &str) -> Table {
    let mut rows = Vec::<Vec<String>>::new();
    for (index, row) in text.split("|-").enumerate() {
        let row = if index == 0 {
            row
        } else {
            row.split_once('\n').map_or("", |(_, cells)| cells)
        };

        let row = row.trim();
        if row.is_empty() {
            continue;
        }

        let row = row.strip_prefix(['!', '|']).unwrap_or(row);
        let (inline, multiline) = if rows.is_empty() {
            ("!!", "\n!")
        } else {
            ("||", "\n|")
        };

        let cells = if row.contains(inline) {
            row.split(inline).collect::<Vec<_>>()
        } else {
            row.split(multiline).collect()
        };

        rows.push(cells.into_iter().map(|cell| cell.trim().to_string()).collect());
    }
    Table { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(table: &Table) -> Vec<Vec<&str>> {
        core::iter::once(table.header())
            .chain(table.rows().iter().map(Vec::as_slice))
            .map(|row| row.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn inline_cells() {
        let table = split_rows("! Year !! Sales !! Costs\n|-\n| 2004 || 1000 || 400\n|-\n| 2005 || 1170 || 460");
        assert_eq!(
            rows(&table),
            [
                vec!["Year", "Sales", "Costs"],
                vec!["2004", "1000", "400"],
                vec!["2005", "1170", "460"],
            ]
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.cell(1, 2), "460");
        assert_eq!(table.cell(2, 0), "");
    }

    #[test]
    fn multiline_cells() {
        let table = split_rows("! Year\n! Sales\n|- class=\"odd\"\n| 2004\n| 1000\n|-\n|2005\n|1170\n");
        assert_eq!(
            rows(&table),
            [vec!["Year", "Sales"], vec!["2004", "1000"], vec!["2005", "1170"]]
        );
    }

    #[test]
    fn blank_and_short_rows() {
        let table = split_rows("! A !! B\n|-\n|-\n| 1\n|-\n\n");
        assert_eq!(rows(&table), [vec!["A", "B"], vec!["1"]]);
        assert_eq!(table.cell(0, 1), "");
    }

    #[test]
    fn single_column() {
        let table = split_rows("! Only\n|-\n| 7");
        assert_eq!(rows(&table), [vec!["Only"], vec!["7"]]);
    }

    #[test]
    fn empty() {
        let table = split_rows("");
        assert!(table.header().is_empty());
        assert!(table.rows().is_empty());
        assert_eq!(table.cell(0, 0), "");
    }

    #[test]
    fn rebuilt_grid() {
        let grid = [
            ["Name", "Q1", "Q2"],
            ["North", "1.5", "2"],
            ["South", "3", "4.25"],
            ["East", "", "9"],
        ];
        let mut text = format!("! {}", grid[0].join(" !! "));
        for row in &grid[1..] {
            text += &format!("\n|-\n| {}", row.join(" || "));
        }
        assert_eq!(rows(&split_rows(&text)), grid.map(Vec::from));
    }
}
