//! Google Visualization chart scripts.

use crate::{
    php::{floatval, strtr, strval},
    wikitext::{Dataset, Table},
};
use core::{fmt::Write as _, num::NonZeroUsize, str::FromStr};
use regex::{Regex, RegexBuilder};
use std::{borrow::Cow, sync::LazyLock};


/// The kinds of chart which can be drawn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ChartKind {
    /// A pie chart.
    Pie,
    /// A horizontal bar chart.
    Bar,
    /// A vertical bar chart.
    Column,
    /// A line chart.
    Line,
    /// A scatter chart. The first column is numeric.
    Scatter,
    /// An area chart.
    Area,
    /// A map of countries.
    GeoMap,
    /// A map of countries shaded by value.
    IntensityMap,
    /// A sparkline image. The first column is numeric.
    SparkLine,
    /// A motion chart drawn from `{{dataset}}` entries.
    Motion,
}

impl ChartKind {
    /// The Google loader package which provides the chart.
    pub fn package(self) -> &'static str {
        match self {
            Self::GeoMap => "geomap",
            Self::IntensityMap => "intensitymap",
            Self::SparkLine => "imagesparkline",
            Self::Motion => "motionchart",
            _ => "corechart",
        }
    }

    /// The name of the JavaScript chart class.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Pie => "PieChart",
            Self::Bar => "BarChart",
            Self::Column => "ColumnChart",
            Self::Line => "LineChart",
            Self::Scatter => "ScatterChart",
            Self::Area => "AreaChart",
            Self::GeoMap => "GeoMap",
            Self::IntensityMap => "IntensityMap",
            Self::SparkLine => "ImageSparkLine",
            Self::Motion => "MotionChart",
        }
    }

    /// Whether the first table column holds numbers instead of labels.
    fn numeric_first_column(self) -> bool {
        matches!(self, Self::Scatter | Self::SparkLine)
    }
}

/// An unrecognised chart type name.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("“{0}” is not a chart type; use one of pie, bar, col, line, scatter, area, geomap, intensitymap, sparkline, or motionchart")]
pub(crate) struct UnknownChartKind(pub String);

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "pie" => Self::Pie,
            "bar" => Self::Bar,
            "col" | "column" => Self::Column,
            "line" => Self::Line,
            "scatter" => Self::Scatter,
            "area" => Self::Area,
            "geomap" => Self::GeoMap,
            "intensitymap" | "intensity-map" => Self::IntensityMap,
            "sparkline" => Self::SparkLine,
            "motion" | "motionchart" => Self::Motion,
            _ => return Err(UnknownChartKind(s.into())),
        })
    }
}

/// Column ids used by intensity maps after the country column. The map
/// cannot show more columns than this.
const INTENSITY_IDS: [&str; 12] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];

/// Drawing options for a chart built from a wikitable.
#[derive(Debug)]
pub(crate) struct TableChart<'a> {
    /// The kind of chart.
    pub kind: ChartKind,
    /// The maximum number of columns to draw, or `None` for every column.
    pub columns: Option<NonZeroUsize>,
    /// The width of the chart, in pixels.
    pub width: u32,
    /// The height of the chart, in pixels.
    pub height: u32,
    /// The chart title. It will be escaped.
    pub title: &'a str,
}

/// Drawing options for a motion chart.
#[derive(Debug)]
pub(crate) struct MotionChart<'a> {
    /// The horizontal axis caption.
    pub x: &'a str,
    /// The vertical axis caption.
    pub y: &'a str,
    /// The group caption.
    pub group: &'a str,
    /// The width of the chart, in pixels.
    pub width: u32,
    /// The height of the chart, in pixels.
    pub height: u32,
}

/// Generates the script which draws a chart from a wikitable.
pub(crate) fn table_chart(table: &Table, chart: &TableChart<'_>) -> Result<String, core::fmt::Error> {
    let header = table.header();
    let mut columns = chart.columns.map_or(header.len(), |n| n.get().min(header.len()));
    if chart.kind == ChartKind::IntensityMap {
        columns = columns.min(INTENSITY_IDS.len() + 1);
    }

    let mut out = String::new();
    write_prologue(&mut out, chart.kind)?;

    for (index, caption) in header.iter().take(columns).enumerate() {
        let kind = if index == 0 && !chart.kind.numeric_first_column() {
            "string"
        } else {
            "number"
        };
        write!(out, "  data.addColumn('{kind}', '{}'", js_text(caption))?;
        if chart.kind == ChartKind::IntensityMap {
            let id = if index == 0 { "Country" } else { INTENSITY_IDS[index - 1] };
            write!(out, ", '{id}'")?;
        }
        writeln!(out, ");")?;
    }

    writeln!(out, "  data.addRows({});", table.rows().len())?;
    for row in 0..table.rows().len() {
        for column in 0..columns {
            let cell = table.cell(row, column);
            if column == 0 && !chart.kind.numeric_first_column() {
                writeln!(out, "  data.setValue({row}, {column}, '{}');", js_text(cell))?;
            } else {
                writeln!(out, "  data.setValue({row}, {column}, {});", strval(number(cell)))?;
            }
        }
    }

    write!(
        out,
        "  chart.draw(data, {{width: {}, height: {}, title: '{}'",
        chart.width,
        chart.height,
        js_text(chart.title)
    )?;
    let caption = |index: usize| header.get(index).map_or(Cow::Borrowed(""), |caption| js_text(caption));
    match chart.kind {
        ChartKind::Scatter => write!(
            out,
            ", hAxis: {{title: '{}'}}, vAxis: {{title: '{}'}}, legend: 'none'",
            caption(0),
            caption(1)
        )?,
        ChartKind::Area => write!(out, ", hAxis: {{title: '{}'}}", caption(0))?,
        ChartKind::SparkLine => write!(
            out,
            ", showAxisLines: true, showValueLabels: true, labelPosition: 'right'"
        )?,
        _ => {}
    }
    writeln!(out, "}});")?;

    write_epilogue(&mut out)?;
    Ok(out)
}

/// Generates the script which draws a motion chart from dataset entries.
pub(crate) fn motion_chart(datasets: &[Dataset], chart: &MotionChart<'_>) -> Result<String, core::fmt::Error> {
    let mut out = String::new();
    write_prologue(&mut out, ChartKind::Motion)?;

    writeln!(out, "  data.addColumn('string', 'Project');")?;
    writeln!(out, "  data.addColumn('date', 'Date');")?;
    writeln!(out, "  data.addColumn('number', '{}');", js_text(chart.x))?;
    writeln!(out, "  data.addColumn('number', '{}');", js_text(chart.y))?;
    writeln!(out, "  data.addColumn('string', '{}');", js_text(chart.group))?;

    writeln!(out, "  data.addRows([")?;
    for (index, dataset) in datasets.iter().enumerate() {
        let (year, month, day) = dataset.ymd();
        write!(
            out,
            "    ['{}', new Date({year}, {month}, {day}), {}, {}, '{}']",
            js_text(&dataset.id),
            strval(number(&dataset.x)),
            strval(number(&dataset.y)),
            js_text(&dataset.label)
        )?;
        writeln!(out, "{}", if index + 1 == datasets.len() { "" } else { "," })?;
    }
    writeln!(out, "  ]);")?;

    writeln!(
        out,
        "  chart.draw(data, {{width: {}, height: {}}});",
        chart.width, chart.height
    )?;

    write_epilogue(&mut out)?;
    Ok(out)
}

/// Writes the loader script and the start of the drawing callback.
fn write_prologue(out: &mut String, kind: ChartKind) -> core::fmt::Result {
    writeln!(
        out,
        r#"<script type="text/javascript" src="https://www.google.com/jsapi"></script>"#
    )?;
    writeln!(out, r#"<script type="text/javascript">"#)?;
    writeln!(
        out,
        r#"google.load("visualization", "1", {{packages: ["{}"]}});"#,
        kind.package()
    )?;
    writeln!(out, "google.setOnLoadCallback(drawChart);")?;
    writeln!(out, "function drawChart() {{")?;
    writeln!(out, "  var data = new google.visualization.DataTable();")?;
    writeln!(
        out,
        "  var chart = new google.visualization.{}(document.getElementById('chart_div'));",
        kind.class_name()
    )
}

/// Writes the end of the drawing callback.
fn write_epilogue(out: &mut String) -> core::fmt::Result {
    writeln!(out, "}}")?;
    write!(out, "</script>")
}

/// Escapes text for use inside a single-quoted JavaScript string in an
/// HTML script element.
pub(crate) fn js_text(text: &str) -> Cow<'_, str> {
    strtr(
        text,
        &[
            ("<!--", "<\\!--"),
            ("</", "<\\/"),
            ("\r\n", "\\n"),
            ("\\", "\\\\"),
            ("'", "\\'"),
            ("\n", "\\n"),
            ("\r", "\\n"),
        ],
    )
}

/// Reads a number from table cell text.
///
/// Grouping spaces are ignored. When both `,` and `.` appear, whichever comes
/// last is the decimal separator. A separator which appears more than once is
/// a grouping separator. A lone `,` is a decimal separator. Text which is not
/// a number reads as 0.
pub(crate) fn number(text: &str) -> f64 {
    let digits = text.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        (Some(comma), Some(point)) if comma > point => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) if digits.matches(',').count() > 1 => digits.replace(',', ""),
        (Some(_), None) => digits.replace(',', "."),
        (None, Some(_)) if digits.matches('.').count() > 1 => digits.replace('.', ""),
        _ => digits,
    };
    floatval(&normalized)
}

/// Removes markup from a user supplied chart title.
pub(crate) fn sanitize_title(title: &str) -> String {
    static STRIP_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
        RegexBuilder::new(r"\x7f?UNIQ.*?QINU\x7f?")
            .dot_matches_new_line(true)
            .build()
            .unwrap()
    });

    let title = STRIP_MARKERS.replace_all(title, "");
    strtr(
        &title,
        &[
            ("</small>", ""),
            ("<small>", ""),
            ("<br />", " "),
            ("<br/>", " "),
            ("<br>", " "),
            ("'''", ""),
            ("[[", ""),
            ("]]", ""),
            ("''", ""),
        ],
    )
    .trim()
    .to_string()
}
