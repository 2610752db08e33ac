//! Extraction of `{{dataset}}` entries from a container template.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// The page has no container template with at least one `{{dataset}}`
/// entry inside it.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("the page is not using the template {{{{{container}}}}} with {{{{dataset}}}} entries correctly")]
pub(crate) struct Error {
    /// The container template name.
    pub container: String,
}

/// One data point of a motion chart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Dataset {
    /// The entity which moves on the chart.
    pub id: String,
    /// The date of the measurement, as `Y/M/D`.
    pub date: String,
    /// The value on the horizontal axis.
    pub x: String,
    /// The value on the vertical axis.
    pub y: String,
    /// The group the entity belongs to.
    pub label: String,
}

impl Dataset {
    /// Reads the date as `(year, month, day)` integers. A missing month reads
    /// as 0 and a missing day as 1. The month is not range checked.
    pub fn ymd(&self) -> (i64, i64, i64) {
        let mut parts = self.date.split('/');
        let mut next = |default| parts.next().and_then(leading_int).unwrap_or(default);
        (next(0), next(0), next(1))
    }
}

/// Parses the integer at the start of a string like `sscanf("%d")`.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let sign = usize::from(text.starts_with(['-', '+']));
    let end = text[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |end| end + sign);
    text[..end].parse().ok()
}

/// Finds the start of any template invocation which takes arguments.
static OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}|]+?)\s*\|").unwrap());

/// A `{{dataset}}` invocation with its five positional arguments.
static DATASET: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"\{\{\s*dataset\s*\|([^|{}]*)\|([^|{}]*)\|([^|{}]*)\|([^|{}]*)\|([^|{}]*)\}\}",
    )
    .case_insensitive(true)
    .build()
    .unwrap()
});

/// Extracts every `{{dataset|id|date|x|y|label}}` entry from the first
/// invocation of the `container` template which contains any.
pub(crate) fn extract_datasets(source: &str, container: &str) -> Result<Vec<Dataset>, Error> {
    OPENER
        .captures_iter(source)
        .filter_map(|captures| {
            let name = captures.get(1)?.as_str();
            let start = captures.get(0)?.start();
            name.eq_ignore_ascii_case(container).then_some(start)
        })
        .map(|start| datasets(template_extent(source, start)))
        .find(|datasets| !datasets.is_empty())
        .ok_or_else(|| Error {
            container: container.into(),
        })
}

/// Reads all the dataset entries in `text`.
fn datasets(text: &str) -> Vec<Dataset> {
    DATASET
        .captures_iter(text)
        .map(|captures| {
            let (_, [id, date, x, y, label]) = captures.extract();
            Dataset {
                id: id.trim().into(),
                date: date.trim().into(),
                x: x.trim().into(),
                y: y.trim().into(),
                label: label.trim().into(),
            }
        })
        .collect()
}

/// Returns the text of the template invocation starting at `start`, up to and
/// including its balanced closing braces. An unterminated invocation extends
/// to the end of the source.
fn template_extent(source: &str, start: usize) -> &str {
    let bytes = source.as_bytes();
    let mut depth = 0_usize;
    let mut index = start;
    while index + 1 < bytes.len() {
        match &bytes[index..index + 2] {
            b"{{" => {
                depth += 1;
                index += 2;
            }
            b"}}" => {
                depth = depth.saturating_sub(1);
                index += 2;
                if depth == 0 {
                    return &source[start..index];
                }
            }
            _ => index += 1,
        }
    }
    &source[start..]
}
