//! Turning wiki page source into a chart script.

use crate::{
    chart::{self, ChartKind, MotionChart, TableChart},
    request::ChartRequest,
    wikitext::{self, DatasetError, LocateError},
};
use std::time::Instant;

/// Default motion chart size.
const MOTION_SIZE: (u32, u32) = (600, 300);

/// Default table chart size.
const TABLE_SIZE: (u32, u32) = (1000, 500);

/// Errors that may occur when extracting chart data from page source.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// The wikitable could not be found.
    #[error(transparent)]
    Locate(#[from] LocateError),
    /// No `{{dataset}}` entries could be found.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// The script could not be written.
    #[error(transparent)]
    Fmt(#[from] core::fmt::Error),
}

/// Generates the chart script for a request from the source of the
/// requested page.
pub(crate) fn chart_script(source: &str, request: &ChartRequest) -> Result<String, Error> {
    let time = Instant::now();
    let script = if request.kind == ChartKind::Motion {
        let datasets = wikitext::extract_datasets(source, &request.template)?;
        log::debug!("Found {} datasets in {{{{{}}}}}", datasets.len(), request.template);
        chart::motion_chart(
            &datasets,
            &MotionChart {
                x: &request.x,
                y: &request.y,
                group: &request.group,
                width: request.width.unwrap_or(MOTION_SIZE.0),
                height: request.height.unwrap_or(MOTION_SIZE.1),
            },
        )?
    } else {
        let text = wikitext::locate_table(source, &request.template, request.occurrence)?;
        let table = wikitext::split_rows(&wikitext::clean(text));
        log::debug!(
            "Found a table with {} columns and {} rows after {{{{{}}}}}",
            table.width(),
            table.rows().len(),
            request.template
        );
        let title = request
            .title
            .as_deref()
            .map_or_else(|| request.display_name(), chart::sanitize_title);
        chart::table_chart(
            &table,
            &TableChart {
                kind: request.kind,
                columns: request.columns,
                width: request.width.unwrap_or(TABLE_SIZE.0),
                height: request.height.unwrap_or(TABLE_SIZE.1),
                title: &title,
            },
        )?
    };
    log::trace!("Generated chart script in {:.2?}", time.elapsed());
    Ok(script)
}
