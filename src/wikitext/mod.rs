//! Extraction of tabular data from Wikitext page source.
//!
//! Data is published on wiki pages in one of two ways: as an ordinary
//! wikitable labelled by a template invocation placed just before it, or as a
//! list of `{{dataset}}` invocations nested inside a container template. This
//! module turns both forms into plain strings; it does not try to be a real
//! Wikitext parser.

pub(crate) use clean::clean;
pub(crate) use dataset::{Dataset, Error as DatasetError, extract_datasets};
pub(crate) use locate::{Error as LocateError, locate_table};
pub(crate) use table::{Table, split_rows};

mod clean;
mod dataset;
mod locate;
mod table;
