//! Query parameters of the visualizer and their validation.

use crate::{
    chart::{ChartKind, UnknownChartKind},
    config,
};
use std::num::{NonZeroU32, NonZeroUsize};

/// Errors that may occur when validating visualizer parameters.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub(crate) enum Error {
    /// The project is not on an allowed wiki domain.
    #[error(
        "“{0}” is not an authorised domain name; the project parameter should be something such as en.wikipedia.org"
    )]
    Project(String),

    /// The template which labels the table is missing.
    #[error("add the template name to your request: &tpl=templateName")]
    MissingTemplate,

    /// The chart type is not recognised.
    #[error(transparent)]
    ChartKind(#[from] UnknownChartKind),

    /// A numeric parameter is not a positive integer.
    #[error("the parameter {name}= should be a positive number, not “{value}”")]
    Number {
        /// The parameter name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Query options for the visualizer.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub(crate) struct Params {
    /// The page containing the data. Spaces and underscores are equivalent.
    pub page: String,
    /// The host name of the wiki, like `en.wikipedia.org`.
    pub project: String,
    /// The name of the template which labels the table, or the container
    /// template of a motion chart.
    pub tpl: String,
    /// The chart type.
    pub ct: String,
    /// Which invocation of the template to use, starting from 1.
    pub id: String,
    /// The maximum number of columns to draw, or `all`.
    pub columns: String,
    /// The chart height, in pixels.
    pub height: Option<String>,
    /// The chart width, in pixels.
    pub width: Option<String>,
    /// The chart title. Defaults to the page name.
    pub title: Option<String>,
    /// The motion chart horizontal axis caption.
    pub x: String,
    /// The motion chart vertical axis caption.
    pub y: String,
    /// The motion chart group caption.
    pub group: String,
    /// The interface language, or `API` to get only the chart script.
    pub lang: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            page: String::new(),
            project: "en.wikipedia.org".into(),
            tpl: String::new(),
            ct: "pie".into(),
            id: "1".into(),
            columns: "all".into(),
            height: None,
            width: None,
            title: None,
            x: "x axis".into(),
            y: "y axis".into(),
            group: "Labels".into(),
            lang: "en".into(),
        }
    }
}

/// A validated visualizer request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ChartRequest {
    /// The page name, with underscores instead of spaces.
    pub page: String,
    /// The host name of the wiki.
    pub project: String,
    /// The template name.
    pub template: String,
    /// The chart type.
    pub kind: ChartKind,
    /// Which invocation of the template to use.
    pub occurrence: NonZeroUsize,
    /// The maximum number of columns, or `None` for all of them.
    pub columns: Option<NonZeroUsize>,
    /// The chart width, if given.
    pub width: Option<u32>,
    /// The chart height, if given.
    pub height: Option<u32>,
    /// The chart title, if given.
    pub title: Option<String>,
    /// The motion chart horizontal axis caption.
    pub x: String,
    /// The motion chart vertical axis caption.
    pub y: String,
    /// The motion chart group caption.
    pub group: String,
    /// The interface language.
    pub lang: String,
}

impl ChartRequest {
    /// The page name as displayed to readers.
    pub fn display_name(&self) -> String {
        self.page.replace('_', " ")
    }

    /// Whether only the chart script was requested, for embedding.
    pub fn api_only(&self) -> bool {
        self.lang == "API"
    }
}

impl Params {
    /// Validates the parameters. Returns `None` if no page was requested.
    pub fn validate(self) -> Result<Option<ChartRequest>, Error> {
        let page = self.page.trim().replace(' ', "_");
        if page.is_empty() || page == "_" {
            return Ok(None);
        }

        let project = self.project.trim();
        if !config::is_allowed_project(project) {
            return Err(Error::Project(project.into()));
        }

        let template = self.tpl.trim();
        if template.is_empty() || template == "_" {
            return Err(Error::MissingTemplate);
        }

        let kind = if template.eq_ignore_ascii_case("motionchart") {
            ChartKind::Motion
        } else {
            self.ct.trim().parse()?
        };

        let occurrence = positive::<NonZeroUsize>("id", &self.id)?;
        let columns = match self.columns.trim() {
            "" | "all" => None,
            columns => Some(positive::<NonZeroUsize>("columns", columns)?),
        };
        let width = optional_positive("width", self.width.as_deref())?;
        let height = optional_positive("height", self.height.as_deref())?;

        Ok(Some(ChartRequest {
            page,
            project: project.into(),
            template: template.into(),
            kind,
            occurrence,
            columns,
            width,
            height,
            title: self.title,
            x: self.x,
            y: self.y,
            group: self.group,
            lang: self.lang,
        }))
    }
}

/// Parses a positive integer parameter.
fn positive<T: core::str::FromStr>(name: &'static str, value: &str) -> Result<T, Error> {
    value.trim().parse().map_err(|_| Error::Number {
        name,
        value: value.into(),
    })
}

/// Parses an optional pixel size. An empty value is the same as no value.
fn optional_positive(name: &'static str, value: Option<&str>) -> Result<Option<u32>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => positive::<NonZeroU32>(name, value).map(|n| Some(n.get())),
    }
}
