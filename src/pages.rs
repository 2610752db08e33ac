//! Routes for axum.

use crate::{
    AppState,
    generators::{self, Generated, UploadError, UploadedFile},
    i18n, mediawiki,
    request::{self, Params},
    visualizer,
};
use axum::{
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use sailfish::TemplateSimple;
use std::{sync::Arc, time::Instant};

/// All errors that may occur during page rendering.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// The visualizer parameters were rejected.
    #[error(transparent)]
    Request(#[from] request::Error),
    /// The wiki page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] mediawiki::Error),
    /// No chart could be made from the wiki page.
    #[error("Sorry, [[{page}]] on {project} could not be visualized: {source}")]
    Visualize {
        /// The displayed page name.
        page: String,
        /// The wiki host name.
        project: String,
        /// The URL of the page.
        url: String,
        /// The extraction error.
        source: visualizer::Error,
    },
    /// An uploaded file was rejected.
    #[error("{field}: {source}")]
    Upload {
        /// The form field name.
        field: &'static str,
        /// The rejection reason.
        source: UploadError,
    },
    /// The uploaded CSV data could not be converted.
    #[error("Check your file! {0}")]
    Generate(#[from] generators::Error),
    /// A multipart form could not be read.
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    /// A blocking task failed.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    /// A templating engine error.
    #[error(transparent)]
    Template(#[from] sailfish::RenderError),
}

impl Error {
    /// The HTTP status of the error response.
    fn status(&self) -> StatusCode {
        match self {
            Error::Request(_) | Error::Upload { .. } => StatusCode::BAD_REQUEST,
            Error::Fetch(mediawiki::Error::PageMissing { .. }) => StatusCode::NOT_FOUND,
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::Visualize {
                source: visualizer::Error::Fmt(_),
                ..
            }
            | Error::Join(_)
            | Error::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Visualize { .. } | Error::Generate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Multipart(error) => error.status(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(TemplateSimple)]
        #[template(path = "error.html")]
        struct ErrorPage<'a> {
            /// The error message.
            message: &'a str,
            /// A link to the page which caused the error.
            link: Option<&'a str>,
        }

        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("{self}");
        }

        let message = self.to_string();
        let link = match &self {
            Error::Visualize { url, .. } => Some(url.as_str()),
            _ => None,
        };

        match (ErrorPage {
            message: &message,
            link,
        })
        .render_once()
        {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(error) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{error}")).into_response(),
        }
    }
}

/// A link to an example chart on the welcome page.
pub(crate) struct Example {
    /// The link text.
    pub label: &'static str,
    /// The query string of the link.
    pub query: &'static str,
}

/// Example charts drawn from pages on the English Wikipedia.
const EXAMPLES: &[Example] = &[
    Example {
        label: "pie",
        query: "page=Template:Visualizer&project=en.wikipedia.org&tpl=visualizer&ct=pie",
    },
    Example {
        label: "bar",
        query: "page=Template:Visualizer&project=en.wikipedia.org&tpl=visualizer&ct=bar",
    },
    Example {
        label: "column",
        query: "page=Template:Visualizer/Test&project=en.wikipedia.org&tpl=visualizer&ct=col",
    },
    Example {
        label: "line",
        query: "page=Template:Visualizer/Test&project=en.wikipedia.org&tpl=visualizer&ct=line",
    },
    Example {
        label: "scatter",
        query: "page=Template:Visualizer/Scatter&project=en.wikipedia.org&tpl=visualizer&ct=scatter",
    },
    Example {
        label: "sparkline",
        query: "page=Template:Visualizer/Scatter&project=en.wikipedia.org&tpl=visualizer&ct=sparkline&title=",
    },
    Example {
        label: "area",
        query: "page=Template:Visualizer/Area&project=en.wikipedia.org&tpl=visualizer&ct=area",
    },
    Example {
        label: "geomap",
        query: "page=Template:Visualizer/GeoMap&project=en.wikipedia.org&tpl=visualizer&ct=geomap",
    },
    Example {
        label: "intensitymap",
        query: "page=Template:Visualizer/IntensityMap&project=en.wikipedia.org&tpl=visualizer&ct=intensitymap",
    },
    Example {
        label: "motion",
        query: "page=User:Al_Maghi/Visualize_Wikipedias_growth_up_to_2010&project=en.wikipedia.org&tpl=motionchart&y=Bytes+per+article&x=Articles&group=Wikipedias",
    },
];

/// The visualizer page template.
#[derive(TemplateSimple)]
#[template(path = "visualizer.html")]
struct VisualizerPage<'a> {
    /// The interface language code.
    lang: &'a str,
    /// Whether the interface language is written right to left.
    rtl: bool,
    /// The name of the tool.
    title: &'a str,
    /// The chart script.
    script: &'a str,
    /// The data source line, or `None` for the welcome page.
    info: Option<&'a str>,
    /// Example chart links for the welcome page.
    examples: &'a [Example],
}

/// The visualizer route handler.
pub(crate) async fn visualize(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Response, Error> {
    let messages = i18n::messages(&params.lang);
    let Some(request) = params.validate()? else {
        return VisualizerPage {
            lang: messages.code,
            rtl: messages.rtl,
            title: messages.title,
            script: "",
            info: None,
            examples: EXAMPLES,
        }
        .render_once()
        .map(html_result)
        .map(IntoResponse::into_response)
        .map_err(Into::into);
    };

    log::debug!(
        "Visualizing [[{}]] on {} from {{{{{}}}}} #{} as {:?}",
        request.page,
        request.project,
        request.template,
        request.occurrence,
        request.kind
    );

    let time = Instant::now();
    let fetcher = Arc::clone(&state.fetcher);
    let (project, page) = (request.project.clone(), request.page.clone());
    let source = tokio::task::spawn_blocking(move || fetcher.fetch(&project, &page)).await??;
    log::trace!("Loaded page source in {:.2?}", time.elapsed());

    let url = i18n::page_url(&state.config.api_scheme, &request.project, &request.page);
    let script = visualizer::chart_script(&source, &request).map_err(|source| Error::Visualize {
        page: request.display_name(),
        project: request.project.clone(),
        url: url.clone(),
        source,
    })?;

    if request.api_only() {
        return Ok(html_result(format!("{script}<div id=\"chart_div\"></div>")).into_response());
    }

    let info = i18n::info_html(messages, &url, &request.project, &request.page);
    VisualizerPage {
        lang: messages.code,
        rtl: messages.rtl,
        title: messages.title,
        script: &script,
        info: Some(&info),
        examples: EXAMPLES,
    }
    .render_once()
    .map(html_result)
    .map(IntoResponse::into_response)
    .map_err(Into::into)
}

/// The converters offered by the generator pages.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Tool {
    /// CSV to `{{Motionchart}}`.
    Motionchart,
    /// CSV to wikitable.
    Wikitable,
}

impl Tool {
    /// The page heading.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Motionchart => "CSV to {{Motionchart}}",
            Self::Wikitable => "CSV to wikitable",
        }
    }

    /// The form action path.
    pub fn action(self) -> &'static str {
        match self {
            Self::Motionchart => "/csv2motionchart",
            Self::Wikitable => "/csv2wikitable",
        }
    }

    /// Whether the tool can also combine two series files.
    pub fn combines(self) -> bool {
        self == Self::Motionchart
    }
}

/// The generator page template.
#[derive(TemplateSimple)]
#[template(path = "generator.html")]
struct GeneratorPage<'a> {
    /// The converter.
    tool: Tool,
    /// The conversion result, if a file was submitted.
    output: Option<&'a Generated>,
}

/// Renders a generator page.
fn generator_page(tool: Tool, output: Option<&Generated>) -> Result<Response, Error> {
    GeneratorPage { tool, output }
        .render_once()
        .map(html_result)
        .map(IntoResponse::into_response)
        .map_err(Into::into)
}

/// The CSV to `{{Motionchart}}` form route handler.
pub(crate) async fn csv2motionchart_form() -> Result<Response, Error> {
    generator_page(Tool::Motionchart, None)
}

/// The CSV to `{{Motionchart}}` conversion route handler.
pub(crate) async fn csv2motionchart(multipart: Multipart) -> Result<Response, Error> {
    let mut form = UploadForm::read(multipart).await?;
    let time = Instant::now();
    let output = if form.submitted("upload2csv") {
        let x_file = form.file("csvXFile")?;
        let y_file = form.file("csvYFile")?;
        log::debug!("Combining {} and {}", x_file.name, y_file.name);
        Some(generators::combine_csv(&x_file, &y_file)?)
    } else if form.submitted("uploadcsv") {
        let file = form.file("csvFile")?;
        log::debug!("Converting {} to a motion chart", file.name);
        Some(generators::wikify_csv(&file.content)?)
    } else {
        None
    };
    log::trace!("Generated Wikitext in {:.2?}", time.elapsed());
    generator_page(Tool::Motionchart, output.as_ref())
}

/// The CSV to wikitable form route handler.
pub(crate) async fn csv2wikitable_form() -> Result<Response, Error> {
    generator_page(Tool::Wikitable, None)
}

/// The CSV to wikitable conversion route handler.
pub(crate) async fn csv2wikitable(multipart: Multipart) -> Result<Response, Error> {
    let mut form = UploadForm::read(multipart).await?;
    let output = if form.submitted("uploadcsv") {
        let file = form.file("csvFile")?;
        log::debug!("Converting {} to a wikitable", file.name);
        Some(generators::csv_to_wikitable(&file.content))
    } else {
        None
    };
    generator_page(Tool::Wikitable, output.as_ref())
}

/// The fields of a submitted upload form.
#[derive(Debug, Default)]
struct UploadForm {
    /// The names of the non-file fields.
    fields: Vec<String>,
    /// The file fields.
    files: Vec<(String, Result<UploadedFile, UploadError>)>,
}

impl UploadForm {
    /// Reads every field of a multipart form.
    async fn read(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if let Some(file_name) = field.file_name().map(ToString::to_string) {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.files
                    .push((name, UploadedFile::new(&file_name, &content_type, &data)));
            } else {
                form.fields.push(name);
            }
        }
        Ok(form)
    }

    /// Returns true if the form has a non-file field with the given name.
    fn submitted(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }

    /// Takes the file sent in the given field.
    fn file(&mut self, field: &'static str) -> Result<UploadedFile, Error> {
        let index = self
            .files
            .iter()
            .position(|(name, _)| name == field)
            .ok_or(Error::Upload {
                field,
                source: UploadError::NoFile,
            })?;
        self.files
            .swap_remove(index)
            .1
            .map_err(|source| Error::Upload { field, source })
    }
}

/// Returns an HTML response.
fn html_result(result: String) -> impl IntoResponse {
    (
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
        ],
        result,
    )
}

/// The CSS resource route handler.
pub(crate) async fn styles() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css"),
            (header::CACHE_CONTROL, "max-age=604800, public, immutable"),
        ],
        include_str!("../res/styles.css"),
    )
}
