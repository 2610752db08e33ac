//! A web service which draws charts from tables published on wiki pages, and
//! converts CSV files into Wikitext for charts and tables.

use crate::{
    config::Config,
    mediawiki::{ApiClient, Fetch},
};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;

mod chart;
mod config;
mod generators;
mod i18n;
mod mediawiki;
mod pages;
mod php;
mod request;
mod visualizer;
mod wikitext;

/// Shared state for the web server.
struct WikiVizState {
    /// The server configuration.
    config: Config,
    /// The wiki page source loader.
    fetcher: Arc<dyn Fetch>,
}

/// Shared state for the web server.
type AppState = Arc<WikiVizState>;

/// Prints the usage text and returns an error with the given message.
fn usage<T>(err: impl core::fmt::Display) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options]\n");
    println!("Options:");
    println!("    --listen: Web server bind (default: 127.0.0.1:3000)");
    println!("    --api-scheme: Scheme for wiki API requests, http or https (default: http)");
    println!("    --user-agent: User-Agent for wiki API requests\n");
    println!("or, use environment variables:");
    println!("    WIKIVIZ_LISTEN");
    println!("    WIKIVIZ_API_SCHEME");
    println!("    WIKIVIZ_USER_AGENT\n");
    Err(anyhow::anyhow!("{err}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        let _ = usage::<()>("");
        return Ok(());
    }

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(err) => return usage(err),
    };

    log::info!("Starting up {} ...", env!("CARGO_PKG_NAME"));

    let fetcher = Arc::new(ApiClient::new(&config.api_scheme, &config.user_agent));
    let listener = TcpListener::bind(&config.listen).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    let state = Arc::new(WikiVizState { config, fetcher });

    let app = Router::new()
        .route("/", get(pages::visualize))
        .route("/visualize", get(pages::visualize))
        .route(
            "/csv2motionchart",
            get(pages::csv2motionchart_form).post(pages::csv2motionchart),
        )
        .route(
            "/csv2wikitable",
            get(pages::csv2wikitable_form).post(pages::csv2wikitable),
        )
        .route("/res/styles.css", get(pages::styles))
        .with_state(state);

    axum::serve(listener, app).await?;
    Ok(())
}
