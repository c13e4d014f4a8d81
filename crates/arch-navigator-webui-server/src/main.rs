mod render;

use anyhow::Context;
use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use render::{RenderQuery, render_query};
use std::path::PathBuf;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

async fn render(Query(query): Query<RenderQuery>) -> Response {
    match render_query(&query) {
        Ok(rendered) => ([(header::CONTENT_TYPE, rendered.content_type)], rendered.body).into_response(),
        Err(err) => {
            tracing::warn!("Rejected render request {query:?}: {err:#}");
            (StatusCode::BAD_REQUEST, format!("{err:#}")).into_response()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let addr = std::env::var("ARCH_NAVIGATOR_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let webui_dir = std::env::var("ARCH_NAVIGATOR_WEBUI_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./crates/arch-navigator-webui"));
    let index = webui_dir.join("assets/index.html");

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/render", get(render))
        .nest_service("/pkg", ServeDir::new(webui_dir.join("pkg")))
        .nest_service("/assets", ServeDir::new(webui_dir.join("assets")))
        .route_service("/index.html", ServeFile::new(&index))
        .route_service("/", ServeFile::new(&index))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Binding {addr}"))?;
    tracing::info!("Serving {} on http://{addr}", webui_dir.display());
    axum::serve(listener, app).await?;
    Ok(())
}
