use axum::http::{header, HeaderValue, Method};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use traceboard_server::api::{self, ApiState};
use traceboard_server::config::{self, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traceboard_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(port = config.port, "traceboard backend starting");

    let mut origins = Vec::with_capacity(config.cors_origins.len());
    for origin in &config.cors_origins {
        origins.push(
            HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("invalid CORS origin {origin}: {e}"))?,
        );
    }
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let api_state = ApiState::new(config.default_page_size);

    // Dashboard WASM frontend, served from the dx build output directory.
    // Default matches `dx build` debug output. Override with TRACEBOARD_DIST in prod.
    let dashboard_dist = config::dashboard_dist_from_env();
    info!(path = %dashboard_dist, "serving dashboard assets from");

    let app = api::router()
        .route("/", get(root_page))
        .nest_service("/wasm", ServeDir::new(format!("{dashboard_dist}/wasm")))
        .nest_service(
            "/assets",
            ServeDir::new(format!("{dashboard_dist}/assets")),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(api_state);

    let addr = format!("{}:{}", config.bind, config.port);
    info!("listening on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve the built dashboard, or a placeholder shell when the dist
/// has not been built yet.
async fn root_page() -> impl IntoResponse {
    let dist = config::dashboard_dist_from_env();
    let index_path = format!("{dist}/index.html");

    match std::fs::read_to_string(&index_path) {
        Ok(html) => Html(html).into_response(),
        Err(_) => Html(PLACEHOLDER_SHELL).into_response(),
    }
}

static PLACEHOLDER_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Traceboard</title>
  <style>
    body { margin: 0; background: #0f172a; color: #f8fafc;
           font-family: system-ui, sans-serif;
           display: flex; align-items: flex-start; justify-content: center;
           padding-top: 8rem; min-height: 100vh; }
    .card { background: #1e293b; border: 1px solid #334155; border-radius: 8px;
            padding: 2rem; width: 100%; max-width: 420px; }
    h1 { font-size: 1.1rem; font-weight: 600; margin: 0 0 1rem;
         color: #94a3b8; letter-spacing: .05em; text-transform: uppercase; }
    p { font-size: .9rem; line-height: 1.5; color: #cbd5e1; }
    code { background: #0f172a; border: 1px solid #334155; border-radius: 4px;
           padding: .1rem .35rem; font-size: .85rem; }
    a { color: #818cf8; }
  </style>
</head>
<body>
  <div class="card">
    <h1>Traceboard</h1>
    <p>The backend is running, but the dashboard has not been built.</p>
    <p>Build it with <code>dx build --package traceboard-ui</code>, then reload.</p>
    <p>The API is live at <a href="/api/traces">/api/traces</a> and
       <a href="/api/health">/api/health</a>.</p>
  </div>
</body>
</html>"#;
