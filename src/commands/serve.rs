use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

use crate::ServeArgs;

pub const DEFAULT_PORT: u16 = 4433;

/// Build the site, then serve it.
pub async fn run(config_file: Option<&Path>, args: &ServeArgs) -> Result<(), anyhow::Error> {
    let site = super::build::run(config_file)?;
    serve(&site.output_dir, args).await
}

/// Serve `output_dir` until interrupted.
pub async fn serve(output_dir: &Path, args: &ServeArgs) -> Result<(), anyhow::Error> {
    let serve_dir = ServeDir::new(output_dir).append_index_html_on_directories(true);
    let app = Router::new().fallback_service(serve_dir);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    tracing::info!("serving {} at {}", output_dir.display(), url);
    tracing::info!("press Ctrl+C to stop");

    if args.open
        && let Err(e) = open::that(&url)
    {
        tracing::warn!("failed to open browser: {}", e);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
