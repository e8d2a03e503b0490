//! Static file server for local development.

use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

const INDEX_FILE: &str = "index.html";

/// Content types by lowercase file extension.
const MIME_TYPES: [(&str, &str); 11] = [
    ("html", "text/html"),
    ("js", "application/javascript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("woff2", "font/woff2"),
    ("woff", "font/woff"),
    ("ttf", "font/ttf"),
];

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("request path contains '..'")]
    BadRequest,

    #[error("directory has no index.html")]
    Forbidden,

    #[error("no such file")]
    NotFound,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        match self {
            ServeError::BadRequest => (StatusCode::BAD_REQUEST, "Bad request").into_response(),
            ServeError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            ServeError::NotFound => {
                (StatusCode::NOT_FOUND, Html("<h1>404 Not Found</h1>")).into_response()
            }
            ServeError::Read { path, source } => {
                error!("Read error for {}: {}", path.display(), source);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

#[derive(Debug, Clone)]
struct SiteState {
    root: Arc<PathBuf>,
}

/// Router serving every GET below `root`.
pub fn router(root: impl Into<PathBuf>) -> Router {
    let state = SiteState {
        root: Arc::new(root.into()),
    };

    Router::new()
        .route("/", get(serve_root))
        .route("/*path", get(serve_nested))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.port` and serve `config.site_root` until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("Serving {}", config.site_root);
    info!("Server running at http://localhost:{}", config.port);

    axum::serve(listener, router(&config.site_root))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down server...");
}

async fn serve_root(State(state): State<SiteState>) -> Result<Response, ServeError> {
    serve_path(&state.root, "/").await
}

/// The extracted path is already percent-decoded.
async fn serve_nested(
    State(state): State<SiteState>,
    UrlPath(path): UrlPath<String>,
) -> Result<Response, ServeError> {
    serve_path(&state.root, &format!("/{}", path)).await
}

async fn serve_path(root: &Path, decoded_path: &str) -> Result<Response, ServeError> {
    let requested = resolve_request(root, decoded_path)?;
    let file = locate(requested).await?;

    let body = tokio::fs::read(&file).await.map_err(|source| ServeError::Read {
        path: file.clone(),
        source,
    })?;

    debug!("Serving {} ({} bytes)", file.display(), body.len());
    Ok(([(header::CONTENT_TYPE, content_type(&file))], body).into_response())
}

/// Map a decoded request path onto the filesystem without touching it.
pub fn resolve_request(root: &Path, decoded_path: &str) -> Result<PathBuf, ServeError> {
    if decoded_path.contains("..") {
        return Err(ServeError::BadRequest);
    }

    let relative = match decoded_path {
        "" | "/" => INDEX_FILE,
        other => other.trim_start_matches('/'),
    };

    Ok(root.join(relative))
}

/// Existing file to serve for `path`; directories serve their index.
async fn locate(path: PathBuf) -> Result<PathBuf, ServeError> {
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| ServeError::NotFound)?;

    if !metadata.is_dir() {
        return Ok(path);
    }

    let index = path.join(INDEX_FILE);
    match tokio::fs::metadata(&index).await {
        Ok(meta) if meta.is_file() => Ok(index),
        _ => Err(ServeError::Forbidden),
    }
}

pub fn content_type(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mime = MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME);

    if mime.starts_with("text/") {
        format!("{}; charset=utf-8", mime)
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Home</h1>").unwrap();
        fs::write(dir.path().join("logo.PNG"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::create_dir_all(dir.path().join("Program")).unwrap();
        fs::write(dir.path().join("Program/index.html"), "<p>Program</p>").unwrap();
        dir
    }

    fn content_type_of(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    // ==================== resolve_request Tests ====================

    #[test]
    fn test_root_maps_to_index() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve_request(root, "/").unwrap(),
            PathBuf::from("/srv/site/index.html")
        );
    }

    #[test]
    fn test_nested_path_stays_under_root() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve_request(root, "/Program/overview.html").unwrap(),
            PathBuf::from("/srv/site/Program/overview.html")
        );
        assert_eq!(
            resolve_request(root, "//etc/passwd").unwrap(),
            PathBuf::from("/srv/site/etc/passwd")
        );
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let root = Path::new("/srv/site");
        for path in ["/../secret.txt", "/docs/../../etc/passwd", "/a..b"] {
            assert!(
                matches!(resolve_request(root, path), Err(ServeError::BadRequest)),
                "{} should be rejected",
                path
            );
        }
    }

    // ==================== content_type Tests ====================

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("a.js")), "application/javascript");
        assert_eq!(content_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("font.woff2")), "font/woff2");
        assert_eq!(content_type(Path::new("archive.zip")), FALLBACK_MIME);
        assert_eq!(content_type(Path::new("README")), FALLBACK_MIME);
    }

    // ==================== serve_path Tests ====================

    #[tokio::test]
    async fn test_serves_index_for_root() {
        let site = site();
        let response = serve_path(site.path(), "/").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type_of(&response), "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_directory_serves_its_index() {
        let site = site();
        let response = serve_path(site.path(), "/Program/").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_directory_without_index_is_forbidden() {
        let site = site();
        let err = serve_path(site.path(), "/docs/").await.unwrap_err();
        assert!(matches!(err, ServeError::Forbidden));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found_html() {
        let site = site();
        let response = serve_path(site.path(), "/missing.html")
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(content_type_of(&response), "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_extension_is_case_insensitive() {
        let site = site();
        let response = serve_path(site.path(), "/logo.PNG").await.unwrap();
        assert_eq!(content_type_of(&response), "image/png");
    }

    #[tokio::test]
    async fn test_traversal_never_reaches_filesystem() {
        let site = site();
        fs::write(site.path().join("secret.txt"), "s3cret").unwrap();
        let err = serve_path(&site.path().join("docs"), "/../secret.txt")
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_entry_is_server_error() {
        let site = site();
        // A socket passes the existence check but cannot be opened for reading
        let socket = site.path().join("feed.json");
        let _listener = std::os::unix::net::UnixListener::bind(&socket).unwrap();

        let err = serve_path(site.path(), "/feed.json").await.unwrap_err();
        assert!(matches!(err, ServeError::Read { ref path, .. } if *path == socket));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type_of(&response), "text/plain; charset=utf-8");
    }
}
