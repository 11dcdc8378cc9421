//! Read-only HTTP API over the blog content

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::PostRepository;
use crate::sitemap::{self, Sitemap};
use crate::Site;

/// Server state
struct ServerState {
    config: SiteConfig,
    repo: PostRepository,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    tag: Option<String>,
}

/// Build the application router
pub fn router(site: &Site) -> Router {
    let state = Arc::new(ServerState {
        config: site.config.clone(),
        repo: site.repository(),
    });

    Router::new()
        .route("/api/posts", get(list_posts_handler))
        .route("/api/posts/:slug", get(get_post_handler))
        .route("/api/slugs", get(list_slugs_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let app = router(site);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("{} content API running at http://{}:{}", site.config.title, ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run blocking repository work off the async executor
async fn blocking<T, F>(state: Arc<ServerState>, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&ServerState) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            tracing::error!("Request task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        })
}

async fn list_posts_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let posts = blocking(state, move |s| match query.tag.as_deref() {
        Some(tag) => s.repo.list_posts_by_tag(tag),
        None => s.repo.list_posts(),
    })
    .await;

    match posts {
        Ok(posts) => Json(posts).into_response(),
        Err(response) => response,
    }
}

async fn get_post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let lookup = slug.clone();
    let post = match blocking(state, move |s| s.repo.get_post(&lookup)).await {
        Ok(post) => post,
        Err(response) => return response,
    };

    match post {
        Ok(Some(post)) => Json(post).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to render post {:?}: {}", slug, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render post").into_response()
        }
    }
}

async fn list_slugs_handler(State(state): State<Arc<ServerState>>) -> Response {
    match blocking(state, |s| s.repo.list_slugs()).await {
        Ok(slugs) => Json(slugs).into_response(),
        Err(response) => response,
    }
}

async fn sitemap_handler(State(state): State<Arc<ServerState>>) -> Response {
    let xml = blocking(state, |s| {
        sitemap::to_xml(&Sitemap::new(&s.config, &s.repo).entries())
    })
    .await;

    match xml {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let content_dir = dir.path().join("content/blog");
        fs::create_dir_all(&content_dir).unwrap();
        fs::write(
            content_dir.join("a.md"),
            "---\ntitle: A\ndate: 2024-01-01\n---\nFirst",
        )
        .unwrap();
        fs::write(
            content_dir.join("b.mdx"),
            "---\ntitle: B\ndate: 2024-06-01\ntags: [stem]\n---\nSecond",
        )
        .unwrap();
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_list_posts() {
        let (_dir, site) = site();
        let (status, body) = get(router(&site), "/api/posts").await;
        assert_eq!(status, StatusCode::OK);

        let posts: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(posts[0]["slug"], "b");
        assert_eq!(posts[1]["slug"], "a");
        assert!(posts[0].get("content").is_none());
    }

    #[tokio::test]
    async fn test_list_posts_by_tag() {
        let (_dir, site) = site();
        let (_, body) = get(router(&site), "/api/posts?tag=stem").await;
        let posts: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(posts.as_array().unwrap().len(), 1);
        assert_eq!(posts[0]["slug"], "b");
    }

    #[tokio::test]
    async fn test_get_post() {
        let (_dir, site) = site();
        let (status, body) = get(router(&site), "/api/posts/a").await;
        assert_eq!(status, StatusCode::OK);

        let post: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(post["title"], "A");
        assert_eq!(post["content"], "<p>First</p>\n");
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let (_dir, site) = site();
        let (status, _) = get(router(&site), "/api/posts/nonexistent-slug").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sitemap() {
        let (_dir, site) = site();
        let (status, body) = get(router(&site), "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<loc>https://tesa.org/blog/a</loc>"));
        assert!(body.contains("<loc>https://tesa.org/blog/b</loc>"));
    }
}
