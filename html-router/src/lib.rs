pub mod html_state;
pub mod middlewares;
pub mod router_factory;
pub mod routes;

use axum::{extract::FromRef, Router};
use html_state::HtmlState;
use router_factory::RouterFactory;

/// Html routes
pub fn html_routes<S>(app_state: &HtmlState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    RouterFactory::new(app_state)
        .add_public_routes(routes::index::public_router())
        .add_public_routes(routes::gallery::public_router())
        .with_static_dir("/image", app_state.library.dir())
        .with_public_assets(app_state.config.public_dir_path())
        .with_compression()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use common::{storage::image_library::ImageLibrary, utils::config::AppConfig};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestSite {
        root: TempDir,
        app: Router,
    }

    impl TestSite {
        async fn new(create_image_dir: bool) -> Self {
            let root = TempDir::new().expect("tempdir");
            let public = root.path().join("public");
            tokio::fs::create_dir_all(&public).await.expect("public dir");
            tokio::fs::write(public.join("style.css"), "body { color: red; }")
                .await
                .expect("style");

            let posts = root.path().join("posts");
            if create_image_dir {
                tokio::fs::create_dir_all(&posts).await.expect("posts dir");
            }

            let config = AppConfig {
                image_dir: posts.to_string_lossy().into_owned(),
                public_dir: public.to_string_lossy().into_owned(),
                site_url: Some("https://shiggy.example".into()),
                ..Default::default()
            };
            let state = HtmlState::new_with_resources(
                config.clone(),
                ImageLibrary::new(config.image_dir_path()),
                None,
            );
            let app = html_routes(&state).with_state(state);

            Self { root, app }
        }

        async fn add_image(&self, name: &str) {
            tokio::fs::write(self.root.path().join("posts").join(name), b"\x89PNG fake")
                .await
                .expect("write image");
        }

        async fn get(&self, uri: &str) -> Response {
            self.app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
                .await
                .expect("router response")
        }
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec()
    }

    async fn body_text(response: Response) -> String {
        String::from_utf8(body_bytes(response).await).expect("utf8 body")
    }

    #[tokio::test]
    async fn test_pages_are_not_found_without_image_directory() {
        let site = TestSite::new(false).await;

        for uri in ["/", "/view", "/image/random"] {
            let response = site.get(uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_pages_are_not_found_with_empty_directory() {
        let site = TestSite::new(true).await;
        site.add_image("notes.txt").await;

        for uri in ["/", "/view", "/image/random"] {
            let response = site.get(uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_index_renders_random_image_with_meta() {
        let site = TestSite::new(true).await;
        site.add_image("42.png").await;

        let response = site.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains(r#"<img src="/image/42.png""#));
        assert!(html.contains(r#"<a href="/image/42.png">Permalink</a>"#));
        assert!(html.contains("Another one"));
        assert!(html.contains("1 random images of Shiggy and counting..."));
        assert!(html.contains(r#"<link rel="icon" href="/image/42.png""#));
        assert!(html.contains("summary_large_image"));
        assert!(html.contains("<title>Shiggy</title>"));
    }

    #[tokio::test]
    async fn test_random_redirects_to_stored_image() {
        let site = TestSite::new(true).await;
        site.add_image("7.png").await;

        let response = site.get("/image/random").await;
        assert!(response.status().is_redirection());
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/image/7.png")
        );
    }

    #[tokio::test]
    async fn test_gallery_lists_every_png() {
        let site = TestSite::new(true).await;
        for name in ["1.png", "2.png", "3.png"] {
            site.add_image(name).await;
        }
        site.add_image("ignored.jpg").await;

        let response = site.get("/view").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert_eq!(html.matches(r#"class="thumbnail""#).count(), 3);
        assert!(html.contains("All Shiggy Images (3)"));
        for name in ["1.png", "2.png", "3.png"] {
            assert!(html.contains(&format!(r#"<a href="/image/{name}">"#)));
        }
        assert!(!html.contains("ignored.jpg"));
    }

    fn gallery_links(html: &str) -> Vec<String> {
        html.split(r#"<a href="/image/"#)
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_gallery_keeps_directory_listing_order() {
        let site = TestSite::new(true).await;
        for name in [
            "42.png", "55.png", "100.png", "3.png", "7.png", "12.png", "1.png", "9.png",
        ] {
            site.add_image(name).await;
        }
        site.add_image("notes.txt").await;

        let listed: Vec<String> = std::fs::read_dir(site.root.path().join("posts"))
            .expect("read posts")
            .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
            .filter(|name| name.ends_with(".png"))
            .collect();

        let html = body_text(site.get("/view").await).await;
        assert_eq!(gallery_links(&html), listed);
    }

    #[tokio::test]
    async fn test_gallery_follows_directory_changes_between_requests() {
        let site = TestSite::new(true).await;
        site.add_image("1.png").await;

        let first = body_text(site.get("/view").await).await;
        assert_eq!(first.matches(r#"class="thumbnail""#).count(), 1);

        site.add_image("2.png").await;
        let second = body_text(site.get("/view").await).await;
        assert_eq!(second.matches(r#"class="thumbnail""#).count(), 2);
    }

    #[tokio::test]
    async fn test_static_mounts() {
        let site = TestSite::new(true).await;
        site.add_image("5.png").await;

        let image = site.get("/image/5.png").await;
        assert_eq!(image.status(), StatusCode::OK);
        assert_eq!(body_bytes(image).await, b"\x89PNG fake".to_vec());

        let missing = site.get("/image/6.png").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let css = site.get("/style.css").await;
        assert_eq!(css.status(), StatusCode::OK);
        assert_eq!(body_text(css).await, "body { color: red; }");
    }
}
