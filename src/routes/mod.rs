pub mod errors;
pub mod images;
pub mod openapi;
pub mod profiles;
pub mod ratelimit;
pub mod responses;

use crate::config::Config;
use aide::axum::ApiRouter;
use aide::axum::routing::get_with;
use aide::openapi::{Info, OpenApi};
use aide::swagger::Swagger;
use axum::routing::get;
use axum::{Extension, Router, middleware};
use log::info;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router from the runtime config
pub fn app(config: Arc<Config>) -> Router {
    let mut image_routes = ApiRouter::new().api_route(
        "/api/get",
        get_with(images::get_image, |op| {
            op.summary("Get image")
                .description("Redirects to a solid color image described by the query parameters, generating it on first request.")
        }),
    );
    if let Some(limiter) = config.rate_limiter.clone() {
        image_routes =
            image_routes.layer(middleware::from_fn_with_state(limiter, ratelimit::rate_limit));
    }

    let api_router = ApiRouter::new().merge(image_routes).api_route(
        "/api/profiles",
        get_with(profiles::list_profiles, |op| {
            op.summary("List profiles")
                .description("Registered image profiles with their query parameters.")
        }),
    );

    let mut api = OpenApi {
        info: Info {
            title: "impala".to_string(),
            description: Some("Placeholder image generation service".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };
    let mut router = api_router.finish_api(&mut api);

    if config.enable_docs {
        info!("Serving API docs at /docs");
        router = router
            .route("/openapi.json", get(openapi::openapi_json))
            .route("/docs", get(Swagger::new("/openapi.json").axum_handler()))
            .layer(Extension(Arc::new(api)));
    }

    let mut router = router.with_state(config.clone());

    if let Some(media) = config.media_serving.as_ref() {
        info!(
            "Serving media files from {} at {}/",
            media.root.display(),
            media.route
        );
        let serve_dir = ServeDir::new(&media.root);
        router = match media.route.is_empty() {
            true => router.fallback_service(serve_dir),
            false => router.nest_service(&media.route, serve_dir),
        };
    }

    router.layer(TraceLayer::new_for_http())
}
