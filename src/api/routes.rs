use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Avatar uploads are raw image bodies and may exceed axum's default limit
const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let media_mount = state.media_mount.clone();

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        // Accounts & session
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/session", get(handlers::session))
        // Catalog
        .route("/catalog", get(handlers::catalog))
        .route("/discover", get(handlers::discover))
        .route("/discover/sections/:index", get(handlers::discover_section))
        // Favourites
        .route("/favourites", get(handlers::list_favourites))
        .route(
            "/favourites/:content_id/toggle",
            post(handlers::toggle_favourite),
        )
        .route("/favourites/:content_id", delete(handlers::remove_favourite))
        // Profile & VIP
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/profile/genres", put(handlers::set_genres))
        .route(
            "/profile/vip",
            post(handlers::enable_vip).delete(handlers::disable_vip),
        )
        .route(
            "/profile/photo",
            put(handlers::upload_photo)
                .delete(handlers::remove_photo)
                .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
        // Metadata & trailers
        .route("/titles/search", get(handlers::search_titles))
        .route("/titles/:imdb_id", get(handlers::title_details))
        .route("/trailers", get(handlers::trailer))
        // Community
        .route(
            "/community/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        // Admin
        .route("/admin/users", get(handlers::admin_search_user))
        .route("/admin/users/:id/premium", put(handlers::admin_set_premium))
        .route("/admin/flags", get(handlers::admin_flags))
        .route("/admin/flags/:name", put(handlers::admin_set_flag))
        .route("/admin/audit", get(handlers::admin_audit))
        .with_state(state);

    if let Some(mount) = media_mount {
        router = router.nest_service(&mount.url_prefix, ServeDir::new(mount.root));
    }

    // Request ids are assigned before the trace span is opened
    router.layer(
        ServiceBuilder::new()
            .layer(CorsLayer::permissive())
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
    )
}
