use crate::handlers::{
    admin, debug::debug_info, health::health_check, jwt, message_tokens, registration,
    rest_auth, users,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{get, patch, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Users app, token and session endpoints
fn api_routes() -> Router<AppState> {
    Router::new()
        // Credential login used by the browsable API
        .route("/api-auth/login/", post(rest_auth::login))
        .route("/api-auth/logout/", post(rest_auth::logout))
        // Token endpoints
        .route("/api/api-jwt-auth/", post(jwt::obtain_token))
        .route("/api/api-jwt-auth/refresh/", post(jwt::refresh_token))
        .route("/api/api-jwt-auth/verify/", post(jwt::verify_token))
        // rest-auth
        .route("/api/rest-auth/login/", post(rest_auth::login))
        .route("/api/rest-auth/logout/", post(rest_auth::logout))
        .route(
            "/api/rest-auth/user/",
            get(rest_auth::user_details).patch(rest_auth::update_user_details),
        )
        .route("/api/rest-auth/password/change/", post(rest_auth::password_change))
        .route("/api/rest-auth/registration/", post(registration::register))
        // Users app
        .route("/api/users/me/", get(users::get_me).patch(users::update_me))
        .route("/api/users/me/withdraw/", post(users::withdraw_me))
        .route("/api/users/me/voucher/", get(users::get_my_voucher))
        .route("/api/users/me/voucher-history/", get(users::get_my_voucher_history))
        .route("/api/teachers/", get(users::list_teachers))
        .route(
            "/api/message-tokens/",
            get(message_tokens::list_message_tokens)
                .post(message_tokens::register_message_token)
                .delete(message_tokens::delete_message_token),
        )
}

/// Staff API
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users/", get(admin::list_users))
        .route(
            "/admin/users/:user_id/",
            get(admin::get_user).patch(admin::update_user),
        )
        .route("/admin/users/:user_id/teacher-group/", put(admin::set_teacher_group))
        .route("/admin/users/:user_id/withdraw/", post(admin::withdraw_user))
        .route(
            "/admin/users/:user_id/voucher/",
            get(admin::get_user_voucher).post(admin::apply_voucher_operation),
        )
        .route(
            "/admin/users/:user_id/voucher-history/",
            get(admin::get_user_voucher_history),
        )
        .route(
            "/admin/teacher-groups/",
            get(admin::list_teacher_groups).post(admin::create_teacher_group),
        )
        .route(
            "/admin/teacher-groups/:group_id/",
            patch(admin::update_teacher_group).delete(admin::delete_teacher_group),
        )
        .route(
            "/admin/teacher-groups/:group_id/members/",
            get(admin::list_teacher_group_members),
        )
        .route("/admin/vouchers/expire/", post(admin::expire_vouchers))
}

/// Create application router with all routes and middleware
///
/// The staff API, the public API and the debug endpoint are mounted only when
/// their settings flag is on.
pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let mut router = Router::new()
        // Health check
        .route("/health", get(health_check));

    if settings.use_staff {
        debug!("Mounting staff API");
        router = router.merge(admin_routes());
    }
    if settings.use_api {
        debug!("Mounting public API");
        router = router.merge(api_routes());
    }
    if settings.debug {
        warn!("Debug endpoint enabled at /__debug__/");
        router = router.route("/__debug__/", get(debug_info));
    }

    let media_path = settings.media_url.trim_end_matches('/');
    if media_path.is_empty() {
        warn!("media_url '{}' cannot be mounted, media is not served", settings.media_url);
    } else {
        debug!("Serving {} from {}", settings.media_url, settings.media_root.display());
        router = router.nest_service(media_path, ServeDir::new(&settings.media_root));
    }

    router
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(settings.request_timeout_secs)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
