use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
    utils::{error_codes, error_to_api_response},
};

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_to_api_response::<()>(error_codes::NOT_FOUND, "Not found".to_string()),
    )
        .into_response()
}

/// Full application router. Auth claims are extracted once by middleware;
/// individual handlers guard what anonymous viewers may reach.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // feeds
        .route("/", get(routes::posts::index))
        .route("/group/{slug}/", get(routes::groups::group_posts))
        .route("/profile/{username}/", get(routes::profiles::profile))
        .route("/follow/", get(routes::follows::follow_index))
        // posts and comments
        .route("/posts/{id}/", get(routes::posts::post_detail))
        .route("/create/", post(routes::posts::post_create))
        .route("/posts/{id}/edit/", post(routes::posts::post_edit))
        .route("/posts/{id}/delete/", post(routes::posts::post_delete))
        .route("/posts/{id}/add_comment", post(routes::posts::add_comment))
        // follow graph
        .route("/profile/{username}/follow", get(routes::follows::profile_follow))
        .route(
            "/profile/{username}/unfollow",
            get(routes::follows::profile_unfollow),
        )
        // groups
        .route("/group/create/", post(routes::groups::create_group))
        .route("/group/{slug}/delete/", post(routes::groups::delete_group))
        // identity
        .route("/auth/register/", post(routes::user::register))
        .route("/auth/login/", post(routes::user::login))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    /// State whose pool and Redis client are created lazily and never
    /// connected; good enough for routing and guard behavior.
    fn test_state() -> AppState {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        let redis = Arc::new(redis::Client::open(config.redis_url.clone()).unwrap());
        AppState { pool, config, redis }
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/no/such/route").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn anonymous_followed_feed_redirects_to_login() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/follow/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=/follow/"
        );
    }

    #[tokio::test]
    async fn anonymous_post_create_redirects_to_login() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::post("/create/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text": "long enough post text"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=/create/"
        );
    }

    #[tokio::test]
    async fn anonymous_redirect_wins_over_malformed_body() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::post("/create/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=/create/"
        );
    }

    #[tokio::test]
    async fn anonymous_redirect_wins_over_missing_content_type() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::post("/create/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=/create/"
        );
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_rejected() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::get("/follow/")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
