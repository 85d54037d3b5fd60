use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::AppError,
    guard::{self, Access, Viewer},
    pagination::PageQuery,
    routes::posts::model::PostInfo,
    routes::user::model::User,
    utils::success_to_api_response,
};

use super::model::{Follow, is_self_follow, unfollow_outcome};

/// Feed of posts by every author the viewer follows.
#[axum::debug_handler]
pub async fn follow_index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Viewer(viewer): Viewer,
) -> Result<Response, AppError> {
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        "/follow/",
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    let page = PostInfo::page_followed(
        &state.pool,
        claims.sub,
        state.config.page_count,
        query.requested(),
    )
    .await?;

    Ok(success_to_api_response(page).into_response())
}

#[axum::debug_handler]
pub async fn profile_follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Response, AppError> {
    let path = format!("/profile/{}/follow", username);
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        &path,
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    let author = User::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    if !is_self_follow(claims.sub, author.id) {
        Follow::create(&state.pool, claims.sub, author.id).await?;
        tracing::debug!("{} now follows {}", claims.username, author.username);
    }

    Ok(Redirect::to(&guard::profile_path(&claims.username)).into_response())
}

#[axum::debug_handler]
pub async fn profile_unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Response, AppError> {
    let path = format!("/profile/{}/unfollow", username);
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        &path,
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    let author = User::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    let removed = Follow::delete(&state.pool, claims.sub, author.id).await?;
    unfollow_outcome(removed)?;

    tracing::debug!("{} unfollowed {}", claims.username, author.username);
    Ok(Redirect::to(&guard::profile_path(&claims.username)).into_response())
}
