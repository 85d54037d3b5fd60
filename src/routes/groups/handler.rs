use axum::{
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::{
    AppState,
    cache::FeedCache,
    error::{AppError, FieldError},
    guard::{self, Access, Viewer},
    pagination::PageQuery,
    routes::posts::model::{FeedPage, PostInfo},
    utils::success_to_api_response,
};

use super::model::{CreateGroupRequest, Group, GroupInfo, validate_slug};

#[derive(Debug, Serialize)]
pub struct GroupFeedResponse {
    pub group: GroupInfo,
    #[serde(flatten)]
    pub page: FeedPage,
}

#[axum::debug_handler]
pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let group = Group::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::NotFound("Group not found"))?;

    let page = PostInfo::page_by_group(
        &state.pool,
        group.id,
        state.config.page_count,
        query.requested(),
    )
    .await?;

    Ok(success_to_api_response(GroupFeedResponse {
        group: GroupInfo::from(group),
        page,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn create_group(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    body: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        "/group/create/",
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    // Only unwrapped once the guard has passed, so anonymous viewers get the
    // login redirect regardless of what they posted.
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return Err(AppError::Validation(vec![FieldError::new(
                "body",
                rejection.body_text(),
            )]));
        }
    };

    let mut errors = Vec::new();
    if let Err(e) = validate_slug(&req.slug) {
        errors.push(e);
    }
    if req.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title must not be empty"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let group = Group::create(&state.pool, &req, claims.sub).await?;
    tracing::info!("Group {} created by {}", group.slug, claims.username);

    Ok((
        StatusCode::CREATED,
        success_to_api_response(GroupInfo::from(group)),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Response, AppError> {
    let path = format!("/group/{}/delete/", slug);
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        &path,
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    let group = Group::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::NotFound("Group not found"))?;

    // Not the creator: back to the group feed, nothing deleted.
    if group.created_by != claims.sub {
        return Ok(Redirect::to(&format!("/group/{}/", slug)).into_response());
    }

    Group::delete(&state.pool, group.id).await?;
    // The SET NULL on posts.group_id just changed rows that may sit in
    // cached global pages.
    FeedCache::from_state(&state).invalidate().await;
    tracing::info!("Group {} deleted by {}", slug, claims.username);

    Ok(Redirect::to("/").into_response())
}
