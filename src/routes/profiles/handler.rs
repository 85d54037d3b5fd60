use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    guard::Viewer,
    pagination::PageQuery,
    routes::follows::model::Follow,
    routes::posts::model::{FeedPage, PostInfo},
    routes::user::model::User,
    utils::success_to_api_response,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub author_id: Uuid,
    pub author: String,
    /// Whether the requesting viewer follows this author. Always false for
    /// anonymous viewers.
    pub following: bool,
    #[serde(flatten)]
    pub page: FeedPage,
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    Viewer(viewer): Viewer,
) -> Result<Response, AppError> {
    let author = User::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    let following = match &viewer {
        Some(claims) => Follow::exists(&state.pool, claims.sub, author.id).await?,
        None => false,
    };

    let page = PostInfo::page_by_author(
        &state.pool,
        author.id,
        state.config.page_count,
        query.requested(),
    )
    .await?;

    Ok(success_to_api_response(ProfileResponse {
        author_id: author.id,
        author: author.username,
        following,
        page,
    })
    .into_response())
}
