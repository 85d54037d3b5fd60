use axum::{
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    cache::{FeedCache, keys::GLOBAL_SCOPE},
    error::{AppError, FieldError},
    guard::{self, Access, Viewer},
    pagination::PageQuery,
    routes::groups::model::Group,
    utils::success_to_api_response,
};

use super::model::{
    CommentForm, CommentInfo, FeedPage, PostDetailResponse, PostForm, PostInfo,
    validate_comment_text, validate_post_text,
};

/// A request body is unwrapped only after the auth guard has passed, so
/// anonymous viewers are redirected to login even when their body is
/// malformed or missing. For authenticated viewers a bad body is a form
/// error like any other.
fn unwrap_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(form)) => Ok(form),
        Err(rejection) => Err(AppError::Validation(vec![FieldError::new(
            "body",
            rejection.body_text(),
        )])),
    }
}

/// Pages below 1 are looked up as page 1; clamping against the real page
/// count happens after the row count is known.
fn cache_lookup_page(requested: i64) -> u32 {
    requested.clamp(1, u32::MAX as i64) as u32
}

/// Global feed. Pages are served through the feed cache, so a fresh post may
/// lag behind here until the TTL or the next write-side invalidation.
#[axum::debug_handler]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let cache = FeedCache::from_state(&state);

    if let Some(page) = cache
        .get_page::<FeedPage>(GLOBAL_SCOPE, cache_lookup_page(query.requested()))
        .await
    {
        return Ok(success_to_api_response(page).into_response());
    }

    let page = PostInfo::page_global(&state.pool, state.config.page_count, query.requested())
        .await?;
    // Store under the clamped page number; out-of-range requests all map to
    // the same entry instead of each caching their own copy of the last page.
    cache.put_page(GLOBAL_SCOPE, page.meta.page, &page).await;

    Ok(success_to_api_response(page).into_response())
}

#[axum::debug_handler]
pub async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Response, AppError> {
    let post = PostInfo::find(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;
    let comments = CommentInfo::list_for_post(&state.pool, post_id).await?;

    Ok(success_to_api_response(PostDetailResponse { post, comments }).into_response())
}

/// Checks the optional group reference of a post form. An unknown group id
/// is a form error, not a 404: the submission is what is wrong.
async fn check_group(state: &AppState, form: &PostForm) -> Result<(), AppError> {
    if let Some(group_id) = form.group_id {
        if !Group::exists(&state.pool, group_id).await? {
            return Err(AppError::Validation(vec![FieldError::new(
                "group",
                "Unknown group",
            )]));
        }
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn post_create(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    body: Result<Json<PostForm>, JsonRejection>,
) -> Result<Response, AppError> {
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        "/create/",
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };
    let form = unwrap_body(body)?;

    let text = validate_post_text(&form.text).map_err(|e| AppError::Validation(vec![e]))?;
    check_group(&state, &form).await?;

    let post = PostInfo::create(
        &state.pool,
        claims.sub,
        &text,
        form.group_id,
        form.image.as_deref(),
    )
    .await?;
    FeedCache::from_state(&state).invalidate().await;

    tracing::info!("Post {} created by {}", post.id, claims.username);
    Ok(Redirect::to(&guard::profile_path(&claims.username)).into_response())
}

#[axum::debug_handler]
pub async fn post_edit(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Viewer(viewer): Viewer,
    body: Result<Json<PostForm>, JsonRejection>,
) -> Result<Response, AppError> {
    let path = format!("/posts/{}/edit/", post_id);
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        &path,
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    let post = PostInfo::find(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    if let Access::RedirectTo(location) = guard::require_post_author(&claims, post.author_id, post_id)
    {
        return Ok(Redirect::to(&location).into_response());
    }

    let form = unwrap_body(body)?;
    let text = validate_post_text(&form.text).map_err(|e| AppError::Validation(vec![e]))?;
    check_group(&state, &form).await?;

    PostInfo::update(&state.pool, post_id, &text, form.group_id, form.image.as_deref()).await?;
    FeedCache::from_state(&state).invalidate().await;

    Ok(Redirect::to(&guard::post_detail_path(post_id)).into_response())
}

#[axum::debug_handler]
pub async fn post_delete(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Viewer(viewer): Viewer,
) -> Result<Response, AppError> {
    let path = format!("/posts/{}/delete/", post_id);
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        &path,
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    let post = PostInfo::find(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    if let Access::RedirectTo(location) = guard::require_post_author(&claims, post.author_id, post_id)
    {
        return Ok(Redirect::to(&location).into_response());
    }

    PostInfo::delete(&state.pool, post_id).await?;
    FeedCache::from_state(&state).invalidate().await;

    tracing::info!("Post {} deleted by {}", post_id, claims.username);
    Ok(Redirect::to(&guard::profile_path(&claims.username)).into_response())
}

#[axum::debug_handler]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Viewer(viewer): Viewer,
    body: Result<Json<CommentForm>, JsonRejection>,
) -> Result<Response, AppError> {
    let path = format!("/posts/{}/add_comment", post_id);
    let claims = match guard::require_auth(
        viewer,
        &state.config.login_url,
        &path,
    ) {
        Access::Allowed(claims) => claims,
        Access::RedirectTo(location) => return Ok(Redirect::to(&location).into_response()),
    };

    // Resolve the post first so a comment on a missing post is a 404, not a
    // dangling row.
    PostInfo::find(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    let form = unwrap_body(body)?;
    let text = validate_comment_text(&form.text).map_err(|e| AppError::Validation(vec![e]))?;
    let comment = CommentInfo::create(&state.pool, post_id, claims.sub, &text).await?;

    tracing::debug!("Comment {} added to post {}", comment.id, post_id);
    Ok(Redirect::to(&guard::post_detail_path(post_id)).into_response())
}

#[cfg(test)]
mod tests {
    use super::cache_lookup_page;
    use crate::pagination::PageMeta;

    #[test]
    fn lookup_page_saturates_below_one() {
        assert_eq!(cache_lookup_page(-5), 1);
        assert_eq!(cache_lookup_page(0), 1);
        assert_eq!(cache_lookup_page(7), 7);
    }

    #[test]
    fn out_of_range_requests_store_under_one_key() {
        // Any page past the end clamps to the same last page, so the cache
        // holds a single entry for all of them.
        let far = PageMeta::compute(999, 13, 10);
        let farther = PageMeta::compute(5000, 13, 10);
        assert_eq!(far.page, 2);
        assert_eq!(far.page, farther.page);
    }
}
