use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::utils::Claims;

/// The requesting viewer: claims when a valid bearer token was presented,
/// `None` for anonymous requests. Always extractable; guards below decide
/// what anonymous viewers may do.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Claims>);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<Claims>().cloned()))
    }
}

/// Outcome of an access-control check. Handlers consume this uniformly:
/// `Allowed` carries the proof (claims, ownership), `RedirectTo` carries the
/// location the viewer is sent to instead of the guarded action.
#[derive(Debug, Clone, PartialEq)]
pub enum Access<T> {
    Allowed(T),
    RedirectTo(String),
}

/// Anonymous viewers of auth-required routes go to the login page with the
/// original path preserved in `next`.
pub fn require_auth(claims: Option<Claims>, login_url: &str, path: &str) -> Access<Claims> {
    match claims {
        Some(claims) => Access::Allowed(claims),
        None => Access::RedirectTo(format!("{}?next={}", login_url, path)),
    }
}

/// Editing a post is author-only; anyone else is silently sent to the
/// read-only detail view.
pub fn require_post_author(claims: &Claims, author_id: Uuid, post_id: i64) -> Access<()> {
    if claims.sub == author_id {
        Access::Allowed(())
    } else {
        Access::RedirectTo(post_detail_path(post_id))
    }
}

pub fn post_detail_path(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

pub fn profile_path(username: &str) -> String {
    format!("/profile/{}/", username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims_for(user_id: Uuid) -> Claims {
        Claims {
            sub: user_id,
            username: "leo".into(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn anonymous_viewer_is_sent_to_login_with_next() {
        let access = require_auth(None, "/auth/login/", "/create/");
        assert_eq!(
            access,
            Access::RedirectTo("/auth/login/?next=/create/".into())
        );
    }

    #[test]
    fn authenticated_viewer_is_allowed() {
        let claims = claims_for(Uuid::new_v4());
        match require_auth(Some(claims.clone()), "/auth/login/", "/create/") {
            Access::Allowed(c) => assert_eq!(c.sub, claims.sub),
            Access::RedirectTo(_) => panic!("expected Allowed"),
        }
    }

    #[test]
    fn non_author_edit_redirects_to_detail() {
        let claims = claims_for(Uuid::new_v4());
        let access = require_post_author(&claims, Uuid::new_v4(), 7);
        assert_eq!(access, Access::RedirectTo("/posts/7/".into()));
    }

    #[test]
    fn author_edit_is_allowed() {
        let claims = claims_for(Uuid::new_v4());
        assert_eq!(
            require_post_author(&claims, claims.sub, 7),
            Access::Allowed(())
        );
    }
}
