//! Route guard for admin area.
//!
//! Every guarded request resolves the session exactly once, going from
//! [`GuardState::Checking`] to `Authenticated` or `Unauthenticated`.
//! Protected content is rendered only when authenticated, API routes answer
//! 401, pages redirect to login.

use std::fmt::Display;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::{
    auth::{current_user, login_url, SessionUser},
    error::ApiError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    Checking,
    Authenticated(SessionUser),
    Unauthenticated,
}

impl GuardState {
    /// Applies result of session lookup, only `Checking` can transition,
    /// a lookup failure counts as no session
    pub fn resolve<E: Display>(self, lookup: Result<Option<SessionUser>, E>) -> GuardState {
        match self {
            GuardState::Checking => match lookup {
                Ok(Some(user)) => GuardState::Authenticated(user),
                Ok(None) => GuardState::Unauthenticated,
                Err(e) => {
                    warn!("Session lookup failed: {e}");
                    GuardState::Unauthenticated
                }
            },
            resolved => resolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, GuardState::Checking)
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            GuardState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

pub async fn check(session: &Session) -> GuardState {
    GuardState::Checking.resolve(current_user(session).await)
}

pub async fn require_session_api(session: Session, mut request: Request, next: Next) -> Response {
    match check(&session).await {
        GuardState::Authenticated(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        _ => {
            debug!("Unauthenticated API request to {}", request.uri());
            ApiError::Unauthorized.into_response()
        }
    }
}

pub async fn require_session_page(session: Session, mut request: Request, next: Next) -> Response {
    match check(&session).await {
        GuardState::Authenticated(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        _ => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/admin");
            debug!("Unauthenticated page request to {target}, redirecting to login");
            Redirect::to(&login_url(target)).into_response()
        }
    }
}

/// Guards all routes of API router (must be called after routes are added)
pub fn protect_api<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(require_session_api))
}

/// Guards all routes of pages router (must be called after routes are added)
pub fn protect_pages<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(require_session_page))
}
