use axum::{
    extract::{FromRequest as _, FromRequestParts},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json,
};
use http::{header, request::Parts};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tcms_dal::user::{User, UserRepository};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const SESSION_COOKIE_NAME: &str = "tcms";
const SESSION_USER_KEY: &str = "user";

pub const LOGIN_PAGE: &str = "/login";
pub const DEFAULT_LANDING_PAGE: &str = "/admin";

crate::repository_from_request!(UserRepository);

/// Signed in staff member, as kept in session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

pub async fn current_user(
    session: &Session,
) -> Result<Option<SessionUser>, tower_sessions::session::Error> {
    session.get::<SessionUser>(SESSION_USER_KEY).await
}

/// Requires signed in user, if guard middleware already resolved user it is reused
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<SessionUser>() {
            return Ok(user.clone());
        }
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ApiError::internal(anyhow::anyhow!(msg)))?;
        current_user(&session).await?.ok_or(ApiError::Unauthorized)
    }
}

pub fn session_layer(secure: bool, expiry: time::Duration) -> SessionManagerLayer<MemoryStore> {
    let session_store = MemoryStore::default();
    SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(secure)
        .with_expiry(Expiry::OnInactivity(expiry))
}

/// Builds authentication router - must be nested on /auth path!
pub fn auth_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/login", axum::routing::post(db_login))
        .route("/logout", get(logout).post(logout))
        .route("/get-user", get(get_user))
}

#[derive(Deserialize)]
struct LoginCredentials {
    email: String,
    password: String,
    next: Option<String>,
}

/// Only local absolute paths are followed after login
/// Only local paths are followed after login, browsers read `/\host` as `//host`
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => DEFAULT_LANDING_PAGE,
    }
}

pub fn login_url(next: &str) -> String {
    let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PAGE}?next={next}")
}

async fn after_ok_login(session: &Session, known_user: User) -> ApiResult<SessionUser> {
    // new id for signed in session
    session.cycle_id().await?;
    let user = SessionUser::from(known_user);
    session.insert(SESSION_USER_KEY, &user).await?;
    debug!("User {} signed in", user.email);
    Ok(user)
}

/// Password sign in, accepts JSON (API clients) or form (login page)
pub async fn db_login(
    user_registry: UserRepository,
    session: Session,
    request: axum::extract::Request,
) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("application/json") {
        let credentials = match Json::<LoginCredentials>::from_request(request, &()).await {
            Ok(Json(data)) => data,
            Err(e) => return ApiError::from(e).into_response(),
        };
        match user_registry
            .check_password(&credentials.email, &credentials.password)
            .await
        {
            Ok(user) => match after_ok_login(&session, user).await {
                Ok(user) => Json(json!({"email": user.email})).into_response(),
                Err(e) => e.into_response(),
            },
            Err(e) => {
                debug!("Login failed: {e}");
                ApiError::Unauthorized.into_response()
            }
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let credentials = match Form::<LoginCredentials>::from_request(request, &()).await {
            Ok(Form(data)) => data,
            Err(e) => return ApiError::from(e).into_response(),
        };
        let next = safe_next(credentials.next.as_deref()).to_string();
        match user_registry
            .check_password(&credentials.email, &credentials.password)
            .await
        {
            Ok(user) => match after_ok_login(&session, user).await {
                Ok(_) => Redirect::to(&next).into_response(),
                Err(e) => e.into_response(),
            },
            Err(e) => {
                debug!("Login failed: {e}");
                let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
                Redirect::to(&format!("{LOGIN_PAGE}?error=invalid&next={next}")).into_response()
            }
        }
    } else {
        ApiError::InvalidRequest(format!("Unsupported content type: {content_type}"))
            .into_response()
    }
}

pub async fn logout(session: Session) -> impl IntoResponse {
    session
        .flush()
        .await
        .unwrap_or_else(|e| warn!("Failed to delete session: {e}"));
    Redirect::to(LOGIN_PAGE)
}

/// Email of signed in user, 401 when there is no session
pub async fn get_user(session: Session) -> ApiResult<impl IntoResponse> {
    match current_user(&session).await {
        Ok(Some(user)) => Ok(Json(json!({"email": user.email}))),
        Ok(None) => Err(ApiError::Unauthorized),
        Err(e) => {
            warn!("Cannot read session: {e}");
            Err(e.into())
        }
    }
}
