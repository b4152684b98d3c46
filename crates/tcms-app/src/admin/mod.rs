//! Server rendered admin area, everything but login page is behind session guard

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use http::StatusCode;
use leptos::prelude::*;
use serde::Deserialize;
use tcms_dal::{ListingParams, Order};
use tracing::{debug, error};

use crate::{
    auth::{safe_next, SessionUser},
    error::ApiError,
    guard::protect_pages,
    html::{render, Document, Message},
    state::AppState,
};

pub mod content;
pub mod views;

use content::{ContentForm, Kind, Repositories, SaveError};
use views::{ContentList, Dashboard, DashboardCounts, Editor, EditorState, LoginForm, Pager};

pub fn router() -> Router<AppState> {
    let protected = Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/{kind}", get(list).post(create))
        .route("/admin/{kind}/new", get(new_record))
        .route("/admin/{kind}/{id}", get(edit).post(update))
        .route("/admin/{kind}/{id}/delete", post(delete));
    protect_pages(protected).route("/login", get(login_page))
}

/// Admin page in document shell with navigation for signed in user
fn page<V>(
    title: String,
    user: &SessionUser,
    content: impl FnOnce() -> V + Send + 'static,
) -> axum::response::Html<String>
where
    V: IntoView + 'static,
{
    let email = user.email.clone();
    render(move || {
        view! {
            <Document title=title user=Some(email)>
                {content()}
            </Document>
        }
    })
}

fn error_page(status: StatusCode, user: &SessionUser, message: String) -> Response {
    let heading = status.canonical_reason().unwrap_or("Error");
    let html = page("Error".to_string(), user, move || {
        view! { <Message heading=heading text=message/> }
    });
    (status, html).into_response()
}

fn failure(user: &SessionUser, e: tcms_dal::Error) -> Response {
    let e = ApiError::from(e);
    let status = e.status_code();
    if status.is_server_error() {
        error!("Admin request failed: {e}");
    }
    error_page(status, user, e.to_string())
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
    error: Option<String>,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    let failed = query.error.is_some();
    render(move || {
        view! {
            <Document title="Sign in" user=None>
                <LoginForm next=next failed=failed/>
            </Document>
        }
    })
    .into_response()
}

pub async fn dashboard(
    State(state): State<AppState>,
    user: SessionUser,
    repositories: Repositories,
) -> Response {
    let counts = async {
        Ok::<_, tcms_dal::Error>(DashboardCounts {
            stories: repositories.count(Kind::Stories, None).await?,
            published_stories: repositories.count(Kind::Stories, Some(true)).await?,
            pages: repositories.count(Kind::Pages, None).await?,
            published_pages: repositories.count(Kind::Pages, Some(true)).await?,
        })
    }
    .await;
    match counts {
        Ok(counts) => {
            let name = user.name.clone();
            let service_role_configured = state.config().service_role_configured;
            page("Dashboard".to_string(), &user, move || {
                view! {
                    <Dashboard
                        name=name
                        counts=counts
                        service_role_configured=service_role_configured
                    />
                }
            })
            .into_response()
        }
        Err(e) => failure(&user, e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<u32>,
}

pub async fn list(
    Path(kind): Path<Kind>,
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
    user: SessionUser,
    repositories: Repositories,
) -> Response {
    let page_size = i64::from(state.config().default_page_size.max(1));
    let page_no = i64::from(query.page.unwrap_or(1).max(1));
    let params = ListingParams::new((page_no - 1) * page_size, page_size)
        .with_order(vec![Order::Desc("created_at".into())]);
    match repositories.list(kind, params).await {
        Ok(batch) => {
            let total_pages = batch.total.div_ceil(page_size.unsigned_abs());
            let pager = Pager {
                page: page_no,
                total_pages: i64::try_from(total_pages).unwrap_or(i64::MAX),
            };
            let can_delete = state.config().service_role_configured;
            page(kind.title().to_string(), &user, move || {
                view! { <ContentList kind=kind rows=batch.rows pager=pager can_delete=can_delete/> }
            })
            .into_response()
        }
        Err(e) => failure(&user, e),
    }
}

fn render_editor(status: StatusCode, user: &SessionUser, editor: EditorState) -> Response {
    let html = page(editor.heading(), user, move || view! { <Editor state=editor/> });
    (status, html).into_response()
}

fn save_failed(
    kind: Kind,
    id: Option<i64>,
    user: &SessionUser,
    form: ContentForm,
    e: SaveError,
) -> Response {
    let mut editor = EditorState::new(kind, id, form);
    match e {
        SaveError::Invalid(errors) => {
            debug!("Invalid {} form: {errors:?}", kind.singular());
            editor.errors = errors;
            editor.message = Some("Please correct the highlighted fields".to_string());
            render_editor(StatusCode::UNPROCESSABLE_ENTITY, user, editor)
        }
        SaveError::Failed(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                error!("Saving {} failed: {e}", kind.singular());
            }
            editor.message = Some(e.to_string());
            render_editor(status, user, editor)
        }
    }
}

pub async fn new_record(Path(kind): Path<Kind>, user: SessionUser) -> Response {
    render_editor(
        StatusCode::OK,
        &user,
        EditorState::new(kind, None, ContentForm::default()),
    )
}

pub async fn create(
    Path(kind): Path<Kind>,
    user: SessionUser,
    repositories: Repositories,
    Form(form): Form<ContentForm>,
) -> Response {
    match repositories.create(kind, &form, &user).await {
        Ok(record) => {
            Redirect::to(&format!("/admin/{}/{}?saved=1", kind.path(), record.id)).into_response()
        }
        Err(e) => save_failed(kind, None, &user, form, e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EditQuery {
    saved: Option<String>,
}

pub async fn edit(
    Path((kind, id)): Path<(Kind, i64)>,
    Query(query): Query<EditQuery>,
    user: SessionUser,
    repositories: Repositories,
) -> Response {
    match repositories.get(kind, id).await {
        Ok(record) => {
            let mut editor = EditorState::new(kind, Some(id), ContentForm::from(&record));
            editor.saved = query.saved.is_some();
            render_editor(StatusCode::OK, &user, editor)
        }
        Err(e) => failure(&user, e),
    }
}

pub async fn update(
    Path((kind, id)): Path<(Kind, i64)>,
    user: SessionUser,
    repositories: Repositories,
    Form(form): Form<ContentForm>,
) -> Response {
    match repositories.update(kind, id, &form).await {
        Ok(record) => {
            Redirect::to(&format!("/admin/{}/{}?saved=1", kind.path(), record.id)).into_response()
        }
        Err(e) => save_failed(kind, Some(id), &user, form, e),
    }
}

pub async fn delete(
    Path((kind, id)): Path<(Kind, i64)>,
    State(state): State<AppState>,
    user: SessionUser,
    repositories: Repositories,
) -> Response {
    if !state.config().service_role_configured {
        return error_page(
            StatusCode::FORBIDDEN,
            &user,
            "Privileged credential is not configured".to_string(),
        );
    }
    match repositories.delete(kind, id).await {
        Ok(()) => Redirect::to(&format!("/admin/{}", kind.path())).into_response(),
        Err(e) => failure(&user, e),
    }
}
