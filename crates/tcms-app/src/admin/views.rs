use leptos::prelude::*;
use time::format_description::well_known::Rfc3339;

use super::content::{ContentForm, ContentRecord, Kind};
use crate::error::FieldErrors;

#[component]
pub fn LoginForm(#[prop(into)] next: String, failed: bool) -> impl IntoView {
    view! {
        <h1>"Sign in"</h1>
        {failed.then(|| view! { <p class="error">"Invalid email or password"</p> })}
        <form method="post" action="/auth/login">
            <input type="hidden" name="next" value=next/>
            <label>"Email " <input type="email" name="email" required/></label>
            <label>"Password " <input type="password" name="password" required/></label>
            <button type="submit">"Sign in"</button>
        </form>
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DashboardCounts {
    pub stories: u64,
    pub published_stories: u64,
    pub pages: u64,
    pub published_pages: u64,
}

#[component]
pub fn Dashboard(
    #[prop(into)] name: String,
    counts: DashboardCounts,
    service_role_configured: bool,
) -> impl IntoView {
    let privileged = if service_role_configured {
        "Privileged credential is configured, records can be deleted."
    } else {
        "Privileged credential is not configured, deleting records is disabled."
    };
    view! {
        <h1>{format!("Welcome, {name}")}</h1>
        <ul class="summary">
            <li>
                <a href="/admin/stories">"Stories"</a>
                {format!(": {} ({} published)", counts.stories, counts.published_stories)}
            </li>
            <li>
                <a href="/admin/pages">"Pages"</a>
                {format!(": {} ({} published)", counts.pages, counts.published_pages)}
            </li>
        </ul>
        <p class="service-role">{privileged}</p>
    }
}

fn format_time(t: &time::OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_default()
}

#[derive(Debug, Clone, Copy)]
pub struct Pager {
    pub page: i64,
    pub total_pages: i64,
}

#[component]
fn ContentRow(kind: Kind, record: ContentRecord, can_delete: bool) -> impl IntoView {
    let delete = can_delete.then(|| {
        view! {
            <form method="post" action=format!("/admin/{}/{}/delete", kind.path(), record.id)>
                <button type="submit">"Delete"</button>
            </form>
        }
    });
    view! {
        <tr>
            <td>
                <a href=format!("/admin/{}/{}", kind.path(), record.id)>{record.title}</a>
            </td>
            <td>{record.slug}</td>
            <td>{if record.published { "yes" } else { "no" }}</td>
            <td>{format_time(&record.updated_at)}</td>
            <td>{delete}</td>
        </tr>
    }
}

#[component]
pub fn ContentList(
    kind: Kind,
    rows: Vec<ContentRecord>,
    pager: Pager,
    can_delete: bool,
) -> impl IntoView {
    let empty = rows.is_empty().then(|| {
        view! {
            <tr>
                <td colspan="5">"Nothing here yet"</td>
            </tr>
        }
    });
    let rows = rows
        .into_iter()
        .map(|record| view! { <ContentRow kind=kind record=record can_delete=can_delete/> })
        .collect_view();
    let previous = (pager.page > 1).then(|| {
        view! { <a href=format!("/admin/{}?page={}", kind.path(), pager.page - 1)>"Previous"</a> }
    });
    let next = (pager.page < pager.total_pages).then(|| {
        view! { <a href=format!("/admin/{}?page={}", kind.path(), pager.page + 1)>"Next"</a> }
    });
    view! {
        <h1>{kind.title()}</h1>
        <p>
            <a href=format!("/admin/{}/new", kind.path())>{format!("New {}", kind.singular())}</a>
            " "
            <a href=format!("/admin/{}", kind.path())>"Refresh"</a>
        </p>
        <table>
            <thead>
                <tr>
                    <th>"Title"</th>
                    <th>"Slug"</th>
                    <th>"Published"</th>
                    <th>"Updated"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>{rows} {empty}</tbody>
        </table>
        <p class="paging">{previous} " " {next}</p>
    }
}

/// Validation messages of one field, placed right under its input
#[component]
fn ErrorMessages(messages: Vec<String>) -> impl IntoView {
    messages
        .into_iter()
        .map(|m| view! { <p class="error">{m}</p> })
        .collect_view()
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub kind: Kind,
    pub id: Option<i64>,
    pub form: ContentForm,
    pub errors: FieldErrors,
    pub message: Option<String>,
    pub saved: bool,
}

impl EditorState {
    pub fn new(kind: Kind, id: Option<i64>, form: ContentForm) -> Self {
        EditorState {
            kind,
            id,
            form,
            errors: FieldErrors::new(),
            message: None,
            saved: false,
        }
    }

    pub fn heading(&self) -> String {
        match self.id {
            Some(_) => format!("Edit {}", self.kind.singular()),
            None => format!("New {}", self.kind.singular()),
        }
    }

    fn action(&self) -> String {
        match self.id {
            Some(id) => format!("/admin/{}/{id}", self.kind.path()),
            None => format!("/admin/{}", self.kind.path()),
        }
    }

    fn messages(&self, field: &str) -> Vec<String> {
        self.errors.get(field).cloned().unwrap_or_default()
    }
}

#[component]
pub fn Editor(state: EditorState) -> impl IntoView {
    let kind = state.kind;
    let heading = state.heading();
    let action = state.action();
    let title_errors = state.messages("title");
    let slug_errors = state.messages("slug");
    let summary_errors = state.messages("summary");
    let body_errors = state.messages("body");
    let cover_image_errors = state.messages("cover_image");
    let images_errors = state.messages("images");
    let checked = state.form.is_published().then_some("checked");
    let saved = state.saved.then(|| view! { <p class="notice">"Saved"</p> });
    let message = state.message.map(|m| view! { <p class="error">{m}</p> });
    let form = state.form;
    view! {
        <h1>{heading}</h1>
        {saved}
        {message}
        <form method="post" action=action>
            <label>"Title " <input type="text" name="title" value=form.title maxlength="200"/></label>
            <ErrorMessages messages=title_errors/>
            <label>"Slug " <input type="text" name="slug" value=form.slug maxlength="200"/></label>
            <ErrorMessages messages=slug_errors/>
            <label>"Summary " <textarea name="summary" maxlength="500">{form.summary}</textarea></label>
            <ErrorMessages messages=summary_errors/>
            <label>"Body " <textarea name="body" rows="12">{form.body}</textarea></label>
            <ErrorMessages messages=body_errors/>
            <label><input type="checkbox" name="published" checked=checked/>" Published"</label>
            <label>"Cover image " <input type="text" name="cover_image" value=form.cover_image/></label>
            <ErrorMessages messages=cover_image_errors/>
            <label>"Gallery images (one per line) " <textarea name="images" rows="5">{form.images}</textarea></label>
            <ErrorMessages messages=images_errors/>
            <button type="submit">"Save"</button>
        </form>
        <p>
            <a href=format!("/admin/{}", kind.path())>{format!("Back to {}", kind.path())}</a>
        </p>
    }
}
