//! Server side rendering of HTML pages with leptos components

use axum::response::Html;
use leptos::prelude::*;

/// Renders a view to a complete response body, views are static so no
/// reactive runtime beyond a root owner is needed
pub fn render<V>(view: impl FnOnce() -> V) -> Html<String>
where
    V: IntoView + 'static,
{
    let owner = Owner::new_root(None);
    Html(owner.with(|| view().to_html()))
}

#[component]
pub fn Document(
    #[prop(into)] title: String,
    /// Email of signed in staff member, public pages have none
    user: Option<String>,
    children: Children,
) -> impl IntoView {
    let nav = match user {
        Some(email) => view! { <AdminNav email=email/> }.into_any(),
        None => view! {
            <nav>
                <a href="/stories">"Stories"</a>
            </nav>
        }
        .into_any(),
    };
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
            </head>
            <body>
                {nav}
                <main>{children()}</main>
            </body>
        </html>
    }
}

#[component]
fn AdminNav(email: String) -> impl IntoView {
    view! {
        <nav>
            <a href="/admin">"Dashboard"</a>
            " "
            <a href="/admin/stories">"Stories"</a>
            " "
            <a href="/admin/pages">"Pages"</a>
            " "
            <span class="user">{email}</span>
            " "
            <a href="/auth/logout">"Sign out"</a>
        </nav>
    }
}

/// Free text to paragraphs of lines, blank line separates paragraphs
pub fn split_paragraphs(text: &str) -> Vec<Vec<String>> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.lines().map(|l| l.trim_end().to_string()).collect())
        .collect()
}

#[component]
pub fn Paragraphs(#[prop(into)] text: String) -> impl IntoView {
    split_paragraphs(&text)
        .into_iter()
        .map(|lines| {
            let mut lines = lines.into_iter();
            let first = lines.next().unwrap_or_default();
            let rest = lines
                .map(|line| view! { <br/> {line} })
                .collect_view();
            view! { <p>{first} {rest}</p> }
        })
        .collect_view()
}

/// Page with just a heading and a message, for errors
#[component]
pub fn Message(#[prop(into)] heading: String, #[prop(into)] text: String) -> impl IntoView {
    view! {
        <h1>{heading}</h1>
        <p class="error">{text}</p>
    }
}
