//! Public reader, published stories and pages rendered as HTML

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use leptos::prelude::*;
use serde::Deserialize;
use tcms_dal::{
    page::{Page, PageRepository},
    story::{Story, StoryRepository},
    ListingParams, Order,
};
use tracing::error;

use crate::{
    html::{render, Document, Message, Paragraphs},
    state::AppState,
};

pub mod gallery;

use gallery::StoryGallery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stories", get(stories))
        .route("/stories/{slug}", get(story))
        .route("/pages/{slug}", get(page))
}

fn message(status: StatusCode, heading: &'static str, text: &'static str) -> Response {
    let html = render(move || {
        view! {
            <Document title=heading user=None>
                <Message heading=heading text=text/>
            </Document>
        }
    });
    (status, html).into_response()
}

fn not_found() -> Response {
    message(
        StatusCode::NOT_FOUND,
        "Not found",
        "There is nothing published here",
    )
}

fn failure(e: tcms_dal::Error) -> Response {
    match e {
        tcms_dal::Error::RecordNotFound(_) => not_found(),
        e => {
            error!("Reader failed: {e}");
            message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error",
                "Something went wrong",
            )
        }
    }
}

fn story_url(slug: &str) -> String {
    let slug: String = url::form_urlencoded::byte_serialize(slug.as_bytes()).collect();
    format!("/stories/{slug}")
}

#[component]
fn StoryTeaser(story: Story) -> impl IntoView {
    let cover = story
        .images
        .first()
        .cloned()
        .map(|img| view! { <img src=img alt=""/> });
    let summary = story.summary.map(|s| view! { <p>{s}</p> });
    view! {
        <li>
            <a href=story_url(&story.slug)>
                {cover}
                <h2>{story.title}</h2>
            </a>
            {summary}
        </li>
    }
}

#[component]
fn StoryList(stories: Vec<Story>) -> impl IntoView {
    let empty = stories.is_empty();
    view! {
        <h1>"Stories"</h1>
        {empty.then(|| view! { <p>"Nothing published yet"</p> })}
        <ul class="stories">
            {stories
                .into_iter()
                .map(|story| view! { <StoryTeaser story=story/> })
                .collect_view()}
        </ul>
    }
}

#[component]
fn StoryArticle(story: Story, selected: Option<usize>) -> impl IntoView {
    let url = story_url(&story.slug);
    let summary = story.summary.map(|s| view! { <p class="summary">{s}</p> });
    let body = story.body.map(|text| view! { <Paragraphs text=text/> });
    view! {
        <article>
            <h1>{story.title.clone()}</h1>
            {summary}
            <StoryGallery images=story.images selected=selected alt=story.title base_url=url/>
            {body}
        </article>
    }
}

#[component]
fn PageArticle(page: Page) -> impl IntoView {
    let cover = page
        .cover_image
        .map(|img| view! { <img class="cover" src=img alt=""/> });
    let body = page.body.map(|text| view! { <Paragraphs text=text/> });
    view! {
        <article>
            <h1>{page.title}</h1>
            {cover}
            {body}
        </article>
    }
}

pub async fn stories(State(state): State<AppState>, repository: StoryRepository) -> Response {
    let params = ListingParams::new(0, state.config().default_page_size.into())
        .with_order(vec![Order::Desc("created_at".into())])
        .only_published();
    match repository.list(params).await {
        Ok(batch) => render(move || {
            view! {
                <Document title="Stories" user=None>
                    <StoryList stories=batch.rows/>
                </Document>
            }
        })
        .into_response(),
        Err(e) => failure(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    image: Option<usize>,
}

pub async fn story(
    Path(slug): Path<String>,
    Query(query): Query<GalleryQuery>,
    repository: StoryRepository,
) -> Response {
    let story = match repository.get_by_slug(&slug).await {
        Ok(story) if story.published => story,
        Ok(_) => return not_found(),
        Err(e) => return failure(e),
    };
    render(move || {
        view! {
            <Document title=story.title.clone() user=None>
                <StoryArticle story=story selected=query.image/>
            </Document>
        }
    })
    .into_response()
}

pub async fn page(Path(slug): Path<String>, repository: PageRepository) -> Response {
    let page = match repository.get_by_slug(&slug).await {
        Ok(page) if page.published => page,
        Ok(_) => return not_found(),
        Err(e) => return failure(e),
    };
    render(move || {
        view! {
            <Document title=page.title.clone() user=None>
                <PageArticle page=page/>
            </Document>
        }
    })
    .into_response()
}
