//! Diagnostics of story image data, shows how stored images look after normalization

use axum::{extract::State, response::IntoResponse, Json};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;
use tcms_dal::story::{Story, StoryRepository};
use tracing::{debug, error};

use crate::state::AppState;

pub const DEBUG_ROWS: i64 = 50;

#[derive(Debug, Serialize)]
pub struct StoryImages {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub cover_image: Option<String>,
    pub images: Vec<String>,
}

impl From<Story> for StoryImages {
    fn from(story: Story) -> Self {
        StoryImages {
            id: story.id,
            title: story.title,
            slug: story.slug,
            cover_image: story.cover_image,
            images: story.images,
        }
    }
}

pub async fn stories_images(
    State(state): State<AppState>,
    repository: StoryRepository,
) -> impl IntoResponse {
    match repository.latest(DEBUG_ROWS).await {
        Ok(stories) => {
            let rows: Vec<StoryImages> = stories.into_iter().map(StoryImages::from).collect();
            if !state.config().is_production() {
                for row in &rows {
                    debug!(
                        "Story {} ({}) cover {:?} images {:?}",
                        row.id, row.slug, row.cover_image, row.images
                    );
                }
            }
            (StatusCode::OK, Json(json!({"ok": true, "rows": rows})))
        }
        Err(e) => {
            error!("Cannot load stories for diagnostics: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "error": e.to_string()})),
            )
        }
    }
}
