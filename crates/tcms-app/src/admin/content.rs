//! Stories and pages as edited in admin, both kinds share one form and one view model

use axum::extract::FromRequestParts;
use garde::Validate as _;
use http::request::Parts;
use serde::Deserialize;
use tcms_dal::{
    page::{CreatePage, Page, PageRepository, UpdatePage},
    story::{CreateStory, Story, StoryRepository, UpdateStory},
    content::Clear,
    Batch, ListingParams,
};
use time::OffsetDateTime;

use crate::{
    auth::SessionUser,
    error::{field_errors, ApiError, FieldErrors},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Stories,
    Pages,
}

impl Kind {
    pub fn path(&self) -> &'static str {
        match self {
            Kind::Stories => "stories",
            Kind::Pages => "pages",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Kind::Stories => "Stories",
            Kind::Pages => "Pages",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Kind::Stories => "story",
            Kind::Pages => "page",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub published: bool,
    pub cover_image: Option<String>,
    /// Stored gallery, cover fallback is not part of it
    pub gallery: Vec<String>,
    pub updated_at: OffsetDateTime,
}

macro_rules! record_from {
    ($entity:ty) => {
        impl From<$entity> for ContentRecord {
            fn from(e: $entity) -> Self {
                ContentRecord {
                    id: e.id,
                    title: e.title,
                    slug: e.slug,
                    summary: e.summary,
                    body: e.body,
                    published: e.published,
                    cover_image: e.cover_image,
                    gallery: e.stored_images,
                    updated_at: e.updated_at,
                }
            }
        }
    };
}

record_from!(Story);
record_from!(Page);

/// Editor form as submitted by browser, gallery images are one per line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    /// Checkbox, present only when checked
    pub published: Option<String>,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub images: String,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ContentForm {
    pub fn image_list(&self) -> Vec<String> {
        self.images
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_published(&self) -> bool {
        self.published.is_some()
    }
}

impl From<&ContentRecord> for ContentForm {
    fn from(record: &ContentRecord) -> Self {
        ContentForm {
            title: record.title.clone(),
            slug: record.slug.clone(),
            summary: record.summary.clone().unwrap_or_default(),
            body: record.body.clone().unwrap_or_default(),
            published: record.published.then(|| "on".to_string()),
            cover_image: record.cover_image.clone().unwrap_or_default(),
            images: record.gallery.join("\n"),
        }
    }
}

macro_rules! payloads_from_form {
    ($create:ident, $update:ident) => {
        impl From<&ContentForm> for $create {
            /// New record, empty gallery means no stored images
            fn from(form: &ContentForm) -> Self {
                let images = form.image_list();
                $create {
                    title: form.title.trim().to_string(),
                    slug: form.slug.trim().to_string(),
                    summary: non_empty(&form.summary),
                    body: non_empty(&form.body),
                    published: Some(form.is_published()),
                    cover_image: non_empty(&form.cover_image),
                    images: if images.is_empty() { None } else { Some(images) },
                    created_by: None,
                }
            }
        }

        impl From<&ContentForm> for $update {
            /// Editor always submits whole record, empty cover keeps stored one,
            /// other empty inputs are stored as NULL like on create
            fn from(form: &ContentForm) -> Self {
                let summary = non_empty(&form.summary);
                let body = non_empty(&form.body);
                let images = Some(form.image_list()).filter(|images| !images.is_empty());
                $update {
                    title: Some(form.title.trim().to_string()),
                    slug: Some(form.slug.trim().to_string()),
                    published: Some(form.is_published()),
                    cover_image: non_empty(&form.cover_image),
                    clear: Clear {
                        summary: summary.is_none(),
                        body: body.is_none(),
                        images: images.is_none(),
                    },
                    summary,
                    body,
                    images,
                }
            }
        }
    };
}

payloads_from_form!(CreateStory, UpdateStory);
payloads_from_form!(CreatePage, UpdatePage);

#[derive(Debug)]
pub enum SaveError {
    Invalid(FieldErrors),
    Failed(ApiError),
}

impl From<garde::Report> for SaveError {
    fn from(report: garde::Report) -> Self {
        SaveError::Invalid(field_errors(&report))
    }
}

impl From<tcms_dal::Error> for SaveError {
    fn from(e: tcms_dal::Error) -> Self {
        SaveError::Failed(e.into())
    }
}

/// Both content repositories, admin routes pick one by [`Kind`]
pub struct Repositories {
    stories: StoryRepository,
    pages: PageRepository,
}

impl FromRequestParts<AppState> for Repositories {
    type Rejection = http::StatusCode;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Repositories {
            stories: StoryRepository::new(state.pool().clone()),
            pages: PageRepository::new(state.pool().clone()),
        })
    }
}

fn records<T: Into<ContentRecord>>(batch: Batch<T>) -> Batch<ContentRecord> {
    Batch {
        offset: batch.offset,
        limit: batch.limit,
        rows: batch.rows.into_iter().map(Into::into).collect(),
        total: batch.total,
    }
}

impl Repositories {
    pub async fn list(
        &self,
        kind: Kind,
        params: ListingParams,
    ) -> tcms_dal::error::Result<Batch<ContentRecord>> {
        match kind {
            Kind::Stories => self.stories.list(params).await.map(records),
            Kind::Pages => self.pages.list(params).await.map(records),
        }
    }

    pub async fn count(&self, kind: Kind, published: Option<bool>) -> tcms_dal::error::Result<u64> {
        match kind {
            Kind::Stories => self.stories.count(published).await,
            Kind::Pages => self.pages.count(published).await,
        }
    }

    pub async fn get(&self, kind: Kind, id: i64) -> tcms_dal::error::Result<ContentRecord> {
        match kind {
            Kind::Stories => self.stories.get(id).await.map(Into::into),
            Kind::Pages => self.pages.get(id).await.map(Into::into),
        }
    }

    pub async fn create(
        &self,
        kind: Kind,
        form: &ContentForm,
        user: &SessionUser,
    ) -> Result<ContentRecord, SaveError> {
        let record: ContentRecord = match kind {
            Kind::Stories => {
                let mut payload = CreateStory::from(form);
                payload.created_by = Some(user.email.clone());
                payload.validate()?;
                self.stories.create(payload).await?.into()
            }
            Kind::Pages => {
                let mut payload = CreatePage::from(form);
                payload.created_by = Some(user.email.clone());
                payload.validate()?;
                self.pages.create(payload).await?.into()
            }
        };
        Ok(record)
    }

    pub async fn update(
        &self,
        kind: Kind,
        id: i64,
        form: &ContentForm,
    ) -> Result<ContentRecord, SaveError> {
        let record: ContentRecord = match kind {
            Kind::Stories => {
                let payload = UpdateStory::from(form);
                payload.validate()?;
                self.stories.update(id, payload).await?.into()
            }
            Kind::Pages => {
                let payload = UpdatePage::from(form);
                payload.validate()?;
                self.pages.update(id, payload).await?.into()
            }
        };
        Ok(record)
    }

    pub async fn delete(&self, kind: Kind, id: i64) -> tcms_dal::error::Result<()> {
        match kind {
            Kind::Stories => self.stories.delete(id).await,
            Kind::Pages => self.pages.delete(id).await,
        }
    }
}
