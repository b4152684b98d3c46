//! Content entities (stories, pages) share same shape, validation rules and
//! repository, only the table differs. [`content_entity!`] generates
//! the create/update payloads, the entity and its repository.

/// Columns returned by every read, internal columns (like `created_by`) are not exposed
pub const PROJECTION: &str =
    "id, title, slug, summary, body, published, cover_image, images, created_at, updated_at";

pub const VALID_ORDER_FIELDS: &[&str] = &[
    "id",
    "title",
    "slug",
    "published",
    "created_at",
    "updated_at",
];

pub const MAX_IMAGE_REF_LEN: usize = 2048;

pub fn validate_images(images: &Option<Vec<String>>, _ctx: &()) -> garde::Result {
    if let Some(images) = images {
        for (idx, image) in images.iter().enumerate() {
            if image.trim().is_empty() {
                return Err(garde::Error::new(format!("image {idx} is empty")));
            }
            if image.len() > MAX_IMAGE_REF_LEN {
                return Err(garde::Error::new(format!(
                    "image {idx} is longer than {MAX_IMAGE_REF_LEN}"
                )));
            }
        }
    }
    Ok(())
}

/// Optional columns of a content record which can be reset to NULL on update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clear {
    pub summary: bool,
    pub body: bool,
    /// Back to cover image fallback
    pub images: bool,
}

impl Clear {
    pub fn is_empty(&self) -> bool {
        !(self.summary || self.body || self.images)
    }
}

#[macro_export]
macro_rules! content_entity {
    (
        entity: $entity:ident,
        create: $create:ident,
        update: $update:ident,
        repository: $repo:ident,
        repository_impl: $repo_impl:ident,
        table: $table:literal $(,)?
    ) => {
        use futures::{StreamExt as _, TryStreamExt as _};
        use garde::Validate;
        use serde::{Deserialize, Serialize};
        use sqlx::Acquire as _;
        use $crate::content::{PROJECTION, VALID_ORDER_FIELDS};

        const TABLE: &str = $table;

        #[derive(Debug, Serialize, Deserialize, Clone, Validate)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $create {
            // missing title/slug are reported by validation together with other fields
            #[serde(default)]
            #[garde(length(chars, min = 1, max = 200))]
            pub title: String,
            #[serde(default)]
            #[garde(length(chars, min = 1, max = 200), pattern(r"^(?i)[a-z0-9-]+$"))]
            pub slug: String,
            #[garde(length(chars, max = 500))]
            pub summary: Option<String>,
            #[garde(skip)]
            pub body: Option<String>,
            #[garde(skip)]
            pub published: Option<bool>,
            #[garde(length(min = 1, max = 2048))]
            pub cover_image: Option<String>,
            #[garde(custom(crate::content::validate_images))]
            pub images: Option<Vec<String>>,
            /// Filled from session, never from payload
            #[serde(skip)]
            #[garde(skip)]
            pub created_by: Option<String>,
        }

        /// Partial update - absent fields are left untouched
        #[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $update {
            #[garde(length(chars, min = 1, max = 200))]
            pub title: Option<String>,
            #[garde(length(chars, min = 1, max = 200), pattern(r"^(?i)[a-z0-9-]+$"))]
            pub slug: Option<String>,
            #[garde(length(chars, max = 500))]
            pub summary: Option<String>,
            #[garde(skip)]
            pub body: Option<String>,
            #[garde(skip)]
            pub published: Option<bool>,
            #[garde(length(min = 1, max = 2048))]
            pub cover_image: Option<String>,
            #[garde(custom(crate::content::validate_images))]
            pub images: Option<Vec<String>>,
            /// Columns to set to NULL, applies only when the field above is absent.
            /// Used by forms which submit whole record (empty input means no value)
            #[serde(skip)]
            #[garde(skip)]
            pub clear: $crate::content::Clear,
        }

        impl $update {
            pub fn is_empty(&self) -> bool {
                self.title.is_none()
                    && self.slug.is_none()
                    && self.summary.is_none()
                    && self.body.is_none()
                    && self.published.is_none()
                    && self.cover_image.is_none()
                    && self.images.is_none()
                    && self.clear.is_empty()
            }
        }

        #[derive(Debug, Serialize, Deserialize, Clone)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $entity {
            pub id: i64,
            pub title: String,
            pub slug: String,
            pub summary: Option<String>,
            pub body: Option<String>,
            pub published: bool,
            pub cover_image: Option<String>,
            pub images: Vec<String>,
            /// Gallery as stored, without cover fallback
            #[serde(skip)]
            pub stored_images: Vec<String>,
            pub created_at: time::OffsetDateTime,
            pub updated_at: time::OffsetDateTime,
        }

        #[derive(Debug, sqlx::FromRow)]
        struct Row {
            id: i64,
            title: String,
            slug: String,
            summary: Option<String>,
            body: Option<String>,
            published: bool,
            cover_image: Option<String>,
            images: Option<String>,
            created_at: time::OffsetDateTime,
            updated_at: time::OffsetDateTime,
        }

        fn from_row(row: Row) -> $entity {
            let stored = $crate::images::parse_stored(row.images.as_deref());
            let images =
                $crate::images::normalize_images(stored.as_ref(), row.cover_image.as_deref());
            let stored_images = $crate::images::normalize_images(stored.as_ref(), None);
            $entity {
                id: row.id,
                title: row.title,
                slug: row.slug,
                summary: row.summary,
                body: row.body,
                published: row.published,
                cover_image: row.cover_image,
                images,
                stored_images,
                created_at: row.created_at,
                updated_at: row.updated_at,
            }
        }

        pub type $repo = $repo_impl<sqlx::Pool<$crate::ChosenDB>>;

        pub struct $repo_impl<E> {
            executor: E,
        }

        impl<'c, E> $repo_impl<E>
        where
            for<'a> &'a E: sqlx::Executor<'c, Database = $crate::ChosenDB>
                + sqlx::Acquire<'c, Database = $crate::ChosenDB>,
        {
            pub fn new(executor: E) -> Self {
                Self { executor }
            }

            pub async fn create(&self, payload: $create) -> $crate::error::Result<$entity> {
                let now = time::OffsetDateTime::now_utc();
                let images = $crate::images::to_stored(payload.images.as_deref())?;
                let insert_cmd = format!(
                    "INSERT INTO {TABLE} (title, slug, summary, body, published, cover_image, images, created_by, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                );
                let result = sqlx::query(&insert_cmd)
                    .bind(&payload.title)
                    .bind(&payload.slug)
                    .bind(&payload.summary)
                    .bind(&payload.body)
                    .bind(payload.published.unwrap_or(false))
                    .bind(&payload.cover_image)
                    .bind(images)
                    .bind(&payload.created_by)
                    .bind(now)
                    .bind(now)
                    .execute(&self.executor)
                    .await
                    .map_err(|e| $crate::Error::from_write(e, stringify!($entity)))?;

                let id = result.last_insert_rowid();
                tracing::debug!("Created {} {id}", stringify!($entity));
                self.get(id).await
            }

            pub async fn update(
                &self,
                id: i64,
                payload: $update,
            ) -> $crate::error::Result<$entity> {
                let images = $crate::images::to_stored(payload.images.as_deref())?;
                let mut query =
                    sqlx::QueryBuilder::<$crate::ChosenDB>::new(format!("UPDATE {TABLE} SET "));
                {
                    let mut fields = query.separated(", ");
                    if let Some(title) = payload.title {
                        fields.push("title = ").push_bind_unseparated(title);
                    }
                    if let Some(slug) = payload.slug {
                        fields.push("slug = ").push_bind_unseparated(slug);
                    }
                    if let Some(summary) = payload.summary {
                        fields.push("summary = ").push_bind_unseparated(summary);
                    } else if payload.clear.summary {
                        fields.push("summary = NULL");
                    }
                    if let Some(body) = payload.body {
                        fields.push("body = ").push_bind_unseparated(body);
                    } else if payload.clear.body {
                        fields.push("body = NULL");
                    }
                    if let Some(published) = payload.published {
                        fields.push("published = ").push_bind_unseparated(published);
                    }
                    if let Some(cover_image) = payload.cover_image {
                        fields.push("cover_image = ").push_bind_unseparated(cover_image);
                    }
                    if let Some(images) = images {
                        fields.push("images = ").push_bind_unseparated(images);
                    } else if payload.clear.images {
                        fields.push("images = NULL");
                    }
                    fields
                        .push("updated_at = ")
                        .push_bind_unseparated(time::OffsetDateTime::now_utc());
                }
                query.push(" WHERE id = ").push_bind(id);

                let mut transaction = self.executor.begin().await?;
                let result = query
                    .build()
                    .execute(&mut *transaction)
                    .await
                    .map_err(|e| $crate::Error::from_write(e, stringify!($entity)))?;

                if result.rows_affected() == 0 {
                    Err($crate::Error::RecordNotFound(stringify!($entity).to_string()))
                } else {
                    let record = get(id, &mut *transaction).await?;
                    transaction.commit().await?;
                    Ok(record)
                }
            }

            pub async fn count(&self, published: Option<bool>) -> $crate::error::Result<u64> {
                let mut query = sqlx::QueryBuilder::<$crate::ChosenDB>::new(format!(
                    "SELECT count(*) FROM {TABLE}"
                ));
                if let Some(published) = published {
                    query.push(" WHERE published = ").push_bind(published);
                }
                let count = query
                    .build_query_scalar::<i64>()
                    .fetch_one(&self.executor)
                    .await?;
                Ok(count as u64)
            }

            pub async fn list(
                &self,
                params: $crate::ListingParams,
            ) -> $crate::error::Result<$crate::Batch<$entity>> {
                let order = params.ordering(VALID_ORDER_FIELDS)?;
                let mut query = sqlx::QueryBuilder::<$crate::ChosenDB>::new(format!(
                    "SELECT {PROJECTION} FROM {TABLE}"
                ));
                if let Some(published) = params.published {
                    query.push(" WHERE published = ").push_bind(published);
                }
                if order.is_empty() {
                    query.push(" ORDER BY id");
                } else {
                    query.push(" ORDER BY ").push(order);
                }
                query
                    .push(" LIMIT ")
                    .push_bind(params.limit)
                    .push(" OFFSET ")
                    .push_bind(params.offset);

                let rows = query
                    .build_query_as::<Row>()
                    .fetch(&self.executor)
                    .take($crate::MAX_LIMIT)
                    .map_ok(from_row)
                    .try_collect::<Vec<_>>()
                    .await?;
                let total = self.count(params.published).await?;
                Ok($crate::Batch {
                    offset: params.offset,
                    limit: params.limit,
                    rows,
                    total,
                })
            }

            pub async fn delete(&self, id: i64) -> $crate::error::Result<()> {
                let res = sqlx::query(&format!("DELETE FROM {TABLE} WHERE id = ?"))
                    .bind(id)
                    .execute(&self.executor)
                    .await?;

                if res.rows_affected() == 0 {
                    Err($crate::Error::RecordNotFound(stringify!($entity).to_string()))
                } else {
                    Ok(())
                }
            }

            pub async fn get(&self, id: i64) -> $crate::error::Result<$entity> {
                get(id, &self.executor).await
            }

            pub async fn get_by_slug(&self, slug: &str) -> $crate::error::Result<$entity> {
                let row = sqlx::query_as::<_, Row>(&format!(
                    "SELECT {PROJECTION} FROM {TABLE} WHERE slug = ?"
                ))
                .bind(slug)
                .fetch_one(&self.executor)
                .await
                .map_err(|e| $crate::Error::from_read(e, stringify!($entity)))?;
                Ok(from_row(row))
            }
        }

        async fn get<'c, E>(id: i64, executor: E) -> $crate::error::Result<$entity>
        where
            E: sqlx::Executor<'c, Database = $crate::ChosenDB>,
        {
            let row = sqlx::query_as::<_, Row>(&format!(
                "SELECT {PROJECTION} FROM {TABLE} WHERE id = ?"
            ))
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| $crate::Error::from_read(e, stringify!($entity)))?;
            Ok(from_row(row))
        }
    };
}
