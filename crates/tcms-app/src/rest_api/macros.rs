/// REST handlers for a content entity, expects `$entity`, `Create$entity`,
/// `Update$entity` and `$entity Repository` in scope of the calling module
#[macro_export]
macro_rules! crud_api {
    ($entity:ident) => {
        type EntityRepository = paste::paste! {[<$entity Repository>]};
        $crate::repository_from_request!(EntityRepository);

        pub mod crud_api {
            use super::*;
            use $crate::auth::SessionUser;
            use $crate::error::{ApiError, ApiResult};
            use $crate::rest_api::{Page as ListPage, Paging};
            use $crate::state::AppState;
            use $crate::validate::Garde;
            use axum::{
                extract::{Path, Query, State},
                response::IntoResponse,
                Json,
            };
            use http::StatusCode;
            use tracing::debug;

            type CreateEntity = paste::paste! {[<Create $entity>]};
            type UpdateEntity = paste::paste! {[<Update $entity>]};

            #[derive(serde::Deserialize)]
            #[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
            #[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
            pub struct CountFilter {
                published: Option<bool>,
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = stringify!($entity), operation_id = concat!("list", stringify!($entity)),
            params(Paging), responses((status = StatusCode::OK, description = "List paginated", body = ListPage<$entity>))))]
            pub async fn list(
                repository: EntityRepository,
                State(state): State<AppState>,
                Garde(Query(paging)): Garde<Query<Paging>>,
            ) -> ApiResult<impl IntoResponse> {
                let default_page_size: u32 = state.config().default_page_size;
                let page_size = paging.page_size(default_page_size);
                let listing_params = paging.into_listing_params(default_page_size)?;
                let batch = repository.list(listing_params).await?;
                Ok((StatusCode::OK, Json(ListPage::try_from_batch(batch, page_size)?)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/count", tag = stringify!($entity), operation_id = concat!("count", stringify!($entity)),
            params(CountFilter), responses((status = StatusCode::OK, description = "Count", body = u64))))]
            pub async fn count(
                repository: EntityRepository,
                Query(filter): Query<CountFilter>,
            ) -> ApiResult<impl IntoResponse> {
                let count = repository.count(filter.published).await?;
                Ok((StatusCode::OK, Json(count)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = stringify!($entity), operation_id = concat!("get", stringify!($entity)),
            responses((status = StatusCode::OK, description = "Get one", body = $entity))))]
            pub async fn get(
                Path(id): Path<i64>,
                repository: EntityRepository,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.get(id).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = stringify!($entity), operation_id = concat!("create", stringify!($entity)),
            responses((status = StatusCode::OK, description = concat!("Created ", stringify!($entity)), body = $entity))))]
            pub async fn create(
                repository: EntityRepository,
                user: SessionUser,
                Garde(Json(mut payload)): Garde<Json<CreateEntity>>,
            ) -> ApiResult<impl IntoResponse> {
                payload.created_by = Some(user.email);
                let record = repository.create(payload).await?;
                debug!("Created {} {}", stringify!($entity), record.id);

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = stringify!($entity), operation_id = concat!("update", stringify!($entity)),
            responses((status = StatusCode::OK, description = concat!("Updated ", stringify!($entity)), body = $entity))))]
            pub async fn update(
                Path(id): Path<i64>,
                repository: EntityRepository,
                Garde(Json(payload)): Garde<Json<UpdateEntity>>,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.update(id, payload).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = stringify!($entity), operation_id = concat!("delete", stringify!($entity))))]
            pub async fn delete(
                Path(id): Path<i64>,
                repository: EntityRepository,
                State(state): State<AppState>,
            ) -> ApiResult<impl IntoResponse> {
                if !state.config().service_role_configured {
                    return Err(ApiError::Forbidden(
                        "Privileged credential is not configured".to_string(),
                    ));
                }
                repository.delete(id).await?;

                Ok((StatusCode::NO_CONTENT, ()))
            }

            #[cfg(feature = "openapi")]
            #[derive(utoipa::OpenApi)]
            #[openapi(paths(list, count, get, delete, update, create))]
            pub struct ApiDocs;
        }

        pub fn router() -> axum::Router<$crate::state::AppState> {
            use axum::routing::get;
            let router = axum::Router::new()
                .route("/", get(crud_api::list).post(crud_api::create))
                .route("/count", get(crud_api::count))
                .route(
                    "/{id}",
                    get(crud_api::get)
                        .put(crud_api::update)
                        .patch(crud_api::update)
                        .delete(crud_api::delete),
                );
            $crate::guard::protect_api(router)
        }
    };
}
