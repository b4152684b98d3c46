use std::any::Any;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::build_state;
use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use futures::FutureExt;
use serde_json::json;
use tcms_app::{
    auth::{auth_router, session_layer},
    debug::stories_images,
    service_role::service_role_exists,
    state::AppState,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state, &args)?;

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

    #[derive(utoipa::OpenApi)]
    #[openapi(modifiers(&SecurityAddon), security(("session" = [])))]
    struct OpenApi;

    struct SecurityAddon;

    impl utoipa::Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    tcms_app::auth::SESSION_COOKIE_NAME,
                ))),
            );
        }
    }

    use utoipa::OpenApi as _;
    OpenApi::openapi().merge_from(tcms_app::rest_api::api_docs())
}

pub fn main_router(state: AppState, config: &ServerConfig) -> Result<Router<()>> {
    let expiry = time::Duration::try_from(config.session_expiry)?;
    let sessions = session_layer(config.secure_cookies(), expiry);

    #[allow(unused_mut)]
    let mut router = Router::new()
        // guarded inside
        .nest("/api/stories", tcms_app::rest_api::story::router())
        .nest("/api/pages", tcms_app::rest_api::page::router())
        .merge(tcms_app::admin::router())
        // public
        .route("/api/service-role-exists", get(service_role_exists))
        .route("/api/debug/stories-images", get(stories_images))
        .nest("/auth", auth_router())
        .merge(tcms_app::reader::router())
        .route("/", get(|| async { Redirect::to("/stories") }))
        .layer(sessions)
        .with_state(state)
        .route("/health", get(health));

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs();
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }

    Ok(router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic)))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Request handler panicked: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal server error"})),
    )
        .into_response()
}
