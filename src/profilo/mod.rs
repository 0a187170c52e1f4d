use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::password::PasswordCodec;
use crate::profile::{
    models::{AdditionalData, PatchOp, UserProfile},
    pg::PgProfileStore,
    response::{ApiFeedback, ProfileListResponse, ProfileResponse},
    service::ProfileService,
};

pub mod handlers;

use self::handlers::{
    health::{self, __path_health},
    profile::{
        __path_delete_by_id, __path_get_by_id, __path_list, __path_patch, __path_update,
    },
    user_login::{self, __path_login},
    user_register::{self, __path_register},
};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        register,
        login,
        list,
        get_by_id,
        delete_by_id,
        patch,
        update
    ),
    components(schemas(
        health::Health,
        user_register::UserRegister,
        user_login::UserLogin,
        UserProfile,
        AdditionalData,
        PatchOp,
        ApiFeedback,
        ProfileResponse,
        ProfileListResponse
    )),
    tags(
        (name = "profilo", description = "User profile management API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let service: handlers::SharedProfileService = Arc::new(ProfileService::new(
        PgProfileStore::new(pool.clone()),
        PasswordCodec::default(),
    ));

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_origin(Any);

    let app = Router::new()
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route(
            "/profile",
            get(handlers::list).put(handlers::update),
        )
        .route(
            "/profile/:id",
            get(handlers::get_by_id)
                .delete(handlers::delete_by_id)
                .patch(handlers::patch),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(service)),
        )
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(Extension(pool))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;

            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
