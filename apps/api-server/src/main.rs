//! api-server — Local/self-hosted HTTP server for the todo list demo.
//!
//! Serves one page at `/`:
//! - `GET /` renders the stored list and an empty form.
//! - `POST /` accepts a plain form submission (`text=...`), appends the item,
//!   and re-renders. Blank input re-renders with a field error and status 200.
//!
//! Storage is a key-value namespace chosen at startup: in-memory, SQLite
//! (file, `sqlite` feature, default) or DynamoDB (`dynamo` feature).
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional
//! cargo run -p api-server
//!
//! # with Dynamo adapter enabled (requires env vars)
//! STORAGE_PROVIDER=dynamo DYNAMO_TABLE_KV=todolist-kv \
//!   cargo run -p api-server --features dynamo
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use domain::adapters::memory_store::InMemoryStore;
use domain::service::TodoListService;
use domain::{CoreError, KvStore};
use http_common::{render_error_page, render_todo_page, AddItemForm, FormState};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type SharedStore = Arc<dyn KvStore>;

#[derive(Clone)]
struct AppState {
    svc: Arc<TodoListService<SharedStore>>,
}

impl AppState {
    fn new(store: SharedStore) -> Self {
        Self {
            svc: Arc::new(TodoListService::new(store)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_ephemeral();

    let store = match build_store(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!(err = %e, provider = ?cfg.storage_provider, "failed to bind key-value store");
            std::process::exit(1);
        }
    };
    let app = build_router(AppState::new(store));

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, namespace = %cfg.kv_namespace, "api-server listening");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, err = %e, "bind failed");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!(err = %e, "server error");
        std::process::exit(1);
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Bind the key-value namespace selected by config.
fn build_store(cfg: &config::Config) -> Result<SharedStore, CoreError> {
    match cfg.storage_provider {
        config::StorageProvider::Memory => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => {
            let kv = match &cfg.db_path {
                Some(path) => {
                    if let Some(dir) = path.parent() {
                        let _ = std::fs::create_dir_all(dir);
                    }
                    sqlite_adapter::SqliteKv::new(path, cfg.kv_namespace.clone())?
                }
                None => sqlite_adapter::SqliteKv::from_env(cfg.kv_namespace.clone())?,
            };
            Ok(Arc::new(kv))
        }
        #[cfg(feature = "dynamo")]
        config::StorageProvider::Dynamo => {
            let table = cfg
                .dynamo_table
                .clone()
                .ok_or_else(|| CoreError::StoreUnavailable("missing DYNAMO_TABLE_KV".into()))?;
            Ok(Arc::new(aws_dynamo::DynamoKv::new(table)?))
        }
        #[allow(unreachable_patterns)]
        ref other => Err(CoreError::StoreUnavailable(format!(
            "{:?} storage not compiled in",
            other
        ))),
    }
}

fn build_router(state: AppState) -> Router {
    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    Router::new()
        .route("/", get(show_list).post(add_item))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .with_state(state)
}

async fn show_list(State(state): State<AppState>) -> Response {
    render_page(&state, FormState::cleared())
}

// Decoded with the shared form reader so every hosting surface agrees on
// duplicate fields, missing fields and bad escapes.
async fn add_item(State(state): State<AppState>, body: Bytes) -> Response {
    let form = AddItemForm::from_body(&body);
    match state.svc.add_item(&form.text) {
        Ok(ack) => {
            info!(text_len = ack.item.text().len(), "todo added");
            render_page(&state, FormState::cleared())
        }
        Err(CoreError::Validation(msg)) => {
            warn!(reason = %msg, "todo rejected");
            render_page(&state, FormState::rejected(form.text, msg))
        }
        Err(e) => {
            error!(err = ?e, "add todo failed");
            store_failure()
        }
    }
}

// Load the list and render it with the given form state.
fn render_page(state: &AppState, form: FormState) -> Response {
    match state.svc.load_list() {
        Ok(items) => {
            info!(count = items.len(), "todo list loaded");
            (StatusCode::OK, Html(render_todo_page(&items, &form))).into_response()
        }
        Err(e) => {
            error!(err = ?e, "load todo list failed");
            store_failure()
        }
    }
}

fn store_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(render_error_page())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use domain::TODOS_KEY;
    use tower::util::ServiceExt;

    struct DownStore;
    impl KvStore for DownStore {
        fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
            Err(CoreError::StoreUnavailable("connection refused".into()))
        }
        fn put(&self, _key: &str, _value: String) -> Result<(), CoreError> {
            Err(CoreError::StoreUnavailable("connection refused".into()))
        }
    }

    fn app_with(store: SharedStore) -> Router {
        build_router(AppState::new(store))
    }

    fn post_form(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_page() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn empty_store_renders_empty_state() {
        let router = app_with(Arc::new(InMemoryStore::new()));
        let resp = router.oneshot(get_page()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("x-request-id").is_some());
        let html = body_text(resp).await;
        assert!(html.contains("No items found"));
    }

    #[tokio::test]
    async fn add_and_list_flow() {
        let store = Arc::new(InMemoryStore::new());
        let router = app_with(store.clone());

        let resp = router.clone().oneshot(post_form("text=Buy+milk")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("<li>Buy milk</li>"));
        // Form is cleared after success
        assert!(html.contains(r#"name="text" value="""#));

        let resp = router.clone().oneshot(post_form("text=%20%20B%20")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = router.oneshot(get_page()).await.unwrap();
        let html = body_text(resp).await;
        let a = html.find("<li>Buy milk</li>").expect("first item");
        let b = html.find("<li>B</li>").expect("second item");
        assert!(a < b);
        assert_eq!(
            store.get(TODOS_KEY).unwrap().as_deref(),
            Some(r#"[{"text":"Buy milk"},{"text":"B"}]"#)
        );
    }

    #[tokio::test]
    async fn blank_submission_rerenders_with_error() {
        let store = Arc::new(InMemoryStore::new());
        store.put(TODOS_KEY, r#"[{"text":"A"}]"#.into()).unwrap();
        let router = app_with(store.clone());

        for body in ["text=", "text=+++", ""] {
            let resp = router.clone().oneshot(post_form(body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let html = body_text(resp).await;
            assert!(html.contains(r#"role="alert""#));
            assert!(html.contains("<li>A</li>"));
        }
        assert_eq!(
            store.get(TODOS_KEY).unwrap().as_deref(),
            Some(r#"[{"text":"A"}]"#)
        );
    }

    #[tokio::test]
    async fn duplicate_field_takes_first_value() {
        let store = Arc::new(InMemoryStore::new());
        let router = app_with(store.clone());

        let resp = router.oneshot(post_form("text=a&text=b")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("<li>a</li>"));
        assert!(!html.contains("<li>b</li>"));
        assert_eq!(
            store.get(TODOS_KEY).unwrap().as_deref(),
            Some(r#"[{"text":"a"}]"#)
        );
    }

    #[tokio::test]
    async fn invalid_escape_is_kept_raw() {
        let store = Arc::new(InMemoryStore::new());
        let router = app_with(store.clone());

        let resp = router.oneshot(post_form("text=%FF")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            store.get(TODOS_KEY).unwrap().as_deref(),
            Some(r#"[{"text":"%FF"}]"#)
        );
    }

    #[tokio::test]
    async fn store_failure_is_500_not_empty_list() {
        let router = app_with(Arc::new(DownStore));

        let resp = router.clone().oneshot(get_page()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = body_text(resp).await;
        assert!(!html.contains("No items found"));
        assert!(!html.contains("connection refused"));

        let resp = router.oneshot(post_form("text=A")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn memory_provider_builds() {
        let cfg = config::Config::from_lookup(|name| match name {
            "STORAGE_PROVIDER" => Some("memory".into()),
            _ => None,
        })
        .unwrap();
        let store = build_store(&cfg).unwrap();
        assert!(store.get(TODOS_KEY).unwrap().is_none());
    }
}
