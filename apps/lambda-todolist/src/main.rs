//! lambda-todolist — AWS Lambda entrypoint serving the todo list page.
//!
//! Purpose
//! - Handle API Gateway HTTP API (v2) events for the single todo list route.
//! - `GET` renders the list; `POST` takes a form submission (`text=...`),
//!   appends via `TodoListService`, and re-renders.
//! - The key-value namespace is the DynamoDB table named by
//!   `DYNAMO_TABLE_KV`; without it the function fails at init.
//!
//! Notes
//! - The route is matched on method only; API Gateway decides which paths
//!   reach this function (stage prefixes are irrelevant here).
//! - `HEAD` gets the same status and headers as `GET` with an empty body.
//! - It initializes `tracing` logging compatible with Lambda CloudWatch;
//!   `LOG_FORMAT=json` switches to JSON lines.

use std::sync::Arc;

use aws_dynamo::DynamoKv;
use domain::service::TodoListService;
use domain::{CoreError, KvStore};
use http_common::lambda::{html_resp, method_not_allowed};
use http_common::{render_error_page, render_todo_page, AddItemForm, FormState};
use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    // Bind the store from env; if it fails, crash early to surface misconfiguration.
    let store = DynamoKv::from_env().map_err(|e| format!("dynamo init error: {e}"))?;
    info!(table = %store.table(), "todo list store bound");
    let svc = Arc::new(TodoListService::new(store));

    let handler = service_fn(move |req: Request| {
        let svc = svc.clone();
        async move { handle_request(&svc, req).await }
    });
    run(handler).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs(std::env::var("LOG_FORMAT").ok().as_deref()) {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(fmt::time::SystemTime)
                    .with_writer(std::io::stdout),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
            .init();
    }
}

fn json_logs(log_format: Option<&str>) -> bool {
    log_format.is_some_and(|s| s.eq_ignore_ascii_case("json"))
}

async fn handle_request<S: KvStore>(
    svc: &TodoListService<S>,
    req: Request,
) -> Result<Response<Body>, Error> {
    let response = match *req.method() {
        Method::GET => render_page(svc, FormState::cleared()),
        Method::HEAD => without_body(render_page(svc, FormState::cleared())),
        Method::POST => {
            let form = AddItemForm::from_body(req.body());
            match svc.add_item(&form.text) {
                Ok(ack) => {
                    info!(text_len = ack.item.text().len(), "todo added");
                    render_page(svc, FormState::cleared())
                }
                Err(CoreError::Validation(msg)) => {
                    warn!(reason = %msg, "todo rejected");
                    render_page(svc, FormState::rejected(form.text, msg))
                }
                Err(e) => {
                    error!(err = ?e, "add todo failed");
                    html_resp(500, render_error_page())
                }
            }
        }
        _ => {
            warn!(method = %req.method(), "method not allowed");
            method_not_allowed()
        }
    };
    Ok(response)
}

fn without_body(resp: Response<Body>) -> Response<Body> {
    let (parts, _) = resp.into_parts();
    Response::from_parts(parts, Body::Empty)
}

fn render_page<S: KvStore>(svc: &TodoListService<S>, form: FormState) -> Response<Body> {
    match svc.load_list() {
        Ok(items) => {
            info!(count = items.len(), "todo list loaded");
            html_resp(200, render_todo_page(&items, &form))
        }
        Err(e) => {
            error!(err = ?e, "load todo list failed");
            html_resp(500, render_error_page())
        }
    }
}
