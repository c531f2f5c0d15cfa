use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use logctx::Context;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Default)]
struct AppState {
    next_request_id: AtomicU64,
    background_jobs: AtomicU64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = logctx::init("logctx-api");

    // Legacy `log` records land in the same structured output
    log::info!("log facade redirected");

    let addr = std::env::var("API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let state = Arc::new(AppState::default());

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/hello", get(hello))
        .merge(logctx::http::level_router("/log/level"))
        .layer(middleware::from_fn_with_state(state.clone(), attach_request_context))
        .with_state(state);

    logger.info(&format!("🚀 API listening on {addr}"));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Every request gets a context whose logger carries its id, method and path.
async fn attach_request_context(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = state.next_request_id.fetch_add(1, Ordering::Relaxed);
    let ctx = logctx::with_fields!(
        &Context::new(),
        request_id = request_id,
        method = %req.method(),
        path = %req.uri().path()
    );
    req.extensions_mut().insert(ctx.clone());

    ctx.scope(next.run(req)).await
}

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    level: String,
    encoding: &'static str,
}

async fn health_check() -> Json<HealthStatus> {
    let logger = logctx::logger(&Context::current());
    logger.debug("health probe");
    Json(HealthStatus {
        status: "OK".to_string(),
        level: logger.level().to_string(),
        encoding: logger.encoding(),
    })
}

#[derive(Serialize)]
struct Greeting {
    message: String,
    background_jobs: u64,
}

async fn hello(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<Context>,
) -> Json<Greeting> {
    let logger = logctx::logger(&ctx);
    logger.in_scope(|| tracing::info!(greeting = "hello", "📍 Greeting requested"));

    // The spawned task outlives the request, so it gets a fresh context that
    // only borrows the request's logger.
    let background = logctx::copy_logger_to_context(&ctx, &Context::new());
    let job_state = state.clone();
    tokio::spawn(background.scope(async move {
        let done = job_state.background_jobs.fetch_add(1, Ordering::Relaxed) + 1;
        logctx::logger(&Context::current())
            .in_scope(|| tracing::debug!(done, "background bookkeeping finished"));
    }));

    Json(Greeting {
        message: "hello".to_string(),
        background_jobs: state.background_jobs.load(Ordering::Relaxed),
    })
}
