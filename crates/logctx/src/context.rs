//! Request-scoped logger propagation.
//!
//! A [`Context`] is an immutable value with a typed logger slot. Every
//! derivation returns a new context; the one it came from keeps whatever it
//! carried before.

use std::future::Future;

use tracing::Span;

use crate::global::l;
use crate::logger::Logger;

tokio::task_local! {
    static CURRENT: Context;
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    logger: Option<Logger>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logger attached to this context, if any. Use [`logger`] to fall
    /// back to the global one.
    pub fn attached_logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Runs `fut` with this context as the task's ambient context.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT.scope(self, fut).await
    }

    pub fn sync_scope<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT.sync_scope(self, f)
    }

    /// The ambient context, or an empty one outside any scope.
    pub fn current() -> Context {
        CURRENT.try_with(Context::clone).unwrap_or_default()
    }
}

/// The logger carried by `ctx`, or the global logger when there is none.
pub fn logger(ctx: &Context) -> Logger {
    match &ctx.logger {
        Some(logger) => logger.clone(),
        None => l(),
    }
}

/// Derives a context carrying `logger`, shadowing any previous one.
pub fn with_logger(ctx: &Context, logger: Logger) -> Context {
    let mut derived = ctx.clone();
    derived.logger = Some(logger);
    derived
}

/// Derives a context carrying the current global logger.
pub fn with_default_logger(ctx: &Context) -> Context {
    with_logger(ctx, l())
}

/// Derives a context whose logger is `logger(ctx)` with extra fields.
///
/// `make_span` builds the span holding the fields; it gets the current
/// logger's span as parent. The [`with_fields!`](crate::with_fields) macro
/// covers the common case.
pub fn with_fields<F>(ctx: &Context, make_span: F) -> Context
where
    F: FnOnce(&Span) -> Span,
{
    with_logger(ctx, logger(ctx).child(make_span))
}

/// Attaches the logger of `src` (or the global one) to a context derived
/// from `dst`.
pub fn copy_logger_to_context(src: &Context, dst: &Context) -> Context {
    with_logger(dst, logger(src))
}

/// Derives a context whose logger carries the given `tracing` fields.
///
/// ```
/// let ctx = logctx::Context::new();
/// let ctx = logctx::with_fields!(&ctx, request_id = 42, tenant = "acme");
/// logctx::logger(&ctx).info("handled");
/// ```
#[macro_export]
macro_rules! with_fields {
    ($ctx:expr, $($field:tt)+) => {
        $crate::with_fields($ctx, |parent| {
            $crate::__private::tracing::info_span!(parent: parent, "fields", $($field)+)
        })
    };
}
