//! Automatic instrumentation of command/event entry points.
//!
//! [`instrument`] wraps any asynchronous entry point: one INFO record when it
//! is invoked, one DEBUG record on success, one ERROR record (with the full
//! failure context) on failure. The original error is always returned
//! unchanged so upstream routing sees the exact failure it would have seen
//! without the wrapper.

use std::{fmt, future::Future, sync::Arc};

use super::context::LogContext;
use crate::Result;

/// What kind of entry point is being instrumented; picks the logger
/// namespace the records go to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Command,
    Event,
}

impl EntryKind {
    fn logger_name(self) -> &'static str {
        match self {
            EntryKind::Command => "bot.commands",
            EntryKind::Event => "bot.events",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            EntryKind::Command => "command",
            EntryKind::Event => "event",
        }
    }
}

/// Who triggered an entry point and from where.
#[derive(Clone, Debug)]
pub struct Invocation {
    /// Invoker identity, e.g. `user 483920 (alice)` or `system`.
    pub invoker: String,
    /// Originating scope, e.g. `chat -10012345` or `DM`.
    pub scope: String,
}

impl Invocation {
    pub fn new(invoker: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            invoker: invoker.into(),
            scope: scope.into(),
        }
    }
}

/// Run `fut` with invocation/success/failure records around it.
///
/// Errors pass through untouched; the wrapper observes, it never converts
/// one failure kind into another.
pub async fn instrument<T, E, Fut>(
    ctx: &Arc<LogContext>,
    kind: EntryKind,
    name: &str,
    invocation: &Invocation,
    fut: Fut,
) -> std::result::Result<T, E>
where
    Fut: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display + fmt::Debug,
{
    let log = ctx.logger(kind.logger_name());
    log.info(format!(
        "{} \"{name}\" invoked by {} in {}",
        kind.noun(),
        invocation.invoker,
        invocation.scope
    ));

    match fut.await {
        Ok(value) => {
            log.debug(format!("{} \"{name}\" completed successfully", kind.noun()));
            Ok(value)
        }
        Err(e) => {
            log.error_with_detail(
                format!("{} \"{name}\" failed: {e}", kind.noun()),
                format!("{e:?}"),
            );
            Err(e)
        }
    }
}

// ============== Trait-Level Decoration ==============

/// An asynchronous entry point as registered with the dispatcher.
#[async_trait::async_trait]
pub trait EntryPoint: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, invocation: &Invocation) -> Result<()>;
}

/// [`EntryPoint`] decorator adding instrumentation by delegation.
///
/// Composes with other decorators (permission checks, cooldowns) applied in
/// any order, and `name()` passes through so dispatchers that inspect the
/// entry point see the original identity.
pub struct Instrumented<H> {
    inner: H,
    kind: EntryKind,
    ctx: Arc<LogContext>,
}

impl<H> Instrumented<H> {
    pub fn new(ctx: Arc<LogContext>, kind: EntryKind, inner: H) -> Self {
        Self { inner, kind, ctx }
    }
}

#[async_trait::async_trait]
impl<H: EntryPoint> EntryPoint for Instrumented<H> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle(&self, invocation: &Invocation) -> Result<()> {
        instrument(
            &self.ctx,
            self.kind,
            self.inner.name(),
            invocation,
            self.inner.handle(invocation),
        )
        .await
    }
}
