//! Listeners: handlers subscribed to a framework event.

use crate::context::Context;
use crate::error::HandlerResult;
use crate::events::{Event, EventKind};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A handler subscribed to one event kind.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Name used in logs and outcome events.
    fn name(&self) -> &str;

    /// Event kind this listener subscribes to.
    fn event(&self) -> EventKind;

    /// Whether the listener detaches after its first run.
    fn once(&self) -> bool {
        false
    }

    /// Handles one event.
    async fn run(&self, ctx: Context, event: Event) -> HandlerResult;
}

type ListenerFn = Arc<dyn Fn(Context, Event) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// A listener backed by a closure.
#[derive(Clone)]
pub struct FnListener {
    name: String,
    event: EventKind,
    once: bool,
    handler: ListenerFn,
}

impl fmt::Debug for FnListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .field("event", &self.event)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

impl FnListener {
    /// A listener running `handler` for every `event`.
    pub fn new<F, Fut>(name: impl Into<String>, event: EventKind, handler: F) -> Self
    where
        F: Fn(Context, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            event,
            once: false,
            handler: Arc::new(move |ctx: Context, event: Event| -> BoxFuture<'static, HandlerResult> {
                Box::pin(handler(ctx, event))
            }),
        }
    }

    /// Detaches after the first run.
    #[must_use]
    pub const fn fire_once(mut self) -> Self {
        self.once = true;
        self
    }
}

#[async_trait]
impl Listener for FnListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn event(&self) -> EventKind {
        self.event
    }

    fn once(&self) -> bool {
        self.once
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        (self.handler)(ctx, event).await
    }
}
