//! Plugins: extensions notified of framework lifecycle phases.

use crate::context::Context;
use crate::error::HandlerResult;
use async_trait::async_trait;

/// A framework extension.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique name. Registering a second plugin with the same name replaces the first.
    fn name(&self) -> &str;

    /// Short description.
    fn description(&self) -> &str {
        ""
    }

    /// Version string.
    fn version(&self) -> &str;

    /// Called after units are loaded and before the client logs in.
    async fn on_preparing(&self, _ctx: &Context) -> HandlerResult {
        Ok(())
    }

    /// Called once the client is ready and commands are patched.
    async fn on_ready(&self, _ctx: &Context) -> HandlerResult {
        Ok(())
    }

    /// Called when the framework shuts down.
    async fn on_destroy(&self, _ctx: &Context) -> HandlerResult {
        Ok(())
    }
}
