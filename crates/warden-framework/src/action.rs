//! Actions: units answering button, select menu and modal interactions.

use crate::context::Context;
use crate::error::{DispatchError, HandlerResult, Surface, UnitKind, ValidationError};
use crate::events::{ActionPayload, Event};
use crate::input::{Component, ComponentKind};
use crate::precondition::{Precondition, PreconditionContainer};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use validator::{Validate, ValidationError as FieldError, ValidationErrors};

/// Component handler.
pub type ComponentHandler = Arc<dyn Fn(Context, Component) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Declarative options of an action.
#[derive(Debug, Clone, Validate)]
pub struct ActionOptions {
    /// Id matched against the first segment of a component custom id.
    #[validate(length(min = 1, max = 100, message = "Action id must be 1 to 100 characters"))]
    pub id: String,
    /// Guards run before any handler.
    pub preconditions: PreconditionContainer,
}

#[derive(Clone, Default)]
struct Handlers {
    button: Option<ComponentHandler>,
    select_menu: Option<ComponentHandler>,
    modal_submit: Option<ComponentHandler>,
}

/// A declared action.
#[derive(Clone)]
pub struct Action {
    options: ActionOptions,
    handlers: Handlers,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.options.id)
            .field("preconditions", &self.options.preconditions)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Starts an action with the given id.
    pub fn builder(id: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            options: ActionOptions {
                id: id.into(),
                preconditions: PreconditionContainer::new(),
            },
            handlers: Handlers::default(),
        }
    }

    /// Action id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.options.id
    }

    /// Guards of this action.
    #[must_use]
    pub const fn preconditions(&self) -> &PreconditionContainer {
        &self.options.preconditions
    }

    /// Runs guards then the handler matching the component kind.
    pub fn handle(self: Arc<Self>, ctx: Context, component: Component) -> BoxFuture<'static, Result<(), DispatchError>> {
        Box::pin(async move {
            let payload = ActionPayload::new(component.clone(), Arc::clone(&self));
            match self.options.preconditions.action_run(&ctx, &component, &self).await {
                Ok(()) => ctx.emit(Event::ActionPreconditionPass(payload)).await,
                Err(failure) => {
                    debug!(action = %self.options.id, identifier = %failure.identifier, "Precondition failed");
                    ctx.emit(Event::ActionPreconditionFail(payload, failure)).await;
                    return Ok(());
                }
            }

            let (surface, handler) = match component.kind {
                ComponentKind::Button => (Surface::Button, self.handlers.button.clone()),
                ComponentKind::SelectMenu => (Surface::SelectMenu, self.handlers.select_menu.clone()),
                ComponentKind::ModalSubmit => (Surface::ModalSubmit, self.handlers.modal_submit.clone()),
            };
            let handler = handler.ok_or_else(|| DispatchError::MissingHandler {
                unit: UnitKind::Action,
                name: self.options.id.clone(),
                surface,
            })?;
            handler(ctx, component).await.map_err(DispatchError::Handler)
        })
    }
}

/// Builder for [`Action`].
#[must_use]
pub struct ActionBuilder {
    options: ActionOptions,
    handlers: Handlers,
}

fn boxed<F, Fut>(handler: F) -> ComponentHandler
where
    F: Fn(Context, Component) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Context, component: Component| -> BoxFuture<'static, HandlerResult> {
        Box::pin(handler(ctx, component))
    })
}

impl ActionBuilder {
    /// Appends a guard.
    pub fn precondition<P: Precondition + 'static>(mut self, precondition: P) -> Self {
        self.options.preconditions.add(precondition);
        self
    }

    /// Button handler.
    pub fn on_button<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, Component) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.button = Some(boxed(handler));
        self
    }

    /// Select menu handler.
    pub fn on_select_menu<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, Component) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.select_menu = Some(boxed(handler));
        self
    }

    /// Modal submit handler.
    pub fn on_modal_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, Component) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.modal_submit = Some(boxed(handler));
        self
    }

    /// Validates the options and builds the action.
    pub fn build(self) -> Result<Action, ValidationError> {
        let mut errors = self.options.validate().err().unwrap_or_else(ValidationErrors::new);
        if self.handlers.button.is_none()
            && self.handlers.select_menu.is_none()
            && self.handlers.modal_submit.is_none()
        {
            errors.add("handlers", FieldError::new("no_handlers"));
        }
        if !errors.errors().is_empty() {
            return Err(ValidationError::new(self.options.id, errors));
        }

        Ok(Action {
            options: self.options,
            handlers: self.handlers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_length() {
        let err = Action::builder("x".repeat(101))
            .on_button(|_, _| async { Ok(()) })
            .build()
            .expect_err("too long");
        assert_eq!(err.fields(), vec!["id"]);

        let err = Action::builder("").on_button(|_, _| async { Ok(()) }).build().expect_err("empty");
        assert_eq!(err.fields(), vec!["id"]);
    }

    #[test]
    fn test_requires_a_handler() {
        let err = Action::builder("confirm").build().expect_err("no handler");
        assert_eq!(err.codes("handlers"), vec!["no_handlers".to_string()]);
    }

    #[test]
    fn test_build() {
        let action = Action::builder("confirm")
            .on_select_menu(|_, _| async { Ok(()) })
            .build()
            .expect("valid");
        assert_eq!(action.id(), "confirm");
        assert!(action.preconditions().is_empty());
    }
}
