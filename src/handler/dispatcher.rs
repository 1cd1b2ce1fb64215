//! Dispatcher - fan-out of one message type to its registered handlers.

use std::sync::Arc;

use super::{DelegatedHandler, Handler, HandlerError};

/// Registry of handlers for messages of type `M`.
///
/// Handlers run in registration order. A handler that is already registered
/// (same wrapped callable) is not added twice.
pub struct Dispatcher<M> {
    handlers: Vec<DelegatedHandler<M>>,
}

impl<M: 'static> Default for Dispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static> Dispatcher<M> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler closure. Uses builder pattern; returns `self` for
    /// chaining.
    pub fn handler<F>(mut self, callback: F) -> Self
    where
        F: Fn(&M) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(DelegatedHandler::new(callback));
        self
    }

    /// Register a delegated handler. Returns `false` if an equal handler is
    /// already registered.
    pub fn subscribe(&mut self, handler: DelegatedHandler<M>) -> bool {
        if self.handlers.contains(&handler) {
            tracing::debug!(handler = ?handler, "handler already subscribed");
            return false;
        }
        self.handlers.push(handler);
        true
    }

    /// Register a closure and return the handle needed to unsubscribe it.
    pub fn subscribe_fn<F>(&mut self, callback: F) -> DelegatedHandler<M>
    where
        F: Fn(&M) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let handler = DelegatedHandler::new(callback);
        self.subscribe(handler.clone());
        handler
    }

    /// Register a shared handler. Returns `false` if that same `Arc` is
    /// already registered.
    pub fn subscribe_handler<H>(&mut self, handler: Arc<H>) -> bool
    where
        H: Handler<M> + 'static,
    {
        self.subscribe(DelegatedHandler::from_handler(handler))
    }

    /// Remove a handler. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, handler: &DelegatedHandler<M>) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|registered| registered != handler);
        self.handlers.len() != before
    }

    pub fn contains(&self, handler: &DelegatedHandler<M>) -> bool {
        self.handlers.contains(handler)
    }

    /// Deliver `message` to every handler in registration order, stopping
    /// at the first failure. Returns how many handlers ran successfully.
    pub fn publish(&self, message: &M) -> Result<usize, HandlerError> {
        for (index, handler) in self.handlers.iter().enumerate() {
            if let Err(err) = handler.handle(message) {
                tracing::warn!(
                    handler = ?handler,
                    delivered = index,
                    error = %err,
                    "handler failed, remaining handlers skipped"
                );
                return Err(err);
            }
        }
        Ok(self.handlers.len())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
