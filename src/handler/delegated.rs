use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{Handler, HandlerError};

type Callback<M> = dyn Fn(&M) -> Result<(), HandlerError> + Send + Sync;

/// Adapts a callable into a `Handler<M>`.
///
/// Equality and hashing follow the identity of the wrapped callable: clones
/// of one delegated handler are equal, two handlers built from the same `fn`
/// item are equal, and two separately built closures are not, even if their
/// code is identical.
pub struct DelegatedHandler<M> {
    callback: Arc<Callback<M>>,
    identity: usize,
}

impl<M: 'static> DelegatedHandler<M> {
    /// Wrap a closure. The new handler is only equal to its own clones.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&M) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let callback: Arc<Callback<M>> = Arc::new(callback);
        let identity = Arc::as_ptr(&callback) as *const () as usize;
        Self { callback, identity }
    }

    /// Wrap a function pointer. Handlers wrapping the same function are equal.
    pub fn from_fn(function: fn(&M) -> Result<(), HandlerError>) -> Self {
        Self {
            callback: Arc::new(function),
            identity: function as usize,
        }
    }

    /// Wrap a shared handler. Handlers wrapping the same `Arc` are equal.
    pub fn from_handler<H>(handler: Arc<H>) -> Self
    where
        H: Handler<M> + 'static,
    {
        let identity = Arc::as_ptr(&handler) as *const () as usize;
        Self {
            callback: Arc::new(move |message: &M| handler.handle(message)),
            identity,
        }
    }
}

impl<M> Clone for DelegatedHandler<M> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            identity: self.identity,
        }
    }
}

impl<M> Handler<M> for DelegatedHandler<M> {
    fn handle(&self, message: &M) -> Result<(), HandlerError> {
        (self.callback)(message)
    }
}

impl<M> PartialEq for DelegatedHandler<M> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<M> Eq for DelegatedHandler<M> {}

impl<M> Hash for DelegatedHandler<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl<M> fmt::Debug for DelegatedHandler<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedHandler")
            .field("identity", &format_args!("{:#x}", self.identity))
            .finish()
    }
}
