//! Handlers - typed message handlers and a de-duplicating dispatcher.
//!
//! `DelegatedHandler<M>` turns a plain function or closure into a
//! `Handler<M>`, so it can be registered anywhere a handler is expected.
//! Two delegated handlers are equal when they wrap the same callable, which
//! lets `Dispatcher` ignore repeated subscriptions.
//!
//! ## Example
//!
//! ```ignore
//! use tracked_repo::handler::{DelegatedHandler, Dispatcher};
//!
//! let mut dispatcher = Dispatcher::new();
//! let audit = dispatcher.subscribe_fn(|event: &NoteCreated| {
//!     println!("created {}", event.id);
//!     Ok(())
//! });
//!
//! dispatcher.publish(&NoteCreated { id: 1 })?;
//! dispatcher.unsubscribe(&audit);
//! ```

mod delegated;
mod dispatcher;
mod error;

pub use delegated::DelegatedHandler;
pub use dispatcher::Dispatcher;
pub use error::HandlerError;

/// Something that reacts to messages of type `M`.
pub trait Handler<M>: Send + Sync {
    fn handle(&self, message: &M) -> Result<(), HandlerError>;
}
