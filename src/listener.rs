//! Guarded press listeners.
//!
//! A listener may fail by returning an error or by panicking. The guard
//! converts both into a `ListenerFault` value, so a dispatch round can
//! always await every listener to settle regardless of individual failures.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::task::JoinError;

use crate::error::{ListenerError, ListenerFault};
use crate::frame::DecodedFrame;

/// A wrapped listener: never panics, never errors, reports faults as values.
pub(crate) type GuardedListener =
    Arc<dyn Fn(DecodedFrame) -> BoxFuture<'static, Option<ListenerFault>> + Send + Sync>;

/// Wrap a user listener so no failure can escape a dispatch round.
pub(crate) fn guard<F, Fut>(listener: F) -> GuardedListener
where
    F: Fn(DecodedFrame) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    let listener = Arc::new(listener);
    Arc::new(move |packet: DecodedFrame| {
        let listener = Arc::clone(&listener);
        // A panicking listener unwinds into its own task, not the round.
        let invocation = tokio::spawn(async move { listener(packet).await });
        Box::pin(async move {
            match invocation.await {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(ListenerFault::Failed(err)),
                Err(err) => Some(fault_from_join_error(err)),
            }
        })
    })
}

fn fault_from_join_error(err: JoinError) -> ListenerFault {
    match err.try_into_panic() {
        Ok(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "non-string panic payload".to_string()
            };
            ListenerFault::Panicked(message)
        }
        Err(err) => ListenerFault::Failed(err.to_string().into()),
    }
}
