//! Typed event handlers.
//!
//! A [`TypedAdapter`] lets a handler take one payload type (say
//! [`MessageEvent`](switchyard_core::MessageEvent)) instead of the general
//! [`Event`]. The adapter narrows the event before calling the handler. Its
//! chain entry is gated by a kind filter for the payload's kind, so narrowing
//! only fails if the adapter is placed behind some other filter set; in that
//! case the adapter fails closed with
//! [`DispatchError::TypeMismatch`](crate::DispatchError::TypeMismatch) and
//! neither the handler nor the continuation is invoked.
//!
//! ```rust,ignore
//! use switchyard_framework::typed_entry;
//! use switchyard_core::AppMentionEvent;
//!
//! let entry = typed_entry(|mention: AppMentionEvent, client, next| async move {
//!     client.post_message(&mention.channel, &Message::text("hi!")).await?;
//!     next.proceed();
//!     Ok(())
//! });
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tower::BoxError;
use tracing::debug;

use switchyard_core::{BoxedClient, Event, EventKind, FromEvent};

use crate::chain::HandlerEntry;
use crate::error::KindMismatch;
use crate::filter::EventFilter;
use crate::handler::{EventHandler, HandlerResult, Next};

/// Wraps a handler typed to payload `T` as a general [`EventHandler`].
pub struct TypedAdapter<T, F> {
    handler: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromEvent, F> TypedAdapter<T, F> {
    /// Wraps `handler`.
    pub fn new<Fut>(handler: F) -> Self
    where
        F: Fn(T, BoxedClient, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            handler,
            _marker: PhantomData,
        }
    }

    /// The kind this adapter accepts.
    pub fn kind(&self) -> EventKind {
        T::KIND
    }
}

impl<T, F: Clone> Clone for TypedAdapter<T, F> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, F, Fut> EventHandler for TypedAdapter<T, F>
where
    T: FromEvent,
    F: Fn(T, BoxedClient, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(
        &self,
        event: Arc<Event>,
        client: BoxedClient,
        next: Next,
    ) -> BoxFuture<'static, HandlerResult> {
        match T::from_event(&event) {
            Some(narrowed) => (self.handler)(narrowed, client, next).boxed(),
            None => {
                let expected = T::KIND;
                let actual = event.kind();
                debug!(%expected, %actual, "Typed handler received wrong kind");
                let err: BoxError = Box::new(KindMismatch { expected, actual });
                future::ready(Err(err)).boxed()
            }
        }
    }
}

/// Builds a chain entry that runs `handler` for events of payload type `T`.
///
/// The entry's only filter is a kind filter for `T::KIND`.
pub fn typed_entry<T, F, Fut>(handler: F) -> HandlerEntry
where
    T: FromEvent,
    F: Fn(T, BoxedClient, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    HandlerEntry::new(
        [EventFilter::of::<T>()],
        Arc::new(TypedAdapter::<T, F>::new(handler)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::testing::{MockClient, counter, message, pin_added};
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;
    use switchyard_core::{MessageEvent, PinAddedEvent};

    #[tokio::test]
    async fn test_narrows_matching_kind_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let adapter = TypedAdapter::new(move |msg: MessageEvent, _client, next: Next| {
            record.lock().unwrap().push(msg.channel);
            next.proceed();
            future::ready(Ok(()))
        });

        let (next, forwarded) = Next::channel();
        adapter
            .call(Arc::new(message("C42")), MockClient::boxed(), next)
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["C42".to_string()]);
        assert!(matches!(forwarded.take(), Some(None)));
        assert_eq!(adapter.kind(), EventKind::Message);
    }

    #[tokio::test]
    async fn test_wrong_kind_fails_closed() {
        let (hits, counted) = counter();
        let adapter = TypedAdapter::new(move |_msg: MessageEvent, _client, next: Next| {
            counted.fetch_add(1, Ordering::SeqCst);
            next.proceed();
            future::ready(Ok(()))
        });

        let (next, forwarded) = Next::channel();
        let err = adapter
            .call(Arc::new(pin_added("C1")), MockClient::boxed(), next)
            .await
            .unwrap_err();

        assert!(matches!(
            DispatchError::from(err),
            DispatchError::TypeMismatch {
                expected: EventKind::Message,
                actual: EventKind::PinAdded,
            }
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(forwarded.take().is_none());
    }

    #[test]
    fn test_typed_entry_filters_by_kind() {
        let entry = typed_entry(|_pin: PinAddedEvent, _client, _next| future::ready(Ok(())));

        assert!(entry.matches(&pin_added("C1")));
        assert!(!entry.matches(&message("C1")));
    }
}
