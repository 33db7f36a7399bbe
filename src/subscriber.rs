//! Callback-style consumption of outcomes.

use std::{any::Any, future::Future, panic::AssertUnwindSafe};

use futures_util::{future, stream, FutureExt, Stream, StreamExt};

use crate::{classify::FALLBACK_MESSAGE, Outcome};

/// Receives the outcome of a call through one handler per variant.
pub trait OutcomeSubscriber<T> {
    /// Called once before the call is awaited.
    fn on_loading(&mut self) {}

    fn on_success(&mut self, body: Option<T>, status_code: u16);

    fn on_error(&mut self, message: String);

    fn on_no_connectivity(&mut self, message: String);

    fn on_session_expired(&mut self, message: String);
}

impl<T> Outcome<T> {
    /// Routes the outcome to the matching handler.
    pub fn dispatch<S>(self, subscriber: &mut S)
    where
        S: OutcomeSubscriber<T> + ?Sized,
    {
        match self {
            Self::Loading => subscriber.on_loading(),
            Self::Success { status_code, body } => subscriber.on_success(body, status_code),
            Self::Error { message, .. } => subscriber.on_error(message),
            Self::NoConnectivity { message } => subscriber.on_no_connectivity(message),
            Self::SessionExpired { message, .. } => subscriber.on_session_expired(message),
        }
    }
}

/// Signals loading, awaits `call` and dispatches its outcome.
///
/// A panic while awaiting `call` is reported through `on_error` with the
/// panic text, so exactly one terminal handler runs.
pub async fn consume<T, F, S>(call: F, subscriber: &mut S)
where
    F: Future<Output = Outcome<T>>,
    S: OutcomeSubscriber<T> + ?Sized,
{
    subscriber.on_loading();
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(outcome) => outcome.dispatch(subscriber),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::warn!(%message, "request future panicked");
            subscriber.on_error(message);
        }
    }
}

/// Yields [`Outcome::Loading`] followed by the outcome of `call`.
pub fn outcome_stream<T, F>(call: F) -> impl Stream<Item = Outcome<T>>
where
    F: Future<Output = Outcome<T>>,
{
    let terminal = AssertUnwindSafe(call)
        .catch_unwind()
        .map(|result| {
            result.unwrap_or_else(|panic| Outcome::error(panic_message(panic.as_ref())))
        });
    stream::once(future::ready(Outcome::Loading)).chain(stream::once(terminal))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        FALLBACK_MESSAGE.to_owned()
    }
}
