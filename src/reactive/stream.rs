//! `futures::Stream` view over one subscription.

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::subscriber::{StreamEvent, Subscriber, Subscription};
use crate::error::{Error, Result};

#[derive(Default)]
struct Control {
    subscription: Option<Subscription>,
    cancelled: bool,
}

/// Pull-based view of a [`Flux`](super::Flux) subscription.
///
/// Requests one item at a time and cancels the subscription when dropped.
pub struct FluxStream<T> {
    rx: mpsc::UnboundedReceiver<StreamEvent<T>>,
    control: Arc<Mutex<Control>>,
    done: bool,
}

impl<T: Send + 'static> FluxStream<T> {
    pub(crate) fn channel() -> (Self, ChannelSubscriber<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let control = Arc::new(Mutex::new(Control::default()));
        let stream = Self {
            rx,
            control: control.clone(),
            done: false,
        };
        (stream, ChannelSubscriber { tx, control })
    }
}

impl<T> FluxStream<T> {
    fn request_more(&self) {
        let subscription = self
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscription
            .clone();
        if let Some(subscription) = subscription {
            subscription.request(1);
        }
    }

    /// Cancel the underlying subscription. Pending events are discarded.
    pub fn cancel(&mut self) {
        let subscription = {
            let mut control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
            control.cancelled = true;
            control.subscription.take()
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
        self.done = true;
    }
}

impl<T> Stream for FluxStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(StreamEvent::Next(item))) => {
                this.request_more();
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(Some(StreamEvent::Error(error))) => {
                this.done = true;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(Some(StreamEvent::Complete)) | Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<T> Drop for FluxStream<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Subscriber feeding a [`FluxStream`].
pub(crate) struct ChannelSubscriber<T> {
    tx: mpsc::UnboundedSender<StreamEvent<T>>,
    control: Arc<Mutex<Control>>,
}

impl<T: Send + 'static> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        let cancelled = {
            let mut control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
            if !control.cancelled {
                control.subscription = Some(subscription.clone());
            }
            control.cancelled
        };
        if cancelled {
            subscription.cancel();
        } else {
            subscription.request(1);
        }
    }

    fn on_next(&mut self, item: T) -> Result<()> {
        // A closed receiver means the stream was dropped and already cancelled.
        let _ = self.tx.send(StreamEvent::Next(item));
        Ok(())
    }

    fn on_error(&mut self, error: Error) -> Result<()> {
        let _ = self.tx.send(StreamEvent::Error(error));
        Ok(())
    }

    fn on_complete(&mut self) {
        let _ = self.tx.send(StreamEvent::Complete);
    }
}
