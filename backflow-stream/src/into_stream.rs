// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consume a publisher as a `futures::Stream`.
//!
//! The bridge subscribes with an internal subscriber that forwards signals through an
//! unbounded channel. Demand is bounded by `prefetch`: it is requested up front and topped
//! up each time three quarters of it has been consumed, so the channel never holds more
//! than `prefetch` items. The publisher's failure arrives as a final
//! [`StreamItem::Error`]; completion simply ends the stream. Dropping the stream cancels
//! the subscription.
//!
//! ```
//! use backflow_stream::sources::from_iter;
//! use backflow_stream::IntoStreamExt;
//! use futures::StreamExt;
//!
//! # futures::executor::block_on(async {
//! let items: Vec<_> = from_iter(vec![1, 2, 3])
//!     .into_stream(2)
//!     .map(|item| item.unwrap())
//!     .collect()
//!     .await;
//! assert_eq!(items, vec![1, 2, 3]);
//! # });
//! ```

use backflow_core::mutex::Mutex;
use backflow_core::{FlowError, Publisher, StreamItem, Subscriber, Subscription};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use pin_project::{pin_project, pinned_drop};
use std::sync::Arc;

/// Prefetch used by [`IntoStreamExt::into_default_stream`].
pub const DEFAULT_PREFETCH: usize = 256;

type SubscriptionSlot = Arc<Mutex<Option<Arc<dyn Subscription>>>>;

/// Extension trait turning any publisher into a `futures::Stream`.
pub trait IntoStreamExt<T>: Publisher<T> + Sized {
    /// Subscribe and expose the signals as a stream, keeping at most `prefetch` items in
    /// flight. A `prefetch` of zero is treated as one.
    fn into_stream(self, prefetch: usize) -> PublisherStream<T>;

    /// [`into_stream`](Self::into_stream) with [`DEFAULT_PREFETCH`].
    fn into_default_stream(self) -> PublisherStream<T> {
        self.into_stream(DEFAULT_PREFETCH)
    }
}

impl<T, P> IntoStreamExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T>,
{
    fn into_stream(self, prefetch: usize) -> PublisherStream<T> {
        let prefetch = prefetch.max(1);
        let (sender, receiver) = unbounded();
        let slot: SubscriptionSlot = Arc::new(Mutex::new(None));

        self.subscribe(Arc::new(ChannelSubscriber {
            sender,
            slot: slot.clone(),
            prefetch: prefetch as u64,
        }));

        PublisherStream {
            receiver,
            slot,
            consumed: 0,
            limit: prefetch - prefetch / 4,
        }
    }
}

struct ChannelSubscriber<T> {
    sender: UnboundedSender<StreamItem<T>>,
    slot: SubscriptionSlot,
    prefetch: u64,
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.slot.lock() = Some(subscription.clone());
        // The stream closes the channel before it looks at the slot when dropped.
        if self.sender.is_closed() {
            subscription.cancel();
        } else {
            subscription.request(self.prefetch);
        }
    }

    fn on_next(&self, item: T) {
        // A closed channel means the stream was dropped; cancellation is already underway.
        let _ = self.sender.unbounded_send(StreamItem::Value(item));
    }

    fn on_error(&self, error: FlowError) {
        let _ = self.sender.unbounded_send(StreamItem::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&self) {
        self.sender.close_channel();
    }
}

/// Stream returned by [`IntoStreamExt::into_stream`].
#[pin_project(PinnedDrop)]
pub struct PublisherStream<T> {
    #[pin]
    receiver: UnboundedReceiver<StreamItem<T>>,
    slot: SubscriptionSlot,
    consumed: usize,
    limit: usize,
}

impl<T> Stream for PublisherStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let polled = this.receiver.poll_next(cx);

        if let Poll::Ready(Some(StreamItem::Value(_))) = &polled {
            *this.consumed += 1;
            if *this.consumed == *this.limit {
                *this.consumed = 0;
                let subscription = this.slot.lock().clone();
                if let Some(subscription) = subscription {
                    subscription.request(*this.limit as u64);
                }
            }
        }
        polled
    }
}

#[pinned_drop]
impl<T> PinnedDrop for PublisherStream<T> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        this.receiver.get_mut().close();
        let subscription = this.slot.lock().clone();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }
}
