//! latest-wins stream switching
//!
//! flattens a stream of streams, always following the most recent inner
//! stream. a newer inner stream drops (and so cancels) the previous one.
//! the first error ends the whole stream.

use crate::error::Result;
use futures_util::stream::{BoxStream, Stream};
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

pub(crate) struct SwitchLatest<T> {
    outer: Option<BoxStream<'static, BoxStream<'static, Result<T>>>>,
    inner: Option<BoxStream<'static, Result<T>>>,
    failed: bool,
}

impl<T> SwitchLatest<T> {
    pub(crate) fn new(outer: BoxStream<'static, BoxStream<'static, Result<T>>>) -> Self {
        Self {
            outer: Some(outer),
            inner: None,
            failed: false,
        }
    }
}

impl<T> Stream for SwitchLatest<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.failed {
            return Poll::Ready(None);
        }

        // take every inner stream that is ready, keeping only the newest
        while let Some(outer) = this.outer.as_mut() {
            match outer.as_mut().poll_next(cx) {
                Poll::Ready(Some(next)) => {
                    if this.inner.replace(next).is_some() {
                        debug!("superseded in-flight network request");
                    }
                }
                Poll::Ready(None) => this.outer = None,
                Poll::Pending => break,
            }
        }

        if let Some(inner) = this.inner.as_mut() {
            match inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if item.is_err() {
                        this.failed = true;
                        this.outer = None;
                        this.inner = None;
                    }
                    return Poll::Ready(Some(item));
                }
                Poll::Ready(None) => this.inner = None,
                Poll::Pending => return Poll::Pending,
            }
        }

        if this.outer.is_none() && this.inner.is_none() {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}
