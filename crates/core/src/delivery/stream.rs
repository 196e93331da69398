//! Byte stream over a final artifact that reports how the transfer ended.

use bytes::Bytes;
use futures::Stream;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::sync::oneshot;
use tokio_util::io::ReaderStream;

use super::types::TransferOutcome;

/// Streams a file and sends a [`TransferOutcome`] when dropped.
///
/// The outcome is `Completed` if end of file was reached and `Aborted`
/// otherwise (client went away, read error, never polled).
pub struct DeliveryStream {
    inner: ReaderStream<File>,
    bytes_sent: u64,
    reached_eof: bool,
    failure: Option<String>,
    notify: Option<oneshot::Sender<TransferOutcome>>,
}

impl DeliveryStream {
    pub(crate) fn new(file: File, notify: oneshot::Sender<TransferOutcome>) -> Self {
        Self {
            inner: ReaderStream::new(file),
            bytes_sent: 0,
            reached_eof: false,
            failure: None,
            notify: Some(notify),
        }
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    fn outcome(&self) -> TransferOutcome {
        if self.reached_eof && self.failure.is_none() {
            TransferOutcome::Completed {
                bytes_sent: self.bytes_sent,
            }
        } else {
            TransferOutcome::Aborted {
                bytes_sent: self.bytes_sent,
                reason: self.failure.clone(),
            }
        }
    }
}

impl Stream for DeliveryStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.reached_eof || this.failure.is_some() {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes_sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.failure = Some(e.to_string());
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.reached_eof = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for DeliveryStream {
    fn drop(&mut self) {
        if let Some(notify) = self.notify.take() {
            let _ = notify.send(self.outcome());
        }
    }
}
