use super::Source;
use crate::error::BatchError;
use async_trait::async_trait;
use futures::stream::Map;
use futures::{Stream, StreamExt, TryStream};
use std::convert::Infallible;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// A plain stream lifted into an infallible `TryStream`.
pub type Lifted<S> =
  Map<S, fn(<S as Stream>::Item) -> Result<<S as Stream>::Item, Infallible>>;

/// Adapts an asynchronous `TryStream` to [`Source`].
///
/// Each pull waits for the next element and races that wait against the
/// cancellation token. Stream errors are reported as [`BatchError::Source`].
/// The stream is dropped once it reports exhaustion.
pub struct Awaiting<S> {
  stream: Option<Pin<Box<S>>>,
}

impl<S: TryStream> Awaiting<S> {
  pub fn new(stream: S) -> Self {
    Self {
      stream: Some(Box::pin(stream)),
    }
  }

  /// Returns `true` once the stream has been exhausted and dropped.
  pub fn is_released(&self) -> bool {
    self.stream.is_none()
  }
}

impl<S: Stream> Awaiting<Lifted<S>> {
  /// Wraps a stream that cannot fail.
  pub fn infallible(stream: S) -> Self {
    Awaiting::new(stream.map(Ok as fn(S::Item) -> Result<S::Item, Infallible>))
  }
}

#[async_trait]
impl<S> Source for Awaiting<S>
where
  S: TryStream + Send,
  S::Ok: Send,
  S::Error: Send,
{
  type Item = S::Ok;
  type Error = S::Error;

  async fn pull(
    &mut self,
    cancel: &CancellationToken,
  ) -> Result<Option<S::Ok>, BatchError<S::Error>> {
    let Some(stream) = self.stream.as_mut() else {
      return Ok(None);
    };
    let next = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(BatchError::Cancelled),
      next = futures::future::poll_fn(|cx| stream.as_mut().try_poll_next(cx)) => next.transpose(),
    };
    match next {
      Ok(Some(item)) => Ok(Some(item)),
      Ok(None) => {
        self.stream = None;
        Ok(None)
      }
      Err(e) => Err(BatchError::Source(e)),
    }
  }

  fn observes_cancellation(&self) -> bool {
    true
  }
}
