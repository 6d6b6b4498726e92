//! # Sources
//!
//! A [`Source`] is anything the batching engine can pull elements from, one at
//! a time, possibly waiting between elements. Two adapters cover the common
//! origins:
//!
//! - [`Immediate`] wraps any `IntoIterator`. A pull never suspends.
//! - [`Awaiting`] wraps any `Stream` or `TryStream`. A pull suspends until the
//!   next element arrives, the stream ends, or the cancellation token fires.
//!
//! Implement [`Source`] directly for producers that fit neither shape.

mod awaiting;
mod immediate;

pub use awaiting::{Awaiting, Lifted};
pub use immediate::Immediate;

use crate::error::BatchError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Pull-based element source with optional waiting and cancellation.
///
/// `pull` returns `Ok(Some(item))` for an element, `Ok(None)` once the source
/// is exhausted, and `Err(_)` when the source failed or observed `cancel`.
/// Callers issue at most one pull at a time.
#[async_trait]
pub trait Source: Send {
  /// Element type.
  type Item: Send;
  /// Error type of the underlying origin.
  type Error: Send;

  /// Reads the next element, waiting if necessary.
  async fn pull(
    &mut self,
    cancel: &CancellationToken,
  ) -> Result<Option<Self::Item>, BatchError<Self::Error>>;

  /// Whether `pull` itself reacts to `cancel`.
  fn observes_cancellation(&self) -> bool {
    false
  }
}

#[async_trait]
impl<S: Source + ?Sized> Source for Box<S> {
  type Item = S::Item;
  type Error = S::Error;

  async fn pull(
    &mut self,
    cancel: &CancellationToken,
  ) -> Result<Option<Self::Item>, BatchError<Self::Error>> {
    (**self).pull(cancel).await
  }

  fn observes_cancellation(&self) -> bool {
    (**self).observes_cancellation()
  }
}
