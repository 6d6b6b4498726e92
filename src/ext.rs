//! Extension traits adding `batch` operators to iterables and streams.
//!
//! ```rust
//! use batchweave::StreamBatchExt;
//! use futures::{StreamExt, stream};
//!
//! # async fn example() {
//! let sums: Vec<i32> = stream::iter(1..=9)
//!   .batch_with(4, |bucket: Vec<i32>| bucket.iter().sum::<i32>())
//!   .unwrap()
//!   .map(Result::unwrap)
//!   .collect()
//!   .await;
//! assert_eq!(sums, vec![10, 26, 9]);
//! # }
//! ```

use crate::batch::{Batch, BatchStream};
use crate::engine::Batcher;
use crate::error::BatchError;
use crate::select::{Identity, Project, TryProject};
use crate::source::{Awaiting, Immediate};
use futures::{Stream, TryStream};
use tokio_util::sync::CancellationToken;

/// `batch` operators for anything that can be turned into an iterator.
pub trait IterBatchExt: IntoIterator + Sized {
  /// Splits the sequence into buckets of at most `size` elements.
  ///
  /// Fails with [`BatchError::OutOfRange`] when `size` is zero. The sequence
  /// is not enumerated until the returned iterator is advanced.
  fn batch(self, size: usize) -> Result<Batch<Self, Identity>, BatchError>
  where
    Self: Send,
    Self::IntoIter: Send,
    Self::Item: Send,
  {
    Ok(Batcher::new(Immediate::new(self), size, Identity)?.into_iter())
  }

  /// Splits the sequence into buckets and projects each one.
  fn batch_with<F, R>(self, size: usize, selector: F) -> Result<Batch<Self, Project<F>>, BatchError>
  where
    Self: Send,
    Self::IntoIter: Send,
    Self::Item: Send,
    F: FnMut(Vec<Self::Item>) -> R,
  {
    Ok(Batcher::new(Immediate::new(self), size, Project(selector))?.into_iter())
  }
}

impl<I: IntoIterator> IterBatchExt for I {}

/// `batch` operators for infallible streams.
pub trait StreamBatchExt: Stream + Sized {
  /// Splits the stream into buckets of at most `size` elements.
  fn batch(self, size: usize) -> Result<BatchStream<Vec<Self::Item>>, BatchError>
  where
    Self: Send + 'static,
    Self::Item: Send + 'static,
  {
    Ok(Batcher::new(Awaiting::infallible(self), size, Identity)?.into_stream())
  }

  /// Splits the stream into buckets and projects each one.
  fn batch_with<F, R>(self, size: usize, selector: F) -> Result<BatchStream<R>, BatchError>
  where
    Self: Send + 'static,
    Self::Item: Send + 'static,
    F: FnMut(Vec<Self::Item>) -> R + Send + 'static,
    R: Send + 'static,
  {
    Ok(Batcher::new(Awaiting::infallible(self), size, Project(selector))?.into_stream())
  }

  /// Splits the stream into buckets, stopping with [`BatchError::Cancelled`]
  /// once `token` is cancelled.
  fn batch_until_cancelled(
    self,
    size: usize,
    token: CancellationToken,
  ) -> Result<BatchStream<Vec<Self::Item>>, BatchError>
  where
    Self: Send + 'static,
    Self::Item: Send + 'static,
  {
    Ok(
      Batcher::new(Awaiting::infallible(self), size, Identity)?
        .with_cancellation(token)
        .into_stream(),
    )
  }
}

impl<S: Stream> StreamBatchExt for S {}

/// `batch` operators for fallible streams.
///
/// Stream errors end the output with [`BatchError::Source`]. The elements
/// buffered so far are discarded.
pub trait TryStreamBatchExt: TryStream + Sized {
  fn try_batch(
    self,
    size: usize,
  ) -> Result<BatchStream<Vec<Self::Ok>, Self::Error>, BatchError<Self::Error>>
  where
    Self: Send + 'static,
    Self::Ok: Send + 'static,
    Self::Error: Send + 'static,
  {
    Ok(Batcher::new(Awaiting::new(self), size, Identity)?.into_stream())
  }

  /// Projects each bucket through a selector that may itself fail.
  fn try_batch_with<F, R, E>(
    self,
    size: usize,
    selector: F,
  ) -> Result<BatchStream<R, Self::Error>, BatchError<Self::Error>>
  where
    Self: Send + 'static,
    Self::Ok: Send + 'static,
    Self::Error: Send + 'static,
    F: FnMut(Vec<Self::Ok>) -> Result<R, E> + Send + 'static,
    E: Into<crate::error::BoxError>,
    R: Send + 'static,
  {
    Ok(Batcher::new(Awaiting::new(self), size, TryProject(selector))?.into_stream())
  }
}

impl<S: TryStream> TryStreamBatchExt for S {}
