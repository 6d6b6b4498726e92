//! # Batch Outputs
//!
//! Adapters that expose a [`Batcher`] in the caller's production model:
//!
//! - [`Batch`] is a synchronous `Iterator` over an [`Immediate`] source.
//! - [`BatchStream`] is an asynchronous `Stream` over any [`Source`].
//!
//! Both are lazy. Nothing is read from the source until the first item is
//! requested, and both are fused after exhaustion or the first error.
//!
//! ```rust
//! use batchweave::IterBatchExt;
//!
//! let batches: Vec<Vec<i32>> = (1..=9)
//!   .batch(4)
//!   .unwrap()
//!   .collect::<Result<_, _>>()
//!   .unwrap();
//! assert_eq!(batches, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9]]);
//! ```

use crate::engine::Batcher;
use crate::error::BatchError;
use crate::select::{Identity, Project, Select};
use crate::source::{Immediate, Source};
use futures::{FutureExt, Stream};
use std::convert::Infallible;
use std::iter::FusedIterator;
use std::pin::Pin;

/// Asynchronous sequence of projected buckets.
pub type BatchStream<R, E = Infallible> =
  Pin<Box<dyn Stream<Item = Result<R, BatchError<E>>> + Send>>;

/// Synchronous sequence of projected buckets over an in-memory source.
///
/// Each call to `next` polls the asynchronous engine once. An [`Immediate`]
/// pull is ready on first poll, so no executor is involved and the iterator can
/// be driven from inside async code.
pub struct Batch<I, F>
where
  I: IntoIterator + Send,
  I::IntoIter: Send,
  I::Item: Send,
{
  engine: Batcher<Immediate<I>, F>,
}

impl<I, F> Batch<I, F>
where
  I: IntoIterator + Send,
  I::IntoIter: Send,
  I::Item: Send,
  F: Select<I::Item>,
{
  pub fn new(engine: Batcher<Immediate<I>, F>) -> Self {
    Self { engine }
  }

  /// The underlying engine.
  pub fn engine(&self) -> &Batcher<Immediate<I>, F> {
    &self.engine
  }
}

impl<I, F> Iterator for Batch<I, F>
where
  I: IntoIterator + Send,
  I::IntoIter: Send,
  I::Item: Send,
  F: Select<I::Item>,
{
  type Item = Result<F::Output, BatchError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self.engine.next_batch().now_or_never() {
      Some(next) => next.transpose(),
      // An in-memory pull never waits; treat a stall as an abnormal end.
      None => Some(Err(BatchError::Cancelled)),
    }
  }
}

impl<I, F> FusedIterator for Batch<I, F>
where
  I: IntoIterator + Send,
  I::IntoIter: Send,
  I::Item: Send,
  F: Select<I::Item>,
{
}

impl<I, F> IntoIterator for Batcher<Immediate<I>, F>
where
  I: IntoIterator + Send,
  I::IntoIter: Send,
  I::Item: Send,
  F: Select<I::Item>,
{
  type Item = Result<F::Output, BatchError>;
  type IntoIter = Batch<I, F>;

  fn into_iter(self) -> Batch<I, F> {
    Batch::new(self)
  }
}

impl<S, F> Batcher<S, F>
where
  S: Source + 'static,
  S::Item: 'static,
  S::Error: 'static,
  F: Select<S::Item> + Send + 'static,
  F::Output: Send + 'static,
{
  /// Turns the engine into a lazily evaluated stream.
  ///
  /// Dropping the stream drops the engine and with it the source.
  pub fn into_stream(mut self) -> BatchStream<F::Output, S::Error> {
    Box::pin(async_stream::stream! {
      loop {
        match self.next_batch().await {
          Ok(Some(batch)) => yield Ok(batch),
          Ok(None) => break,
          Err(e) => {
            yield Err(e);
            break;
          }
        }
      }
    })
  }
}

/// Batches any [`Source`] into buckets of at most `size` elements.
pub fn batch<S>(source: S, size: usize) -> Result<BatchStream<Vec<S::Item>, S::Error>, BatchError<S::Error>>
where
  S: Source + 'static,
  S::Item: 'static,
  S::Error: 'static,
{
  Ok(Batcher::new(source, size, Identity)?.into_stream())
}

/// Batches any [`Source`] and projects each bucket through `selector`.
pub fn batch_with<S, F, R>(
  source: S,
  size: usize,
  selector: F,
) -> Result<BatchStream<R, S::Error>, BatchError<S::Error>>
where
  S: Source + 'static,
  S::Item: 'static,
  S::Error: 'static,
  F: FnMut(Vec<S::Item>) -> R + Send + 'static,
  R: Send + 'static,
{
  Ok(Batcher::new(source, size, Project(selector))?.into_stream())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::Awaiting;
  use futures::{StreamExt, stream};
  use tokio_test::{assert_pending, assert_ready, task};

  #[test]
  fn test_sync_batches() {
    let batches: Vec<Vec<i32>> = Batcher::new(Immediate::new(1..=9), 3, Identity)
      .unwrap()
      .into_iter()
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
  }

  #[test]
  fn test_sync_iterator_is_fused() {
    let mut batches = Batcher::new(Immediate::new(vec![1]), 2, Identity)
      .unwrap()
      .into_iter();
    assert_eq!(batches.next().unwrap().unwrap(), vec![1]);
    assert!(batches.next().is_none());
    assert!(batches.next().is_none());
    assert!(batches.engine().is_terminated());
  }

  #[tokio::test]
  async fn test_sync_iterator_inside_runtime() {
    let sums: Vec<i32> = Batcher::new(Immediate::new(1..=9), 4, Project(|b: Vec<i32>| b.iter().sum()))
      .unwrap()
      .into_iter()
      .map(Result::unwrap)
      .collect();
    assert_eq!(sums, vec![10, 26, 9]);
  }

  #[test]
  fn test_sync_iterator_inside_futures_executor() {
    let batches: Vec<Vec<i32>> = futures::executor::block_on(async {
      Batcher::new(Immediate::new(vec![1, 2, 3]), 2, Identity)
        .unwrap()
        .into_iter()
        .map(Result::unwrap)
        .collect()
    });
    assert_eq!(batches, vec![vec![1, 2], vec![3]]);
  }

  #[tokio::test]
  async fn test_batch_over_source() {
    let out: Vec<_> = batch(Awaiting::infallible(stream::iter(1..=5)), 2)
      .unwrap()
      .map(Result::unwrap)
      .collect()
      .await;
    assert_eq!(out, vec![vec![1, 2], vec![3, 4], vec![5]]);
  }

  #[tokio::test]
  async fn test_batch_with_over_source() {
    let out: Vec<usize> = batch_with(Immediate::new("abcdefg".chars()), 3, |b| b.len())
      .unwrap()
      .map(Result::unwrap)
      .collect()
      .await;
    assert_eq!(out, vec![3, 3, 1]);
  }

  #[test]
  fn test_batch_rejects_zero_size() {
    let err = batch(Immediate::new(vec![1]), 0).err().unwrap();
    assert_eq!(err.param(), Some("size"));
  }

  #[test]
  fn test_stream_waits_for_source() {
    let (tx, rx) = futures::channel::mpsc::unbounded::<u8>();
    let mut out = task::spawn(batch(Awaiting::infallible(rx), 2).unwrap());

    assert_pending!(out.poll_next());
    tx.unbounded_send(1).unwrap();
    assert_pending!(out.poll_next());
    tx.unbounded_send(2).unwrap();
    let first = assert_ready!(out.poll_next());
    assert_eq!(first.unwrap().unwrap(), vec![1, 2]);

    tx.unbounded_send(3).unwrap();
    drop(tx);
    let last = assert_ready!(out.poll_next());
    assert_eq!(last.unwrap().unwrap(), vec![3]);
    assert!(assert_ready!(out.poll_next()).is_none());
  }
}
