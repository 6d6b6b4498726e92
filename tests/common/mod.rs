#![allow(dead_code)]

use batchweave::BatchError;
use futures::{Stream, StreamExt};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_test_writer()
    .with_max_level(tracing::Level::TRACE)
    .try_init();
}

/// A sequence that fails the test as soon as enumeration is requested.
pub struct BreakingSequence<T>(PhantomData<T>);

impl<T> BreakingSequence<T> {
  pub fn new() -> Self {
    Self(PhantomData)
  }
}

impl<T> IntoIterator for BreakingSequence<T> {
  type Item = T;
  type IntoIter = std::vec::IntoIter<T>;

  fn into_iter(self) -> Self::IntoIter {
    panic!("enumeration requested on a breaking sequence");
  }
}

/// A stream that fails the test as soon as it is polled.
pub struct BreakingStream<T>(PhantomData<T>);

impl<T> BreakingStream<T> {
  pub fn new() -> Self {
    Self(PhantomData)
  }
}

impl<T> Stream for BreakingStream<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<T>> {
    panic!("enumeration requested on a breaking stream");
  }
}

/// Wraps an iterator or stream and records when it is dropped and how many
/// elements were read from it.
pub struct TrackedSource<S> {
  inner: S,
  probe: Probe,
}

#[derive(Clone, Default)]
pub struct Probe {
  released: Arc<AtomicBool>,
  reads: Arc<AtomicUsize>,
}

impl Probe {
  pub fn released(&self) -> bool {
    self.released.load(Ordering::SeqCst)
  }

  pub fn reads(&self) -> usize {
    self.reads.load(Ordering::SeqCst)
  }
}

impl<S> TrackedSource<S> {
  pub fn new(inner: S) -> (Self, Probe) {
    let probe = Probe::default();
    (
      Self {
        inner,
        probe: probe.clone(),
      },
      probe,
    )
  }
}

impl<S> Drop for TrackedSource<S> {
  fn drop(&mut self) {
    self.probe.released.store(true, Ordering::SeqCst);
  }
}

impl<I: Iterator> Iterator for TrackedSource<I> {
  type Item = I::Item;

  fn next(&mut self) -> Option<I::Item> {
    self.probe.reads.fetch_add(1, Ordering::SeqCst);
    self.inner.next()
  }
}

impl<S: Stream + Unpin> Stream for TrackedSource<S> {
  type Item = S::Item;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
    let this = self.get_mut();
    let polled = this.inner.poll_next_unpin(cx);
    if polled.is_ready() {
      this.probe.reads.fetch_add(1, Ordering::SeqCst);
    }
    polled
  }
}

/// An endless stream producing `0, 1, 2, ...` with a delay before each element.
pub fn slow_counter(delay: Duration) -> impl Stream<Item = u64> + Send + 'static {
  futures::stream::unfold(0u64, move |n| async move {
    tokio::time::sleep(delay).await;
    Some((n, n + 1))
  })
}

/// Drives a fallible iterator with read / read_end assertions.
pub struct SequenceReader<I> {
  inner: I,
}

impl<I, T, E> SequenceReader<I>
where
  I: Iterator<Item = Result<T, BatchError<E>>>,
  T: Debug,
  E: Debug,
{
  pub fn new(inner: impl IntoIterator<IntoIter = I>) -> Self {
    Self {
      inner: inner.into_iter(),
    }
  }

  #[track_caller]
  pub fn read(&mut self) -> T {
    match self.inner.next() {
      Some(Ok(item)) => item,
      Some(Err(e)) => panic!("expected an element, got error {:?}", e),
      None => panic!("expected an element, but the sequence ended"),
    }
  }

  #[track_caller]
  pub fn read_error(&mut self) -> BatchError<E> {
    match self.inner.next() {
      Some(Err(e)) => e,
      Some(Ok(item)) => panic!("expected an error, got element {:?}", item),
      None => panic!("expected an error, but the sequence ended"),
    }
  }

  #[track_caller]
  pub fn read_end(&mut self) {
    if let Some(item) = self.inner.next() {
      panic!("expected the end of the sequence, got {:?}", item);
    }
  }
}

/// Async counterpart of [`SequenceReader`].
pub struct StreamReader<S> {
  inner: S,
}

impl<S, T, E> StreamReader<S>
where
  S: Stream<Item = Result<T, BatchError<E>>> + Unpin,
  T: Debug,
  E: Debug,
{
  pub fn new(inner: S) -> Self {
    Self { inner }
  }

  pub async fn read(&mut self) -> T {
    match self.inner.next().await {
      Some(Ok(item)) => item,
      Some(Err(e)) => panic!("expected an element, got error {:?}", e),
      None => panic!("expected an element, but the stream ended"),
    }
  }

  pub async fn read_error(&mut self) -> BatchError<E> {
    match self.inner.next().await {
      Some(Err(e)) => e,
      Some(Ok(item)) => panic!("expected an error, got element {:?}", item),
      None => panic!("expected an error, but the stream ended"),
    }
  }

  pub async fn read_end(&mut self) {
    if let Some(item) = self.inner.next().await {
      panic!("expected the end of the stream, got {:?}", item);
    }
  }
}
