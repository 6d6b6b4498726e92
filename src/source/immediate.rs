use super::Source;
use crate::error::BatchError;
use async_trait::async_trait;
use std::convert::Infallible;
use tokio_util::sync::CancellationToken;

enum State<I: IntoIterator> {
  /// `into_iter` has not been called yet.
  Pending(I),
  Started(I::IntoIter),
  Released,
}

/// Adapts an in-memory `IntoIterator` to [`Source`].
///
/// The collection is not turned into an iterator until the first pull, and the
/// iterator is dropped as soon as it reports exhaustion. Pulls complete on
/// first poll and never look at the cancellation token.
pub struct Immediate<I: IntoIterator> {
  state: State<I>,
}

impl<I: IntoIterator> Immediate<I> {
  pub fn new(source: I) -> Self {
    Self {
      state: State::Pending(source),
    }
  }

  /// Returns `true` once enumeration has begun.
  pub fn is_started(&self) -> bool {
    !matches!(self.state, State::Pending(_))
  }

  /// Returns `true` once the iterator has been exhausted and dropped.
  pub fn is_released(&self) -> bool {
    matches!(self.state, State::Released)
  }

  fn next_now(&mut self) -> Option<I::Item> {
    if matches!(self.state, State::Pending(_)) {
      if let State::Pending(source) = std::mem::replace(&mut self.state, State::Released) {
        self.state = State::Started(source.into_iter());
      }
    }
    match &mut self.state {
      State::Started(iter) => {
        let next = iter.next();
        if next.is_none() {
          self.state = State::Released;
        }
        next
      }
      _ => None,
    }
  }
}

#[async_trait]
impl<I> Source for Immediate<I>
where
  I: IntoIterator + Send,
  I::IntoIter: Send,
  I::Item: Send,
{
  type Item = I::Item;
  type Error = Infallible;

  async fn pull(&mut self, _cancel: &CancellationToken) -> Result<Option<I::Item>, BatchError> {
    Ok(self.next_now())
  }
}
