//! Result selectors: what becomes of a completed bucket.
//!
//! A selector receives each bucket by value, so it owns exactly the elements of
//! that one batch and can never observe a neighbouring or still-growing batch.

use crate::error::BoxError;

/// Projects a completed bucket into an output value.
pub trait Select<T> {
  /// The value emitted for each bucket.
  type Output;

  /// Projects one bucket. A failure terminates the output.
  fn select(&mut self, bucket: Vec<T>) -> Result<Self::Output, BoxError>;
}

/// Emits the bucket itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Select<T> for Identity {
  type Output = Vec<T>;

  fn select(&mut self, bucket: Vec<T>) -> Result<Vec<T>, BoxError> {
    Ok(bucket)
  }
}

/// Infallible projection through a closure.
#[derive(Debug, Clone)]
pub struct Project<F>(pub F);

impl<T, R, F> Select<T> for Project<F>
where
  F: FnMut(Vec<T>) -> R,
{
  type Output = R;

  fn select(&mut self, bucket: Vec<T>) -> Result<R, BoxError> {
    Ok((self.0)(bucket))
  }
}

/// Fallible projection through a closure.
#[derive(Debug, Clone)]
pub struct TryProject<F>(pub F);

impl<T, R, E, F> Select<T> for TryProject<F>
where
  F: FnMut(Vec<T>) -> Result<R, E>,
  E: Into<BoxError>,
{
  type Output = R;

  fn select(&mut self, bucket: Vec<T>) -> Result<R, BoxError> {
    (self.0)(bucket).map_err(Into::into)
  }
}
