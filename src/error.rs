//! # Error Handling
//!
//! Every failure the batching operator can report, in one enum.
//!
//! Argument errors (`InvalidArgument`, `OutOfRange`) are raised eagerly, when a
//! batch is constructed and before the source is touched. The remaining variants
//! surface while the output is being consumed and terminate it:
//!
//! - **Cancelled**: the caller's token fired while a pull was in flight
//! - **Source**: the source itself yielded an error, passed through unmodified
//! - **Selector**: a fallible result selector rejected a bucket
//!
//! Nothing is retried. After the first error the output yields no more items.

use std::convert::Infallible;
use thiserror::Error;

/// Boxed error returned by fallible result selectors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for batch construction and consumption.
///
/// `E` is the error type of the underlying source; in-memory sources use
/// [`Infallible`].
#[derive(Error, Debug)]
pub enum BatchError<E = Infallible> {
  /// An argument was malformed.
  #[error("invalid argument `{param}`: {reason}")]
  InvalidArgument {
    /// Name of the offending parameter.
    param: &'static str,
    /// What was wrong with it.
    reason: String,
  },
  /// A numeric argument fell outside its accepted range.
  #[error("argument `{param}` out of range: got {value}, expected {expected}")]
  OutOfRange {
    /// Name of the offending parameter.
    param: &'static str,
    /// The rejected value.
    value: usize,
    /// Human readable description of the accepted range.
    expected: &'static str,
  },
  /// The pull of the next element observed cancellation.
  #[error("batch operation was cancelled")]
  Cancelled,
  /// The source failed while producing an element.
  #[error("source error: {0}")]
  Source(#[source] E),
  /// The result selector failed while projecting a bucket.
  #[error("result selector error: {0}")]
  Selector(#[source] BoxError),
}

impl<E> BatchError<E> {
  /// Returns `true` for the abnormal cancellation outcome.
  pub fn is_cancelled(&self) -> bool {
    matches!(self, BatchError::Cancelled)
  }

  /// Returns `true` for errors raised before any element was consumed.
  pub fn is_argument_error(&self) -> bool {
    matches!(
      self,
      BatchError::InvalidArgument { .. } | BatchError::OutOfRange { .. }
    )
  }

  /// Name of the offending parameter for argument errors.
  pub fn param(&self) -> Option<&'static str> {
    match self {
      BatchError::InvalidArgument { param, .. } | BatchError::OutOfRange { param, .. } => {
        Some(param)
      }
      _ => None,
    }
  }
}

impl BatchError<Infallible> {
  /// Moves an argument error into the error type of any source.
  pub fn into_source_error<F>(self) -> BatchError<F> {
    match self {
      BatchError::InvalidArgument { param, reason } => BatchError::InvalidArgument { param, reason },
      BatchError::OutOfRange {
        param,
        value,
        expected,
      } => BatchError::OutOfRange {
        param,
        value,
        expected,
      },
      BatchError::Cancelled => BatchError::Cancelled,
      BatchError::Selector(e) => BatchError::Selector(e),
      BatchError::Source(never) => match never {},
    }
  }
}

/// Identifies the component an error or log event came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
  /// Configured name of the component.
  pub name: String,
  /// Rust type name of the component.
  pub type_name: String,
}

impl ComponentInfo {
  pub fn new(name: String, type_name: String) -> Self {
    Self { name, type_name }
  }
}

/// Validates a bucket size.
pub(crate) fn check_size(size: usize) -> Result<usize, BatchError> {
  if size == 0 {
    return Err(BatchError::OutOfRange {
      param: "size",
      value: size,
      expected: "a bucket size of at least 1",
    });
  }
  Ok(size)
}
