//! # Batching Engine
//!
//! [`Batcher`] is the single implementation of the batching algorithm. It pulls
//! elements from any [`Source`] one at a time, gathers them into a bucket and
//! hands each completed bucket to a [`Select`] projection.
//!
//! ## Algorithm
//!
//! - The bucket is allocated with capacity `size` when the first element of a
//!   batch arrives, so an empty source allocates nothing.
//! - When the bucket holds `size` elements it is moved out and projected. The
//!   next element starts a fresh bucket.
//! - At exhaustion a non-empty bucket is trimmed to its length and projected
//!   once. An empty one produces nothing.
//! - On cancellation or any error the buffered elements are discarded, the
//!   source is released and the engine is terminated.
//!
//! For `N` elements and bucket size `S` the engine emits `ceil(N / S)` buckets.
//! All but the last hold exactly `S` elements.
//!
//! Construction only validates arguments. The source is not touched until the
//! first call to [`Batcher::next_batch`].

use crate::config::{BatchConfig, CancelPolicy, DEFAULT_NAME};
use crate::error::{BatchError, ComponentInfo, check_size};
use crate::select::Select;
use crate::source::Source;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Pull-driven batching engine over a [`Source`].
pub struct Batcher<S: Source, F> {
  /// `None` once the engine has terminated and released the source.
  source: Option<S>,
  size: usize,
  selector: F,
  bucket: Option<Vec<S::Item>>,
  cancel: CancellationToken,
  policy: CancelPolicy,
  name: Option<String>,
  emitted: usize,
}

impl<S: Source, F: Select<S::Item>> Batcher<S, F> {
  /// Creates an engine emitting buckets of at most `size` elements.
  ///
  /// Fails with [`BatchError::OutOfRange`] when `size` is zero. The source is
  /// not read.
  pub fn new(source: S, size: usize, selector: F) -> Result<Self, BatchError<S::Error>> {
    let size = check_size(size).map_err(BatchError::into_source_error)?;
    Ok(Self {
      source: Some(source),
      size,
      selector,
      bucket: None,
      cancel: CancellationToken::new(),
      policy: CancelPolicy::default(),
      name: None,
      emitted: 0,
    })
  }

  /// Creates an engine from a validated [`BatchConfig`].
  pub fn from_config(
    source: S,
    config: &BatchConfig,
    selector: F,
  ) -> Result<Self, BatchError<S::Error>> {
    config.validate().map_err(BatchError::into_source_error)?;
    let mut batcher = Self::new(source, config.size, selector)?.with_cancel_policy(config.cancel_policy);
    batcher.name = config.name.clone();
    Ok(batcher)
  }

  /// Uses `token` to cancel in-flight pulls.
  pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
    self.cancel = token;
    self
  }

  pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn cancel_policy(&self) -> CancelPolicy {
    self.policy
  }

  pub fn cancellation_token(&self) -> &CancellationToken {
    &self.cancel
  }

  /// Number of buckets emitted so far.
  pub fn emitted(&self) -> usize {
    self.emitted
  }

  /// Returns `true` once the source has been exhausted, has failed, or the
  /// engine observed cancellation.
  pub fn is_terminated(&self) -> bool {
    self.source.is_none()
  }

  pub fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_NAME.to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }

  /// Produces the next projected bucket.
  ///
  /// Returns `Ok(None)` when the source is exhausted and every bucket has been
  /// emitted. After an error the engine is terminated and keeps returning
  /// `Ok(None)`.
  pub async fn next_batch(&mut self) -> Result<Option<F::Output>, BatchError<S::Error>> {
    loop {
      let Some(source) = self.source.as_mut() else {
        return Ok(None);
      };

      let pulled = match self.policy {
        CancelPolicy::Enforced if self.cancel.is_cancelled() => Err(BatchError::Cancelled),
        // A source that watches the token reports its own outcome.
        CancelPolicy::Enforced if source.observes_cancellation() => source.pull(&self.cancel).await,
        CancelPolicy::Enforced => {
          tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(BatchError::Cancelled),
            pulled = source.pull(&self.cancel) => pulled,
          }
        }
        CancelPolicy::Cooperative => source.pull(&self.cancel).await,
      };

      match pulled {
        Ok(Some(item)) => {
          let size = self.size;
          let bucket = self.bucket.get_or_insert_with(|| Vec::with_capacity(size));
          bucket.push(item);
          if bucket.len() == size {
            if let Some(full) = self.bucket.take() {
              return self.emit(full);
            }
          }
        }
        Ok(None) => {
          self.source = None;
          return match self.bucket.take() {
            Some(mut partial) => {
              partial.shrink_to_fit();
              debug!(
                batcher = %self.display_name(),
                emitted = self.emitted + 1,
                partial = partial.len(),
                "source exhausted, flushing partial batch"
              );
              self.emit(partial)
            }
            None => {
              debug!(
                batcher = %self.display_name(),
                emitted = self.emitted,
                "source exhausted"
              );
              Ok(None)
            }
          };
        }
        Err(err) => {
          self.terminate(&err);
          return Err(err);
        }
      }
    }
  }

  fn emit(&mut self, bucket: Vec<S::Item>) -> Result<Option<F::Output>, BatchError<S::Error>> {
    let len = bucket.len();
    match self.selector.select(bucket) {
      Ok(output) => {
        self.emitted += 1;
        trace!(batcher = %self.display_name(), len, index = self.emitted - 1, "emitting batch");
        Ok(Some(output))
      }
      Err(e) => {
        warn!(batcher = %self.display_name(), len, error = %e, "result selector failed");
        self.source = None;
        Err(BatchError::Selector(e))
      }
    }
  }

  fn terminate(&mut self, err: &BatchError<S::Error>) {
    let discarded = self.bucket.take().map_or(0, |b| b.len());
    self.source = None;
    if err.is_cancelled() {
      debug!(batcher = %self.display_name(), discarded, "batch cancelled");
    } else {
      warn!(batcher = %self.display_name(), discarded, "source failed");
    }
  }

  fn display_name(&self) -> &str {
    self.name.as_deref().unwrap_or(DEFAULT_NAME)
  }
}
