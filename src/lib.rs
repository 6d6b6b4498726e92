//! # batchweave
//!
//! Lazy, cancellable batching for iterators and async streams.
//!
//! The `batch` operator splits a sequence into consecutive, non-overlapping
//! buckets of at most `size` elements, optionally projecting each bucket
//! through a result selector. One engine implements the algorithm. It pulls
//! from a [`Source`], which either wraps an in-memory collection
//! ([`Immediate`]) or an asynchronous stream ([`Awaiting`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use batchweave::{IterBatchExt, StreamBatchExt};
//! use futures::{StreamExt, stream};
//!
//! // Synchronous
//! let batches: Vec<Vec<i32>> = (1..=9).batch(3).unwrap().map(Result::unwrap).collect();
//! assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
//!
//! // Asynchronous
//! # tokio_test::block_on(async {
//! let sums: Vec<i32> = stream::iter(1..=9)
//!   .batch_with(4, |bucket: Vec<i32>| bucket.iter().sum::<i32>())
//!   .unwrap()
//!   .map(Result::unwrap)
//!   .collect()
//!   .await;
//! assert_eq!(sums, vec![10, 26, 9]);
//! # });
//! ```
//!
//! ## Guarantees
//!
//! - **Eager validation**: a zero bucket size fails at construction, before the
//!   source is touched.
//! - **Laziness**: the source is not enumerated until the first bucket is
//!   requested.
//! - **Single pull**: at most one read of the source is in flight. There is no
//!   read-ahead.
//! - **Cancellation**: a cancelled token ends the output with
//!   [`BatchError::Cancelled`] and discards buffered elements.
//! - **Release**: the source is dropped once exhausted, failed, cancelled, or
//!   when the output is dropped.

/// Output adapters: the `Batch` iterator and `BatchStream`.
pub mod batch;
/// Operator configuration and cancellation policy.
pub mod config;
/// The batching engine.
pub mod engine;
/// Error types.
pub mod error;
/// Extension traits for iterables and streams.
pub mod ext;
/// Result selectors applied to completed buckets.
pub mod select;
/// Pull-based sources.
pub mod source;

pub use batch::{Batch, BatchStream, batch, batch_with};
pub use config::{BatchConfig, CancelPolicy};
pub use engine::Batcher;
pub use error::{BatchError, BoxError, ComponentInfo};
pub use ext::{IterBatchExt, StreamBatchExt, TryStreamBatchExt};
pub use select::{Identity, Project, Select, TryProject};
pub use source::{Awaiting, Immediate, Source};
pub use tokio_util::sync::CancellationToken;
