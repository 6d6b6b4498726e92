//! # Batch Configuration
//!
//! [`BatchConfig`] collects the knobs of a batching operator: the bucket size,
//! an optional component name used in log events, and the [`CancelPolicy`].
//! It can be built in code with the `with_*` setters or deserialized from JSON.
//!
//! ```rust
//! use batchweave::{BatchConfig, CancelPolicy};
//!
//! let config = BatchConfig::from_json(r#"{ "size": 64, "name": "uploads" }"#).unwrap();
//! assert_eq!(config.size, 64);
//! assert_eq!(config.cancel_policy, CancelPolicy::Enforced);
//! ```

use crate::error::{BatchError, check_size};
use serde::{Deserialize, Serialize};

/// Name reported by operators that were not given one.
pub const DEFAULT_NAME: &str = "batch";

/// How strictly a cancellation token is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
  /// The engine checks the token before every pull and races every pull
  /// against it, so even sources that never look at the token stop.
  #[default]
  Enforced,
  /// The token is only handed to the source. Sources that ignore it
  /// (in-memory iterators, for instance) run to completion.
  Cooperative,
}

/// Configuration for a batching operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
  /// Maximum number of elements per bucket. Must be at least 1.
  pub size: usize,
  /// Component name used in log events.
  #[serde(default)]
  pub name: Option<String>,
  /// Cancellation policy.
  #[serde(default)]
  pub cancel_policy: CancelPolicy,
}

impl BatchConfig {
  pub fn new(size: usize) -> Self {
    Self {
      size,
      name: None,
      cancel_policy: CancelPolicy::default(),
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
    self.cancel_policy = policy;
    self
  }

  /// The configured name, or [`DEFAULT_NAME`].
  pub fn name(&self) -> &str {
    self.name.as_deref().unwrap_or(DEFAULT_NAME)
  }

  /// Checks every field without touching any source.
  pub fn validate(&self) -> Result<(), BatchError> {
    check_size(self.size)?;
    if let Some(name) = &self.name {
      if name.trim().is_empty() {
        return Err(BatchError::InvalidArgument {
          param: "name",
          reason: "component name must not be blank".to_string(),
        });
      }
    }
    Ok(())
  }

  /// Parses and validates a JSON configuration.
  pub fn from_json(json: &str) -> Result<Self, BatchError> {
    let config: BatchConfig =
      serde_json::from_str(json).map_err(|e| BatchError::InvalidArgument {
        param: "config",
        reason: e.to_string(),
      })?;
    config.validate()?;
    Ok(config)
  }
}
