use thiserror::Error;

use crate::observer::{AnchorId, SubscriptionHandle};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
  #[error("anchor {0} is not mounted")]
  MissingAnchor(AnchorId),
  #[error("subscription {0} is not active")]
  UnknownSubscription(SubscriptionHandle),
  #[error("invalid root margin {input:?}: {reason}")]
  InvalidRootMargin { input: String, reason: String },
  #[error("threshold {0} is outside 0.0..=1.0")]
  InvalidThreshold(f64),
  #[error("batch size must be at least 1")]
  InvalidBatchSize,
}
