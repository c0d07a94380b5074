//! Viewport intersection observation.
//!
//! A [`VisibilityHost`] tracks laid-out anchor elements and notifies
//! subscribers when an anchor's intersection with the (margin-expanded)
//! viewport crosses the subscription's threshold.

use std::fmt;

use crate::error::Error;

pub mod root_margin;
pub mod viewport;

#[cfg(test)]
pub mod mock_host;

pub use root_margin::{Length, RootMargin};
pub use viewport::{Span, Viewport};

/// Identifies an element that has been laid out in a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Handle to a live subscription, returned by [`VisibilityHost::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub u64);

impl fmt::Display for SubscriptionHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "sub-{}", self.0)
  }
}

/// Fraction of the anchor that must be visible before it counts as intersecting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Threshold(f64);

impl Threshold {
  pub fn value(self) -> f64 {
    self.0
  }
}

impl TryFrom<f64> for Threshold {
  type Error = Error;

  fn try_from(value: f64) -> Result<Self, Self::Error> {
    if (0.0..=1.0).contains(&value) { Ok(Threshold(value)) } else { Err(Error::InvalidThreshold(value)) }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationConfig {
  pub root_margin: RootMargin,
  pub threshold: Threshold,
}

impl ObservationConfig {
  pub fn new(root_margin: &str, threshold: f64) -> Result<Self, Error> {
    Ok(ObservationConfig { root_margin: root_margin.parse()?, threshold: Threshold::try_from(threshold)? })
  }
}

/// One visibility transition reported by a host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
  pub anchor: AnchorId,
  pub is_intersecting: bool,
  pub ratio: f64,
}

impl IntersectionEntry {
  pub fn new(anchor: AnchorId, is_intersecting: bool, ratio: f64) -> Self {
    IntersectionEntry { anchor, is_intersecting, ratio }
  }
}

/// Receives every entry queued for a subscription since the last delivery.
pub type IntersectionCallback = Box<dyn FnMut(&[IntersectionEntry]) + Send + Sync>;

pub trait VisibilityHost: Send + Sync {
  /// Starts observing `anchor`. Fails with [`Error::MissingAnchor`] when the
  /// anchor has not been laid out.
  fn subscribe(
    &mut self,
    anchor: AnchorId,
    config: &ObservationConfig,
    callback: IntersectionCallback,
  ) -> Result<SubscriptionHandle, Error>;

  /// Stops a subscription. Its callback is dropped and never called again.
  fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), Error>;
}
