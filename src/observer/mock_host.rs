use std::collections::{BTreeMap, HashSet};

use super::{AnchorId, IntersectionCallback, IntersectionEntry, ObservationConfig, SubscriptionHandle, VisibilityHost};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
  Subscribe(SubscriptionHandle, AnchorId, ObservationConfig),
  Unsubscribe(SubscriptionHandle),
}

/// Records every call and lets tests deliver arbitrary batches.
#[derive(Default)]
pub struct MockVisibilityHost {
  pub anchors: HashSet<AnchorId>,
  pub calls: Vec<HostCall>,
  pub max_active: usize,
  subscriptions: BTreeMap<SubscriptionHandle, (AnchorId, IntersectionCallback)>,
  next_handle: u64,
}

impl MockVisibilityHost {
  pub fn with_anchor(anchor: AnchorId) -> Self {
    let mut host = Self::default();
    host.anchors.insert(anchor);
    host
  }

  pub fn active(&self) -> usize {
    self.subscriptions.len()
  }

  /// Delivers `entries` to every live subscription.
  pub fn deliver(&mut self, entries: &[IntersectionEntry]) {
    for (_, callback) in self.subscriptions.values_mut() {
      callback(entries);
    }
  }

  /// Takes the callback out of the host without unsubscribing. Stands in for
  /// a notification that was already queued when the marker went away.
  pub fn steal_callback(&mut self, handle: SubscriptionHandle) -> Option<IntersectionCallback> {
    self.subscriptions.remove(&handle).map(|(_, callback)| callback)
  }
}

impl VisibilityHost for MockVisibilityHost {
  fn subscribe(
    &mut self,
    anchor: AnchorId,
    config: &ObservationConfig,
    callback: IntersectionCallback,
  ) -> Result<SubscriptionHandle, Error> {
    if !self.anchors.contains(&anchor) {
      return Err(Error::MissingAnchor(anchor));
    }
    self.next_handle += 1;
    let handle = SubscriptionHandle(self.next_handle);
    self.calls.push(HostCall::Subscribe(handle, anchor, config.clone()));
    self.subscriptions.insert(handle, (anchor, callback));
    self.max_active = self.max_active.max(self.subscriptions.len());
    Ok(handle)
  }

  fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), Error> {
    self.calls.push(HostCall::Unsubscribe(handle));
    self.subscriptions.remove(&handle).map(|_| ()).ok_or(Error::UnknownSubscription(handle))
  }
}
