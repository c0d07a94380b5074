use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use super::{AnchorId, IntersectionCallback, IntersectionEntry, ObservationConfig, SubscriptionHandle, VisibilityHost};
use crate::error::Error;

/// Vertical extent of a laid-out element, in content rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
  pub top: usize,
  pub height: usize,
}

impl Span {
  pub fn new(top: usize, height: usize) -> Self {
    Span { top, height }
  }
}

struct Observation {
  anchor: AnchorId,
  config: ObservationConfig,
  callback: IntersectionCallback,
  last_intersecting: Option<bool>,
  pending: Vec<IntersectionEntry>,
}

/// A vertically scrolling terminal viewport acting as the visibility host.
///
/// Layout and scrolling call [`Viewport::evaluate`], which queues an entry for
/// every subscription whose intersecting state changed (the first evaluation
/// of a subscription always queues one). Queued entries are delivered in one
/// batch per subscription by [`Viewport::flush`].
#[derive(Default)]
pub struct Viewport {
  scroll_top: usize,
  height: usize,
  content_height: usize,
  anchors: HashMap<AnchorId, Span>,
  observations: BTreeMap<SubscriptionHandle, Observation>,
  next_handle: u64,
}

impl Viewport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn scroll_top(&self) -> usize {
    self.scroll_top
  }

  pub fn content_height(&self) -> usize {
    self.content_height
  }

  pub fn max_scroll(&self) -> usize {
    self.content_height.saturating_sub(self.height)
  }

  pub fn active_subscriptions(&self) -> usize {
    self.observations.len()
  }

  /// Returns true when the height changed.
  pub fn set_height(&mut self, height: usize) -> bool {
    if self.height == height {
      return false;
    }
    self.height = height;
    self.clamp_scroll();
    true
  }

  pub fn set_content_height(&mut self, content_height: usize) {
    self.content_height = content_height;
    self.clamp_scroll();
  }

  pub fn scroll_by(&mut self, delta: isize) {
    let target = self.scroll_top.saturating_add_signed(delta);
    self.scroll_to(target);
  }

  pub fn scroll_to(&mut self, top: usize) {
    self.scroll_top = top.min(self.max_scroll());
  }

  pub fn scroll_to_end(&mut self) {
    self.scroll_top = self.max_scroll();
  }

  pub fn place_anchor(&mut self, anchor: AnchorId, span: Span) {
    self.anchors.insert(anchor, span);
  }

  /// Removes an anchor from layout. Subscriptions on it stay registered but
  /// are skipped until the anchor is placed again.
  pub fn remove_anchor(&mut self, anchor: AnchorId) {
    self.anchors.remove(&anchor);
  }

  fn clamp_scroll(&mut self) {
    self.scroll_top = self.scroll_top.min(self.max_scroll());
  }

  fn intersection(&self, span: Span, config: &ObservationConfig) -> (bool, f64) {
    let margin = &config.root_margin;
    let root_top = self.scroll_top as i64 - margin.top.resolve(self.height);
    let root_bottom = (self.scroll_top + self.height) as i64 + margin.bottom.resolve(self.height);
    let top = span.top as i64;

    if span.height == 0 {
      let inside = root_top <= top && top <= root_bottom;
      return (inside, if inside { 1.0 } else { 0.0 });
    }

    let bottom = top + span.height as i64;
    let overlap = (bottom.min(root_bottom) - top.max(root_top)).max(0);
    let ratio = overlap as f64 / span.height as f64;
    let threshold = config.threshold.value();
    let intersecting = if threshold == 0.0 { overlap > 0 } else { ratio >= threshold };
    (intersecting, ratio)
  }

  /// Recomputes every subscription against the current layout and scroll
  /// position, queueing an entry where the intersecting state changed. Does
  /// nothing until the viewport has a height.
  pub fn evaluate(&mut self) {
    if self.height == 0 {
      return;
    }
    let handles: Vec<SubscriptionHandle> = self.observations.keys().copied().collect();
    for handle in handles {
      let Some(observation) = self.observations.get(&handle) else { continue };
      let Some(span) = self.anchors.get(&observation.anchor).copied() else { continue };
      let (intersecting, ratio) = self.intersection(span, &observation.config);

      if let Some(observation) = self.observations.get_mut(&handle) {
        if observation.last_intersecting != Some(intersecting) {
          trace!(%handle, anchor = %observation.anchor, intersecting, ratio, "intersection changed");
          observation.last_intersecting = Some(intersecting);
          observation.pending.push(IntersectionEntry::new(observation.anchor, intersecting, ratio));
        }
      }
    }
  }

  /// Delivers queued entries, one batch per subscription. Returns how many
  /// batches were delivered.
  pub fn flush(&mut self) -> usize {
    let mut delivered = 0;
    for observation in self.observations.values_mut() {
      if observation.pending.is_empty() {
        continue;
      }
      let entries = std::mem::take(&mut observation.pending);
      (observation.callback)(&entries);
      delivered += 1;
    }
    delivered
  }
}

impl VisibilityHost for Viewport {
  fn subscribe(
    &mut self,
    anchor: AnchorId,
    config: &ObservationConfig,
    callback: IntersectionCallback,
  ) -> Result<SubscriptionHandle, Error> {
    if !self.anchors.contains_key(&anchor) {
      return Err(Error::MissingAnchor(anchor));
    }
    self.next_handle += 1;
    let handle = SubscriptionHandle(self.next_handle);
    debug!(%handle, %anchor, ?config, "subscribe");
    self.observations.insert(handle, Observation {
      anchor,
      config: config.clone(),
      callback,
      last_intersecting: None,
      pending: Vec::new(),
    });
    Ok(handle)
  }

  fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), Error> {
    let observation = self.observations.remove(&handle).ok_or(Error::UnknownSubscription(handle))?;
    debug!(%handle, anchor = %observation.anchor, "unsubscribe");
    if !self.anchors.contains_key(&observation.anchor) {
      return Err(Error::MissingAnchor(observation.anchor));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use pretty_assertions::assert_eq;

  use super::*;

  fn recorder() -> (Arc<Mutex<Vec<Vec<IntersectionEntry>>>>, IntersectionCallback) {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let sink = batches.clone();
    (batches, Box::new(move |entries: &[IntersectionEntry]| sink.lock().unwrap().push(entries.to_vec())))
  }

  fn viewport(height: usize, content_height: usize) -> Viewport {
    let mut viewport = Viewport::new();
    viewport.set_content_height(content_height);
    viewport.set_height(height);
    viewport
  }

  #[test]
  fn test_subscribe_requires_anchor() {
    let mut viewport = viewport(10, 100);
    let (_, callback) = recorder();

    let result = viewport.subscribe(AnchorId(1), &ObservationConfig::default(), callback);

    assert_eq!(result, Err(Error::MissingAnchor(AnchorId(1))));
    assert_eq!(viewport.active_subscriptions(), 0);
  }

  #[test]
  fn test_initial_notification_reports_current_state() {
    let mut viewport = viewport(10, 100);
    viewport.place_anchor(AnchorId(1), Span::new(50, 0));
    let (batches, callback) = recorder();
    viewport.subscribe(AnchorId(1), &ObservationConfig::default(), callback).unwrap();

    viewport.evaluate();
    viewport.flush();

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![IntersectionEntry::new(AnchorId(1), false, 0.0)]);
  }

  #[test]
  fn test_only_transitions_are_reported() {
    let mut viewport = viewport(10, 100);
    viewport.place_anchor(AnchorId(1), Span::new(15, 0));
    let (batches, callback) = recorder();
    viewport.subscribe(AnchorId(1), &ObservationConfig::default(), callback).unwrap();
    viewport.evaluate();
    viewport.flush();

    viewport.scroll_by(1);
    viewport.evaluate();
    viewport.flush();
    viewport.scroll_by(5);
    viewport.evaluate();
    viewport.flush();
    viewport.scroll_by(1);
    viewport.evaluate();
    viewport.flush();

    let batches = batches.lock().unwrap();
    let states: Vec<bool> = batches.iter().map(|batch| batch[0].is_intersecting).collect();
    assert_eq!(states, vec![false, true]);
  }

  #[test]
  fn test_entries_accumulate_until_flush() {
    let mut viewport = viewport(10, 100);
    viewport.place_anchor(AnchorId(1), Span::new(12, 0));
    let (batches, callback) = recorder();
    viewport.subscribe(AnchorId(1), &ObservationConfig::default(), callback).unwrap();

    viewport.evaluate();
    viewport.scroll_to(5);
    viewport.evaluate();
    viewport.scroll_to(0);
    viewport.evaluate();
    let delivered = viewport.flush();

    assert_eq!(delivered, 1);
    let batches = batches.lock().unwrap();
    let states: Vec<bool> = batches[0].iter().map(|entry| entry.is_intersecting).collect();
    assert_eq!(states, vec![false, true, false]);
  }

  #[test]
  fn test_root_margin_expands_viewport() {
    let mut viewport = viewport(10, 100);
    viewport.place_anchor(AnchorId(1), Span::new(14, 0));
    let (batches, callback) = recorder();
    let config = ObservationConfig::new("0px 0px 5px 0px", 0.0).unwrap();
    viewport.subscribe(AnchorId(1), &config, callback).unwrap();

    viewport.evaluate();
    viewport.flush();

    assert!(batches.lock().unwrap()[0][0].is_intersecting);
  }

  #[test]
  fn test_threshold_needs_enough_visible_rows() {
    let mut viewport = viewport(10, 100);
    viewport.place_anchor(AnchorId(1), Span::new(8, 4));
    let (batches, callback) = recorder();
    let config = ObservationConfig::new("0px", 0.75).unwrap();
    viewport.subscribe(AnchorId(1), &config, callback).unwrap();

    viewport.evaluate();
    viewport.scroll_by(1);
    viewport.evaluate();
    viewport.flush();

    let batches = batches.lock().unwrap();
    assert_eq!(batches[0].len(), 2);
    assert!(!batches[0][0].is_intersecting);
    assert_eq!(batches[0][0].ratio, 0.5);
    assert!(batches[0][1].is_intersecting);
    assert_eq!(batches[0][1].ratio, 0.75);
  }

  #[test]
  fn test_unsubscribe_drops_pending_entries() {
    let mut viewport = viewport(10, 100);
    viewport.place_anchor(AnchorId(1), Span::new(0, 0));
    let (batches, callback) = recorder();
    let handle = viewport.subscribe(AnchorId(1), &ObservationConfig::default(), callback).unwrap();
    viewport.evaluate();

    viewport.unsubscribe(handle).unwrap();
    viewport.flush();

    assert!(batches.lock().unwrap().is_empty());
    assert_eq!(viewport.unsubscribe(handle), Err(Error::UnknownSubscription(handle)));
  }

  #[test]
  fn test_scroll_is_clamped_to_content() {
    let mut viewport = viewport(10, 25);

    viewport.scroll_by(100);
    assert_eq!(viewport.scroll_top(), 15);
    viewport.scroll_by(-100);
    assert_eq!(viewport.scroll_top(), 0);

    viewport.scroll_to_end();
    viewport.set_content_height(12);
    assert_eq!(viewport.scroll_top(), 2);
  }

  #[test]
  fn test_evaluate_waits_for_height() {
    let mut viewport = Viewport::new();
    viewport.place_anchor(AnchorId(1), Span::new(0, 0));
    let (batches, callback) = recorder();
    viewport.subscribe(AnchorId(1), &ObservationConfig::default(), callback).unwrap();

    viewport.evaluate();
    viewport.flush();

    assert!(batches.lock().unwrap().is_empty());
  }
}
